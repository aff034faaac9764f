//! OpenRouteService directions client
//!
//! API documentation:
//! https://openrouteservice.org/dev/#/api-docs/v2/directions/{profile}/post

use async_trait::async_trait;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::TripWaypoints;
use super::{DistanceProvider, RouteGeometry, TripLegs};

/// Polyline precision used by OpenRouteService (without elevation)
const POLYLINE_PRECISION: u32 = 5;

/// OpenRouteService client configuration
#[derive(Debug, Clone)]
pub struct OpenRouteServiceConfig {
    /// Base URL (e.g. "https://api.openrouteservice.org")
    pub base_url: String,
    pub api_key: String,
    /// Routing profile (e.g. "driving-car", "driving-hgv")
    pub profile: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl OpenRouteServiceConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            profile: "driving-car".to_string(),
            timeout_seconds: 30,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }
}

/// OpenRouteService directions client
pub struct OpenRouteServiceClient {
    client: Client,
    config: OpenRouteServiceConfig,
}

impl OpenRouteServiceClient {
    pub fn new(config: OpenRouteServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    fn directions_url(&self) -> String {
        format!(
            "{}/v2/directions/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile
        )
    }

    /// Waypoints in `[lng, lat]` order as the API expects
    fn build_directions_request(&self, waypoints: &TripWaypoints) -> DirectionsRequest {
        DirectionsRequest {
            coordinates: waypoints.as_array().iter().map(|c| c.to_lng_lat()).collect(),
        }
    }

    /// Check the service answers before routing traffic to it
    pub async fn check_health(&self) -> Result<()> {
        let url = format!("{}/v2/health", self.config.base_url.trim_end_matches('/'));
        let response = self.client
            .get(&url)
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            anyhow::bail!("OpenRouteService returned status {}", response.status())
        }
    }
}

#[async_trait]
impl DistanceProvider for OpenRouteServiceClient {
    async fn trip_legs(&self, waypoints: &TripWaypoints) -> Result<TripLegs> {
        let request = self.build_directions_request(waypoints);
        let url = self.directions_url();

        debug!("Requesting directions from OpenRouteService ({})", self.config.profile);

        let response = self.client
            .post(&url)
            .header("Authorization", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to OpenRouteService")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenRouteService returned error {}: {}", status, body);
        }

        let directions: DirectionsResponse = response
            .json()
            .await
            .context("Failed to parse OpenRouteService response")?;

        let legs = legs_from_response(directions)?;
        debug!(
            "Received legs from OpenRouteService: {:.0} m to pickup, {:.0} m to dropoff",
            legs.to_pickup_meters, legs.to_dropoff_meters
        );

        Ok(legs)
    }

    fn name(&self) -> &str {
        "OpenRouteService"
    }
}

/// Segment 0 is start → pickup, segment 1 is pickup → dropoff.
fn legs_from_response(response: DirectionsResponse) -> Result<TripLegs> {
    let route = response
        .routes
        .into_iter()
        .next()
        .context("OpenRouteService returned no routes")?;

    if route.segments.len() < 2 {
        anyhow::bail!(
            "OpenRouteService returned {} segment(s), expected 2",
            route.segments.len()
        );
    }

    let geometry = match route.geometry {
        Some(encoded) => RouteGeometry {
            coordinates: decode_polyline(&encoded, POLYLINE_PRECISION)?,
        },
        None => RouteGeometry::empty(),
    };

    Ok(TripLegs {
        to_pickup_meters: route.segments[0].distance,
        to_dropoff_meters: route.segments[1].distance,
        geometry,
    })
}

// OpenRouteService API types

#[derive(Debug, Serialize)]
struct DirectionsRequest {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    segments: Vec<RouteSegment>,
    /// Encoded polyline
    #[serde(default)]
    geometry: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RouteSegment {
    /// Meters
    #[serde(default)]
    distance: f64,
}

/// Decode one zig-zag varint from the polyline, advancing `pos`.
fn decode_value(bytes: &[u8], pos: &mut usize) -> Result<i64> {
    let mut shift = 0;
    let mut result = 0i64;
    loop {
        if shift > 60 {
            anyhow::bail!("Invalid polyline encoding: value too long");
        }
        let byte = *bytes
            .get(*pos)
            .context("Invalid polyline encoding: truncated value")? as i64
            - 63;
        *pos += 1;
        result |= (byte & 0x1f) << shift;
        shift += 5;
        if byte < 0x20 {
            break;
        }
    }
    Ok(if result & 1 != 0 { !(result >> 1) } else { result >> 1 })
}

/// Decode an encoded polyline into GeoJSON `[lng, lat]` pairs
fn decode_polyline(encoded: &str, precision: u32) -> Result<Vec<[f64; 2]>> {
    let factor = 10_f64.powi(precision as i32);
    let bytes = encoded.as_bytes();
    let mut coordinates = Vec::new();
    let mut pos = 0;
    let mut lat = 0i64;
    let mut lng = 0i64;

    while pos < bytes.len() {
        lat = lat
            .checked_add(decode_value(bytes, &mut pos)?)
            .context("Invalid polyline encoding: latitude overflow")?;
        lng = lng
            .checked_add(decode_value(bytes, &mut pos)?)
            .context("Invalid polyline encoding: longitude overflow")?;
        coordinates.push([lng as f64 / factor, lat as f64 / factor]);
    }

    Ok(coordinates)
}
