//! Distance providers for the two trip legs
//!
//! Uses OpenRouteService in production, a haversine estimate otherwise.

mod openrouteservice;

pub use openrouteservice::{OpenRouteServiceClient, OpenRouteServiceConfig};

use async_trait::async_trait;
use anyhow::Result;

use crate::services::geo::{road_distance_meters, ROAD_COEFFICIENT};
use crate::types::{Coordinates, TripWaypoints};

/// Route geometry as GeoJSON coordinates
/// Coordinates are in [longitude, latitude] order (GeoJSON standard)
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct RouteGeometry {
    pub coordinates: Vec<[f64; 2]>,
}

impl RouteGeometry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Straight lines through the given points
    pub fn from_coordinates(coords: &[Coordinates]) -> Self {
        Self {
            coordinates: coords.iter().map(|c| c.to_lng_lat()).collect(),
        }
    }
}

/// Road distances for start → pickup and pickup → dropoff
#[derive(Debug, Clone, PartialEq)]
pub struct TripLegs {
    pub to_pickup_meters: f64,
    pub to_dropoff_meters: f64,
    pub geometry: RouteGeometry,
}

impl TripLegs {
    pub fn total_meters(&self) -> f64 {
        self.to_pickup_meters + self.to_dropoff_meters
    }
}

/// Source of leg distances (OpenRouteService, mock, ...)
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    /// Distances for both legs of the trip, in meters
    async fn trip_legs(&self, waypoints: &TripWaypoints) -> Result<TripLegs>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Haversine × road coefficient; straight-line geometry
pub struct MockDistanceProvider {
    road_coefficient: f64,
}

impl Default for MockDistanceProvider {
    fn default() -> Self {
        Self {
            road_coefficient: ROAD_COEFFICIENT,
        }
    }
}

impl MockDistanceProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DistanceProvider for MockDistanceProvider {
    async fn trip_legs(&self, waypoints: &TripWaypoints) -> Result<TripLegs> {
        Ok(TripLegs {
            to_pickup_meters: road_distance_meters(&waypoints.start, &waypoints.pickup, self.road_coefficient),
            to_dropoff_meters: road_distance_meters(&waypoints.pickup, &waypoints.dropoff, self.road_coefficient),
            geometry: RouteGeometry::from_coordinates(&waypoints.as_array()),
        })
    }

    fn name(&self) -> &str {
        "MockDistance"
    }
}

/// Create the distance provider, falling back to the mock when
/// OpenRouteService is not configured or does not answer its health check.
pub async fn create_distance_provider_with_fallback(
    config: Option<OpenRouteServiceConfig>,
) -> Box<dyn DistanceProvider> {
    use tracing::{info, warn};

    if let Some(cfg) = config {
        let base_url = cfg.base_url.clone();
        match OpenRouteServiceClient::new(cfg) {
            Ok(client) => match client.check_health().await {
                Ok(()) => {
                    info!("OpenRouteService available at {}", base_url);
                    return Box::new(client);
                }
                Err(e) => {
                    warn!("OpenRouteService not available at {}: {}. Falling back to mock distances.", base_url, e);
                }
            },
            Err(e) => {
                warn!("Failed to build OpenRouteService client: {}. Falling back to mock distances.", e);
            }
        }
    }

    info!("Using mock distance provider (OpenRouteService not configured or unavailable)");
    Box::new(MockDistanceProvider::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waypoints() -> TripWaypoints {
        TripWaypoints {
            start: Coordinates { lat: 41.8781, lng: -87.6298 },   // Chicago
            pickup: Coordinates { lat: 39.7684, lng: -86.1581 },  // Indianapolis
            dropoff: Coordinates { lat: 39.9612, lng: -82.9988 }, // Columbus
        }
    }

    #[tokio::test]
    async fn test_mock_legs_are_positive_road_estimates() {
        let provider = MockDistanceProvider::new();
        let legs = provider.trip_legs(&waypoints()).await.unwrap();

        // Chicago → Indianapolis ~265 km straight, ~345 km estimated road
        let to_pickup_km = legs.to_pickup_meters / 1000.0;
        assert!(to_pickup_km > 320.0 && to_pickup_km < 370.0, "got {} km", to_pickup_km);
        assert!(legs.to_dropoff_meters > 0.0);
        assert!((legs.total_meters() - (legs.to_pickup_meters + legs.to_dropoff_meters)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_mock_geometry_is_straight_lines() {
        let provider = MockDistanceProvider::new();
        let legs = provider.trip_legs(&waypoints()).await.unwrap();

        assert_eq!(legs.geometry.coordinates.len(), 3);
        assert_eq!(legs.geometry.coordinates[0], [-87.6298, 41.8781]);
    }

    #[tokio::test]
    async fn test_mock_same_point_trip_is_zero() {
        let here = Coordinates { lat: 50.0, lng: 14.0 };
        let provider = MockDistanceProvider { road_coefficient: 1.0 };
        let legs = provider
            .trip_legs(&TripWaypoints { start: here, pickup: here, dropoff: here })
            .await
            .unwrap();

        assert!(legs.to_pickup_meters.abs() < 1e-6);
        assert!(legs.to_dropoff_meters.abs() < 1e-6);
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(MockDistanceProvider::new().name(), "MockDistance");
    }

    #[test]
    fn test_route_geometry_empty() {
        assert!(RouteGeometry::empty().coordinates.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_without_config() {
        let provider = create_distance_provider_with_fallback(None).await;
        assert_eq!(provider.name(), "MockDistance");
    }

    #[tokio::test]
    async fn test_fallback_on_unreachable_service() {
        let config = OpenRouteServiceConfig::new("http://localhost:9", "test-key");
        let provider = create_distance_provider_with_fallback(Some(config)).await;
        assert_eq!(provider.name(), "MockDistance");
    }
}
