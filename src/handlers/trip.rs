//! Trip planning message handlers

use std::sync::Arc;
use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::services::hos::{self, RegulatoryConfig, ScheduleError};
use crate::services::routing::DistanceProvider;
use crate::types::{
    error_codes, ErrorResponse, Request, SuccessResponse, TripPlanRequest, TripPlanResponse,
};

/// Why a trip could not be planned
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("distance provider failed: {0:#}")]
    Upstream(anyhow::Error),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

impl PlanError {
    pub fn code(&self) -> &'static str {
        match self {
            PlanError::InvalidInput(_) => error_codes::INVALID_INPUT,
            PlanError::Upstream(_) => error_codes::UPSTREAM_UNAVAILABLE,
            PlanError::Schedule(e) => e.code(),
        }
    }

    /// Extra context for the error response, if any
    pub fn details(&self, provider: &str) -> Option<serde_json::Value> {
        match self {
            PlanError::InvalidInput(_) => None,
            PlanError::Upstream(_) => Some(json!({ "provider": provider })),
            PlanError::Schedule(ScheduleError::InvalidConfig { field, .. })
            | PlanError::Schedule(ScheduleError::InvalidInput { field, .. }) => {
                Some(json!({ "field": field }))
            }
        }
    }
}

/// Resolve leg distances and build the duty schedule for one trip.
pub async fn plan_trip(
    provider: &dyn DistanceProvider,
    config: &RegulatoryConfig,
    request: &TripPlanRequest,
) -> Result<TripPlanResponse, PlanError> {
    let waypoints = request.waypoints();
    for (name, point) in [
        ("start", waypoints.start),
        ("pickup", waypoints.pickup),
        ("dropoff", waypoints.dropoff),
    ] {
        if !point.is_valid() {
            return Err(PlanError::InvalidInput(format!(
                "{} must be [lat, lng] within range, got [{}, {}]",
                name, point.lat, point.lng
            )));
        }
    }

    let cycle_used = request
        .cycle_used_hours()
        .map_err(PlanError::InvalidInput)?;

    let legs = provider
        .trip_legs(&waypoints)
        .await
        .map_err(PlanError::Upstream)?;
    debug!(
        "{} legs: {:.0} m to pickup, {:.0} m to dropoff",
        provider.name(),
        legs.to_pickup_meters,
        legs.to_dropoff_meters
    );

    let steps = hos::generate(legs.to_pickup_meters, legs.to_dropoff_meters, cycle_used, config)?;
    let summary = hos::summarize(&steps);
    let total_distance_meters = legs.total_meters();

    Ok(TripPlanResponse {
        distance_to_pickup_meters: legs.to_pickup_meters,
        distance_to_dropoff_meters: legs.to_dropoff_meters,
        total_distance_meters,
        total_distance_miles: hos::meters_to_miles(total_distance_meters),
        route_geometry: legs.geometry.coordinates,
        steps,
        summary,
    })
}

/// Handle hos.trip.plan messages
pub async fn handle_plan(
    client: Client,
    mut subscriber: Subscriber,
    provider: Arc<dyn DistanceProvider>,
    config: Arc<RegulatoryConfig>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received trip.plan message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<TripPlanRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), error_codes::INVALID_REQUEST, e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        match plan_trip(provider.as_ref(), &config, &request.payload).await {
            Ok(response) => {
                info!(
                    "Trip planned: {:.1} mi, {} segments over {} day(s)",
                    response.total_distance_miles,
                    response.steps.len(),
                    response.summary.day_count
                );
                let success = SuccessResponse::new(request.id, response);
                let _ = client.publish(reply, serde_json::to_vec(&success)?.into()).await;
            }
            Err(e) => {
                error!("Failed to plan trip: {}", e);
                let mut error = ErrorResponse::new(request.id, e.code(), e.to_string());
                if let Some(details) = e.details(provider.name()) {
                    error = error.with_details(details);
                }
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::services::routing::{MockDistanceProvider, TripLegs};
    use crate::types::{CycleUsed, TripWaypoints};

    struct FailingProvider;

    #[async_trait]
    impl DistanceProvider for FailingProvider {
        async fn trip_legs(&self, _waypoints: &TripWaypoints) -> Result<TripLegs> {
            anyhow::bail!("connection refused")
        }

        fn name(&self) -> &str {
            "Failing"
        }
    }

    fn request(cycle_used: Option<CycleUsed>) -> TripPlanRequest {
        TripPlanRequest {
            start: [41.8781, -87.6298],   // Chicago
            pickup: [39.7684, -86.1581],  // Indianapolis
            dropoff: [39.9612, -82.9988], // Columbus
            cycle_used,
        }
    }

    #[tokio::test]
    async fn test_plan_trip_with_mock_provider() {
        let config = RegulatoryConfig::default();
        let response = plan_trip(&MockDistanceProvider::new(), &config, &request(None))
            .await
            .unwrap();

        assert!(response.distance_to_pickup_meters > 0.0);
        assert!(
            (response.total_distance_meters
                - (response.distance_to_pickup_meters + response.distance_to_dropoff_meters))
                .abs()
                < 1e-6
        );
        assert!((response.total_distance_miles - response.summary.total_miles).abs() < 1e-6);
        assert_eq!(response.route_geometry.len(), 3);

        let pickups = response.steps.iter().filter(|s| s.label == "Pickup Loading").count();
        assert_eq!(pickups, 1);
        assert_eq!(response.steps.last().map(|s| s.label.as_str()), Some("Off Duty"));
    }

    #[tokio::test]
    async fn test_plan_trip_exhausted_cycle_starts_with_restart() {
        let config = RegulatoryConfig::default();
        let response = plan_trip(
            &MockDistanceProvider::new(),
            &config,
            &request(Some(CycleUsed::Text("70".to_string()))),
        )
        .await
        .unwrap();

        let first_drive = response
            .steps
            .iter()
            .position(|s| s.label == "Driving")
            .unwrap();
        assert!(response.steps[..first_drive]
            .iter()
            .any(|s| s.label == "34h Cycle Restart"));
    }

    #[tokio::test]
    async fn test_plan_trip_rejects_bad_cycle_used() {
        let config = RegulatoryConfig::default();
        let err = plan_trip(
            &MockDistanceProvider::new(),
            &config,
            &request(Some(CycleUsed::Hours(-5.0))),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_plan_trip_rejects_out_of_range_coordinates() {
        let config = RegulatoryConfig::default();
        let mut bad = request(None);
        bad.pickup = [120.0, 14.0];

        let err = plan_trip(&MockDistanceProvider::new(), &config, &bad)
            .await
            .unwrap_err();

        assert_eq!(err.code(), "INVALID_INPUT");
        assert!(err.to_string().contains("pickup"));
    }

    #[tokio::test]
    async fn test_plan_trip_provider_failure_is_upstream() {
        let config = RegulatoryConfig::default();
        let err = plan_trip(&FailingProvider, &config, &request(None))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "UPSTREAM_UNAVAILABLE");
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.details("Failing"), Some(json!({"provider": "Failing"})));
    }

    #[tokio::test]
    async fn test_plan_trip_invalid_config() {
        let config = RegulatoryConfig {
            avg_speed_mph: 0.0,
            ..Default::default()
        };
        let err = plan_trip(&MockDistanceProvider::new(), &config, &request(None))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "INVALID_CONFIG");
        assert_eq!(err.details("MockDistance"), Some(json!({"field": "avg_speed_mph"})));
    }

    #[test]
    fn test_request_envelope_deserializes() {
        let request: Request<TripPlanRequest> = serde_json::from_value(json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "timestamp": "2026-01-15T08:00:00Z",
            "payload": {
                "start": [40.7128, -74.0060],
                "pickup": [39.9526, -75.1652],
                "dropoff": [38.9072, -77.0369],
                "cycleUsed": 12
            }
        }))
        .unwrap();

        assert_eq!(request.payload.cycle_used_hours().unwrap(), 12.0);
    }
}
