//! Status handler for health checks

use std::sync::Arc;
use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde::Serialize;
use tracing::{debug, error};
use uuid::Uuid;

use crate::services::hos::RegulatoryConfig;
use crate::services::routing::DistanceProvider;
use crate::types::{error_codes, EmptyPayload, ErrorResponse, Request, SuccessResponse};

pub const SERVICE_NAME: &str = "hos-log-worker";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub service: String,
    pub version: String,
    pub distance_provider: String,
    pub regulatory: RegulatoryConfig,
}

pub fn build_status(provider: &dyn DistanceProvider, config: &RegulatoryConfig) -> StatusResponse {
    StatusResponse {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        distance_provider: provider.name().to_string(),
        regulatory: config.clone(),
    }
}

/// Handle hos.status messages
pub async fn handle_status(
    client: Client,
    mut subscriber: Subscriber,
    provider: Arc<dyn DistanceProvider>,
    config: Arc<RegulatoryConfig>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received status message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                error!("Status message without reply subject");
                continue;
            }
        };

        // Empty body is allowed
        let request_id = if msg.payload.is_empty() {
            Uuid::nil()
        } else {
            match serde_json::from_slice::<Request<EmptyPayload>>(&msg.payload) {
                Ok(req) => req.id,
                Err(e) => {
                    error!("Failed to parse status request: {}", e);
                    let error = ErrorResponse::new(Uuid::nil(), error_codes::INVALID_REQUEST, e.to_string());
                    let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                    continue;
                }
            }
        };

        let response = SuccessResponse::new(request_id, build_status(provider.as_ref(), &config));
        client.publish(reply, serde_json::to_vec(&response)?.into()).await?;

        debug!("Sent status response");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::routing::MockDistanceProvider;

    #[test]
    fn test_build_status() {
        let config = RegulatoryConfig::default();
        let status = build_status(&MockDistanceProvider::new(), &config);

        assert_eq!(status.service, "hos-log-worker");
        assert_eq!(status.distance_provider, "MockDistance");
        assert_eq!(status.regulatory, config);
    }

    #[test]
    fn test_status_serializes_camel_case() {
        let status = build_status(&MockDistanceProvider::new(), &RegulatoryConfig::default());
        let value = serde_json::to_value(&status).unwrap();

        assert_eq!(value["distanceProvider"], "MockDistance");
        assert_eq!(value["regulatory"]["maxCycleHours"], 70.0);
        assert_eq!(value["regulatory"]["startDutyHour"], 6.0);
    }
}
