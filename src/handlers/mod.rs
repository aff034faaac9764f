//! NATS message handlers

pub mod status;
pub mod trip;

use std::sync::Arc;
use anyhow::Result;
use async_nats::Client;
use tracing::{info, error};
use tokio::select;

use crate::config::Config;
use crate::services::hos::RegulatoryConfig;
use crate::services::routing::{DistanceProvider, create_distance_provider_with_fallback};

pub const SUBJECT_TRIP_PLAN: &str = "hos.trip.plan";
pub const SUBJECT_STATUS: &str = "hos.status";

/// Start all message handlers
pub async fn start_handlers(client: Client, config: &Config) -> Result<()> {
    info!("Starting message handlers...");

    // Distance provider with automatic OpenRouteService detection
    let provider: Arc<dyn DistanceProvider> = Arc::from(
        create_distance_provider_with_fallback(config.ors.clone()).await
    );
    info!("Distance provider initialized: {}", provider.name());

    let regulatory: Arc<RegulatoryConfig> = Arc::new(config.regulatory.clone());

    // Subscribe to all subjects
    let trip_plan_sub = client.subscribe(SUBJECT_TRIP_PLAN).await?;
    let status_sub = client.subscribe(SUBJECT_STATUS).await?;

    let client_trip_plan = client.clone();
    let provider_trip_plan = Arc::clone(&provider);
    let regulatory_trip_plan = Arc::clone(&regulatory);
    let trip_plan_handle = tokio::spawn(async move {
        if let Err(e) = trip::handle_plan(client_trip_plan, trip_plan_sub, provider_trip_plan, regulatory_trip_plan).await {
            error!("Trip plan handler error: {}", e);
        }
    });

    let client_status = client.clone();
    let provider_status = Arc::clone(&provider);
    let regulatory_status = Arc::clone(&regulatory);
    let status_handle = tokio::spawn(async move {
        if let Err(e) = status::handle_status(client_status, status_sub, provider_status, regulatory_status).await {
            error!("Status handler error: {}", e);
        }
    });

    info!("All handlers started, waiting for messages...");

    // Wait for any handler to finish (which means an error occurred)
    select! {
        result = trip_plan_handle => {
            error!("Trip plan handler finished: {:?}", result);
        }
        result = status_handle => {
            error!("Status handler finished: {:?}", result);
        }
    }

    Ok(())
}
