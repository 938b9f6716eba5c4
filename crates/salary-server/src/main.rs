//! Salary Server - HTTP salary prediction service
//!
//! Loads the trained artifacts once and serves predictions, form options,
//! health probes and Prometheus metrics.

use anyhow::Result;
use salary_core::{
    health::{components, HealthRegistry},
    observability::{ServiceMetrics, StructuredLogger},
    ArtifactStore, Predictor,
};
use salary_server::{api, ServerConfig};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting salary-server");

    let config = ServerConfig::load()?;
    info!(
        artifact_dir = %config.artifact_dir.display(),
        addr = %config.listen_addr(),
        "Server configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::ARTIFACTS).await;
    health_registry.register(components::PREDICTOR).await;

    let metrics = ServiceMetrics::new();
    let logger = StructuredLogger::new(&config.service_name);
    logger.log_startup(SERVICE_VERSION, &config.artifact_dir.display().to_string());

    let store = Arc::new(ArtifactStore::from_dir(&config.artifact_dir));
    let predictor = Predictor::new(
        store,
        health_registry.clone(),
        metrics,
        logger.clone(),
    );

    if config.preload_artifacts {
        // A failure leaves the service up but not ready; requests retry the load
        if let Err(e) = predictor.artifacts().await {
            warn!(error = %e, "Artifacts unavailable at startup");
        }
    }

    let app_state = Arc::new(api::AppState::new(predictor, health_registry));
    let api_handle = tokio::spawn(api::serve(config.listen_addr(), app_state));

    tokio::select! {
        result = api_handle => {
            match result {
                Ok(Ok(())) => logger.log_shutdown("API server stopped"),
                Ok(Err(e)) => {
                    logger.log_shutdown("API server failed");
                    return Err(e);
                }
                Err(e) => {
                    logger.log_shutdown("API server task panicked");
                    return Err(e.into());
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
