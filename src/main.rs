//! Inference Service
//!
//! Object detection and face recognition over gRPC, health probes over HTTP.
//! Models and the gRPC server run as lifecycle components.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use faceflow::config::Config;
use faceflow::engine::{ModelPool, ModelProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Starting inference service v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = Config::default_path();
    let mut config = Config::load(&config_path).unwrap_or_else(|e| {
        info!("Using default config ({}: {})", config_path, e);
        Config::default()
    });
    config.apply_env_overrides();
    config.validate()?;

    info!("Configuration loaded:");
    info!("  REST: {}:{}", config.server.rest_host, config.server.rest_port);
    info!("  gRPC: {}:{}", config.server.grpc_host, config.server.grpc_port);
    info!("  Device: {} ({} threads)", config.inference.device, config.inference.num_threads);
    info!("  Frame interval: {}ms", config.stream.min_frame_interval_ms);
    info!(
        "  Parallel startup: {}, fail on component error: {}",
        config.lifecycle.parallel_startup, config.lifecycle.fail_on_component_error
    );

    // Models load lazily, inside the component startups
    let provider: Arc<dyn ModelProvider> = Arc::new(ModelPool::new(&config));
    faceflow::app::run(config, provider, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for shutdown signal: {}", e);
        }
    })
    .await?;

    info!("Goodbye!");
    Ok(())
}
