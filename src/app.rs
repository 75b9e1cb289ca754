//! Service wiring: components, lifecycle, REST probes
//!
//! The REST listener is bound before any component starts, so a taken port
//! fails fast without loading models, and the probes can answer while
//! startup is still running.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::api::grpc::GrpcServices;
use crate::api::rest::{create_rest_router, AppState};
use crate::config::Config;
use crate::engine::ModelProvider;
use crate::lifecycle::modules::register_default_components;
use crate::lifecycle::{ComponentRegistry, HealthRegistry, LifespanManager, LifespanOptions};
use crate::service::{FaceRecognitionService, ObjectDetectionService, StreamSettings};

/// Run the service until `shutdown` resolves, then stop every component.
pub async fn run<F>(config: Config, provider: Arc<dyn ModelProvider>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let services = GrpcServices {
        detection: Arc::new(ObjectDetectionService::new(
            provider.clone(),
            config.detection.clone(),
            &config.models,
        )),
        face: Arc::new(FaceRecognitionService::new(provider, config.face.clone())),
        stream: StreamSettings::from(&config.stream),
    };

    let registry = Arc::new(ComponentRegistry::new());
    register_default_components(&registry, &config, &services)?;
    let manager = Arc::new(LifespanManager::new(
        registry,
        Arc::new(HealthRegistry::new()),
        LifespanOptions::from(&config.lifecycle),
    ));

    let rest_addr = format!("{}:{}", config.server.rest_host, config.server.rest_port);
    let listener = TcpListener::bind(&rest_addr)
        .await
        .with_context(|| format!("failed to bind REST listener on {}", rest_addr))?;
    let local = listener.local_addr()?;

    // Stops the REST server and the health loop
    let (stop_tx, stop_rx) = watch::channel(false);

    let rest_router = create_rest_router(Arc::new(AppState::new(manager.clone())));
    let mut rest_stop = stop_rx.clone();
    let rest_task = tokio::spawn(async move {
        let shutdown = async move {
            let _ = rest_stop.changed().await;
        };
        if let Err(e) = axum::serve(listener, rest_router)
            .with_graceful_shutdown(shutdown)
            .await
        {
            error!("REST server error: {}", e);
        }
    });
    info!("REST health probes listening on http://{}", local);

    let report = match manager.startup().await {
        Ok(report) => report,
        Err(e) => {
            error!("startup aborted: {}", e);
            let _ = stop_tx.send(true);
            manager.shutdown().await;
            let _ = rest_task.await;
            return Err(e.into());
        }
    };
    for failed in &report.failed {
        warn!(component = %failed.name, "component unavailable: {}", failed.error);
    }

    let interval = Duration::from_secs(config.lifecycle.health_check_interval_secs.max(1));
    let health_task = spawn_health_loop(manager.clone(), interval, stop_rx);

    info!("Inference service is ready!");
    shutdown.await;
    info!("Shutdown signal received, cleaning up...");

    let _ = stop_tx.send(true);
    manager.shutdown().await;
    let _ = health_task.await;
    let _ = rest_task.await;
    Ok(())
}

fn spawn_health_loop(
    manager: Arc<LifespanManager>,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let results = manager.check_health().await;
                    let unhealthy: Vec<_> = results.iter().filter(|(_, ok)| !**ok).map(|(n, _)| n.as_str()).collect();
                    if !unhealthy.is_empty() {
                        warn!(components = ?unhealthy, "health check failures");
                    }
                }
                _ = stop.changed() => break,
            }
        }
    })
}
