//! gRPC server component
//!
//! Binds the listener during startup so address problems fail the component,
//! then serves in a background task until shutdown is signalled.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tracing::{error, info, warn};

use crate::api::grpc::{build_router, GrpcServices, SERVICE_NAMES};
use crate::config::{LifecycleConfig, ServerConfig};
use crate::lifecycle::component::{Component, ComponentDescriptor, ComponentPriority};
use crate::lifecycle::health::Metadata;

use super::{detection, face_models};

pub const NAME: &str = "grpc_server";

struct Serving {
    address: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<Result<(), tonic::transport::Error>>,
}

pub struct GrpcServerComponent {
    config: ServerConfig,
    services: GrpcServices,
    serving: Mutex<Option<Serving>>,
}

impl GrpcServerComponent {
    pub fn new(config: ServerConfig, services: GrpcServices) -> Self {
        Self {
            config,
            services,
            serving: Mutex::new(None),
        }
    }

    pub fn descriptor(self: Arc<Self>, lifecycle: &LifecycleConfig) -> ComponentDescriptor {
        ComponentDescriptor::from_instance(NAME, self)
            .priority(ComponentPriority::NORMAL)
            .depends_on([detection::NAME, face_models::NAME])
            .startup_timeout(Duration::from_secs(lifecycle.startup_timeout_secs))
            .shutdown_timeout(Duration::from_secs(lifecycle.shutdown_timeout_secs))
    }

    /// Bound address while serving
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.serving.lock().as_ref().map(|s| s.address)
    }

    pub fn is_serving(&self) -> bool {
        self.serving
            .lock()
            .as_ref()
            .is_some_and(|s| !s.task.is_finished())
    }
}

#[async_trait]
impl Component for GrpcServerComponent {
    async fn startup(&self) -> anyhow::Result<()> {
        if self.serving.lock().is_some() {
            info!("gRPC server already started");
            return Ok(());
        }

        let bind = format!("{}:{}", self.config.grpc_host, self.config.grpc_port);
        let listener = TcpListener::bind(&bind)
            .await
            .with_context(|| format!("failed to bind gRPC server to {}", bind))?;
        let address = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let router = build_router(&self.services, &self.config);
        let task = tokio::spawn(async move {
            router
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!(
            address = %address,
            max_workers = self.config.grpc_max_workers,
            "gRPC server listening"
        );
        *self.serving.lock() = Some(Serving {
            address,
            shutdown_tx,
            task,
        });
        Ok(())
    }

    async fn shutdown(&self) -> anyhow::Result<()> {
        let serving = self.serving.lock().take();
        let Some(serving) = serving else {
            warn!("gRPC server is not running");
            return Ok(());
        };

        info!(address = %serving.address, "stopping gRPC server");
        let _ = serving.shutdown_tx.send(());
        match serving.task.await {
            Ok(Ok(())) => {
                info!("gRPC server stopped");
                Ok(())
            }
            Ok(Err(e)) => {
                error!("gRPC server exited with error: {}", e);
                Err(e.into())
            }
            Err(e) => Err(anyhow::anyhow!("gRPC server task failed: {}", e)),
        }
    }

    async fn health_check(&self) -> anyhow::Result<bool> {
        Ok(self.is_serving())
    }

    fn metadata(&self) -> Metadata {
        let address = self
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|| format!("{}:{}", self.config.grpc_host, self.config.grpc_port));
        let port = self
            .local_addr()
            .map_or(self.config.grpc_port, |a| a.port());

        let mut metadata = Metadata::new();
        metadata.insert("host".into(), Value::from(self.config.grpc_host.clone()));
        metadata.insert("port".into(), Value::from(port));
        metadata.insert("address".into(), Value::from(address));
        metadata.insert("max_workers".into(), Value::from(self.config.grpc_max_workers));
        metadata.insert(
            "services".into(),
            Value::from(SERVICE_NAMES.iter().map(|s| s.to_string()).collect::<Vec<_>>()),
        );
        metadata
    }
}
