//! Model serving components
//!
//! The concrete components of the service, registered by an explicit list:
//! detection model and face models first (in parallel), then the gRPC server.

mod blocking;
pub mod detection;
pub mod face_models;
pub mod grpc_server;

use std::sync::Arc;

use crate::api::grpc::GrpcServices;
use crate::config::Config;

use super::error::LifecycleError;
use super::registry::ComponentRegistry;

pub use detection::DetectionModelComponent;
pub use face_models::FaceModelsComponent;
pub use grpc_server::GrpcServerComponent;

/// Register the service's components. Returns how many were added.
pub fn register_default_components(
    registry: &ComponentRegistry,
    config: &Config,
    services: &GrpcServices,
) -> Result<usize, LifecycleError> {
    let descriptors = [
        Arc::new(DetectionModelComponent::new(
            services.detection.clone(),
            config.inference.warmup_iterations,
        ))
        .descriptor(),
        Arc::new(FaceModelsComponent::new(services.face.clone())).descriptor(),
        Arc::new(GrpcServerComponent::new(config.server.clone(), services.clone()))
            .descriptor(&config.lifecycle),
    ];

    let mut added = 0;
    for descriptor in descriptors {
        if registry.register(descriptor)? {
            added += 1;
        }
    }
    Ok(added)
}
