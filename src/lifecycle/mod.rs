//! Application lifecycle
//!
//! - Component contract and runtime state
//! - Registry with dependency validation and batching
//! - Lifespan manager (ordered startup, health checks, LIFO shutdown)
//! - Shared health registry

pub mod component;
pub mod error;
pub mod health;
pub mod manager;
pub mod modules;
pub mod registry;

pub use component::{
    Component, ComponentDescriptor, ComponentHandle, ComponentMetrics, ComponentPriority,
    ComponentState,
};
pub use error::LifecycleError;
pub use health::{ComponentHealth, HealthRegistry, HealthStatus, HealthSummary, Metadata};
pub use manager::{LifespanManager, LifespanOptions, RunState, StartupReport};
pub use registry::{dependency_batches, ComponentRegistry};
