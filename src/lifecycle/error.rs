use std::time::Duration;

use thiserror::Error;

/// Errors raised while wiring or running the component graph
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("component name must not be empty")]
    EmptyName,

    #[error("component '{component}' depends on '{dependency}' which is not registered (available: {available:?})")]
    MissingDependency {
        component: String,
        dependency: String,
        available: Vec<String>,
    },

    #[error("circular dependency detected: {path}")]
    CircularDependency { path: String },

    #[error("cannot resolve dependencies for components: {0:?}")]
    UnresolvableDependencies(Vec<String>),

    #[error("failed to instantiate component '{name}': {reason}")]
    Instantiation { name: String, reason: String },

    #[error("component '{name}' failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("component '{name}' did not start within {timeout:?}")]
    StartupTimeout { name: String, timeout: Duration },

    #[error("component '{name}' did not stop within {timeout:?}")]
    ShutdownTimeout { name: String, timeout: Duration },

    #[error("lifespan manager already started")]
    AlreadyStarted,
}

impl LifecycleError {
    /// Configuration errors abort startup regardless of fail-fast settings
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            LifecycleError::EmptyName
                | LifecycleError::MissingDependency { .. }
                | LifecycleError::CircularDependency { .. }
                | LifecycleError::UnresolvableDependencies(_)
        )
    }
}
