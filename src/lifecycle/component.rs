//! Component lifecycle contract
//!
//! A component is a subsystem (a model, a server) that needs explicit
//! startup and shutdown. Components are described by a [`ComponentDescriptor`]
//! and instantiated by the lifespan manager, which tracks their state in a
//! [`ComponentHandle`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use super::health::Metadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    Uninitialized,
    Initializing,
    Ready,
    Degraded,
    Failed,
    Stopping,
    Stopped,
}

impl ComponentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentState::Uninitialized => "uninitialized",
            ComponentState::Initializing => "initializing",
            ComponentState::Ready => "ready",
            ComponentState::Degraded => "degraded",
            ComponentState::Failed => "failed",
            ComponentState::Stopping => "stopping",
            ComponentState::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for ComponentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Startup priority. Lower values start first and stop last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ComponentPriority(pub u32);

impl ComponentPriority {
    /// Core infrastructure
    pub const CRITICAL: Self = Self(0);
    /// Models and other essential services
    pub const HIGH: Self = Self(10);
    /// Servers
    pub const NORMAL: Self = Self(20);
    /// Optional extras
    pub const LOW: Self = Self(30);
}

impl Default for ComponentPriority {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// A lifecycle-managed subsystem.
///
/// `startup` may fail; the manager records the failure instead of
/// propagating it. `shutdown` must be idempotent. Errors it returns are
/// logged and swallowed.
#[async_trait]
pub trait Component: Send + Sync {
    async fn startup(&self) -> anyhow::Result<()>;

    async fn shutdown(&self) -> anyhow::Result<()>;

    /// Deep health check, only consulted while the component is running
    async fn health_check(&self) -> anyhow::Result<bool> {
        Ok(true)
    }

    /// Key/value details surfaced in the health registry
    fn metadata(&self) -> Metadata {
        Metadata::new()
    }
}

pub type ComponentFactory = Box<dyn Fn() -> anyhow::Result<Arc<dyn Component>> + Send + Sync>;

/// Static description of a component: identity, ordering and budgets
pub struct ComponentDescriptor {
    pub name: String,
    pub priority: ComponentPriority,
    pub depends_on: Vec<String>,
    pub startup_timeout: Duration,
    pub shutdown_timeout: Duration,
    factory: ComponentFactory,
}

impl ComponentDescriptor {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> anyhow::Result<Arc<dyn Component>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            priority: ComponentPriority::default(),
            depends_on: Vec::new(),
            startup_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(10),
            factory: Box::new(factory),
        }
    }

    /// Descriptor for an already constructed component
    pub fn from_instance(name: impl Into<String>, instance: Arc<dyn Component>) -> Self {
        Self::new(name, move || Ok(instance.clone()))
    }

    pub fn priority(mut self, priority: ComponentPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn instantiate(&self) -> anyhow::Result<Arc<dyn Component>> {
        (self.factory)()
    }
}

impl std::fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("depends_on", &self.depends_on)
            .field("startup_timeout", &self.startup_timeout)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentMetrics {
    pub name: String,
    pub priority: u32,
    pub state: ComponentState,
    pub uptime_seconds: Option<f64>,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub metadata: Metadata,
}

#[derive(Debug)]
struct RuntimeState {
    state: ComponentState,
    started_at: Option<DateTime<Utc>>,
    stopped_at: Option<DateTime<Utc>>,
    error: Option<String>,
}

/// A live component instance together with its runtime state
pub struct ComponentHandle {
    pub descriptor: Arc<ComponentDescriptor>,
    pub instance: Arc<dyn Component>,
    runtime: RwLock<RuntimeState>,
}

impl ComponentHandle {
    pub fn new(descriptor: Arc<ComponentDescriptor>, instance: Arc<dyn Component>) -> Self {
        Self {
            descriptor,
            instance,
            runtime: RwLock::new(RuntimeState {
                state: ComponentState::Uninitialized,
                started_at: None,
                stopped_at: None,
                error: None,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn state(&self) -> ComponentState {
        self.runtime.read().state
    }

    pub fn error(&self) -> Option<String> {
        self.runtime.read().error.clone()
    }

    pub(crate) fn set_state(&self, state: ComponentState) {
        let mut runtime = self.runtime.write();
        match state {
            ComponentState::Ready if runtime.started_at.is_none() => {
                runtime.started_at = Some(Utc::now());
            }
            ComponentState::Stopped => runtime.stopped_at = Some(Utc::now()),
            _ => {}
        }
        runtime.state = state;
    }

    pub(crate) fn fail(&self, error: impl Into<String>) {
        let mut runtime = self.runtime.write();
        runtime.state = ComponentState::Failed;
        runtime.error = Some(error.into());
    }

    pub(crate) fn record_error(&self, error: impl Into<String>) {
        self.runtime.write().error = Some(error.into());
    }

    /// Whether the manager should run deep health checks on it
    pub fn is_running(&self) -> bool {
        matches!(self.state(), ComponentState::Ready | ComponentState::Degraded)
    }

    pub fn metrics(&self) -> ComponentMetrics {
        let runtime = self.runtime.read();
        let uptime_seconds = match (runtime.started_at, runtime.state) {
            (Some(started), ComponentState::Ready | ComponentState::Degraded) => {
                Some((Utc::now() - started).num_milliseconds() as f64 / 1000.0)
            }
            _ => None,
        };

        ComponentMetrics {
            name: self.descriptor.name.clone(),
            priority: self.descriptor.priority.0,
            state: runtime.state,
            uptime_seconds,
            started_at: runtime.started_at,
            stopped_at: runtime.stopped_at,
            error: runtime.error.clone(),
            metadata: self.instance.metadata(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl Component for Noop {
        async fn startup(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn shutdown(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_priority_ordering() {
        assert!(ComponentPriority::CRITICAL < ComponentPriority::HIGH);
        assert!(ComponentPriority::HIGH < ComponentPriority::NORMAL);
        assert!(ComponentPriority::NORMAL < ComponentPriority::LOW);
        assert_eq!(ComponentPriority::default(), ComponentPriority::NORMAL);
    }

    #[test]
    fn test_handle_state_tracking() {
        let descriptor = Arc::new(
            ComponentDescriptor::from_instance("noop", Arc::new(Noop))
                .priority(ComponentPriority::HIGH)
                .depends_on(["other"]),
        );
        let handle = ComponentHandle::new(descriptor.clone(), descriptor.instantiate().unwrap());
        assert_eq!(handle.state(), ComponentState::Uninitialized);

        handle.set_state(ComponentState::Initializing);
        handle.set_state(ComponentState::Ready);
        let metrics = handle.metrics();
        assert_eq!(metrics.state, ComponentState::Ready);
        assert!(metrics.started_at.is_some());
        assert!(metrics.uptime_seconds.is_some());
        assert_eq!(metrics.priority, 10);

        handle.fail("boom");
        assert_eq!(handle.state(), ComponentState::Failed);
        assert_eq!(handle.error().as_deref(), Some("boom"));
        assert!(!handle.is_running());
    }
}
