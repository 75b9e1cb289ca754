//! Lifespan Manager
//!
//! Instantiates registered components in dependency batches, starts them
//! (batch members in parallel when enabled), runs periodic health checks and
//! shuts everything down in reverse start order.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::LifecycleConfig;

use super::component::{Component, ComponentHandle, ComponentMetrics, ComponentState};
use super::error::LifecycleError;
use super::health::{HealthRegistry, HealthStatus, Metadata};
use super::registry::ComponentRegistry;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    Initializing,
    Starting,
    Running,
    ShuttingDown,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct LifespanOptions {
    pub parallel_startup: bool,
    pub fail_on_component_error: bool,
}

impl Default for LifespanOptions {
    fn default() -> Self {
        Self {
            parallel_startup: true,
            fail_on_component_error: false,
        }
    }
}

impl From<&LifecycleConfig> for LifespanOptions {
    fn from(config: &LifecycleConfig) -> Self {
        Self {
            parallel_startup: config.parallel_startup,
            fail_on_component_error: config.fail_on_component_error,
        }
    }
}

/// Outcome of a startup pass
#[derive(Debug, Clone, Serialize)]
pub struct StartupReport {
    pub all_successful: bool,
    pub started: Vec<String>,
    pub failed: Vec<FailedComponent>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedComponent {
    pub name: String,
    pub error: String,
}

/// How a guarded lifecycle call ended
enum CallOutcome<T> {
    Completed(T),
    Failed(String),
    TimedOut,
}

/// Run a lifecycle call on its own task so that a panic or a hang is
/// contained and reported instead of taking the manager down.
async fn guarded<T, F>(timeout: Duration, fut: F) -> CallOutcome<T>
where
    T: Send + 'static,
    F: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    let mut task = tokio::spawn(fut);
    match tokio::time::timeout(timeout, &mut task).await {
        Ok(Ok(Ok(value))) => CallOutcome::Completed(value),
        Ok(Ok(Err(e))) => CallOutcome::Failed(format!("{:#}", e)),
        Ok(Err(join_err)) if join_err.is_panic() => CallOutcome::Failed("panicked".to_string()),
        Ok(Err(join_err)) => CallOutcome::Failed(join_err.to_string()),
        Err(_) => {
            task.abort();
            CallOutcome::TimedOut
        }
    }
}

pub struct LifespanManager {
    registry: Arc<ComponentRegistry>,
    health: Arc<HealthRegistry>,
    options: LifespanOptions,
    state: RwLock<RunState>,
    /// Instantiated components, flattened in start order
    components: RwLock<Vec<Arc<ComponentHandle>>>,
}

impl LifespanManager {
    pub fn new(
        registry: Arc<ComponentRegistry>,
        health: Arc<HealthRegistry>,
        options: LifespanOptions,
    ) -> Self {
        Self {
            registry,
            health,
            options,
            state: RwLock::new(RunState::NotStarted),
            components: RwLock::new(Vec::new()),
        }
    }

    pub fn run_state(&self) -> RunState {
        *self.state.read()
    }

    pub fn is_running(&self) -> bool {
        self.run_state() == RunState::Running
    }

    pub fn health(&self) -> &Arc<HealthRegistry> {
        &self.health
    }

    fn set_run_state(&self, state: RunState) {
        *self.state.write() = state;
    }

    /// Validate, instantiate and start every registered component.
    ///
    /// Configuration errors are always returned. Component failures only
    /// abort startup when `fail_on_component_error` is set; otherwise they
    /// are recorded and the report says `all_successful = false`.
    pub async fn startup(&self) -> Result<StartupReport, LifecycleError> {
        {
            let mut state = self.state.write();
            if *state != RunState::NotStarted {
                return Err(LifecycleError::AlreadyStarted);
            }
            *state = RunState::Initializing;
        }
        let started_at = Instant::now();

        let batches = match self
            .registry
            .validate_dependencies()
            .and_then(|_| self.registry.dependency_batches())
        {
            Ok(batches) => batches,
            Err(e) => {
                error!(error = %e, "component graph is invalid");
                self.set_run_state(RunState::Stopped);
                return Err(e);
            }
        };

        info!(
            components = self.registry.len(),
            batches = batches.len(),
            parallel = self.options.parallel_startup,
            "starting components"
        );

        let mut failed: Vec<FailedComponent> = Vec::new();

        // Instantiate everything up front, in batch order
        let mut handle_batches: Vec<Vec<Arc<ComponentHandle>>> = Vec::with_capacity(batches.len());
        for batch in &batches {
            let mut handles = Vec::with_capacity(batch.len());
            for descriptor in batch {
                match descriptor.instantiate() {
                    Ok(instance) => {
                        let handle = Arc::new(ComponentHandle::new(descriptor.clone(), instance));
                        self.health.register_component(
                            &descriptor.name,
                            HealthStatus::Unknown,
                            state_metadata(&handle),
                        );
                        handles.push(handle);
                    }
                    Err(e) => {
                        let reason = format!("{:#}", e);
                        error!(component = %descriptor.name, error = %reason, "component instantiation failed");
                        self.health.mark_failed(&descriptor.name, &reason, Metadata::new());
                        if self.options.fail_on_component_error {
                            self.set_run_state(RunState::Stopped);
                            return Err(LifecycleError::Instantiation {
                                name: descriptor.name.clone(),
                                reason,
                            });
                        }
                        failed.push(FailedComponent {
                            name: descriptor.name.clone(),
                            error: reason,
                        });
                    }
                }
            }
            self.components.write().extend(handles.iter().cloned());
            handle_batches.push(handles);
        }

        self.set_run_state(RunState::Starting);

        let mut started = Vec::new();
        for (index, batch) in handle_batches.iter().enumerate() {
            let results: Vec<Result<(), LifecycleError>> =
                if self.options.parallel_startup && batch.len() > 1 {
                    join_all(batch.iter().map(|h| self.start_component(h.clone()))).await
                } else {
                    let mut results = Vec::with_capacity(batch.len());
                    for handle in batch {
                        results.push(self.start_component(handle.clone()).await);
                    }
                    results
                };

            let mut first_error = None;
            for (handle, result) in batch.iter().zip(results) {
                match result {
                    Ok(()) => started.push(handle.name().to_string()),
                    Err(e) => {
                        failed.push(FailedComponent {
                            name: handle.name().to_string(),
                            error: e.to_string(),
                        });
                        first_error.get_or_insert(e);
                    }
                }
            }

            if let Some(e) = first_error {
                if self.options.fail_on_component_error {
                    error!(batch = index, error = %e, "aborting startup");
                    self.shutdown_components().await;
                    self.set_run_state(RunState::Stopped);
                    return Err(e);
                }
            }
        }

        let report = StartupReport {
            all_successful: failed.is_empty(),
            started,
            failed,
            duration_ms: started_at.elapsed().as_millis() as u64,
        };

        self.set_run_state(RunState::Running);

        if report.all_successful {
            info!(
                started = report.started.len(),
                duration_ms = report.duration_ms,
                "all components started"
            );
        } else {
            warn!(
                started = report.started.len(),
                failed = ?report.failed.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
                "running in degraded mode"
            );
        }

        Ok(report)
    }

    async fn start_component(&self, handle: Arc<ComponentHandle>) -> Result<(), LifecycleError> {
        let name = handle.name().to_string();
        let timeout = handle.descriptor.startup_timeout;

        handle.set_state(ComponentState::Initializing);
        self.health
            .register_component(&name, HealthStatus::Unknown, state_metadata(&handle));
        info!(component = %name, "starting component");

        let started = Instant::now();
        let instance = handle.instance.clone();
        let outcome = guarded(timeout, async move { instance.startup().await }).await;

        let error = match outcome {
            CallOutcome::Completed(()) => {
                handle.set_state(ComponentState::Ready);
                self.health.mark_healthy(&name, state_metadata(&handle));
                info!(
                    component = %name,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "component ready"
                );
                return Ok(());
            }
            CallOutcome::Failed(reason) => LifecycleError::StartupFailed {
                name: name.clone(),
                reason,
            },
            CallOutcome::TimedOut => LifecycleError::StartupTimeout {
                name: name.clone(),
                timeout,
            },
        };

        handle.fail(error.to_string());
        self.health
            .mark_failed(&name, &error.to_string(), state_metadata(&handle));
        Err(error)
    }

    /// Stop every instantiated component in reverse start order.
    /// Safe to call more than once.
    pub async fn shutdown(&self) {
        {
            let mut state = self.state.write();
            match *state {
                RunState::NotStarted | RunState::Stopped | RunState::ShuttingDown => {
                    info!(state = ?*state, "shutdown requested, nothing to do");
                    return;
                }
                _ => *state = RunState::ShuttingDown,
            }
        }

        info!("shutting down components");
        self.shutdown_components().await;
        self.set_run_state(RunState::Stopped);
        info!("shutdown complete");
    }

    async fn shutdown_components(&self) {
        let handles: Vec<Arc<ComponentHandle>> = self.components.read().iter().rev().cloned().collect();

        for handle in handles {
            if matches!(
                handle.state(),
                ComponentState::Uninitialized | ComponentState::Stopped
            ) {
                continue;
            }

            let name = handle.name().to_string();
            let timeout = handle.descriptor.shutdown_timeout;
            handle.set_state(ComponentState::Stopping);
            info!(component = %name, "stopping component");

            let instance = handle.instance.clone();
            match guarded(timeout, async move { instance.shutdown().await }).await {
                CallOutcome::Completed(()) => {}
                CallOutcome::Failed(reason) => {
                    error!(component = %name, error = %reason, "component shutdown failed");
                    handle.record_error(reason);
                }
                CallOutcome::TimedOut => {
                    let err = LifecycleError::ShutdownTimeout {
                        name: name.clone(),
                        timeout,
                    };
                    error!(component = %name, error = %err, "component shutdown timed out");
                    handle.record_error(err.to_string());
                }
            }

            handle.set_state(ComponentState::Stopped);
            self.health
                .register_component(&name, HealthStatus::Unknown, state_metadata(&handle));
        }
    }

    /// Run the deep health check of every running component and record the
    /// result: healthy, degraded on `false`, failed on error.
    pub async fn check_health(&self) -> HashMap<String, bool> {
        let mut results = HashMap::new();
        if !self.is_running() {
            return results;
        }

        let handles: Vec<Arc<ComponentHandle>> = self.components.read().clone();
        for handle in handles.into_iter().filter(|h| h.is_running()) {
            let name = handle.name().to_string();
            let instance = handle.instance.clone();

            let healthy = match guarded(HEALTH_CHECK_TIMEOUT, async move {
                instance.health_check().await
            })
            .await
            {
                CallOutcome::Completed(true) => {
                    handle.set_state(ComponentState::Ready);
                    self.health.mark_healthy(&name, state_metadata(&handle));
                    true
                }
                CallOutcome::Completed(false) => {
                    handle.set_state(ComponentState::Degraded);
                    self.health
                        .mark_degraded(&name, "health check failed", state_metadata(&handle));
                    false
                }
                CallOutcome::Failed(reason) => {
                    let message = format!("health check error: {}", reason);
                    handle.fail(message.clone());
                    self.health.mark_failed(&name, &message, state_metadata(&handle));
                    false
                }
                CallOutcome::TimedOut => {
                    let message = "health check timed out".to_string();
                    handle.fail(message.clone());
                    self.health.mark_failed(&name, &message, state_metadata(&handle));
                    false
                }
            };
            results.insert(name, healthy);
        }

        results
    }

    pub fn component_metrics(&self) -> Vec<ComponentMetrics> {
        self.components.read().iter().map(|h| h.metrics()).collect()
    }

    pub fn component(&self, name: &str) -> Option<Arc<dyn Component>> {
        self.components
            .read()
            .iter()
            .find(|h| h.name() == name)
            .map(|h| h.instance.clone())
    }

    pub fn component_state(&self, name: &str) -> Option<ComponentState> {
        self.components
            .read()
            .iter()
            .find(|h| h.name() == name)
            .map(|h| h.state())
    }

    /// Names in start order
    pub fn started_order(&self) -> Vec<String> {
        self.components
            .read()
            .iter()
            .map(|h| h.name().to_string())
            .collect()
    }
}

fn state_metadata(handle: &ComponentHandle) -> Metadata {
    let mut metadata = handle.instance.metadata();
    metadata.insert("state".to_string(), Value::from(handle.state().as_str()));
    metadata.insert(
        "priority".to_string(),
        Value::from(handle.descriptor.priority.0),
    );
    metadata
}
