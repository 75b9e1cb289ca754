//! Health Registry
//!
//! Shared, lock-protected record of every component's health. Entries are
//! created on first report and updated in place afterwards.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

pub type Metadata = HashMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Unknown,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Unknown => "unknown",
        }
    }

    /// Whether a probe should report this status as unavailable (503)
    pub fn is_failing(&self) -> bool {
        matches!(self, HealthStatus::Degraded | HealthStatus::Unhealthy)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub error_message: Option<String>,
    pub metadata: Metadata,
    pub consecutive_failures: u32,
    pub total_checks: u64,
}

impl ComponentHealth {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
            last_check: Utc::now(),
            error_message: None,
            metadata: Metadata::new(),
            consecutive_failures: 0,
            total_checks: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthCounts {
    pub total: usize,
    pub healthy: usize,
    pub degraded: usize,
    pub unhealthy: usize,
    pub unknown: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthSummary {
    pub overall_status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub components: BTreeMap<String, ComponentHealth>,
    pub summary: HealthCounts,
}

#[derive(Debug, Default)]
pub struct HealthRegistry {
    components: RwLock<HashMap<String, ComponentHealth>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a component's status, merging metadata
    pub fn register_component(&self, name: &str, status: HealthStatus, metadata: Metadata) {
        {
            let mut components = self.components.write();
            let entry = components
                .entry(name.to_string())
                .or_insert_with(|| ComponentHealth::new(name, status));
            entry.status = status;
            entry.last_check = Utc::now();
            entry.total_checks += 1;
            entry.metadata.extend(metadata);
            if status == HealthStatus::Healthy {
                entry.consecutive_failures = 0;
                entry.error_message = None;
            }
        }
        debug!(component = name, status = %status, "health status updated");
    }

    pub fn mark_healthy(&self, name: &str, metadata: Metadata) {
        self.register_component(name, HealthStatus::Healthy, metadata);
    }

    /// Partially functional; counts as a failure
    pub fn mark_degraded(&self, name: &str, reason: &str, metadata: Metadata) {
        self.record_failure(name, HealthStatus::Degraded, reason, metadata);
        warn!(component = name, reason, "component degraded");
    }

    pub fn mark_failed(&self, name: &str, error: &str, metadata: Metadata) {
        self.record_failure(name, HealthStatus::Unhealthy, error, metadata);
        error!(component = name, error, "component failed");
    }

    fn record_failure(&self, name: &str, status: HealthStatus, message: &str, metadata: Metadata) {
        let mut components = self.components.write();
        let entry = components
            .entry(name.to_string())
            .or_insert_with(|| ComponentHealth::new(name, status));
        entry.status = status;
        entry.error_message = Some(message.to_string());
        entry.last_check = Utc::now();
        entry.metadata.extend(metadata);
        entry.consecutive_failures += 1;
        entry.total_checks += 1;
    }

    pub fn get(&self, name: &str) -> Option<ComponentHealth> {
        self.components.read().get(name).cloned()
    }

    pub fn all(&self) -> HashMap<String, ComponentHealth> {
        self.components.read().clone()
    }

    /// Worst status wins; Unknown when empty or when nothing is decided yet
    pub fn overall_status(&self) -> HealthStatus {
        let components = self.components.read();
        overall_of(components.values().map(|c| c.status))
    }

    pub fn summary(&self) -> HealthSummary {
        let components = self.components.read();
        let overall_status = overall_of(components.values().map(|c| c.status));

        let mut counts = HealthCounts {
            total: components.len(),
            ..Default::default()
        };
        for health in components.values() {
            match health.status {
                HealthStatus::Healthy => counts.healthy += 1,
                HealthStatus::Degraded => counts.degraded += 1,
                HealthStatus::Unhealthy => counts.unhealthy += 1,
                HealthStatus::Unknown => counts.unknown += 1,
            }
        }

        HealthSummary {
            overall_status,
            timestamp: Utc::now(),
            components: components
                .iter()
                .map(|(name, health)| (name.clone(), health.clone()))
                .collect(),
            summary: counts,
        }
    }

    /// Drop all entries (tests only)
    pub fn clear(&self) {
        self.components.write().clear();
    }
}

fn overall_of(statuses: impl Iterator<Item = HealthStatus>) -> HealthStatus {
    let statuses: Vec<HealthStatus> = statuses.collect();
    if statuses.is_empty() {
        return HealthStatus::Unknown;
    }
    if statuses.contains(&HealthStatus::Unhealthy) {
        return HealthStatus::Unhealthy;
    }
    if statuses.contains(&HealthStatus::Degraded) {
        return HealthStatus::Degraded;
    }
    if statuses.iter().all(|s| *s == HealthStatus::Healthy) {
        return HealthStatus::Healthy;
    }
    HealthStatus::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry_is_unknown() {
        let registry = HealthRegistry::new();
        assert_eq!(registry.overall_status(), HealthStatus::Unknown);
    }

    #[test]
    fn test_overall_status_aggregation() {
        let registry = HealthRegistry::new();
        registry.mark_healthy("a", Metadata::new());
        registry.mark_healthy("b", Metadata::new());
        assert_eq!(registry.overall_status(), HealthStatus::Healthy);

        registry.register_component("c", HealthStatus::Unknown, Metadata::new());
        assert_eq!(registry.overall_status(), HealthStatus::Unknown);

        registry.mark_degraded("b", "slow", Metadata::new());
        assert_eq!(registry.overall_status(), HealthStatus::Degraded);

        registry.mark_failed("a", "gone", Metadata::new());
        assert_eq!(registry.overall_status(), HealthStatus::Unhealthy);
    }

    #[test]
    fn test_failure_counters() {
        let registry = HealthRegistry::new();
        registry.mark_failed("model", "load error", Metadata::new());
        registry.mark_degraded("model", "warmup skipped", Metadata::new());

        let health = registry.get("model").unwrap();
        assert_eq!(health.consecutive_failures, 2);
        assert_eq!(health.total_checks, 2);
        assert_eq!(health.error_message.as_deref(), Some("warmup skipped"));

        registry.mark_healthy("model", Metadata::new());
        let health = registry.get("model").unwrap();
        assert_eq!(health.consecutive_failures, 0);
        assert_eq!(health.total_checks, 3);
        assert!(health.error_message.is_none());
    }

    #[test]
    fn test_metadata_is_merged() {
        let registry = HealthRegistry::new();
        let mut first = Metadata::new();
        first.insert("device".into(), Value::from("CPU"));
        registry.register_component("model", HealthStatus::Unknown, first);

        let mut second = Metadata::new();
        second.insert("warmup_completed".into(), Value::from(true));
        registry.mark_healthy("model", second);

        let health = registry.get("model").unwrap();
        assert_eq!(health.metadata["device"], Value::from("CPU"));
        assert_eq!(health.metadata["warmup_completed"], Value::from(true));
    }

    #[test]
    fn test_summary_counts() {
        let registry = HealthRegistry::new();
        registry.mark_healthy("a", Metadata::new());
        registry.mark_degraded("b", "x", Metadata::new());
        registry.register_component("c", HealthStatus::Unknown, Metadata::new());

        let summary = registry.summary();
        assert_eq!(summary.overall_status, HealthStatus::Degraded);
        assert_eq!(summary.summary.total, 3);
        assert_eq!(summary.summary.healthy, 1);
        assert_eq!(summary.summary.degraded, 1);
        assert_eq!(summary.summary.unknown, 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["overall_status"], "degraded");
        assert_eq!(json["components"]["b"]["status"], "degraded");

        registry.clear();
        assert_eq!(registry.overall_status(), HealthStatus::Unknown);
    }
}
