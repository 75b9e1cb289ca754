//! HTTP response data transfer objects

use serde::Serialize;

use crate::lifecycle::{ComponentMetrics, HealthSummary};

/// Full health report: registry summary plus per-component runtime details
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    #[serde(flatten)]
    pub summary: HealthSummary,
    pub version: String,
    pub uptime_seconds: u64,
    pub run_state: String,
    pub component_metrics: Vec<ComponentMetrics>,
}

/// Short answer of the liveness/readiness/startup probes
#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ProbeResponse {
    pub fn ok(status: &str) -> Self {
        Self {
            status: status.to_string(),
            reason: None,
        }
    }

    pub fn failing(status: &str, reason: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            reason: Some(reason.into()),
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            code: code.to_string(),
        }
    }
}
