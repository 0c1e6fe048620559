//! Domain Entities - Core business objects
//!
//! The wire envelope a backend answers a ping with, and the immutable
//! record of one completed probe.

use crate::domain::value_objects::ProbeOutcome;
use serde::{Deserialize, Serialize};

/// Body returned by a backend's ping endpoint.
///
/// `hostname` identifies the backend the load balancer routed the
/// request to. `message` is not validated beyond decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
    pub hostname: String,
}

impl PingResponse {
    /// The standard "pong" reply for a host.
    pub fn pong(hostname: impl Into<String>) -> Self {
        Self {
            message: "pong".to_string(),
            hostname: hostname.into(),
        }
    }
}

/// Record of one completed probe attempt.
///
/// Latency is always measured, but only successful samples contribute
/// to per-target latency statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSample {
    /// Wall-clock time of the exchange in milliseconds
    pub latency_ms: u64,
    /// Classified result
    pub outcome: ProbeOutcome,
}

impl ResponseSample {
    pub fn new(outcome: ProbeOutcome, latency_ms: u64) -> Self {
        Self { latency_ms, outcome }
    }

    pub fn success(target_id: impl Into<String>, latency_ms: u64) -> Self {
        Self::new(ProbeOutcome::success(target_id), latency_ms)
    }

    pub fn target_id(&self) -> Option<&str> {
        self.outcome.target_id()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}
