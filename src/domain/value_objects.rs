//! Value Objects - Immutable domain primitives
//!
//! Outcome classification for a single probe and the per-kind failure
//! counters derived from it.

use serde::{Deserialize, Serialize};

/// Classified result of one probe attempt.
///
/// Only a successful probe carries the identity of the backend that
/// served it; failures never attribute to a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// 2xx response with a decodable envelope
    Success { target_id: String },
    /// Connection refused, DNS, timeout, or any error before a status line
    TransportFailure,
    /// Response received with a status outside the 2xx range
    BadStatus,
    /// Status accepted but the body did not decode into the envelope
    DecodeFailure,
}

impl ProbeOutcome {
    /// Build a success outcome for the given target.
    pub fn success(target_id: impl Into<String>) -> Self {
        Self::Success {
            target_id: target_id.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Identifier of the serving backend, present only on success.
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Self::Success { target_id } => Some(target_id),
            _ => None,
        }
    }

    /// Short label used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::TransportFailure => "transport",
            Self::BadStatus => "bad_status",
            Self::DecodeFailure => "decode",
        }
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success { target_id } => write!(f, "success ({})", target_id),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Failed probe counts split by failure kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureBreakdown {
    pub transport: u64,
    pub bad_status: u64,
    pub decode: u64,
}

impl FailureBreakdown {
    /// Count one failure of the given kind. Success is ignored.
    pub fn count(&mut self, outcome: &ProbeOutcome) {
        match outcome {
            ProbeOutcome::Success { .. } => {}
            ProbeOutcome::TransportFailure => self.transport += 1,
            ProbeOutcome::BadStatus => self.bad_status += 1,
            ProbeOutcome::DecodeFailure => self.decode += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.transport + self.bad_status + self.decode
    }
}
