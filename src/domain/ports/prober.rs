//! Prober Port
//!
//! Defines the interface for performing one request/response exchange
//! against the endpoint under test.

use crate::domain::entities::PingResponse;
use crate::domain::value_objects::ProbeOutcome;
use async_trait::async_trait;

/// Per-attempt probe failures.
///
/// None of these are fatal to a run: each is counted once as a failed
/// probe and the run carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// No status line was obtained (refused, DNS, timeout, reset).
    #[error("transport error: {0}")]
    Transport(String),
    /// A response arrived with a status outside the 2xx range.
    #[error("unexpected status: {0}")]
    BadStatus(u16),
    /// The body could not be decoded into a ping envelope.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ProbeError {
    /// Failure kind this error is counted as.
    pub fn outcome(&self) -> ProbeOutcome {
        match self {
            Self::Transport(_) => ProbeOutcome::TransportFailure,
            Self::BadStatus(_) => ProbeOutcome::BadStatus,
            Self::Decode(_) => ProbeOutcome::DecodeFailure,
        }
    }
}

/// Performs a single probe against the configured target.
///
/// This is an outbound port that abstracts the HTTP transport. The
/// dispatcher measures latency and enforces the timeout around each
/// call, so implementations only need to perform and classify the
/// exchange.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Issue one request and decode the backend's reply.
    async fn probe(&self) -> Result<PingResponse, ProbeError>;
}
