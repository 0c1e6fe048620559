//! Dispatcher - Main application use case
//!
//! Issues a fixed number of probes against the target, never more than
//! `concurrency` at a time, and folds every outcome into one shared
//! aggregator. A run is consumed by `run`: once it returns, the
//! aggregate is final.

use crate::config::ConfigError;
use crate::domain::entities::ResponseSample;
use crate::domain::ports::Prober;
use crate::domain::services::{AggregateState, Aggregator, Summarizer, Summary};
use crate::domain::value_objects::ProbeOutcome;
use crate::infrastructure::{ConcurrencyLimiter, LimiterError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Failures of the dispatch machinery itself.
///
/// Individual probe failures are never reported here; they are counted
/// in the aggregate.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid dispatch settings: {0}")]
    Config(#[from] ConfigError),
    #[error("concurrency limiter failed: {0}")]
    Limiter(#[from] LimiterError),
    #[error("probe task failed: {0}")]
    TaskFailed(String),
}

/// Run parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Number of probes to issue
    pub request_count: u64,
    /// Max probes in flight at once (>= 1)
    pub concurrency: usize,
    /// Per-probe deadline; expiry counts as a transport failure
    pub timeout: Duration,
}

impl DispatchSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(0));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

impl From<&crate::config::ProbeConfig> for DispatchSettings {
    fn from(cfg: &crate::config::ProbeConfig) -> Self {
        Self {
            request_count: cfg.request_count,
            concurrency: cfg.concurrency,
            timeout: cfg.timeout,
        }
    }
}

/// Final result of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub snapshot: AggregateState,
    /// Wall-clock time from first spawn to last completion
    pub elapsed: Duration,
}

impl RunReport {
    pub fn summarize(&self) -> Summary {
        Summarizer::summarize(&self.snapshot)
    }
}

/// Bounded-concurrency probe dispatcher.
pub struct Dispatcher {
    prober: Arc<dyn Prober>,
    settings: DispatchSettings,
    limiter: ConcurrencyLimiter,
    aggregator: Arc<Aggregator>,
}

impl Dispatcher {
    /// Create a dispatcher. Invalid settings are rejected here, before
    /// any probe is issued.
    pub fn new(prober: Arc<dyn Prober>, settings: DispatchSettings) -> Result<Self, DispatchError> {
        settings.validate()?;
        let limiter = ConcurrencyLimiter::new(settings.concurrency)?;
        Ok(Self {
            prober,
            settings,
            limiter,
            aggregator: Arc::new(Aggregator::new()),
        })
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Handle to the live aggregate, for intermediate snapshots.
    pub fn aggregator(&self) -> Arc<Aggregator> {
        self.aggregator.clone()
    }

    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    /// Issue every probe and wait for all of them to finish.
    ///
    /// Returns only after each spawned task has terminated. If the
    /// limiter fails or a task dies, the remaining tasks still run to
    /// completion before the error is returned.
    pub async fn run(self) -> Result<RunReport, DispatchError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("probe_run", %run_id);
        let started = Instant::now();

        tracing::info!(
            %run_id,
            requests = self.settings.request_count,
            concurrency = self.settings.concurrency,
            timeout_ms = self.settings.timeout.as_millis() as u64,
            "starting probe run"
        );

        let mut tasks = JoinSet::new();
        for request_num in 1..=self.settings.request_count {
            tasks.spawn(
                probe_once(
                    request_num,
                    self.prober.clone(),
                    self.limiter.clone(),
                    self.aggregator.clone(),
                    self.settings.timeout,
                )
                .instrument(span.clone()),
            );
        }

        let mut failure: Option<DispatchError> = None;
        while let Some(joined) = tasks.join_next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) => Err(DispatchError::TaskFailed(e.to_string())),
            };
            if let Err(e) = result {
                tracing::error!(%run_id, "probe machinery failure: {}", e);
                failure.get_or_insert(e);
            }
        }

        let elapsed = started.elapsed();
        if let Some(e) = failure {
            return Err(e);
        }

        let snapshot = self.aggregator.snapshot();
        tracing::info!(
            %run_id,
            total_duration_ms = elapsed.as_millis() as u64,
            total_requests = snapshot.total,
            successful_requests = snapshot.successful,
            failed_requests = snapshot.failed,
            available_nodes = snapshot.requests_per_target.len(),
            "probe run completed"
        );

        Ok(RunReport {
            run_id,
            snapshot,
            elapsed,
        })
    }
}

/// One probe attempt: take a slot, exchange, classify, record, release.
async fn probe_once(
    request_num: u64,
    prober: Arc<dyn Prober>,
    limiter: ConcurrencyLimiter,
    aggregator: Arc<Aggregator>,
    timeout: Duration,
) -> Result<(), DispatchError> {
    let slot = limiter.acquire().await?;

    let started = Instant::now();
    let result = tokio::time::timeout(timeout, prober.probe()).await;
    let latency_ms = started.elapsed().as_millis() as u64;

    let outcome = match result {
        Ok(Ok(resp)) => {
            tracing::debug!(
                request = request_num,
                hostname = %resp.hostname,
                response_time_ms = latency_ms,
                "request completed"
            );
            ProbeOutcome::success(resp.hostname)
        }
        Ok(Err(e)) => {
            tracing::debug!(request = request_num, error = %e, "request failed");
            e.outcome()
        }
        Err(_) => {
            tracing::debug!(request = request_num, "request timed out");
            ProbeOutcome::TransportFailure
        }
    };

    aggregator.record(ResponseSample::new(outcome, latency_ms));
    slot.release();
    Ok(())
}
