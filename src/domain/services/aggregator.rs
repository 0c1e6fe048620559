//! Aggregator Service
//!
//! Thread-safe accumulator for probe samples. All counters and per-target
//! maps live behind a single lock so every `record` is applied as one
//! unit and every `snapshot` sees a state between two records.

use crate::domain::entities::ResponseSample;
use crate::domain::value_objects::{FailureBreakdown, ProbeOutcome};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Accumulated outcome of every sample recorded so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateState {
    /// Every attempted probe
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    /// Failed probes split by kind (sums to `failed`)
    pub failures: FailureBreakdown,
    /// Successful probes per target
    pub requests_per_target: HashMap<String, u64>,
    /// Latency of each successful probe per target, in completion order
    pub latencies_per_target: HashMap<String, Vec<u64>>,
}

impl AggregateState {
    fn apply(&mut self, sample: ResponseSample) {
        self.total += 1;

        match sample.outcome {
            ProbeOutcome::Success { target_id } => {
                self.successful += 1;
                *self.requests_per_target.entry(target_id.clone()).or_insert(0) += 1;
                self.latencies_per_target
                    .entry(target_id)
                    .or_default()
                    .push(sample.latency_ms);
            }
            failure => {
                self.failed += 1;
                self.failures.count(&failure);
            }
        }
    }

    /// Check the bookkeeping invariants between counters and maps.
    pub fn is_consistent(&self) -> bool {
        if self.successful + self.failed != self.total {
            return false;
        }
        if self.failures.total() != self.failed {
            return false;
        }
        if self.requests_per_target.values().sum::<u64>() != self.successful {
            return false;
        }
        self.requests_per_target.iter().all(|(target, count)| {
            self.latencies_per_target
                .get(target)
                .map(|l| l.len() as u64)
                .unwrap_or(0)
                == *count
        }) && self
            .latencies_per_target
            .keys()
            .all(|target| self.requests_per_target.contains_key(target))
    }
}

/// Concurrent sample accumulator.
///
/// Shared between probe tasks behind an `Arc`. The lock is never held
/// across an await point.
#[derive(Debug, Default)]
pub struct Aggregator {
    state: Mutex<AggregateState>,
}

impl Aggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one sample into the running state.
    pub fn record(&self, sample: ResponseSample) {
        self.state.lock().apply(sample);
    }

    /// Point-in-time copy of the whole state.
    pub fn snapshot(&self) -> AggregateState {
        self.state.lock().clone()
    }

    /// Number of samples recorded so far.
    pub fn total(&self) -> u64 {
        self.state.lock().total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_empty_snapshot() {
        let aggregator = Aggregator::new();
        let state = aggregator.snapshot();
        assert_eq!(state, AggregateState::default());
        assert!(state.is_consistent());
    }

    #[test]
    fn test_record_success() {
        let aggregator = Aggregator::new();
        aggregator.record(ResponseSample::success("node-a", 10));
        aggregator.record(ResponseSample::success("node-a", 30));
        aggregator.record(ResponseSample::success("node-b", 20));

        let state = aggregator.snapshot();
        assert_eq!(state.total, 3);
        assert_eq!(state.successful, 3);
        assert_eq!(state.failed, 0);
        assert_eq!(state.requests_per_target["node-a"], 2);
        assert_eq!(state.requests_per_target["node-b"], 1);
        assert_eq!(state.latencies_per_target["node-a"], vec![10, 30]);
        assert!(state.is_consistent());
    }

    #[test]
    fn test_record_failures_do_not_touch_targets() {
        let aggregator = Aggregator::new();
        aggregator.record(ResponseSample::new(ProbeOutcome::TransportFailure, 5000));
        aggregator.record(ResponseSample::new(ProbeOutcome::BadStatus, 3));
        aggregator.record(ResponseSample::new(ProbeOutcome::DecodeFailure, 4));

        let state = aggregator.snapshot();
        assert_eq!(state.total, 3);
        assert_eq!(state.failed, 3);
        assert_eq!(state.successful, 0);
        assert_eq!(state.failures.transport, 1);
        assert_eq!(state.failures.bad_status, 1);
        assert_eq!(state.failures.decode, 1);
        assert!(state.requests_per_target.is_empty());
        assert!(state.latencies_per_target.is_empty());
        assert!(state.is_consistent());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let aggregator = Aggregator::new();
        aggregator.record(ResponseSample::success("node-a", 10));
        let before = aggregator.snapshot();

        aggregator.record(ResponseSample::success("node-a", 20));

        assert_eq!(before.total, 1);
        assert_eq!(aggregator.snapshot().total, 2);
    }

    #[test]
    fn test_inconsistent_state_detected() {
        let mut state = AggregateState::default();
        state.total = 1;
        state.successful = 1;
        state.requests_per_target.insert("node-a".into(), 1);
        // latency list missing for node-a
        assert!(!state.is_consistent());

        state.latencies_per_target.insert("node-a".into(), vec![5]);
        assert!(state.is_consistent());

        state.latencies_per_target.insert("node-b".into(), vec![]);
        assert!(!state.is_consistent());
    }

    #[test]
    fn test_concurrent_records() {
        let aggregator = Arc::new(Aggregator::new());
        let mut handles = vec![];

        for t in 0..10 {
            let aggregator = aggregator.clone();
            handles.push(thread::spawn(move || {
                for i in 0..100u64 {
                    if i % 4 == 0 {
                        aggregator.record(ResponseSample::new(ProbeOutcome::TransportFailure, i));
                    } else {
                        aggregator.record(ResponseSample::success(format!("node-{}", t % 3), i));
                    }
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        let state = aggregator.snapshot();
        assert_eq!(state.total, 1000);
        assert_eq!(state.failed, 250);
        assert_eq!(state.successful, 750);
        assert_eq!(state.requests_per_target.len(), 3);
        assert!(state.is_consistent());
    }

    #[test]
    fn test_snapshots_consistent_under_concurrent_writes() {
        let aggregator = Arc::new(Aggregator::new());
        let done = Arc::new(AtomicBool::new(false));

        let reader = {
            let aggregator = aggregator.clone();
            let done = done.clone();
            thread::spawn(move || {
                let mut observed = 0;
                while !done.load(Ordering::SeqCst) {
                    let state = aggregator.snapshot();
                    assert!(state.is_consistent(), "torn snapshot: {:?}", state);
                    observed += 1;
                }
                observed
            })
        };

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let aggregator = aggregator.clone();
                thread::spawn(move || {
                    for i in 0..500u64 {
                        let sample = match i % 3 {
                            0 => ResponseSample::new(ProbeOutcome::BadStatus, i),
                            _ => ResponseSample::success(format!("node-{}", t), i),
                        };
                        aggregator.record(sample);
                    }
                })
            })
            .collect();

        for w in writers {
            w.join().unwrap();
        }
        done.store(true, Ordering::SeqCst);
        let observed = reader.join().unwrap();

        assert!(observed > 0);
        assert_eq!(aggregator.total(), 2000);
        assert!(aggregator.snapshot().is_consistent());
    }
}
