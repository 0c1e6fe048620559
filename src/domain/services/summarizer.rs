//! Summarizer Service
//!
//! Pure conversion from an aggregate snapshot to the sorted, derived
//! statistics shown to the user. No I/O, no randomness: the same
//! snapshot always produces the same summary.

use crate::domain::services::aggregator::AggregateState;
use crate::domain::value_objects::FailureBreakdown;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-target statistics derived from its latency samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStats {
    pub node_id: String,
    /// Successful probes attributed to this node
    pub requests: u64,
    /// Share of all successful probes, 0.0 when there were none
    pub percentage: f64,
    /// Number of latency samples the min/avg/max are computed over
    pub samples: usize,
    pub avg_latency_ms: u64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
}

/// Final report of one run.
///
/// Field names of the serialized form are stable; per-node latency
/// details are only exposed through `nodes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub available_nodes: usize,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    #[serde(rename = "average_response_time_ms")]
    pub average_latency_ms: u64,
    #[serde(rename = "node_hostnames")]
    pub node_ids: Vec<String>,
    pub requests_per_node: BTreeMap<String, u64>,
    pub failures: FailureBreakdown,
    #[serde(skip)]
    pub nodes: Vec<NodeStats>,
}

impl Summary {
    /// Stats for one node, if it served at least one probe.
    pub fn node(&self, node_id: &str) -> Option<&NodeStats> {
        self.nodes.iter().find(|n| n.node_id == node_id)
    }
}

/// Summarizer for aggregate snapshots.
pub struct Summarizer;

impl Summarizer {
    /// Derive the summary of a snapshot.
    ///
    /// Node ids are the targets with at least one success, sorted
    /// lexicographically. Averages are truncated to whole milliseconds.
    pub fn summarize(state: &AggregateState) -> Summary {
        let mut node_ids: Vec<String> = state
            .requests_per_target
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(id, _)| id.clone())
            .collect();
        node_ids.sort();

        let (latency_sum, latency_count) = state
            .latencies_per_target
            .values()
            .flatten()
            .fold((0u64, 0u64), |(sum, n), l| (sum + l, n + 1));
        let average_latency_ms = latency_sum.checked_div(latency_count).unwrap_or(0);

        let nodes: Vec<NodeStats> = node_ids
            .iter()
            .map(|id| Self::node_stats(state, id))
            .collect();

        let requests_per_node = node_ids
            .iter()
            .map(|id| (id.clone(), state.requests_per_target[id]))
            .collect();

        Summary {
            available_nodes: node_ids.len(),
            total_requests: state.total,
            successful_requests: state.successful,
            failed_requests: state.failed,
            average_latency_ms,
            node_ids,
            requests_per_node,
            failures: state.failures,
            nodes,
        }
    }

    fn node_stats(state: &AggregateState, node_id: &str) -> NodeStats {
        let requests = state.requests_per_target.get(node_id).copied().unwrap_or(0);
        let percentage = if state.successful == 0 {
            0.0
        } else {
            requests as f64 / state.successful as f64 * 100.0
        };

        let latencies = state
            .latencies_per_target
            .get(node_id)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let sum: u64 = latencies.iter().sum();
        let avg_latency_ms = sum.checked_div(latencies.len() as u64).unwrap_or(0);

        NodeStats {
            node_id: node_id.to_string(),
            requests,
            percentage,
            samples: latencies.len(),
            avg_latency_ms,
            min_latency_ms: latencies.iter().copied().min().unwrap_or(0),
            max_latency_ms: latencies.iter().copied().max().unwrap_or(0),
        }
    }
}
