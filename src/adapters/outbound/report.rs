//! Report Writer
//!
//! Renders a run summary as a human-readable table and as JSON.

use crate::domain::services::Summary;
use std::fmt::Write;

/// Render the tabular text report.
pub fn render_text(summary: &Summary) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_text(&mut out, summary);
    out
}

fn write_text(out: &mut String, summary: &Summary) -> std::fmt::Result {
    writeln!(out, "\n=== Load Balancer Test Results ===")?;
    writeln!(out, "Total Requests: {}", summary.total_requests)?;
    writeln!(out, "Successful Requests: {}", summary.successful_requests)?;
    writeln!(out, "Failed Requests: {}", summary.failed_requests)?;
    writeln!(out, "Available Nodes: {}", summary.available_nodes)?;
    writeln!(
        out,
        "Average Response Time: {} ms\n",
        summary.average_latency_ms
    )?;

    if summary.failed_requests > 0 {
        writeln!(out, "=== Failures ===")?;
        writeln!(out, "{:<20}: {:4}", "transport", summary.failures.transport)?;
        writeln!(out, "{:<20}: {:4}", "bad status", summary.failures.bad_status)?;
        writeln!(out, "{:<20}: {:4}\n", "decode", summary.failures.decode)?;
    }

    writeln!(out, "=== Node Hostnames ===")?;
    for (i, node_id) in summary.node_ids.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, node_id)?;
    }

    writeln!(out, "\n=== Requests Per Node ===")?;
    for node in &summary.nodes {
        writeln!(
            out,
            "{:<20}: {:4} requests ({:.1}%)",
            node.node_id, node.requests, node.percentage
        )?;
    }

    writeln!(out, "\n=== Response Time Statistics (ms) ===")?;
    for node in summary.nodes.iter().filter(|n| n.samples > 0) {
        writeln!(
            out,
            "{:<20}: avg={:3}ms, min={:3}ms, max={:3}ms, count={}",
            node.node_id, node.avg_latency_ms, node.min_latency_ms, node.max_latency_ms, node.samples
        )?;
    }

    Ok(())
}

/// Render the machine-readable JSON report.
pub fn render_json(summary: &Summary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}
