//! lb-probe Library
//!
//! Fires a bounded-concurrency burst of probes at a load balancer and
//! reports how the responses were spread across backend nodes.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use adapters::inbound::PingServer;
pub use adapters::outbound::{render_json, render_text, HttpProber};
pub use application::{DispatchError, DispatchSettings, Dispatcher, RunReport};
pub use config::{load_probe_config, load_server_config, ConfigError, ProbeConfig, ServerConfig};
pub use domain::entities::{PingResponse, ResponseSample};
pub use domain::ports::{ProbeError, Prober};
pub use domain::services::{AggregateState, Aggregator, NodeStats, Summarizer, Summary};
pub use domain::value_objects::{FailureBreakdown, ProbeOutcome};
pub use infrastructure::{ConcurrencyLimiter, LimiterError};
