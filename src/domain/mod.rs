//! Domain Layer
//!
//! Probe records, outcome classification, the prober port, and the
//! aggregation/summarization services. No I/O lives here.

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{PingResponse, ResponseSample};
pub use value_objects::{FailureBreakdown, ProbeOutcome};
