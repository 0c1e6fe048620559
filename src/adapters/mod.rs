//! Adapters Layer
//!
//! Inbound: the ping endpoint backends expose. Outbound: the HTTP prober
//! and report rendering.

pub mod inbound;
pub mod outbound;
