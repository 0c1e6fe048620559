//! Application Layer
//!
//! Use cases orchestrating the domain: the probe run.

mod dispatcher;

pub use dispatcher::{DispatchError, DispatchSettings, Dispatcher, RunReport};
