//! Infrastructure Layer
//!
//! Cross-cutting concerns and infrastructure components.

pub mod concurrency_limiter;
pub mod shutdown;
pub mod telemetry;

pub use concurrency_limiter::{ConcurrencyLimiter, LimiterError, LimiterSlot};
pub use shutdown::{shutdown_signal, ShutdownController};
pub use telemetry::{init_tracing, LogOutput};
