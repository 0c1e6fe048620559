mod prober;

pub use prober::{ProbeError, Prober};
