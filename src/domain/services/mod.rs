pub mod aggregator;
pub mod summarizer;

pub use aggregator::{AggregateState, Aggregator};
pub use summarizer::{NodeStats, Summarizer, Summary};
