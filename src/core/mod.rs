pub mod aggregator;
pub mod auth;
pub mod fetcher;
pub mod hierarchy;
pub mod pipeline;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::model::{AggregateResult, TeamRecord, UpdateOutcome};
pub use crate::domain::ports::{GradingApi, RateLimiter};
pub use crate::utils::error::Result;
pub use hierarchy::PoolHierarchy;
pub use pipeline::{GradePipeline, PipelineError, PipelineOptions, PipelineState, UpdatePolicy};
