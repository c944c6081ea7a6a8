pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::GraderConfig;

pub use adapters::{FixedDelay, IntraClient, NoDelay};
pub use crate::core::{GradePipeline, PipelineError, PipelineOptions, PoolHierarchy, UpdatePolicy};
pub use domain::model::UpdateOutcome;
pub use utils::error::{GraderError, Result};
