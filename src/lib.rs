//! Chalet: batch loader for lodging policy records.
//!
//! This crate handles:
//! - Reading line-delimited JSON policy records from disk
//! - Normalizing free-text policy fields and resolving country codes
//! - Writing snappy-compressed Parquet files partitioned by country code
//! - Committing each batch to a Delta table in a single atomic append

pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod tracing;
pub mod transform;

// Re-export commonly used items
pub use config::{CliArgs, Config};
pub use error::PipelineError;
pub use pipeline::{PipelineStats, run_pipeline};

pub use crate::tracing::init_tracing;
