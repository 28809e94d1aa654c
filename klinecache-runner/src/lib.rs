//! klinecache runner: top-level collect/load operations, return statistics
//! and export.
//!
//! This crate builds on `klinecache-core` to provide:
//! - `collect` (paginate, dedup, cache) and `load` (read, filter, align)
//! - Mean vector and covariance of log returns over aligned assets
//! - CSV and JSON export of tables and statistics

pub mod export;
pub mod pipeline;
pub mod stats;

pub use pipeline::{collect, load, plan, status, PipelineError};
pub use stats::{ReturnStats, StatsError};
