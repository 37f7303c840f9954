//! # labeval-cli
//!
//! Command-line runner for classification service evaluations.
//!
//! ## Usage
//!
//! ```bash
//! # Single-label run with settings from .env
//! labeval run --policy single
//!
//! # Multi-label run against an explicit endpoint, first 100 examples
//! labeval run --policy multi --classifier-url http://localhost:8000/classify --limit 100
//!
//! # Verify InfluxDB credentials
//! labeval check-sink
//! ```
//!
//! ## Exit codes
//!
//! - `0`: run finished and every configured output was written
//! - `1`: configuration, dataset or trace file error
//! - `2`: run finished but the metrics point was not written

pub mod cli;
pub mod run;

pub use cli::{CheckSinkArgs, Cli, Commands, RunArgs};
pub use run::{RunStatus, check_sink, run_evaluation};
