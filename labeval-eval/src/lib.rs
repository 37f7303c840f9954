//! # labeval-eval
//!
//! Quality evaluation of text-classification services.
//!
//! This crate replays a labeled reference dataset against a classification
//! service, scores every answer and summarises the run as precision, recall
//! and F1, optionally pushing the figures to a time-series database.
//!
//! ## Features
//!
//! - **Datasets**: CSV files with a text column and a (possibly multi-valued) label column
//! - **Policies**: single-label (expected code anywhere in the ranked answer) and
//!   multi-label (any overlap between expected and predicted sets)
//! - **Metrics**: support-weighted scores for single-label runs, micro-averaged
//!   scores over the label universe for multi-label runs
//! - **Reporting**: per-example CSV trace and an InfluxDB line-protocol sink
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use labeval_eval::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let policy = MatchPolicy::Multi;
//!     let dataset = Dataset::load(
//!         "data/dataset.csv",
//!         &DatasetConfig::default().with_delimiter(policy.label_delimiter('|')),
//!     )?;
//!
//!     let classifier = HttpClassifier::new(HttpClassifierConfig::new(
//!         "http://localhost:8000/classify",
//!         Duration::from_secs(policy.default_timeout_secs()),
//!     ))?;
//!
//!     let evaluator = Evaluator::new(EvaluationConfig::with_policy(policy));
//!     let report = evaluator.evaluate(Arc::new(classifier), &dataset.examples).await?;
//!     println!("{}", report.format_summary());
//!
//!     let outcome = RunReporter::new("data/classification_results.csv", "v1")
//!         .publish(&report)
//!         .await;
//!     outcome.trace?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod label;
pub mod metrics;
pub mod outcome;
pub mod report;
pub mod reporter;
pub mod sink;

// Re-exports
pub use client::{Classifier, HttpClassifier, HttpClassifierConfig, parse_candidates};
pub use config::EvalSettings;
pub use dataset::{Dataset, DatasetConfig, Example};
pub use error::{EvalError, Result};
pub use evaluator::{EvaluationConfig, Evaluator, RunAccumulator, Verdict, apply_policy};
pub use label::{LabelCode, LabelSet, LabelUniverse, vectorize};
pub use metrics::{AggregateMetrics, MicroCounts, micro_scores, weighted_scores};
pub use outcome::{ClassificationOutcome, MatchPolicy, ScalarPrediction};
pub use report::{EvaluationRecord, EvaluationReport, RunSummary};
pub use reporter::{PublishOutcome, RunReporter, TelemetryStatus, TraceWriter};
pub use sink::{InfluxConfig, InfluxSink, MetricsSink, TelemetryPoint};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::{Classifier, HttpClassifier, HttpClassifierConfig};
    pub use crate::config::EvalSettings;
    pub use crate::dataset::{Dataset, DatasetConfig, Example};
    pub use crate::error::{EvalError, Result};
    pub use crate::evaluator::{EvaluationConfig, Evaluator};
    pub use crate::label::{LabelCode, LabelSet};
    pub use crate::metrics::AggregateMetrics;
    pub use crate::outcome::{ClassificationOutcome, MatchPolicy};
    pub use crate::report::{EvaluationRecord, EvaluationReport};
    pub use crate::reporter::{RunReporter, TelemetryStatus};
    pub use crate::sink::{InfluxConfig, InfluxSink, MetricsSink, TelemetryPoint};
}
