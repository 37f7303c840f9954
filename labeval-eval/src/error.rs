//! Error types for the evaluation framework

use thiserror::Error;

/// Result type alias for evaluation operations
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors that can occur during evaluation
///
/// Failures of individual classifier calls are not represented here; they
/// degrade to [`ClassificationOutcome::Failed`](crate::outcome::ClassificationOutcome)
/// and never abort a run.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Failed to load the dataset
    #[error("Failed to load dataset: {0}")]
    LoadError(String),

    /// Failed to parse input
    #[error("Failed to parse: {0}")]
    ParseError(String),

    /// No usable examples were available for the run
    #[error("No examples to evaluate: {0}")]
    EmptyDataset(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The classification client could not be built
    #[error("Classifier client error: {0}")]
    ClientError(String),

    /// Writing to the metrics sink failed
    #[error("Metrics sink error: {0}")]
    SinkError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// CSV read or write error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}
