use clap::{Args, Parser, Subcommand};
use labeval_eval::outcome::MatchPolicy;
use labeval_eval::reporter::DEFAULT_TRUNCATE;
use labeval_eval::sink::DEFAULT_MEASUREMENT;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "labeval")]
#[command(about = "Evaluate a text-classification service against a labeled dataset", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Export spans to an OTLP collector (e.g. http://localhost:4317)
    #[arg(long, global = true)]
    pub otlp_endpoint: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay the dataset against the classifier and report metrics
    Run(RunArgs),

    /// Write one diagnostic point to the metrics sink
    CheckSink(CheckSinkArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Matching policy: single or multi
    #[arg(long, default_value = "single")]
    pub policy: MatchPolicy,

    /// Dataset CSV file (overrides DATASET_FILE)
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Classification endpoint (overrides CLASSIFIER_URL)
    #[arg(long)]
    pub classifier_url: Option<String>,

    /// Trace CSV destination (overrides OUTPUT_FILE)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Model version tag (overrides MODEL_VERSION)
    #[arg(long)]
    pub model_version: Option<String>,

    /// Per-request timeout in seconds [default: 10 single, 20 multi]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Pause between classifier calls, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,

    /// Evaluate only the first N usable examples
    #[arg(long)]
    pub limit: Option<usize>,

    #[arg(long, default_value = "texto")]
    pub text_column: String,

    #[arg(long, default_value = "codigo_assunto")]
    pub label_column: String,

    /// Separator of multi-valued label fields (multi policy only)
    #[arg(long, default_value_t = '|')]
    pub label_delimiter: char,

    /// JSON field carrying the text in the request body
    #[arg(long, default_value = "texto")]
    pub request_field: String,

    /// Field holding the label code in each candidate
    #[arg(long, default_value = "codigo")]
    pub code_field: String,

    /// Field wrapping the candidate list when the service answers with an object
    #[arg(long)]
    pub response_field: Option<String>,

    /// Trace text length in characters, 0 keeps the full text
    #[arg(long, default_value_t = DEFAULT_TRUNCATE)]
    pub truncate: usize,

    /// Measurement name for the metrics point
    #[arg(long, default_value = DEFAULT_MEASUREMENT)]
    pub measurement: String,
}

#[derive(Args, Debug, Clone)]
pub struct CheckSinkArgs {
    /// Measurement name for the diagnostic point
    #[arg(long, default_value = DEFAULT_MEASUREMENT)]
    pub measurement: String,
}
