//! Command handlers
//!
//! Flags take precedence over [`EvalSettings`] values read from the environment.

use crate::cli::{CheckSinkArgs, RunArgs};

use anyhow::{Context, Result};
use labeval_eval::prelude::*;
use labeval_eval::reporter::TraceWriter;
use std::sync::Arc;
use std::time::Duration;

/// How a finished run ended, as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Trace written and, when a sink is configured, metrics written
    Complete,
    /// Trace written but the metrics point was not
    TelemetryIncomplete(String),
}

impl RunStatus {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Complete => 0,
            Self::TelemetryIncomplete(_) => 2,
        }
    }
}

/// Evaluate the dataset and publish the trace and metrics
pub async fn run_evaluation(args: &RunArgs, settings: &EvalSettings) -> Result<RunStatus> {
    let classifier_url = match &args.classifier_url {
        Some(url) => url.clone(),
        None => settings.require_classifier_url()?.to_string(),
    };
    let dataset_path = match &args.dataset {
        Some(path) => path.clone(),
        None => settings.require_dataset_file()?.clone(),
    };
    let output = args.output.clone().unwrap_or_else(|| settings.output_file.clone());
    let model_version =
        args.model_version.clone().unwrap_or_else(|| settings.model_version.clone());

    let dataset_config = DatasetConfig {
        text_column: args.text_column.clone(),
        label_column: args.label_column.clone(),
        delimiter: args.policy.label_delimiter(args.label_delimiter),
    };
    let mut dataset = Dataset::load(&dataset_path, &dataset_config)
        .with_context(|| format!("cannot read dataset {}", dataset_path.display()))?;
    tracing::info!(
        path = %dataset_path.display(),
        rows_read = dataset.rows_read,
        rows_dropped = dataset.rows_dropped,
        usable = dataset.len(),
        "dataset loaded"
    );
    if let Some(limit) = args.limit {
        dataset.truncate(limit);
    }

    let timeout = Duration::from_secs(
        args.timeout_secs.unwrap_or_else(|| args.policy.default_timeout_secs()),
    );
    let mut client_config = HttpClassifierConfig::new(classifier_url, timeout)
        .with_request_field(&args.request_field)
        .with_code_field(&args.code_field);
    if let Some(field) = &args.response_field {
        client_config = client_config.with_response_field(field);
    }
    let classifier = HttpClassifier::new(client_config)?;

    let config = EvaluationConfig::with_policy(args.policy)
        .with_request_delay(Duration::from_millis(args.delay_ms));
    let report = Evaluator::new(config).evaluate(Arc::new(classifier), &dataset.examples).await?;

    println!("{}", report.format_summary());

    let mut reporter = RunReporter::new(output, model_version)
        .with_trace_writer(TraceWriter::new(args.truncate))
        .with_measurement(&args.measurement);
    let misconfigured = !settings.influx_partial.is_empty();
    match &settings.influx {
        Some(influx) => reporter = reporter.with_sink(Box::new(InfluxSink::new(influx.clone())?)),
        None if misconfigured => tracing::warn!(
            set = ?settings.influx_partial,
            "incomplete InfluxDB settings, telemetry disabled"
        ),
        None => {}
    }

    let outcome = reporter.publish(&report).await;
    let trace_path = outcome.trace.context("cannot write trace file")?;
    println!("Trace written to {}", trace_path.display());

    Ok(match outcome.telemetry {
        TelemetryStatus::Written => RunStatus::Complete,
        TelemetryStatus::Skipped(_) if !misconfigured => RunStatus::Complete,
        TelemetryStatus::Skipped(reason) | TelemetryStatus::Failed(reason) => {
            RunStatus::TelemetryIncomplete(reason)
        }
    })
}

/// Write a single diagnostic point to verify the sink credentials
pub async fn check_sink(args: &CheckSinkArgs, settings: &EvalSettings) -> Result<()> {
    let influx = settings.require_influx()?;
    let sink = InfluxSink::new(influx.clone())?;
    let point = TelemetryPoint::new(&args.measurement).tag("teste", "valido").field("valor", 1.0);

    sink.write(&point).await.with_context(|| format!("cannot write to {}", influx.url))?;
    println!("Wrote diagnostic point to bucket '{}' at {}", influx.bucket, influx.url);
    Ok(())
}
