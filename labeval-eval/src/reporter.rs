//! Run reporter
//!
//! Persists the per-example trace as CSV and pushes the aggregate metrics to a
//! [`MetricsSink`]. A sink failure never undoes or masks the trace write.

use crate::error::Result;
use crate::label::join_labels;
use crate::outcome::MatchPolicy;
use crate::report::{EvaluationRecord, EvaluationReport};
use crate::sink::{DEFAULT_MEASUREMENT, MetricsSink, TelemetryPoint};

use std::io::Write;
use std::path::{Path, PathBuf};

/// Default trace text length, in characters
pub const DEFAULT_TRUNCATE: usize = 50;

/// Shorten `text` to `max` characters followed by `...`; `0` keeps it whole
pub fn truncate_text(text: &str, max: usize) -> String {
    if max == 0 || text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str("...");
    out
}

/// Writes the per-example trace as CSV
#[derive(Debug, Clone)]
pub struct TraceWriter {
    truncate: usize,
}

impl Default for TraceWriter {
    fn default() -> Self {
        Self { truncate: DEFAULT_TRUNCATE }
    }
}

impl TraceWriter {
    pub fn new(truncate: usize) -> Self {
        Self { truncate }
    }

    fn header(policy: MatchPolicy) -> [&'static str; 5] {
        match policy {
            MatchPolicy::Single => {
                ["text", "expected_label", "predicted_labels", "prediction_for_metric", "error"]
            }
            MatchPolicy::Multi => ["text", "expected_labels", "predicted_labels", "hit", "error"],
        }
    }

    fn row(&self, policy: MatchPolicy, record: &EvaluationRecord) -> [String; 5] {
        let outcome_column = match (policy, &record.scalar_prediction) {
            (MatchPolicy::Single, Some(scalar)) => scalar.to_string(),
            _ => record.matched.to_string(),
        };
        [
            truncate_text(&record.text, self.truncate),
            join_labels(&record.expected_labels, "|"),
            record.predicted_display(),
            outcome_column,
            record.error.clone().unwrap_or_default(),
        ]
    }

    /// Write the trace to any destination
    pub fn write_to<W: Write>(&self, report: &EvaluationReport, dest: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(dest);
        writer.write_record(Self::header(report.policy))?;
        for record in &report.records {
            writer.write_record(self.row(report.policy, record))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the trace to `path`, replacing any existing file
    pub fn write(&self, report: &EvaluationReport, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        self.write_to(report, file)?;
        Ok(path.to_path_buf())
    }
}

/// What happened to the metrics point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryStatus {
    Written,
    /// No sink configured
    Skipped(String),
    Failed(String),
}

impl TelemetryStatus {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written)
    }
}

/// Result of publishing one report
#[derive(Debug)]
pub struct PublishOutcome {
    /// Where the trace was written, or why it could not be
    pub trace: Result<PathBuf>,
    pub telemetry: TelemetryStatus,
}

impl PublishOutcome {
    /// True when both the trace and the metrics point were written
    pub fn is_complete(&self) -> bool {
        self.trace.is_ok() && self.telemetry.is_written()
    }
}

/// Renders a finished run to its durable destinations
pub struct RunReporter {
    trace_path: PathBuf,
    trace_writer: TraceWriter,
    sink: Option<Box<dyn MetricsSink>>,
    measurement: String,
    model_version: String,
}

impl RunReporter {
    pub fn new(trace_path: impl Into<PathBuf>, model_version: impl Into<String>) -> Self {
        Self {
            trace_path: trace_path.into(),
            trace_writer: TraceWriter::default(),
            sink: None,
            measurement: DEFAULT_MEASUREMENT.to_string(),
            model_version: model_version.into(),
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn MetricsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub fn with_trace_writer(mut self, writer: TraceWriter) -> Self {
        self.trace_writer = writer;
        self
    }

    #[must_use]
    pub fn with_measurement(mut self, measurement: impl Into<String>) -> Self {
        self.measurement = measurement.into();
        self
    }

    /// Write the trace, then the metrics point. Both are always attempted.
    pub async fn publish(&self, report: &EvaluationReport) -> PublishOutcome {
        let trace = self.trace_writer.write(report, &self.trace_path);
        match &trace {
            Ok(path) => {
                tracing::info!(path = %path.display(), rows = report.records.len(), "trace written")
            }
            Err(e) => {
                tracing::error!(path = %self.trace_path.display(), error = %e, "trace write failed")
            }
        }

        let telemetry = match &self.sink {
            None => {
                tracing::warn!("no metrics sink configured, skipping telemetry");
                TelemetryStatus::Skipped("no metrics sink configured".to_string())
            }
            Some(sink) => {
                let point = TelemetryPoint::from_metrics(
                    &self.measurement,
                    &self.model_version,
                    &report.metrics,
                );
                match sink.write(&point).await {
                    Ok(()) => {
                        tracing::info!(sink = sink.name(), "metrics point written");
                        TelemetryStatus::Written
                    }
                    Err(e) => {
                        tracing::error!(sink = sink.name(), error = %e, "metrics write failed");
                        TelemetryStatus::Failed(e.to_string())
                    }
                }
            }
        };

        PublishOutcome { trace, telemetry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 50), "short");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("ação", 2), "aç...");
        assert_eq!(truncate_text("keep everything", 0), "keep everything");
    }

    #[test]
    fn test_headers_follow_policy() {
        assert_eq!(TraceWriter::header(MatchPolicy::Single)[3], "prediction_for_metric");
        assert_eq!(TraceWriter::header(MatchPolicy::Multi)[3], "hit");
    }
}
