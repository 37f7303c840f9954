//! Evaluation result reporting
//!
//! Structures for representing and formatting the outcome of a run.

use crate::label::{LabelCode, LabelSet, join_labels};
use crate::metrics::AggregateMetrics;
use crate::outcome::{MatchPolicy, ScalarPrediction};

use serde::{Serialize, Serializer};
use std::time::Duration;

/// Trace row for one example. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRecord {
    /// Position of the example in the dataset
    pub index: usize,
    pub text: String,
    pub expected_labels: LabelSet,
    /// Ranked predictions; empty when the call failed or returned nothing
    pub predicted_labels: Vec<LabelCode>,
    pub matched: bool,
    /// Scalar used by the single-label metrics; `None` under the multi-label policy
    pub scalar_prediction: Option<ScalarPrediction>,
    /// Failure detail when the classifier call failed
    pub error: Option<String>,
}

impl EvaluationRecord {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// Comma-joined predictions as shown in the trace
    pub fn predicted_display(&self) -> String {
        if self.failed() { "ERROR".to_string() } else { join_labels(&self.predicted_labels, ", ") }
    }
}

impl Serialize for ScalarPrediction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Complete report for one evaluation run
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// Unique identifier for this evaluation run
    pub run_id: String,
    pub policy: MatchPolicy,
    /// When the evaluation started
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// When the evaluation completed
    pub completed_at: chrono::DateTime<chrono::Utc>,
    /// Total duration
    pub duration: Duration,
    /// One record per example, in dataset order
    pub records: Vec<EvaluationRecord>,
    /// Summary statistics
    pub summary: RunSummary,
    pub metrics: AggregateMetrics,
}

impl EvaluationReport {
    /// Create a new report
    pub fn new(
        run_id: &str,
        policy: MatchPolicy,
        records: Vec<EvaluationRecord>,
        metrics: AggregateMetrics,
        started_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        let completed_at = chrono::Utc::now();
        let duration = (completed_at - started_at).to_std().unwrap_or_default();
        let summary = RunSummary::from_records(&records);

        Self {
            run_id: run_id.to_string(),
            policy,
            started_at,
            completed_at,
            duration,
            records,
            summary,
            metrics,
        }
    }

    /// Records whose classifier call failed
    pub fn failures(&self) -> Vec<&EvaluationRecord> {
        self.records.iter().filter(|r| r.failed()).collect()
    }

    /// Format as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Evaluation Report: {}\n", self.run_id));
        output.push_str(&format!("Policy: {}\n", self.policy));
        output.push_str(&format!("Duration: {:?}\n", self.duration));
        output.push_str("\nSummary:\n");
        output.push_str(&format!("  Processed: {}\n", self.summary.processed));
        output.push_str(&format!("  Matched: {}\n", self.summary.matched));
        output.push_str(&format!("  Failed calls: {}\n", self.summary.failed));

        output.push_str("\nMetrics:\n");
        for (name, value) in self.metrics.fields() {
            output.push_str(&format!("  {}: {:.4}\n", name, value));
        }

        output
    }

    /// Export to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Counters for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Examples processed, failures included
    pub processed: usize,
    pub matched: usize,
    /// Examples whose classifier call failed
    pub failed: usize,
}

impl RunSummary {
    pub fn from_records(records: &[EvaluationRecord]) -> Self {
        Self {
            processed: records.len(),
            matched: records.iter().filter(|r| r.matched).count(),
            failed: records.iter().filter(|r| r.failed()).count(),
        }
    }
}
