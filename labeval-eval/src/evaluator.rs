//! Core evaluator implementation
//!
//! The [`Evaluator`] drives one classifier call per example, strictly in
//! sequence, scores each outcome under the active [`MatchPolicy`], and turns the
//! accumulated labels into [`AggregateMetrics`] once the dataset is exhausted.

use crate::client::Classifier;
use crate::dataset::Example;
use crate::error::{EvalError, Result};
use crate::label::{LabelSet, intersects_any};
use crate::metrics::{AggregateMetrics, micro_scores, weighted_scores};
use crate::outcome::{ClassificationOutcome, MatchPolicy, ScalarPrediction};
use crate::report::{EvaluationRecord, EvaluationReport};

use labeval_telemetry::{classify_call_span, evaluation_run_span, record_run_counts};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Configuration for the evaluator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Matching policy applied to every example
    #[serde(default)]
    pub policy: MatchPolicy,
    /// Pause between consecutive classifier calls
    #[serde(default)]
    pub request_delay: Option<Duration>,
}

impl EvaluationConfig {
    /// Create config for a policy with no pacing delay
    pub fn with_policy(policy: MatchPolicy) -> Self {
        Self { policy, ..Default::default() }
    }

    #[must_use]
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = if delay.is_zero() { None } else { Some(delay) };
        self
    }
}

/// Outcome of applying a policy to one example
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub matched: bool,
    /// Set under the single-label policy only
    pub scalar_prediction: Option<ScalarPrediction>,
}

/// Decide whether an example matched under `policy`.
///
/// Under the single-label policy the expected label is the example's
/// [primary label](Example::primary_label).
pub fn apply_policy(
    policy: MatchPolicy,
    example: &Example,
    outcome: &ClassificationOutcome,
) -> Verdict {
    match policy {
        MatchPolicy::Single => {
            let expected = example.primary_label();
            Verdict {
                matched: outcome.predicted_labels().contains(expected),
                scalar_prediction: Some(ScalarPrediction::collapse(expected, outcome)),
            }
        }
        MatchPolicy::Multi => Verdict {
            matched: intersects_any(example.expected_labels(), &outcome.predicted_set()),
            scalar_prediction: None,
        },
    }
}

/// Labels and counters collected over one run
///
/// Owned by a single run; sequences are index-aligned with the example order.
#[derive(Debug, Clone, Default)]
pub struct RunAccumulator {
    policy: MatchPolicy,
    expected: Vec<LabelSet>,
    predicted: Vec<LabelSet>,
    scalar_true: Vec<ScalarPrediction>,
    scalar_pred: Vec<ScalarPrediction>,
    matches: usize,
    processed: usize,
}

impl RunAccumulator {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy, ..Default::default() }
    }

    /// Score one example and return its trace record
    pub fn push(
        &mut self,
        index: usize,
        example: &Example,
        outcome: ClassificationOutcome,
    ) -> EvaluationRecord {
        let verdict = apply_policy(self.policy, example, &outcome);

        if let Some(scalar) = &verdict.scalar_prediction {
            self.scalar_true.push(ScalarPrediction::Label(example.primary_label().clone()));
            self.scalar_pred.push(scalar.clone());
        } else {
            self.expected.push(example.expected_labels().clone());
            self.predicted.push(outcome.predicted_set());
        }

        self.processed += 1;
        if verdict.matched {
            self.matches += 1;
        }

        let error = outcome.error_detail().map(String::from);
        let predicted_labels = match outcome {
            ClassificationOutcome::Labels(labels) => labels,
            ClassificationOutcome::Empty | ClassificationOutcome::Failed(_) => Vec::new(),
        };

        EvaluationRecord {
            index,
            text: example.text().to_string(),
            expected_labels: example.expected_labels().clone(),
            predicted_labels,
            matched: verdict.matched,
            scalar_prediction: verdict.scalar_prediction,
            error,
        }
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn matches(&self) -> usize {
        self.matches
    }

    /// Compute the aggregate scores. Fails when nothing was processed.
    pub fn finalize(&self) -> Result<AggregateMetrics> {
        if self.processed == 0 {
            return Err(EvalError::EmptyDataset("no example was processed".to_string()));
        }

        Ok(match self.policy {
            MatchPolicy::Single => weighted_scores(&self.scalar_true, &self.scalar_pred),
            MatchPolicy::Multi => {
                micro_scores(self.matches, self.processed, &self.expected, &self.predicted)
            }
        })
    }
}

/// The main evaluator struct
pub struct Evaluator {
    config: EvaluationConfig,
}

impl Evaluator {
    /// Create a new evaluator
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Evaluate every example against the classifier.
    ///
    /// Classifier failures are recorded and scored as empty predictions; only an
    /// empty example list aborts the run.
    pub async fn evaluate(
        &self,
        classifier: Arc<dyn Classifier>,
        examples: &[Example],
    ) -> Result<EvaluationReport> {
        let started_at = chrono::Utc::now();
        let run_id = format!("{}_{}", self.config.policy, uuid::Uuid::new_v4());

        if examples.is_empty() {
            return Err(EvalError::EmptyDataset("dataset has no usable examples".to_string()));
        }

        let span = evaluation_run_span(&run_id, self.config.policy.as_str());
        self.run(&run_id, classifier, examples, started_at).instrument(span).await
    }

    async fn run(
        &self,
        run_id: &str,
        classifier: Arc<dyn Classifier>,
        examples: &[Example],
        started_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<EvaluationReport> {
        let total = examples.len();
        let mut accumulator = RunAccumulator::new(self.config.policy);
        let mut records = Vec::with_capacity(total);

        tracing::info!(examples = total, classifier = classifier.name(), "evaluation started");

        for (index, example) in examples.iter().enumerate() {
            if index > 0 {
                if let Some(delay) = self.config.request_delay {
                    tokio::time::sleep(delay).await;
                }
            }

            let outcome = classifier
                .classify(example.text())
                .instrument(classify_call_span(classifier.name(), index))
                .await;

            if let Some(detail) = outcome.error_detail() {
                tracing::warn!(example = index, error = detail, "classifier call failed");
            }

            let record = accumulator.push(index, example, outcome);
            tracing::info!(
                example = index + 1,
                total,
                matched = record.matched,
                predicted = %record.predicted_display(),
                "example processed"
            );
            records.push(record);
        }

        let metrics = accumulator.finalize()?;
        record_run_counts(accumulator.processed(), accumulator.matches());
        tracing::info!(
            processed = accumulator.processed(),
            matched = accumulator.matches(),
            "evaluation finished"
        );

        Ok(EvaluationReport::new(run_id, self.config.policy, records, metrics, started_at))
    }
}
