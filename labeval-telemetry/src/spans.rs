//! Span helpers for evaluation runs
//!
//! Provides pre-configured spans for instrumenting a run, its classifier calls,
//! and the writes to the metrics sink.

use tracing::Span;

/// Create a span covering one full evaluation run
///
/// # Arguments
/// * `run_id` - Unique ID for this run
/// * `policy` - Matching policy name (e.g. "single", "multi")
///
/// # Example
/// ```
/// use labeval_telemetry::evaluation_run_span;
/// let span = evaluation_run_span("run-123", "multi");
/// let _enter = span.enter();
/// ```
pub fn evaluation_run_span(run_id: &str, policy: &str) -> Span {
    tracing::info_span!(
        "evaluation.run",
        run.id = run_id,
        run.policy = policy,
        run.processed = tracing::field::Empty,
        run.matched = tracing::field::Empty,
        otel.kind = "internal"
    )
}

/// Create a span for one call to the classification service
///
/// # Arguments
/// * `endpoint` - URL of the classification service
/// * `example_index` - Zero-based position of the example in the dataset
pub fn classify_call_span(endpoint: &str, example_index: usize) -> Span {
    tracing::debug_span!(
        "classifier.call",
        classifier.endpoint = endpoint,
        example.index = example_index,
        otel.kind = "client"
    )
}

/// Create a span for a write to the metrics sink
pub fn sink_write_span(sink: &str) -> Span {
    tracing::info_span!("sink.write", sink.name = sink, otel.kind = "client")
}

/// Record the final counters of a run on the current span
pub fn record_run_counts(processed: usize, matched: usize) {
    let span = Span::current();
    span.record("run.processed", processed);
    span.record("run.matched", matched);
}
