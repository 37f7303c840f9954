//! Trace file and telemetry publishing.

use async_trait::async_trait;
use labeval_eval::prelude::*;
use labeval_eval::{RunSummary, ScalarPrediction, TraceWriter};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Clone, Default)]
struct RecordingSink {
    points: Arc<Mutex<Vec<TelemetryPoint>>>,
}

#[async_trait]
impl MetricsSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn write(&self, point: &TelemetryPoint) -> Result<()> {
        self.points.lock().unwrap().push(point.clone());
        Ok(())
    }
}

struct FailingSink;

#[async_trait]
impl MetricsSink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    async fn write(&self, _point: &TelemetryPoint) -> Result<()> {
        Err(EvalError::SinkError("connection refused".to_string()))
    }
}

fn record(index: usize, text: &str, expected: i64, predicted: &[i64]) -> EvaluationRecord {
    let predicted_labels: Vec<LabelCode> = predicted.iter().map(|&c| LabelCode::Int(c)).collect();
    EvaluationRecord {
        index,
        text: text.to_string(),
        expected_labels: LabelSet::from([LabelCode::Int(expected)]),
        matched: predicted_labels.contains(&LabelCode::Int(expected)),
        scalar_prediction: None,
        predicted_labels,
        error: None,
    }
}

fn multi_report() -> EvaluationReport {
    let records = vec![
        record(0, "semaforo quebrado na esquina", 1, &[1, 2]),
        record(1, "calcada", 3, &[4]),
    ];
    let metrics = AggregateMetrics {
        policy: MatchPolicy::Multi,
        accuracy: 0.5,
        precision: 1.0 / 3.0,
        recall: 0.5,
        f1: 0.4,
    };
    EvaluationReport::new("multi_test", MatchPolicy::Multi, records, metrics, chrono::Utc::now())
}

#[tokio::test]
async fn test_trace_and_telemetry_written() {
    let dir = TempDir::new().unwrap();
    let trace_path = dir.path().join("out").join("results.csv");
    let sink = RecordingSink::default();

    let outcome = RunReporter::new(&trace_path, "v3")
        .with_sink(Box::new(sink.clone()))
        .publish(&multi_report())
        .await;

    assert!(outcome.is_complete());
    assert_eq!(outcome.trace.unwrap(), trace_path);

    let trace = std::fs::read_to_string(&trace_path).unwrap();
    let lines: Vec<&str> = trace.lines().collect();
    assert_eq!(lines[0], "text,expected_labels,predicted_labels,hit,error");
    assert_eq!(lines[1], "semaforo quebrado na esquina,1,\"1, 2\",true,");
    assert_eq!(lines[2], "calcada,3,4,false,");

    let points = sink.points.lock().unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].measurement, "classificacao_api");
    assert_eq!(points[0].tags.get("versao_modelo").map(String::as_str), Some("v3"));
    assert_eq!(points[0].fields[0], ("hit_rate".to_string(), 0.5));
}

#[tokio::test]
async fn test_trace_is_overwritten() {
    let dir = TempDir::new().unwrap();
    let trace_path = dir.path().join("results.csv");
    std::fs::write(&trace_path, "stale content\nfrom an earlier run\n").unwrap();

    RunReporter::new(&trace_path, "v1").publish(&multi_report()).await.trace.unwrap();

    let trace = std::fs::read_to_string(&trace_path).unwrap();
    assert!(!trace.contains("stale"));
    assert_eq!(trace.lines().count(), 3);
}

#[tokio::test]
async fn test_sink_failure_keeps_trace() {
    let dir = TempDir::new().unwrap();
    let trace_path = dir.path().join("results.csv");

    let outcome = RunReporter::new(&trace_path, "v1")
        .with_sink(Box::new(FailingSink))
        .publish(&multi_report())
        .await;

    assert!(outcome.trace.is_ok());
    assert!(matches!(outcome.telemetry, TelemetryStatus::Failed(ref e) if e.contains("refused")));
    assert!(!outcome.is_complete());
    assert!(trace_path.exists());
}

#[tokio::test]
async fn test_missing_sink_is_skipped() {
    let dir = TempDir::new().unwrap();
    let outcome =
        RunReporter::new(dir.path().join("t.csv"), "v1").publish(&multi_report()).await;

    assert!(outcome.trace.is_ok());
    assert!(matches!(outcome.telemetry, TelemetryStatus::Skipped(_)));
}

#[tokio::test]
async fn test_unwritable_trace_still_publishes_metrics() {
    let dir = TempDir::new().unwrap();
    // A directory in place of the trace file makes the create fail
    let trace_path = dir.path().join("taken");
    std::fs::create_dir(&trace_path).unwrap();
    let sink = RecordingSink::default();

    let outcome = RunReporter::new(&trace_path, "v1")
        .with_sink(Box::new(sink.clone()))
        .publish(&multi_report())
        .await;

    assert!(outcome.trace.is_err());
    assert_eq!(outcome.telemetry, TelemetryStatus::Written);
    assert_eq!(sink.points.lock().unwrap().len(), 1);
}

#[test]
fn test_single_label_trace_columns_and_truncation() {
    let mut ok = record(0, "a very long complaint about the street lights", 7, &[9, 7]);
    ok.scalar_prediction = Some(ScalarPrediction::Label(LabelCode::Int(7)));
    let mut failed = record(1, "short", 2, &[]);
    failed.matched = false;
    failed.scalar_prediction = Some(ScalarPrediction::Error);
    failed.error = Some("HTTP 502: bad gateway".to_string());

    let metrics = AggregateMetrics {
        policy: MatchPolicy::Single,
        accuracy: 0.5,
        precision: 0.5,
        recall: 0.5,
        f1: 0.5,
    };
    let report = EvaluationReport::new(
        "single_test",
        MatchPolicy::Single,
        vec![ok, failed],
        metrics,
        chrono::Utc::now(),
    );
    assert_eq!(report.summary, RunSummary { processed: 2, matched: 1, failed: 1 });

    let mut out = Vec::new();
    TraceWriter::new(10).write_to(&report, &mut out).unwrap();
    let trace = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = trace.lines().collect();

    assert_eq!(lines[0], "text,expected_label,predicted_labels,prediction_for_metric,error");
    assert_eq!(lines[1], "a very lon...,7,\"9, 7\",7,");
    assert_eq!(lines[2], "short,2,ERROR,ERROR,HTTP 502: bad gateway");
}
