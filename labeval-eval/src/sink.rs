//! Time-series sink for aggregate metrics
//!
//! Points are encoded as InfluxDB line protocol and written synchronously, one
//! request per point, over the v2 HTTP write API.

use crate::error::{EvalError, Result};
use crate::metrics::AggregateMetrics;

use async_trait::async_trait;
use labeval_telemetry::sink_write_span;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::Instrument;

/// Tag carrying the model version on every metrics point
pub const MODEL_VERSION_TAG: &str = "versao_modelo";

/// Default measurement name for evaluation metrics
pub const DEFAULT_MEASUREMENT: &str = "classificacao_api";

/// One measurement with tags, float fields and a nanosecond timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryPoint {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: Vec<(String, f64)>,
    /// Nanoseconds since the Unix epoch
    pub timestamp_ns: Option<i64>,
}

impl TelemetryPoint {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: vec![],
            timestamp_ns: None,
        }
    }

    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: f64) -> Self {
        self.fields.push((key.into(), value));
        self
    }

    #[must_use]
    pub fn timestamp_ns(mut self, ns: i64) -> Self {
        self.timestamp_ns = Some(ns);
        self
    }

    /// Build the aggregate-metrics point, stamped with the current time
    pub fn from_metrics(
        measurement: &str,
        model_version: &str,
        metrics: &AggregateMetrics,
    ) -> Self {
        let mut point = Self::new(measurement).tag(MODEL_VERSION_TAG, model_version);
        for (name, value) in metrics.fields() {
            point = point.field(name, value);
        }
        match chrono::Utc::now().timestamp_nanos_opt() {
            Some(ns) => point.timestamp_ns(ns),
            None => point,
        }
    }

    /// Encode as a single line of InfluxDB line protocol
    pub fn to_line_protocol(&self) -> String {
        let mut line = escape(&self.measurement, &[',', ' ']);
        for (key, value) in &self.tags {
            line.push(',');
            line.push_str(&escape(key, &[',', '=', ' ']));
            line.push('=');
            line.push_str(&escape(value, &[',', '=', ' ']));
        }

        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(key, value)| format!("{}={}", escape(key, &[',', '=', ' ']), value))
            .collect();
        line.push(' ');
        line.push_str(&fields.join(","));

        if let Some(ns) = self.timestamp_ns {
            line.push(' ');
            line.push_str(&ns.to_string());
        }
        line
    }
}

fn escape(raw: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Destination for aggregate metrics points
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Identifier used in logs and spans
    fn name(&self) -> &str;

    /// Durably write one point
    async fn write(&self, point: &TelemetryPoint) -> Result<()>;
}

/// Connection settings for an InfluxDB v2 server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluxConfig {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
    /// Per-request timeout
    #[serde(default = "default_sink_timeout")]
    pub timeout: Duration,
}

fn default_sink_timeout() -> Duration {
    Duration::from_secs(10)
}

impl InfluxConfig {
    pub fn new(
        url: impl Into<String>,
        token: impl Into<String>,
        org: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            org: org.into(),
            bucket: bucket.into(),
            timeout: default_sink_timeout(),
        }
    }
}

/// InfluxDB v2 sink using the HTTP write API
pub struct InfluxSink {
    client: Client,
    config: InfluxConfig,
}

impl InfluxSink {
    pub fn new(config: InfluxConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EvalError::SinkError(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn write_url(&self) -> String {
        format!("{}/api/v2/write", self.config.url.trim_end_matches('/'))
    }

    async fn post(&self, body: String) -> Result<()> {
        let resp = self
            .client
            .post(self.write_url())
            .query(&[
                ("org", self.config.org.as_str()),
                ("bucket", self.config.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header("Authorization", format!("Token {}", self.config.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| EvalError::SinkError(format!("write request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(EvalError::SinkError(format!(
                "status={status}, body={}",
                error_text.trim()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl MetricsSink for InfluxSink {
    fn name(&self) -> &str {
        "influxdb"
    }

    async fn write(&self, point: &TelemetryPoint) -> Result<()> {
        let body = point.to_line_protocol();
        tracing::debug!(line = %body, bucket = %self.config.bucket, "writing metrics point");
        self.post(body).instrument(sink_write_span(self.name())).await
    }
}
