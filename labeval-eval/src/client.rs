//! Classification service adapter
//!
//! [`HttpClassifier`] posts one text to the service and converts everything that
//! can go wrong into [`ClassificationOutcome::Failed`]. Nothing is retried.

use crate::error::{EvalError, Result};
use crate::label::LabelCode;
use crate::outcome::ClassificationOutcome;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Longest error body excerpt kept in a failure detail
const MAX_ERROR_BODY: usize = 200;

/// Something that assigns ranked labels to a text
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Identifier used in logs and spans
    fn name(&self) -> &str;

    /// Classify one text. Must not panic or return early with an error:
    /// failures are reported as [`ClassificationOutcome::Failed`].
    async fn classify(&self, text: &str) -> ClassificationOutcome;
}

/// Configuration for the HTTP classification service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClassifierConfig {
    /// Endpoint receiving `POST {"<request_field>": text}`
    pub url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// JSON field carrying the text in the request body
    #[serde(default = "default_request_field")]
    pub request_field: String,
    /// Field holding the label code inside each candidate object
    #[serde(default = "default_code_field")]
    pub code_field: String,
    /// Field wrapping the candidate list when the service answers with an object
    #[serde(default)]
    pub response_field: Option<String>,
}

fn default_request_field() -> String {
    "texto".to_string()
}

fn default_code_field() -> String {
    "codigo".to_string()
}

impl HttpClassifierConfig {
    /// Create a config with the default field names
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
            request_field: default_request_field(),
            code_field: default_code_field(),
            response_field: None,
        }
    }

    #[must_use]
    pub fn with_request_field(mut self, field: impl Into<String>) -> Self {
        self.request_field = field.into();
        self
    }

    #[must_use]
    pub fn with_code_field(mut self, field: impl Into<String>) -> Self {
        self.code_field = field.into();
        self
    }

    #[must_use]
    pub fn with_response_field(mut self, field: impl Into<String>) -> Self {
        self.response_field = Some(field.into());
        self
    }
}

/// Classification service reached over HTTP
pub struct HttpClassifier {
    client: Client,
    config: HttpClassifierConfig,
}

impl HttpClassifier {
    /// Create a client from the given config.
    pub fn new(config: HttpClassifierConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(EvalError::ConfigError("classifier URL is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EvalError::ClientError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClassifierConfig {
        &self.config
    }

    async fn request(&self, text: &str) -> std::result::Result<Vec<LabelCode>, String> {
        let mut body = Map::new();
        body.insert(self.config.request_field.clone(), Value::String(text.to_string()));

        let resp = self.client.post(&self.config.url).json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                format!("request timed out after {:?}", self.config.timeout)
            } else {
                format!("request failed: {e}")
            }
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| format!("failed to read response body: {e}"))?;

        if !status.is_success() {
            return Err(format!("HTTP {status}: {}", excerpt(&text)));
        }

        parse_candidates(&text, &self.config.code_field, self.config.response_field.as_deref())
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    fn name(&self) -> &str {
        &self.config.url
    }

    async fn classify(&self, text: &str) -> ClassificationOutcome {
        match self.request(text).await {
            Ok(labels) => {
                tracing::debug!(candidates = labels.len(), "classifier answered");
                ClassificationOutcome::from_labels(labels)
            }
            Err(detail) => ClassificationOutcome::Failed(detail),
        }
    }
}

/// The two response shapes the service is known to produce
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifierResponse {
    /// `[{"codigo": 7, ...}, ...]`
    Ranked(Vec<Value>),
    /// `{"<field>": [{"codigo": 7, ...}, ...], ...}`
    Wrapped(Map<String, Value>),
}

/// Parse a response body into ranked label codes.
///
/// A wrapped response uses `response_field` when given; otherwise the object must
/// contain exactly one array-valued field.
pub fn parse_candidates(
    body: &str,
    code_field: &str,
    response_field: Option<&str>,
) -> std::result::Result<Vec<LabelCode>, String> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| format!("malformed response body: {e}"))?;
    let response: ClassifierResponse = serde_json::from_value(value).map_err(|_| {
        "malformed response body: expected a candidate list or an object wrapping one".to_string()
    })?;

    let candidates = match response {
        ClassifierResponse::Ranked(items) => items,
        ClassifierResponse::Wrapped(map) => unwrap_candidates(map, response_field)?,
    };

    candidates
        .iter()
        .enumerate()
        .map(|(rank, candidate)| {
            candidate.get(code_field).and_then(LabelCode::from_json).ok_or_else(|| {
                format!("malformed response body: candidate {rank} has no usable '{code_field}'")
            })
        })
        .collect()
}

fn unwrap_candidates(
    mut map: Map<String, Value>,
    response_field: Option<&str>,
) -> std::result::Result<Vec<Value>, String> {
    if let Some(field) = response_field {
        return match map.remove(field) {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(format!("malformed response body: '{field}' is not a list")),
            None => Err(format!("malformed response body: missing '{field}'")),
        };
    }

    let mut lists = map.into_iter().filter_map(|(_, v)| match v {
        Value::Array(items) => Some(items),
        _ => None,
    });

    match (lists.next(), lists.next()) {
        (Some(items), None) => Ok(items),
        (None, _) => Err("malformed response body: object holds no candidate list".to_string()),
        (Some(_), Some(_)) => Err(
            "malformed response body: several lists in response, set the response field"
                .to_string(),
        ),
    }
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() > MAX_ERROR_BODY {
        format!("{}...", trimmed.chars().take(MAX_ERROR_BODY).collect::<String>())
    } else {
        trimmed.to_string()
    }
}
