//! Process settings read from the environment

use crate::error::{EvalError, Result};
use crate::sink::InfluxConfig;

use std::path::PathBuf;

pub const ENV_CLASSIFIER_URL: &str = "CLASSIFIER_URL";
pub const ENV_DATASET_FILE: &str = "DATASET_FILE";
pub const ENV_OUTPUT_FILE: &str = "OUTPUT_FILE";
pub const ENV_MODEL_VERSION: &str = "MODEL_VERSION";
pub const ENV_INFLUX_URL: &str = "INFLUX_URL";
pub const ENV_INFLUX_TOKEN: &str = "INFLUX_TOKEN";
pub const ENV_INFLUX_ORG: &str = "INFLUX_ORG";
pub const ENV_INFLUX_BUCKET: &str = "INFLUX_BUCKET";

/// Default path of the per-example trace
pub const DEFAULT_OUTPUT_FILE: &str = "data/classification_results.csv";

/// Default model version tag
pub const DEFAULT_MODEL_VERSION: &str = "v1";

/// Settings for one evaluation run
///
/// Every field may be left unset here and filled from the command line; use
/// [`EvalSettings::require_classifier_url`] and friends to enforce presence.
#[derive(Debug, Clone, Default)]
pub struct EvalSettings {
    pub classifier_url: Option<String>,
    pub dataset_file: Option<PathBuf>,
    pub output_file: PathBuf,
    pub model_version: String,
    /// Set only when all four Influx variables are present
    pub influx: Option<InfluxConfig>,
    /// Influx variables that are set while others are missing
    pub influx_partial: Vec<&'static str>,
}

impl EvalSettings {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup function
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let influx_keys = [ENV_INFLUX_URL, ENV_INFLUX_TOKEN, ENV_INFLUX_ORG, ENV_INFLUX_BUCKET];
        let influx_values: Vec<Option<String>> = influx_keys.iter().map(|k| get(k)).collect();

        let influx = match influx_values.as_slice() {
            [Some(url), Some(token), Some(org), Some(bucket)] => {
                Some(InfluxConfig::new(url, token, org, bucket))
            }
            _ => None,
        };
        let influx_partial = if influx.is_none() {
            influx_keys
                .iter()
                .zip(&influx_values)
                .filter(|(_, v)| v.is_some())
                .map(|(k, _)| *k)
                .collect()
        } else {
            Vec::new()
        };

        Self {
            classifier_url: get(ENV_CLASSIFIER_URL),
            dataset_file: get(ENV_DATASET_FILE).map(PathBuf::from),
            output_file: get(ENV_OUTPUT_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
            model_version: get(ENV_MODEL_VERSION)
                .unwrap_or_else(|| DEFAULT_MODEL_VERSION.to_string()),
            influx,
            influx_partial,
        }
    }

    pub fn require_classifier_url(&self) -> Result<&str> {
        self.classifier_url.as_deref().ok_or_else(|| missing(ENV_CLASSIFIER_URL))
    }

    pub fn require_dataset_file(&self) -> Result<&PathBuf> {
        self.dataset_file.as_ref().ok_or_else(|| missing(ENV_DATASET_FILE))
    }

    pub fn require_influx(&self) -> Result<&InfluxConfig> {
        self.influx.as_ref().ok_or_else(|| {
            EvalError::ConfigError(format!(
                "{ENV_INFLUX_URL}, {ENV_INFLUX_TOKEN}, {ENV_INFLUX_ORG} and {ENV_INFLUX_BUCKET} must all be set"
            ))
        })
    }
}

fn missing(key: &str) -> EvalError {
    EvalError::ConfigError(format!("{key} is not set"))
}
