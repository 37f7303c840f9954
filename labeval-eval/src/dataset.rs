//! Reference dataset loading
//!
//! Reads a CSV file with a text column and a label column. Rows with a blank
//! text or a label field that yields no codes are dropped before evaluation.

use crate::error::{EvalError, Result};
use crate::label::{LabelCode, LabelSet, parse_label_field};

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// One labeled example
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Example {
    text: String,
    expected_labels: LabelSet,
    #[serde(skip)]
    primary_label: LabelCode,
}

impl Example {
    /// Returns `None` when the text is blank or no label is given
    pub fn new(text: impl Into<String>, expected_labels: LabelSet) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }
        let primary_label = expected_labels.first()?.clone();
        Some(Self { text, expected_labels, primary_label })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Never empty
    pub fn expected_labels(&self) -> &LabelSet {
        &self.expected_labels
    }

    /// Smallest expected code; the only one in single-label datasets
    pub fn primary_label(&self) -> &LabelCode {
        &self.primary_label
    }
}

/// Column layout of the dataset file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Header of the free-text column
    pub text_column: String,
    /// Header of the label column
    pub label_column: String,
    /// Separator of multi-valued label fields; `None` reads the field as one code
    pub delimiter: Option<char>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            text_column: "texto".to_string(),
            label_column: "codigo_assunto".to_string(),
            delimiter: None,
        }
    }
}

impl DatasetConfig {
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: Option<char>) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Usable examples plus load statistics
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub examples: Vec<Example>,
    /// Data rows read from the file
    pub rows_read: usize,
    /// Rows dropped for a missing text or label
    pub rows_dropped: usize,
}

impl Dataset {
    /// Load a dataset from a CSV file
    pub fn load(path: impl AsRef<Path>, config: &DatasetConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| EvalError::LoadError(format!("{}: {e}", path.display())))?;
        Self::from_reader(file, config)
    }

    /// Load a dataset from any CSV source
    pub fn from_reader<R: Read>(reader: R, config: &DatasetConfig) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers.iter().position(|h| h.trim() == name).ok_or_else(|| {
                EvalError::LoadError(format!("missing column '{name}' in dataset header"))
            })
        };
        let text_idx = column(&config.text_column)?;
        let label_idx = column(&config.label_column)?;

        let mut dataset = Dataset::default();
        for record in reader.records() {
            let record = record?;
            dataset.rows_read += 1;

            let text = record.get(text_idx).unwrap_or_default();
            let raw_labels = record.get(label_idx).unwrap_or_default();
            let labels = parse_label_field(raw_labels, config.delimiter);

            match Example::new(text, labels) {
                Some(example) => dataset.examples.push(example),
                None => dataset.rows_dropped += 1,
            }
        }

        tracing::debug!(
            rows_read = dataset.rows_read,
            rows_dropped = dataset.rows_dropped,
            "dataset loaded"
        );

        Ok(dataset)
    }

    /// Keep only the first `n` examples
    pub fn truncate(&mut self, n: usize) {
        self.examples.truncate(n);
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}
