//! Per-example outcome types
//!
//! A [`ClassificationOutcome`] is produced fresh for every example by the
//! classifier adapter. The single-label policy collapses it to a
//! [`ScalarPrediction`]; the multi-label policy keeps the full label list.

use crate::label::{LabelCode, LabelSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result of one call to the classification service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationOutcome {
    /// The service answered with at least one candidate, in rank order
    Labels(Vec<LabelCode>),
    /// The service answered with an empty candidate list
    Empty,
    /// Transport error, non-2xx status or malformed body
    Failed(String),
}

impl ClassificationOutcome {
    /// Build an outcome from a parsed candidate list
    pub fn from_labels(labels: Vec<LabelCode>) -> Self {
        if labels.is_empty() { Self::Empty } else { Self::Labels(labels) }
    }

    /// Ranked predictions; empty for [`Empty`](Self::Empty) and [`Failed`](Self::Failed)
    pub fn predicted_labels(&self) -> &[LabelCode] {
        match self {
            Self::Labels(labels) => labels,
            Self::Empty | Self::Failed(_) => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn error_detail(&self) -> Option<&str> {
        match self {
            Self::Failed(detail) => Some(detail),
            _ => None,
        }
    }

    /// Top-ranked candidate, if any
    pub fn top(&self) -> Option<&LabelCode> {
        self.predicted_labels().first()
    }

    /// Predictions as a set, dropping rank and duplicates
    pub fn predicted_set(&self) -> LabelSet {
        self.predicted_labels().iter().cloned().collect()
    }
}

/// Policy used to decide whether an example matched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// One expected label; matched when it appears anywhere in the ranked list
    #[default]
    Single,
    /// Expected label set; matched when it intersects the predicted set
    Multi,
}

impl MatchPolicy {
    /// Name used in logs and trace metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multi => "multi",
        }
    }

    /// Request timeout used when none is configured
    pub fn default_timeout_secs(&self) -> u64 {
        match self {
            Self::Single => 10,
            Self::Multi => 20,
        }
    }

    /// Delimiter used to split the dataset label field
    pub fn label_delimiter(&self, configured: char) -> Option<char> {
        match self {
            Self::Single => None,
            Self::Multi => Some(configured),
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "single-label" | "single_label" => Ok(Self::Single),
            "multi" | "multi-label" | "multi_label" => Ok(Self::Multi),
            other => Err(format!("unknown match policy '{other}' (expected single or multi)")),
        }
    }
}

/// Scalar prediction used by the single-label exact-match metrics
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarPrediction {
    Label(LabelCode),
    /// The service returned no candidates
    None,
    /// The call failed
    Error,
}

impl ScalarPrediction {
    /// Collapse an outcome against the expected label.
    ///
    /// The expected label wins when it appears at any rank, otherwise the top
    /// candidate is used.
    pub fn collapse(expected: &LabelCode, outcome: &ClassificationOutcome) -> Self {
        match outcome {
            ClassificationOutcome::Failed(_) => Self::Error,
            ClassificationOutcome::Empty => Self::None,
            ClassificationOutcome::Labels(labels) => {
                if labels.contains(expected) {
                    Self::Label(expected.clone())
                } else {
                    labels.first().cloned().map_or(Self::None, Self::Label)
                }
            }
        }
    }

    pub fn is_label(&self, label: &LabelCode) -> bool {
        matches!(self, Self::Label(l) if l == label)
    }
}

impl fmt::Display for ScalarPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => write!(f, "{label}"),
            Self::None => f.write_str("NONE"),
            Self::Error => f.write_str("ERROR"),
        }
    }
}
