//! Label codes and label set utilities
//!
//! Both matching policies work on [`LabelSet`]s. The multi-label metrics binarize
//! those sets against a [`LabelUniverse`] built from every label seen in a run.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Opaque identifier of a classification category
///
/// Integer-like inputs (`7`, `"7"`, `"7.0"`) all normalise to [`LabelCode::Int`],
/// so codes read from a CSV file compare equal to codes returned as JSON numbers.
/// Integer codes order before text codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum LabelCode {
    Int(i64),
    Text(String),
}

impl LabelCode {
    /// Parse a raw field value. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(n) = raw.parse::<i64>() {
            return Some(Self::Int(n));
        }

        if let Ok(f) = raw.parse::<f64>() {
            if let Some(n) = integral(f) {
                return Some(Self::Int(n));
            }
        }

        Some(Self::Text(raw.to_string()))
    }

    /// Convert a JSON value returned by the classification service
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Self::Int(i)),
                None => n
                    .as_f64()
                    .and_then(integral)
                    .map(Self::Int)
                    .or_else(|| Self::parse(&n.to_string())),
            },
            Value::String(s) => Self::parse(s),
            _ => None,
        }
    }
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 { Some(f as i64) } else { None }
}

impl fmt::Display for LabelCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for LabelCode {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for LabelCode {
    fn from(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| Self::Text(s.to_string()))
    }
}

/// Unordered set of label codes, iterated in [`LabelCode`] order
pub type LabelSet = BTreeSet<LabelCode>;

/// Parse a label field into a set.
///
/// With a delimiter, `"123|456"` yields two codes and empty segments are skipped.
/// Without one, the whole field is a single code.
pub fn parse_label_field(raw: &str, delimiter: Option<char>) -> LabelSet {
    match delimiter {
        Some(d) => raw.split(d).filter_map(LabelCode::parse).collect(),
        None => LabelCode::parse(raw).into_iter().collect(),
    }
}

/// True iff the two sets share at least one label
pub fn intersects_any(expected: &LabelSet, predicted: &LabelSet) -> bool {
    !expected.is_disjoint(predicted)
}

/// Join labels for display, e.g. `"1, 2"` or `"1|2"`
pub fn join_labels<'a>(labels: impl IntoIterator<Item = &'a LabelCode>, sep: &str) -> String {
    labels.into_iter().map(ToString::to_string).collect::<Vec<_>>().join(sep)
}

/// Sorted set of every label observed in a run
///
/// Column `i` of a binarized matrix corresponds to `labels()[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelUniverse {
    labels: Vec<LabelCode>,
    index: BTreeMap<LabelCode, usize>,
}

impl LabelUniverse {
    /// Build the universe as the union of all given sets
    pub fn from_sets<'a>(sets: impl IntoIterator<Item = &'a LabelSet>) -> Self {
        let union: LabelSet = sets.into_iter().flatten().cloned().collect();
        let labels: Vec<LabelCode> = union.into_iter().collect();
        let index = labels.iter().enumerate().map(|(i, l)| (l.clone(), i)).collect();
        Self { labels, index }
    }

    pub fn labels(&self) -> &[LabelCode] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn index_of(&self, label: &LabelCode) -> Option<usize> {
        self.index.get(label).copied()
    }
}

/// Binarize each set against the universe, one row per set.
///
/// Labels missing from the universe are ignored.
pub fn vectorize(universe: &LabelUniverse, label_sets: &[LabelSet]) -> Vec<Vec<u8>> {
    label_sets
        .iter()
        .map(|set| {
            let mut row = vec![0u8; universe.len()];
            for label in set {
                if let Some(i) = universe.index_of(label) {
                    row[i] = 1;
                }
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(codes: &[i64]) -> LabelSet {
        codes.iter().map(|&c| LabelCode::Int(c)).collect()
    }

    #[test]
    fn test_parse_normalises_integers() {
        assert_eq!(LabelCode::parse("7"), Some(LabelCode::Int(7)));
        assert_eq!(LabelCode::parse(" 7 "), Some(LabelCode::Int(7)));
        assert_eq!(LabelCode::parse("7.0"), Some(LabelCode::Int(7)));
        assert_eq!(LabelCode::parse("7.5"), Some(LabelCode::Text("7.5".into())));
        assert_eq!(LabelCode::parse("ABC"), Some(LabelCode::Text("ABC".into())));
        assert_eq!(LabelCode::parse("   "), None);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(LabelCode::from_json(&json!(7)), Some(LabelCode::Int(7)));
        assert_eq!(LabelCode::from_json(&json!(7.0)), Some(LabelCode::Int(7)));
        assert_eq!(LabelCode::from_json(&json!("7")), Some(LabelCode::Int(7)));
        assert_eq!(LabelCode::from_json(&json!(null)), None);
        assert_eq!(LabelCode::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_ordering_ints_before_text() {
        let mut labels = vec![LabelCode::from("b"), LabelCode::Int(10), LabelCode::Int(2)];
        labels.sort();
        assert_eq!(labels, vec![LabelCode::Int(2), LabelCode::Int(10), LabelCode::from("b")]);
    }

    #[test]
    fn test_parse_label_field() {
        assert_eq!(parse_label_field("123|456", Some('|')), set(&[123, 456]));
        assert_eq!(parse_label_field("123||", Some('|')), set(&[123]));
        assert_eq!(
            parse_label_field("123|456", None),
            LabelSet::from([LabelCode::from("123|456")])
        );
        assert!(parse_label_field("", Some('|')).is_empty());
    }

    #[test]
    fn test_intersects_any() {
        assert!(intersects_any(&set(&[1, 2]), &set(&[2, 9])));
        assert!(!intersects_any(&set(&[3]), &set(&[4])));
        assert!(!intersects_any(&set(&[3]), &LabelSet::new()));
    }

    #[test]
    fn test_vectorize() {
        let sets = vec![set(&[1, 2]), set(&[3]), set(&[2]), set(&[4])];
        let universe = LabelUniverse::from_sets(&sets);
        let expected: Vec<LabelCode> = set(&[1, 2, 3, 4]).into_iter().collect();
        assert_eq!(universe.labels(), expected.as_slice());

        let matrix = vectorize(&universe, &sets);
        assert_eq!(
            matrix,
            vec![vec![1, 1, 0, 0], vec![0, 0, 1, 0], vec![0, 1, 0, 0], vec![0, 0, 0, 1]]
        );
        assert_eq!(matrix, vectorize(&universe, &sets));
    }

    #[test]
    fn test_vectorize_ignores_unknown_labels() {
        let universe = LabelUniverse::from_sets(&[set(&[1])]);
        assert_eq!(vectorize(&universe, &[set(&[1, 5])]), vec![vec![1]]);
    }
}
