//! Aggregate quality metrics
//!
//! Two families, chosen by [`MatchPolicy`]:
//!
//! - single-label: accuracy plus precision/recall/F1 averaged over classes,
//!   weighted by each class's support in the expected labels
//! - multi-label: hit rate plus micro-averaged precision/recall/F1 over the
//!   binarized label sets
//!
//! Every division by zero resolves to `0.0`; no function here returns NaN.

use crate::label::{LabelSet, LabelUniverse, vectorize};
use crate::outcome::MatchPolicy;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The four dataset-level scores, each in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    /// Policy the scores were computed under
    pub policy: MatchPolicy,
    /// Exact-match accuracy (single) or hit rate (multi)
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl AggregateMetrics {
    /// Name of the first score under the active policy
    pub fn accuracy_label(&self) -> &'static str {
        match self.policy {
            MatchPolicy::Single => "accuracy",
            MatchPolicy::Multi => "hit_rate",
        }
    }

    /// Scores as `(name, value)` pairs in a fixed order
    pub fn fields(&self) -> [(&'static str, f64); 4] {
        [
            (self.accuracy_label(), self.accuracy),
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1_score", self.f1),
        ]
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn harmonic(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 { 0.0 } else { 2.0 * precision * recall / (precision + recall) }
}

#[derive(Debug, Default, Clone, Copy)]
struct ClassCounts {
    true_pos: usize,
    false_pos: usize,
    false_neg: usize,
    support: usize,
}

/// Single-label scores over index-aligned scalar labels.
///
/// Classes are the union of both sequences. A class that never appears in
/// `y_true` has zero support and therefore zero weight.
pub fn weighted_scores<T: Ord>(y_true: &[T], y_pred: &[T]) -> AggregateMetrics {
    let n = y_true.len().min(y_pred.len());
    let mut classes: BTreeMap<&T, ClassCounts> = BTreeMap::new();
    let mut correct = 0;

    for (t, p) in y_true.iter().zip(y_pred).take(n) {
        classes.entry(t).or_default().support += 1;
        if t == p {
            correct += 1;
            classes.entry(t).or_default().true_pos += 1;
        } else {
            classes.entry(p).or_default().false_pos += 1;
            classes.entry(t).or_default().false_neg += 1;
        }
    }

    let (mut precision, mut recall, mut f1) = (0.0, 0.0, 0.0);
    for counts in classes.values() {
        let weight = counts.support as f64;
        let p = ratio(counts.true_pos, counts.true_pos + counts.false_pos);
        let r = ratio(counts.true_pos, counts.true_pos + counts.false_neg);
        precision += weight * p;
        recall += weight * r;
        f1 += weight * harmonic(p, r);
    }

    let total = n as f64;
    let (precision, recall, f1) = if n == 0 {
        (0.0, 0.0, 0.0)
    } else {
        ((precision / total).min(1.0), (recall / total).min(1.0), (f1 / total).min(1.0))
    };

    AggregateMetrics {
        policy: MatchPolicy::Single,
        accuracy: ratio(correct, n),
        precision,
        recall,
        f1,
    }
}

/// Pooled confusion counts over a binarized label matrix
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MicroCounts {
    pub true_pos: usize,
    pub false_pos: usize,
    pub false_neg: usize,
}

impl MicroCounts {
    /// Binarize both sides over their shared universe and pool every cell
    pub fn from_sets(expected: &[LabelSet], predicted: &[LabelSet]) -> Self {
        let universe = LabelUniverse::from_sets(expected.iter().chain(predicted));
        let truth = vectorize(&universe, expected);
        let guess = vectorize(&universe, predicted);

        let mut counts = Self::default();
        for (t_row, p_row) in truth.iter().zip(&guess) {
            for (&t, &p) in t_row.iter().zip(p_row) {
                match (t, p) {
                    (1, 1) => counts.true_pos += 1,
                    (0, 1) => counts.false_pos += 1,
                    (1, 0) => counts.false_neg += 1,
                    _ => {}
                }
            }
        }
        counts
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_pos, self.true_pos + self.false_pos)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_pos, self.true_pos + self.false_neg)
    }

    pub fn f1(&self) -> f64 {
        harmonic(self.precision(), self.recall())
    }
}

/// Multi-label scores: hit rate plus micro-averaged precision/recall/F1
pub fn micro_scores(
    matches: usize,
    processed: usize,
    expected: &[LabelSet],
    predicted: &[LabelSet],
) -> AggregateMetrics {
    let counts = MicroCounts::from_sets(expected, predicted);
    AggregateMetrics {
        policy: MatchPolicy::Multi,
        accuracy: ratio(matches, processed),
        precision: counts.precision(),
        recall: counts.recall(),
        f1: counts.f1(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LabelCode;

    fn set(codes: &[i64]) -> LabelSet {
        codes.iter().map(|&c| LabelCode::Int(c)).collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_weighted_perfect() {
        let m = weighted_scores(&[1, 2, 2], &[1, 2, 2]);
        assert_eq!((m.accuracy, m.precision, m.recall, m.f1), (1.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn test_weighted_matches_reference_values() {
        // classes: 0 (support 2), 1 (support 1), 2 (support 1, never predicted)
        let y_true = [0, 0, 1, 2];
        let y_pred = [0, 1, 1, 0];
        let m = weighted_scores(&y_true, &y_pred);

        // class 0: p=1/2 r=1/2 f=1/2; class 1: p=1/2 r=1 f=2/3; class 2: 0
        assert!(close(m.accuracy, 0.5));
        assert!(close(m.precision, (2.0 * 0.5 + 0.5) / 4.0));
        assert!(close(m.recall, (2.0 * 0.5 + 1.0) / 4.0));
        assert!(close(m.f1, (2.0 * 0.5 + 2.0 / 3.0) / 4.0));
    }

    #[test]
    fn test_weighted_unseen_prediction_has_no_weight() {
        let m = weighted_scores(&["a", "a"], &["a", "zzz"]);
        assert!(close(m.precision, 1.0));
        assert!(close(m.recall, 0.5));
    }

    #[test]
    fn test_weighted_empty_is_zero() {
        let m = weighted_scores::<i32>(&[], &[]);
        assert_eq!((m.accuracy, m.precision, m.recall, m.f1), (0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_micro_scores_scenario() {
        let expected = [set(&[1, 2]), set(&[3])];
        let predicted = [set(&[2]), set(&[4])];
        let m = micro_scores(1, 2, &expected, &predicted);

        assert!(close(m.accuracy, 0.5));
        assert!(close(m.precision, 0.5));
        assert!(close(m.recall, 1.0 / 3.0));
        assert!(close(m.f1, 0.4));
    }

    #[test]
    fn test_micro_all_empty_predictions() {
        let m = micro_scores(0, 2, &[set(&[1]), set(&[2])], &[set(&[]), set(&[])]);
        assert_eq!((m.precision, m.recall, m.f1), (0.0, 0.0, 0.0));
        assert!(!m.f1.is_nan());
    }

    #[test]
    fn test_micro_counts() {
        let counts = MicroCounts::from_sets(&[set(&[1, 2])], &[set(&[2, 3])]);
        assert_eq!(counts, MicroCounts { true_pos: 1, false_pos: 1, false_neg: 1 });
    }

    #[test]
    fn test_field_names_follow_policy() {
        let single = weighted_scores(&[1], &[1]);
        assert_eq!(single.fields()[0].0, "accuracy");
        let multi = micro_scores(1, 1, &[set(&[1])], &[set(&[1])]);
        assert_eq!(multi.fields()[0].0, "hit_rate");
    }
}
