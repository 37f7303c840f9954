//! Property tests for the aggregate metrics.

use labeval_eval::label::{LabelCode, LabelSet, LabelUniverse, vectorize};
use labeval_eval::metrics::{MicroCounts, micro_scores, weighted_scores};
use labeval_eval::outcome::MatchPolicy;
use proptest::prelude::*;

fn arb_label() -> impl Strategy<Value = LabelCode> {
    prop_oneof![
        4 => (0i64..12).prop_map(LabelCode::Int),
        1 => "[A-C]{1,2}".prop_map(LabelCode::Text),
    ]
}

fn arb_label_set() -> impl Strategy<Value = LabelSet> {
    prop::collection::btree_set(arb_label(), 0..4)
}

/// Aligned expected/predicted sequences; expected sets are never empty
fn arb_run() -> impl Strategy<Value = (Vec<LabelSet>, Vec<LabelSet>)> {
    prop::collection::vec(
        (prop::collection::btree_set(arb_label(), 1..4), arb_label_set()),
        1..20,
    )
    .prop_map(|pairs| pairs.into_iter().unzip())
}

fn in_unit_range(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Micro scores are finite and within [0, 1], and the hit rate is matches over processed.
    #[test]
    fn prop_micro_scores_bounded((expected, predicted) in arb_run()) {
        let matches = expected
            .iter()
            .zip(&predicted)
            .filter(|(e, p)| e.intersection(p).next().is_some())
            .count();
        let metrics = micro_scores(matches, expected.len(), &expected, &predicted);

        prop_assert_eq!(metrics.policy, MatchPolicy::Multi);
        prop_assert!((metrics.accuracy - matches as f64 / expected.len() as f64).abs() < 1e-12);
        for (name, value) in metrics.fields() {
            prop_assert!(in_unit_range(value), "{} out of range: {}", name, value);
        }
    }

    /// Micro counts agree with a direct set comparison.
    #[test]
    fn prop_micro_counts_match_set_algebra((expected, predicted) in arb_run()) {
        let counts = MicroCounts::from_sets(&expected, &predicted);

        let mut tp = 0;
        let mut fp = 0;
        let mut fn_ = 0;
        for (e, p) in expected.iter().zip(&predicted) {
            tp += e.intersection(p).count();
            fp += p.difference(e).count();
            fn_ += e.difference(p).count();
        }
        prop_assert_eq!((counts.true_pos, counts.false_pos, counts.false_neg), (tp, fp, fn_));
    }

    /// Weighted scores stay within [0, 1] for arbitrary scalar labelings.
    #[test]
    fn prop_weighted_scores_bounded(
        pairs in prop::collection::vec((0u8..6, 0u8..6), 1..30)
    ) {
        let (y_true, y_pred): (Vec<u8>, Vec<u8>) = pairs.into_iter().unzip();
        let metrics = weighted_scores(&y_true, &y_pred);

        for (name, value) in metrics.fields() {
            prop_assert!(in_unit_range(value), "{} out of range: {}", name, value);
        }
        if y_true == y_pred {
            prop_assert_eq!(metrics.f1, 1.0);
        }
    }

    /// Vectorizing is deterministic and each row has one slot per universe label.
    #[test]
    fn prop_vectorize_is_deterministic((expected, predicted) in arb_run()) {
        let universe = LabelUniverse::from_sets(expected.iter().chain(&predicted));
        let first = vectorize(&universe, &expected);
        let second = vectorize(&universe, &expected);

        prop_assert_eq!(&first, &second);
        for (row, set) in first.iter().zip(&expected) {
            prop_assert_eq!(row.len(), universe.len());
            prop_assert_eq!(row.iter().filter(|&&v| v == 1).count(), set.len());
        }
        let labels = universe.labels();
        prop_assert!(labels.windows(2).all(|w| w[0] < w[1]));
    }
}
