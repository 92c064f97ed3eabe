//! Property tests for the cell strategies and weight derivation.

use proptest::prelude::*;

use rowmatch_core::score::{exact, partial_ratio, ratio, token_set_ratio};
use rowmatch_core::{score_cell, strategy_score, uniqueness_weights};
use rowmatch_model::{Dataset, DatasetSide, PriorityList, Strategy, StrategyThresholds};

fn in_unit_range(score: f64) -> bool {
    (0.0..=1.0).contains(&score)
}

proptest! {
    #[test]
    fn strategy_scores_stay_in_unit_range(a in ".{0,24}", b in ".{0,24}") {
        prop_assert!(in_unit_range(exact(&a, &b)));
        prop_assert!(in_unit_range(ratio(&a, &b)));
        prop_assert!(in_unit_range(partial_ratio(&a, &b)));
        prop_assert!(in_unit_range(token_set_ratio(&a, &b)));
    }

    #[test]
    fn identical_values_match_exactly(a in ".{0,24}") {
        prop_assert_eq!(exact(&a, &a), 1.0);
        let cell = score_cell(&a, &a, &PriorityList::default(), &StrategyThresholds::default());
        prop_assert_eq!(cell.strategy, Some(Strategy::Exact));
        prop_assert_eq!(cell.score, 1.0);
    }

    #[test]
    fn ratios_are_symmetric(a in "[a-zA-Z ]{0,16}", b in "[a-zA-Z ]{0,16}") {
        prop_assert!((ratio(&a, &b) - ratio(&b, &a)).abs() < 1e-12);
        prop_assert!((partial_ratio(&a, &b) - partial_ratio(&b, &a)).abs() < 1e-12);
        prop_assert!((token_set_ratio(&a, &b) - token_set_ratio(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn contained_value_has_full_partial_ratio(a in "[a-z]{1,8}", prefix in "[a-z]{0,6}", suffix in "[a-z]{0,6}") {
        let longer = format!("{prefix}{a}{suffix}");
        prop_assert_eq!(partial_ratio(&a, &longer), 1.0);
    }

    #[test]
    fn overhanging_overlap_scores_its_shared_part(shared in "[a-z]{3,8}", head in "[A-Z]{1,3}", tail in "[0-9]{1,3}") {
        // `shared` ends the first value and starts the second
        let first = format!("{head}{shared}");
        let second = format!("{shared}{tail}");
        let len = |value: &str| value.chars().count() as f64;
        let shorter = len(first.as_str()).min(len(second.as_str()));
        let floor = 2.0 * len(shared.as_str()) / (shorter + len(shared.as_str()));
        prop_assert!(partial_ratio(&first, &second) + 1e-12 >= floor);
    }

    #[test]
    fn declined_strategies_score_zero(a in "[a-z]{0,12}", b in "[a-z]{0,12}", threshold in 0.0f64..=1.0) {
        let thresholds = StrategyThresholds {
            fuzzy_simple: threshold,
            fuzzy_partial: threshold,
            token_set: threshold,
        };
        for strategy in Strategy::ALL {
            let score = strategy_score(strategy, &a, &b, &thresholds);
            prop_assert!(score == 0.0 || score >= threshold);
        }
    }

    #[test]
    fn cell_score_is_first_nonzero_in_priority(a in "[a-c]{1,4}", b in "[a-c]{1,4}") {
        let thresholds = StrategyThresholds::default();
        let priority = PriorityList::default();
        let cell = score_cell(&a, &b, &priority, &thresholds);
        let first = priority
            .iter()
            .map(|strategy| (strategy, strategy_score(strategy, &a, &b, &thresholds)))
            .find(|(_, score)| *score > 0.0);
        match first {
            Some((strategy, score)) => {
                prop_assert_eq!(cell.strategy, Some(strategy));
                prop_assert_eq!(cell.score, score);
            }
            None => {
                prop_assert_eq!(cell.strategy, None);
            }
        }
    }

    #[test]
    fn weights_sum_to_one(rows in prop::collection::vec(("[a-d]{0,2}", "[a-d]{0,2}"), 0..20)) {
        let dataset = Dataset::from_rows(
            ["lastname", "state"],
            rows.iter().map(|(last, state)| vec![last.clone(), state.clone()]),
        );
        let columns = vec!["lastname".to_string(), "state".to_string()];
        let (weights, issues) = uniqueness_weights(&dataset, &columns, DatasetSide::Incoming);
        prop_assert!(issues.is_empty());
        prop_assert!((weights.total() - 1.0).abs() < 1e-9);
        for (_, weight) in weights.iter() {
            prop_assert!(weight >= 0.0);
        }
    }
}
