//! Cell-level similarity strategies and the priority fallback scorer.
//!
//! Fuzzy ratios are Indel normalized similarities (`2 * matches / total
//! length`), which is the classic "ratio" of sequence matching.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use rapidfuzz::distance::indel;
use rowmatch_model::{PriorityList, Strategy, StrategyThresholds};

/// Result of scoring one cell pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellScore {
    /// Winning strategy, `None` when every strategy declined.
    pub strategy: Option<Strategy>,
    pub score: f64,
}

impl CellScore {
    pub const UNMATCHED: CellScore = CellScore {
        strategy: None,
        score: 0.0,
    };
}

/// Try strategies in priority order; the first nonzero score wins.
pub fn score_cell(
    incoming: &str,
    reference: &str,
    priority: &PriorityList,
    thresholds: &StrategyThresholds,
) -> CellScore {
    for strategy in priority.iter() {
        let score = strategy_score(strategy, incoming, reference, thresholds);
        if score > 0.0 {
            return CellScore {
                strategy: Some(strategy),
                score,
            };
        }
    }
    CellScore::UNMATCHED
}

/// Score with a single strategy, returning 0 when below its threshold.
pub fn strategy_score(
    strategy: Strategy,
    incoming: &str,
    reference: &str,
    thresholds: &StrategyThresholds,
) -> f64 {
    let raw = match strategy {
        Strategy::Exact => return exact(incoming, reference),
        Strategy::FuzzySimple => ratio(incoming, reference),
        Strategy::FuzzyPartial => partial_ratio(incoming, reference),
        Strategy::TokenSet => token_set_ratio(incoming, reference),
    };
    if raw >= thresholds.for_strategy(strategy) {
        raw
    } else {
        0.0
    }
}

pub fn exact(a: &str, b: &str) -> f64 {
    if a == b { 1.0 } else { 0.0 }
}

/// Whole-string similarity in `[0, 1]`; 0 when either side is empty.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    indel::normalized_similarity(a.chars(), b.chars())
}

/// Best similarity of the shorter string against every alignment with the
/// longer one: each full-length window, plus the shorter prefixes and
/// suffixes where the shorter string hangs off either end.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    match a.len().cmp(&b.len()) {
        Ordering::Less => best_alignment(&a, &b),
        Ordering::Greater => best_alignment(&b, &a),
        Ordering::Equal => best_alignment(&a, &b).max(best_alignment(&b, &a)),
    }
}

fn best_alignment(shorter: &[char], longer: &[char]) -> f64 {
    let len = shorter.len();
    let prefixes = (1..len).map(move |end| &longer[..end]);
    let suffixes = (longer.len() + 1 - len..longer.len()).map(move |start| &longer[start..]);

    let mut best = 0.0_f64;
    for window in prefixes.chain(longer.windows(len)).chain(suffixes) {
        let score = indel::normalized_similarity(shorter.iter().copied(), window.iter().copied());
        if score > best {
            best = score;
            if best >= 1.0 {
                break;
            }
        }
    }
    best
}

/// Token-set similarity: case, punctuation, order and duplicates are ignored.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let common = join_tokens(tokens_a.intersection(&tokens_b));
    let combined_a = join_parts(&common, &join_tokens(tokens_a.difference(&tokens_b)));
    let combined_b = join_parts(&common, &join_tokens(tokens_b.difference(&tokens_a)));

    ratio(&common, &combined_a)
        .max(ratio(&common, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

fn tokenize(value: &str) -> BTreeSet<String> {
    value
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() {
                ch.to_lowercase().next().unwrap_or(ch)
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn join_tokens<'a>(tokens: impl Iterator<Item = &'a String>) -> String {
    tokens.map(String::as_str).collect::<Vec<_>>().join(" ")
}

fn join_parts(head: &str, tail: &str) -> String {
    format!("{head} {tail}").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn ratio_counts_shared_characters() {
        // 4 shared of 10 total characters on each side
        assert!((ratio("Smith", "Smyth") - 0.8).abs() < EPS);
        assert_eq!(ratio("abc", "abc"), 1.0);
        assert_eq!(ratio("", "abc"), 0.0);
    }

    #[test]
    fn partial_ratio_finds_substring() {
        assert_eq!(partial_ratio("Rep", "Representative"), 1.0);
        assert_eq!(partial_ratio("Representative", "Rep"), 1.0);
        assert!(partial_ratio("xyz", "Representative") < 0.5);
    }

    #[test]
    fn partial_ratio_aligns_past_the_ends() {
        // "Smith" is a suffix of the longer value and a prefix of the shorter
        let score = partial_ratio("Smith J", "Dr Smith");
        assert!((score - 10.0 / 12.0).abs() < EPS);
        assert!((partial_ratio("Dr Smith", "Smith J") - score).abs() < EPS);
        assert!((partial_ratio("Smith J", "J Smithe") - partial_ratio("J Smithe", "Smith J")).abs() < EPS);

        let thresholds = StrategyThresholds::default();
        let passed = strategy_score(Strategy::FuzzyPartial, "Smith J", "Dr Smith", &thresholds);
        assert!((passed - 10.0 / 12.0).abs() < EPS);
    }

    #[test]
    fn token_set_ignores_order_case_and_duplicates() {
        assert_eq!(token_set_ratio("Democratic Party", "party democratic"), 1.0);
        assert_eq!(token_set_ratio("Jr.", "JR"), 1.0);
        assert_eq!(token_set_ratio("New York New York", "york new"), 1.0);
        assert_eq!(token_set_ratio("District 5", "5"), 1.0);
        assert_eq!(token_set_ratio("...", "abc"), 0.0);
    }

    #[test]
    fn fuzzy_scores_below_threshold_decline() {
        let thresholds = StrategyThresholds {
            fuzzy_simple: 0.81,
            ..StrategyThresholds::default()
        };
        assert_eq!(
            strategy_score(Strategy::FuzzySimple, "Smith", "Smyth", &thresholds),
            0.0
        );
        let thresholds = StrategyThresholds {
            fuzzy_simple: 0.79,
            ..StrategyThresholds::default()
        };
        assert!(strategy_score(Strategy::FuzzySimple, "Smith", "Smyth", &thresholds) > 0.79);
    }

    #[test]
    fn falls_back_through_priority() {
        let thresholds = StrategyThresholds::default();
        let result = score_cell("Smith", "Smyth", &PriorityList::default(), &thresholds);
        assert_eq!(result.strategy, Some(Strategy::FuzzySimple));

        let result = score_cell("Smith", "Smith", &PriorityList::default(), &thresholds);
        assert_eq!(result.strategy, Some(Strategy::Exact));
        assert_eq!(result.score, 1.0);

        let result = score_cell("Smith", "Garcia", &PriorityList::default(), &thresholds);
        assert_eq!(result, CellScore::UNMATCHED);
    }
}
