//! Confidence classification of a row's candidate set.

use rowmatch_model::{MatchCandidate, MatchStatus};

/// Tolerance for comparing aggregate scores against thresholds and each other.
pub const SCORE_EPSILON: f64 = 1e-9;

/// `score >= threshold`, tolerant of floating point summation error.
pub fn meets(score: f64, threshold: f64) -> bool {
    score + SCORE_EPSILON >= threshold
}

/// Scores within [`SCORE_EPSILON`] of each other are tied.
pub fn tied(a: f64, b: f64) -> bool {
    (a - b).abs() <= SCORE_EPSILON
}

/// Classify candidates that already cleared the optimize threshold.
///
/// | candidates | score            | status    |
/// |------------|------------------|-----------|
/// | 0          |                  | Unmatched |
/// | 1          | >= total         | Matched   |
/// | 1          | < total          | Review    |
/// | > 1        |                  | Ambiguous |
pub fn classify(candidates: &[MatchCandidate], total_threshold: f64) -> MatchStatus {
    match candidates {
        [] => MatchStatus::Unmatched,
        [candidate] if meets(candidate.score, total_threshold) => MatchStatus::Matched,
        [_] => MatchStatus::Review,
        _ => MatchStatus::Ambiguous,
    }
}
