//! Match results: per-cell outcomes, candidates, row classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::strategy::Strategy;

/// Confidence class of one incoming row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// One candidate at or above the total threshold.
    Matched,
    /// One candidate between the optimize and total thresholds.
    Review,
    /// Several candidates tied at the row maximum.
    Ambiguous,
    /// No candidate cleared the optimize threshold.
    Unmatched,
}

impl MatchStatus {
    /// Label stamped into the `match_status` column.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Matched => "MATCHED",
            Self::Review => "REVIEW",
            Self::Ambiguous => "AMBIGUOUS MATCH",
            Self::Unmatched => "UNMATCHED",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score of one column for one row pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellOutcome {
    pub column: String,
    /// Winning strategy, `None` when every strategy declined.
    pub strategy: Option<Strategy>,
    /// Similarity before weighting.
    pub score: f64,
    /// `score` multiplied by the column weight.
    pub weighted_score: f64,
}

impl CellOutcome {
    pub fn strategy_label(&self) -> &'static str {
        self.strategy.as_ref().map_or("unmatched", Strategy::as_str)
    }
}

/// A reference row that cleared the optimize threshold for an incoming row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub reference_row: usize,
    pub cells: Vec<CellOutcome>,
    /// Sum of the weighted cell scores.
    pub score: f64,
}

/// Outcome for one incoming row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowMatch {
    pub incoming_row: usize,
    /// Candidates tied at the row maximum, ordered by reference row.
    pub candidates: Vec<MatchCandidate>,
    pub status: MatchStatus,
}

impl RowMatch {
    /// The matched candidate when exactly one exists.
    pub fn single(&self) -> Option<&MatchCandidate> {
        match self.candidates.as_slice() {
            [candidate] => Some(candidate),
            _ => None,
        }
    }

    pub fn best_score(&self) -> Option<f64> {
        self.candidates.first().map(|candidate| candidate.score)
    }
}

/// Results of one run, one entry per incoming row in incoming order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResultTable {
    rows: Vec<RowMatch>,
}

impl MatchResultTable {
    /// Build from row matches; entries are sorted by incoming row.
    pub fn new(mut rows: Vec<RowMatch>) -> Self {
        rows.sort_by_key(|row| row.incoming_row);
        Self { rows }
    }

    pub fn get(&self, incoming_row: usize) -> Option<&RowMatch> {
        self.rows
            .binary_search_by_key(&incoming_row, |row| row.incoming_row)
            .ok()
            .map(|idx| &self.rows[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RowMatch> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn count(&self, status: MatchStatus) -> usize {
        self.rows.iter().filter(|row| row.status == status).count()
    }

    pub fn describe(&self) -> ResultsDescription {
        let passed = self.count(MatchStatus::Matched);
        let needs_review = self.count(MatchStatus::Review);
        ResultsDescription {
            total_rows: self.rows.len(),
            matched: passed + needs_review,
            passed,
            needs_review,
            ambiguous: self.count(MatchStatus::Ambiguous),
            unmatched: self.count(MatchStatus::Unmatched),
        }
    }
}

/// Summary counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsDescription {
    pub total_rows: usize,
    /// Rows with exactly one candidate (`passed + needs_review`).
    pub matched: usize,
    pub passed: usize,
    pub needs_review: usize,
    pub ambiguous: usize,
    pub unmatched: usize,
}

/// Which side of the match a data-shape problem was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetSide {
    Incoming,
    Reference,
}

impl fmt::Display for DatasetSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incoming => f.write_str("incoming"),
            Self::Reference => f.write_str("reference"),
        }
    }
}

/// A selected column that one dataset lacks. The run continues and the
/// column contributes nothing for that side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataShapeIssue {
    pub column: String,
    pub side: DatasetSide,
}

impl fmt::Display for DataShapeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column '{}' is missing from the {} dataset", self.column, self.side)
    }
}
