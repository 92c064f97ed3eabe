//! A match session: frozen datasets and snapshot, plus the operations that
//! run the matcher and hand results back to collaborators.

use tracing::{debug, info, warn};

use rowmatch_model::{
    DataShapeIssue, Dataset, DatasetSide, MatchResultTable, MatchSnapshot, MatchStatus,
    ResultsDescription, Table, WeightSide,
};

use crate::error::{MatchError, SessionError};
use crate::matcher::{RowMatcher, RunOptions};
use crate::normalize::normalize_pair;
use crate::sink::DatasetSink;
use crate::weights::{ColumnWeights, uniqueness_weights};

/// Column holding the display row number of the matched reference row.
pub const MATCHED_ROW_COLUMN: &str = "matched_row";
/// Column holding the aggregate score of the single match.
pub const MATCH_SCORE_COLUMN: &str = "match_score";
/// Column holding the match status label.
pub const MATCH_STATUS_COLUMN: &str = "match_status";

pub struct MatchSession {
    incoming: Dataset,
    reference: Dataset,
    snapshot: MatchSnapshot,
    incoming_weights: ColumnWeights,
    reference_weights: ColumnWeights,
    optimize_threshold: f64,
    issues: Vec<DataShapeIssue>,
    results: Option<MatchResultTable>,
    augmented: Option<Dataset>,
}

impl MatchSession {
    /// Normalize both tables and compute weights for the snapshot's columns.
    pub fn new(incoming: &Table, reference: &Table, snapshot: MatchSnapshot) -> Self {
        let (incoming, reference) = normalize_pair(incoming, reference);
        let (incoming_weights, mut issues) =
            uniqueness_weights(&incoming, snapshot.columns(), DatasetSide::Incoming);
        let (reference_weights, reference_issues) =
            uniqueness_weights(&reference, snapshot.columns(), DatasetSide::Reference);
        issues.extend(reference_issues);

        let max_weight = match snapshot.weight_side() {
            WeightSide::Incoming => incoming_weights.max_weight(),
            WeightSide::Reference => reference_weights.max_weight(),
        };
        let optimize_threshold = snapshot.effective_optimize_threshold(max_weight);
        debug!(
            weight_side = ?snapshot.weight_side(),
            pruning = ?snapshot.pruning(),
            optimize_threshold,
            "session prepared"
        );

        Self {
            incoming,
            reference,
            snapshot,
            incoming_weights,
            reference_weights,
            optimize_threshold,
            issues,
            results: None,
            augmented: None,
        }
    }

    pub fn incoming(&self) -> &Dataset {
        &self.incoming
    }

    pub fn reference(&self) -> &Dataset {
        &self.reference
    }

    pub fn snapshot(&self) -> &MatchSnapshot {
        &self.snapshot
    }

    /// Weights used for scoring, chosen by the snapshot's weight side.
    pub fn weights(&self) -> &ColumnWeights {
        match self.snapshot.weight_side() {
            WeightSide::Incoming => &self.incoming_weights,
            WeightSide::Reference => &self.reference_weights,
        }
    }

    pub fn weights_for(&self, side: WeightSide) -> &ColumnWeights {
        match side {
            WeightSide::Incoming => &self.incoming_weights,
            WeightSide::Reference => &self.reference_weights,
        }
    }

    /// Pruning threshold after the pruning mode is applied.
    pub fn optimize_threshold(&self) -> f64 {
        self.optimize_threshold
    }

    /// Missing-column problems found while preparing the session.
    pub fn issues(&self) -> &[DataShapeIssue] {
        &self.issues
    }

    /// Match every incoming row; previous results are discarded.
    pub fn run(&mut self, options: &RunOptions<'_>) -> Result<&MatchResultTable, MatchError> {
        self.results = None;
        self.augmented = None;
        let matcher = RowMatcher::new(
            &self.incoming,
            &self.reference,
            self.weights(),
            &self.snapshot,
            self.optimize_threshold,
        );
        let table = matcher.run(options)?;
        let description = table.describe();
        info!(
            total = description.total_rows,
            passed = description.passed,
            review = description.needs_review,
            ambiguous = description.ambiguous,
            unmatched = description.unmatched,
            "classified incoming rows"
        );
        Ok(&*self.results.insert(table))
    }

    pub fn results(&self) -> Option<&MatchResultTable> {
        self.results.as_ref()
    }

    /// Counts per outcome; all zero before the first run.
    pub fn results_description(&self) -> ResultsDescription {
        self.results
            .as_ref()
            .map(MatchResultTable::describe)
            .unwrap_or_default()
    }

    /// Build the augmented incoming dataset.
    ///
    /// Rows with exactly one candidate receive `columns` copied from the
    /// matched reference row plus `matched_row`, `match_score` and
    /// `match_status`. Ambiguous rows list every tied reference row and are
    /// not copied into; unmatched rows only get a status.
    pub fn apply_to_columns(&mut self, columns: &[String]) -> Result<&Dataset, SessionError> {
        let results = self.results.as_ref().ok_or(SessionError::NotMatched)?;
        let mut augmented = self.incoming.clone();

        let copies: Vec<(usize, usize)> = columns
            .iter()
            .filter_map(|column| match self.reference.column_index(column) {
                Some(source) => Some((source, augmented.ensure_column(column))),
                None => {
                    warn!(column = %column, "apply column missing from reference dataset, skipping");
                    None
                }
            })
            .collect();
        let row_col = augmented.ensure_column(MATCHED_ROW_COLUMN);
        let score_col = augmented.ensure_column(MATCH_SCORE_COLUMN);
        let status_col = augmented.ensure_column(MATCH_STATUS_COLUMN);

        for row in results.iter() {
            let target = row.incoming_row;
            match row.status {
                MatchStatus::Matched | MatchStatus::Review => {
                    let Some(candidate) = row.single() else {
                        continue;
                    };
                    for (source, dest) in &copies {
                        let value = self.reference.cell(candidate.reference_row, *source);
                        augmented.set_cell(target, *dest, value);
                    }
                    augmented.set_cell(
                        target,
                        row_col,
                        self.reference.display_row(candidate.reference_row).to_string(),
                    );
                    augmented.set_cell(target, score_col, format!("{:.4}", candidate.score));
                }
                MatchStatus::Ambiguous => {
                    let rows = row
                        .candidates
                        .iter()
                        .map(|candidate| {
                            self.reference.display_row(candidate.reference_row).to_string()
                        })
                        .collect::<Vec<_>>()
                        .join(", ");
                    augmented.set_cell(target, row_col, rows);
                }
                MatchStatus::Unmatched => {}
            }
            augmented.set_cell(target, status_col, row.status.label());
        }

        debug!(
            rows = augmented.len(),
            copied_columns = copies.len(),
            "applied match results"
        );
        Ok(&*self.augmented.insert(augmented))
    }

    /// The augmented dataset from the last [`MatchSession::apply_to_columns`].
    pub fn augmented(&self) -> Option<&Dataset> {
        self.augmented.as_ref()
    }

    /// Hand the augmented dataset to a caller-owned sink.
    pub fn export<S: DatasetSink + ?Sized>(&self, sink: &mut S) -> Result<(), SessionError> {
        let augmented = self.augmented.as_ref().ok_or(SessionError::NotApplied)?;
        sink.write_dataset(augmented)?;
        Ok(())
    }
}
