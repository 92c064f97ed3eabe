//! Row matching: aggregate weighted cell scores and keep the best candidates.
//!
//! Every incoming row is compared with every reference row; there is no
//! blocking or indexing. Rows are independent, so a run can be spread over a
//! rayon pool with read-only access to the datasets, weights and snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use rowmatch_model::{
    CellOutcome, DataShapeIssue, Dataset, DatasetSide, MatchCandidate, MatchResultTable,
    MatchSnapshot, PriorityList, RowMatch, StrategyThresholds,
};

use crate::classify::{classify, meets, tied};
use crate::error::MatchError;
use crate::score::{CellScore, score_cell};
use crate::weights::ColumnWeights;

/// Cooperative cancellation flag, checked before each incoming row.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Observer notified as incoming rows finish; called from worker threads.
pub trait MatchProgress: Sync {
    fn row_finished(&self, incoming_row: usize);
}

/// How incoming rows are distributed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    /// One worker per available core.
    #[default]
    Auto,
    Threads(usize),
}

/// Per-run execution options.
#[derive(Default, Clone, Copy)]
pub struct RunOptions<'a> {
    pub parallelism: Parallelism,
    pub cancel: Option<&'a CancelToken>,
    pub progress: Option<&'a dyn MatchProgress>,
}

impl<'a> RunOptions<'a> {
    pub fn sequential() -> Self {
        Self {
            parallelism: Parallelism::Sequential,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: &'a CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: &'a dyn MatchProgress) -> Self {
        self.progress = Some(progress);
        self
    }
}

struct ColumnPlan<'a> {
    column: &'a str,
    weight: f64,
    incoming: Option<usize>,
    reference: Option<usize>,
    priority: &'a PriorityList,
}

/// Matches incoming rows against a reference dataset under one snapshot.
pub struct RowMatcher<'a> {
    incoming: &'a Dataset,
    reference: &'a Dataset,
    thresholds: &'a StrategyThresholds,
    total_threshold: f64,
    optimize_threshold: f64,
    plan: Vec<ColumnPlan<'a>>,
    issues: Vec<DataShapeIssue>,
}

impl<'a> RowMatcher<'a> {
    /// Prepare a matcher. Matchable columns missing from either dataset are
    /// recorded in [`RowMatcher::issues`] and score 0 for every pair.
    pub fn new(
        incoming: &'a Dataset,
        reference: &'a Dataset,
        weights: &'a ColumnWeights,
        snapshot: &'a MatchSnapshot,
        optimize_threshold: f64,
    ) -> Self {
        let mut issues = Vec::new();
        let plan = snapshot
            .columns()
            .iter()
            .map(|column| {
                let incoming_idx = incoming.column_index(column);
                let reference_idx = reference.column_index(column);
                for (idx, side) in [
                    (incoming_idx, DatasetSide::Incoming),
                    (reference_idx, DatasetSide::Reference),
                ] {
                    if idx.is_none() {
                        warn!(column = %column, side = %side, "matchable column missing, scoring it 0");
                        issues.push(DataShapeIssue {
                            column: column.clone(),
                            side,
                        });
                    }
                }
                ColumnPlan {
                    column: column.as_str(),
                    weight: weights.get(column).unwrap_or(0.0),
                    incoming: incoming_idx,
                    reference: reference_idx,
                    priority: snapshot.priority_for(column),
                }
            })
            .collect();

        Self {
            incoming,
            reference,
            thresholds: snapshot.strategy_thresholds(),
            total_threshold: snapshot.total_threshold(),
            optimize_threshold,
            plan,
            issues,
        }
    }

    pub fn issues(&self) -> &[DataShapeIssue] {
        &self.issues
    }

    pub fn optimize_threshold(&self) -> f64 {
        self.optimize_threshold
    }

    fn cell_scores(&self, incoming_row: usize, reference_row: usize) -> (Vec<CellScore>, f64) {
        let mut total = 0.0;
        let cells = self
            .plan
            .iter()
            .map(|column| {
                let cell = match (column.incoming, column.reference) {
                    (Some(incoming), Some(reference)) => score_cell(
                        self.incoming.cell(incoming_row, incoming),
                        self.reference.cell(reference_row, reference),
                        column.priority,
                        self.thresholds,
                    ),
                    _ => CellScore::UNMATCHED,
                };
                total += cell.score * column.weight;
                cell
            })
            .collect();
        (cells, total.clamp(0.0, 1.0))
    }

    fn candidate(&self, reference_row: usize, cells: &[CellScore], score: f64) -> MatchCandidate {
        MatchCandidate {
            reference_row,
            cells: self
                .plan
                .iter()
                .zip(cells)
                .map(|(column, cell)| CellOutcome {
                    column: column.column.to_string(),
                    strategy: cell.strategy,
                    score: cell.score,
                    weighted_score: cell.score * column.weight,
                })
                .collect(),
            score,
        }
    }

    /// Score one row pair across every matchable column.
    pub fn score_pair(&self, incoming_row: usize, reference_row: usize) -> MatchCandidate {
        let (cells, score) = self.cell_scores(incoming_row, reference_row);
        self.candidate(reference_row, &cells, score)
    }

    /// All passable reference rows tied at the best aggregate score.
    ///
    /// Ties are measured against the final maximum, not the first score seen.
    pub fn match_row(&self, incoming_row: usize) -> RowMatch {
        let mut best_score = f64::NEG_INFINITY;
        let mut best: Vec<(usize, Vec<CellScore>, f64)> = Vec::new();

        for reference_row in 0..self.reference.len() {
            let (cells, score) = self.cell_scores(incoming_row, reference_row);
            if !meets(score, self.optimize_threshold) {
                continue;
            }
            if score > best_score {
                best_score = score;
                best.retain(|(_, _, kept)| tied(*kept, best_score));
                best.push((reference_row, cells, score));
            } else if tied(score, best_score) {
                best.push((reference_row, cells, score));
            }
        }

        let candidates: Vec<MatchCandidate> = best
            .iter()
            .map(|(reference_row, cells, score)| self.candidate(*reference_row, cells, *score))
            .collect();
        let status = classify(&candidates, self.total_threshold);
        RowMatch {
            incoming_row,
            candidates,
            status,
        }
    }

    fn try_match_row(
        &self,
        incoming_row: usize,
        options: &RunOptions<'_>,
        completed: &AtomicUsize,
    ) -> Option<RowMatch> {
        if options.cancel.is_some_and(CancelToken::is_cancelled) {
            return None;
        }
        let row = self.match_row(incoming_row);
        completed.fetch_add(1, Ordering::Relaxed);
        if let Some(progress) = options.progress {
            progress.row_finished(incoming_row);
        }
        Some(row)
    }

    /// Match every incoming row and build the result table from scratch.
    pub fn run(&self, options: &RunOptions<'_>) -> Result<MatchResultTable, MatchError> {
        let total = self.incoming.len();
        let span = info_span!(
            "match_run",
            incoming_rows = total,
            reference_rows = self.reference.len(),
            columns = self.plan.len()
        );
        let _guard = span.enter();
        let start = Instant::now();
        let completed = AtomicUsize::new(0);

        let rows: Vec<Option<RowMatch>> = match options.parallelism {
            Parallelism::Sequential => (0..total)
                .map(|row| self.try_match_row(row, options, &completed))
                .collect(),
            Parallelism::Auto | Parallelism::Threads(_) => {
                let threads = match options.parallelism {
                    Parallelism::Threads(count) => count,
                    _ => 0,
                };
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|idx| format!("matcher {idx}"))
                    .build()?;
                debug!(threads = pool.current_num_threads(), "matching in parallel");
                pool.install(|| {
                    (0..total)
                        .into_par_iter()
                        .map(|row| self.try_match_row(row, options, &completed))
                        .collect()
                })
            }
        };

        let completed = completed.load(Ordering::Relaxed);
        if completed < total {
            info!(completed, total, "match run cancelled");
            return Err(MatchError::Cancelled { completed, total });
        }

        let table = MatchResultTable::new(rows.into_iter().flatten().collect());
        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            comparisons = total * self.reference.len(),
            "match run finished"
        );
        Ok(table)
    }
}
