//! Record matching engine.
//!
//! Given an incoming and a reference dataset, finds for each incoming row
//! the reference rows with the best uniqueness-weighted similarity and
//! classifies the outcome:
//!
//! 1. **Normalize**: coerce both datasets to string cells
//! 2. **Weight**: derive column weights from value uniqueness
//! 3. **Score**: per cell, try strategies in priority order
//! 4. **Match**: sum weighted cell scores, keep every row tied at the maximum
//! 5. **Classify**: matched, review, ambiguous or unmatched

#![deny(unsafe_code)]

pub mod analysis;
pub mod classify;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod score;
pub mod session;
pub mod sink;
pub mod weights;

pub use analysis::{ColumnProfile, profile_column, profile_columns};
pub use classify::{SCORE_EPSILON, classify};
pub use error::{MatchError, SessionError};
pub use matcher::{CancelToken, MatchProgress, Parallelism, RowMatcher, RunOptions};
pub use normalize::{normalize, normalize_pair};
pub use score::{CellScore, score_cell, strategy_score};
pub use session::{MATCH_SCORE_COLUMN, MATCH_STATUS_COLUMN, MATCHED_ROW_COLUMN, MatchSession};
pub use sink::{DatasetSink, MemorySink};
pub use weights::{ColumnWeights, column_uniqueness, uniqueness_weights};
