use thiserror::Error;

use crate::settings::ThresholdKind;
use crate::strategy::Strategy;

/// Configuration mistakes, reported when settings are edited or snapshotted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("priority position {position} is out of range (expected 1..={len})")]
    InvalidPosition { position: usize, len: usize },

    #[error("{kind} must be within [0, 1], got {value}")]
    ThresholdOutOfRange { kind: ThresholdKind, value: f64 },

    #[error("no matchable columns selected")]
    NoMatchableColumns,

    #[error("matchable column '{0}' is selected more than once")]
    DuplicateColumn(String),

    #[error("priority list must contain each strategy exactly once, got [{}]", format_strategies(.0))]
    NotAPermutation(Vec<Strategy>),

    #[error("unknown strategy '{0}' (expected exact, fuzzy_simple, fuzzy_partial or token_set)")]
    UnknownStrategy(String),
}

fn format_strategies(strategies: &[Strategy]) -> String {
    strategies
        .iter()
        .map(Strategy::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ConfigError>;
