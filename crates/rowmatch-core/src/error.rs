//! Error types for match runs and sessions.

use thiserror::Error;

/// Failures of a match run.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("match run cancelled after {completed} of {total} incoming rows")]
    Cancelled { completed: usize, total: usize },

    #[error("failed to build matcher thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Failures of the session operations that follow a run.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no match results yet; run the matcher first")]
    NotMatched,

    #[error("no augmented dataset yet; apply results to columns first")]
    NotApplied,

    #[error(transparent)]
    Sink(#[from] anyhow::Error),
}
