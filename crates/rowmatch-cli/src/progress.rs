//! Terminal progress for match runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use rowmatch_core::MatchProgress;

const PROGRESS_UPDATE_INTERVAL: Duration = Duration::from_millis(200);

/// Progress bar fed by the matcher, one tick per incoming row.
pub struct MatchProgressBar {
    inner: ProgressBar,
}

impl MatchProgressBar {
    pub fn new(total_rows: usize, enabled: bool) -> Self {
        let inner = if enabled {
            let style = ProgressStyle::with_template(
                "{msg}  {bar} {percent:>3}%  {pos}/{len} rows  [{elapsed_precise}]",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar());
            let inner = ProgressBar::new(total_rows as u64)
                .with_style(style)
                .with_message("Matching");
            inner.enable_steady_tick(PROGRESS_UPDATE_INTERVAL);
            inner
        } else {
            ProgressBar::hidden()
        };
        Self { inner }
    }

    pub fn finish(&self) {
        self.inner.finish_and_clear();
    }
}

impl MatchProgress for MatchProgressBar {
    fn row_finished(&self, _incoming_row: usize) {
        self.inner.inc(1);
    }
}
