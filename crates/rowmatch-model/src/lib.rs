//! Data model shared by the record matching crates.

pub mod error;
pub mod result;
pub mod settings;
pub mod strategy;
pub mod table;

pub use error::{ConfigError, Result};
pub use result::{
    CellOutcome, DataShapeIssue, DatasetSide, MatchCandidate, MatchResultTable, MatchStatus,
    ResultsDescription, RowMatch,
};
pub use settings::{
    MatchSettings, MatchSnapshot, Pruning, StrategyThresholds, ThresholdKind, WeightSide,
};
pub use strategy::{PriorityConfig, PriorityList, Strategy};
pub use table::{CellValue, DISPLAY_ROW_OFFSET, Dataset, Table};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_description_counts_statuses() {
        let row = |incoming_row, status| RowMatch {
            incoming_row,
            candidates: Vec::new(),
            status,
        };
        let table = MatchResultTable::new(vec![
            row(2, MatchStatus::Review),
            row(0, MatchStatus::Matched),
            row(1, MatchStatus::Matched),
            row(3, MatchStatus::Ambiguous),
            row(4, MatchStatus::Unmatched),
        ]);
        let description = table.describe();
        assert_eq!(description.total_rows, 5);
        assert_eq!(description.matched, 3);
        assert_eq!(description.passed, 2);
        assert_eq!(description.needs_review, 1);
        assert_eq!(description.ambiguous, 1);
        assert_eq!(description.unmatched, 1);
        assert_eq!(table.get(2).unwrap().status, MatchStatus::Review);
    }

    #[test]
    fn snapshot_serializes() {
        let snapshot = MatchSettings::with_columns(["lastname", "state"])
            .snapshot()
            .expect("valid settings");
        let json = serde_json::to_value(&snapshot).expect("serialize snapshot");
        assert_eq!(json["columns"][0], "lastname");
        assert_eq!(json["pruning"], "threshold");
        assert_eq!(json["priorities"]["default"][0], "exact");
    }
}
