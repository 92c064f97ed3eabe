//! Column weights derived from value uniqueness.
//!
//! A column with many distinct values (a last name) tells rows apart better
//! than one with few (a state code), so it should dominate the row score.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use rowmatch_model::{DataShapeIssue, Dataset, DatasetSide};

/// Ordered column → weight mapping. Weights sum to 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnWeights {
    entries: Vec<(String, f64)>,
}

impl ColumnWeights {
    /// Build from explicit weights, keeping the given order.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(column, weight)| (column.into(), weight))
                .collect(),
        }
    }

    /// Equal weights over `columns`.
    pub fn uniform(columns: &[String]) -> Self {
        let weight = if columns.is_empty() {
            0.0
        } else {
            1.0 / columns.len() as f64
        };
        Self::from_pairs(columns.iter().map(|column| (column.clone(), weight)))
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, weight)| *weight)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries
            .iter()
            .map(|(column, weight)| (column.as_str(), *weight))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, weight)| weight).sum()
    }

    pub fn max_weight(&self) -> f64 {
        self.entries
            .iter()
            .map(|(_, weight)| *weight)
            .fold(0.0, f64::max)
    }
}

/// Share of distinct values in a column (`""` counts as a value).
pub fn column_uniqueness(dataset: &Dataset, column: usize) -> f64 {
    if dataset.is_empty() {
        return 0.0;
    }
    let distinct: HashSet<&str> = dataset.column_values(column).collect();
    distinct.len() as f64 / dataset.len() as f64
}

/// Uniqueness ratios over `columns`, rescaled to sum to 1.
///
/// Columns absent from `dataset` get weight 0 and are reported as issues.
/// When no column has any uniqueness (no rows, or all columns absent) the
/// weights fall back to uniform.
pub fn uniqueness_weights(
    dataset: &Dataset,
    columns: &[String],
    side: DatasetSide,
) -> (ColumnWeights, Vec<DataShapeIssue>) {
    let mut issues = Vec::new();
    let ratios: Vec<(String, f64)> = columns
        .iter()
        .map(|column| {
            let ratio = match dataset.column_index(column) {
                Some(index) => column_uniqueness(dataset, index),
                None => {
                    warn!(column = %column, side = %side, "matchable column missing, weighting it 0");
                    issues.push(DataShapeIssue {
                        column: column.clone(),
                        side,
                    });
                    0.0
                }
            };
            (column.clone(), ratio)
        })
        .collect();

    let sum: f64 = ratios.iter().map(|(_, ratio)| ratio).sum();
    let weights = if sum > 0.0 {
        ColumnWeights::from_pairs(ratios.into_iter().map(|(column, ratio)| (column, ratio / sum)))
    } else {
        debug!(side = %side, "no column uniqueness, using uniform weights");
        ColumnWeights::uniform(columns)
    };
    (weights, issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Dataset {
        Dataset::from_rows(
            ["lastname", "state"],
            [
                ["Smith", "CA"],
                ["Jones", "CA"],
                ["Brown", "NY"],
                ["Smith", "CA"],
            ],
        )
    }

    #[test]
    fn weights_follow_distinct_ratio() {
        let columns = vec!["lastname".to_string(), "state".to_string()];
        let (weights, issues) = uniqueness_weights(&people(), &columns, DatasetSide::Incoming);
        assert!(issues.is_empty());
        // lastname 3/4, state 2/4
        assert!((weights.get("lastname").unwrap() - 0.6).abs() < 1e-12);
        assert!((weights.get("state").unwrap() - 0.4).abs() < 1e-12);
        assert!((weights.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn missing_column_gets_zero_weight() {
        let columns = vec!["lastname".to_string(), "party".to_string()];
        let (weights, issues) = uniqueness_weights(&people(), &columns, DatasetSide::Reference);
        assert_eq!(weights.get("party"), Some(0.0));
        assert_eq!(weights.get("lastname"), Some(1.0));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].side, DatasetSide::Reference);
    }

    #[test]
    fn empty_dataset_falls_back_to_uniform() {
        let empty = Dataset::from_rows(["lastname", "state"], Vec::<Vec<&str>>::new());
        let columns = vec!["lastname".to_string(), "state".to_string()];
        let (weights, _) = uniqueness_weights(&empty, &columns, DatasetSide::Incoming);
        assert_eq!(weights.get("lastname"), Some(0.5));
        assert_eq!(weights.get("state"), Some(0.5));
    }
}
