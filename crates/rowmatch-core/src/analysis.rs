//! Column profiling used to judge which columns are worth matching on.

use std::collections::BTreeMap;

use serde::Serialize;

use rowmatch_model::Dataset;

use crate::weights::column_uniqueness;

/// Summary of one column's values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub column: String,
    pub distinct: usize,
    /// Distinct values over row count.
    pub uniqueness: f64,
    /// Display row numbers of blank cells.
    pub blank_rows: Vec<usize>,
    /// Display row numbers sharing a non-blank value, one group per value.
    pub duplicate_groups: Vec<Vec<usize>>,
    /// Most frequent non-blank value and its count.
    pub largest_group: Option<(String, usize)>,
    /// Least frequent non-blank value and its count.
    pub smallest_group: Option<(String, usize)>,
}

/// Profile `column`, or `None` when the dataset lacks it.
pub fn profile_column(dataset: &Dataset, column: &str) -> Option<ColumnProfile> {
    let index = dataset.column_index(column)?;

    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    let mut blank_rows = Vec::new();
    for (row, value) in dataset.column_values(index).enumerate() {
        if value.trim().is_empty() {
            blank_rows.push(dataset.display_row(row));
        } else {
            groups.entry(value).or_default().push(dataset.display_row(row));
        }
    }

    let distinct = groups.len() + usize::from(!blank_rows.is_empty());
    // Ties resolve to the first value in sorted order.
    let largest_group = groups
        .iter()
        .fold(None::<(&str, usize)>, |best, (value, rows)| match best {
            Some((_, count)) if count >= rows.len() => best,
            _ => Some((*value, rows.len())),
        })
        .map(|(value, count)| (value.to_string(), count));
    let smallest_group = groups
        .iter()
        .fold(None::<(&str, usize)>, |best, (value, rows)| match best {
            Some((_, count)) if count <= rows.len() => best,
            _ => Some((*value, rows.len())),
        })
        .map(|(value, count)| (value.to_string(), count));
    let duplicate_groups = groups
        .into_values()
        .filter(|rows| rows.len() > 1)
        .collect();

    Some(ColumnProfile {
        column: column.to_string(),
        distinct,
        uniqueness: column_uniqueness(dataset, index),
        blank_rows,
        duplicate_groups,
        largest_group,
        smallest_group,
    })
}

/// Profile every column in `columns` that the dataset has.
pub fn profile_columns(dataset: &Dataset, columns: &[String]) -> Vec<ColumnProfile> {
    columns
        .iter()
        .filter_map(|column| profile_column(dataset, column))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_blanks_duplicates_and_groups() {
        let dataset = Dataset::from_rows(
            ["state"],
            [["CA"], ["NY"], [""], ["CA"], ["TX"], ["CA"], ["NY"]],
        );
        let profile = profile_column(&dataset, "state").unwrap();
        assert_eq!(profile.distinct, 4);
        assert!((profile.uniqueness - 4.0 / 7.0).abs() < 1e-12);
        assert_eq!(profile.blank_rows, vec![4]);
        assert_eq!(profile.duplicate_groups, vec![vec![2, 5, 7], vec![3, 8]]);
        assert_eq!(profile.largest_group, Some(("CA".to_string(), 3)));
        assert_eq!(profile.smallest_group, Some(("TX".to_string(), 1)));
    }

    #[test]
    fn rows_are_reported_by_source_line() {
        let dataset = Dataset::from_rows(["state"], [["CA"], [""], ["CA"]])
            .with_source_lines(vec![2, 4, 7]);
        let profile = profile_column(&dataset, "state").unwrap();
        assert_eq!(profile.blank_rows, vec![4]);
        assert_eq!(profile.duplicate_groups, vec![vec![2, 7]]);
    }

    #[test]
    fn missing_column_has_no_profile() {
        let dataset = Dataset::from_rows(["state"], [["CA"]]);
        assert!(profile_column(&dataset, "party").is_none());
    }
}
