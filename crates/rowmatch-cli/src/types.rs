use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use rowmatch_core::{ColumnProfile, ColumnWeights};
use rowmatch_model::{
    DataShapeIssue, MatchResultTable, MatchSnapshot, PriorityConfig, ResultsDescription,
};

/// A `--swap` argument: two 1-based priority positions, optionally scoped
/// to one column. Written `A:B` or `A:B@column`; `A>B` is accepted too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapSpec {
    pub position_a: usize,
    pub position_b: usize,
    pub column: Option<String>,
}

impl FromStr for SwapSpec {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (positions, column) = match raw.split_once('@') {
            Some((positions, column)) => {
                let column = column.trim();
                if column.is_empty() {
                    return Err(format!("missing column after '@' in swap '{raw}'"));
                }
                (positions, Some(column.to_string()))
            }
            None => (raw, None),
        };
        let (a, b) = positions
            .split_once([':', '>'])
            .ok_or_else(|| format!("expected A:B or A:B@column, got '{raw}'"))?;
        let parse = |value: &str| {
            value
                .trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid priority position '{}' in swap '{raw}'", value.trim()))
        };
        Ok(Self {
            position_a: parse(a)?,
            position_b: parse(b)?,
            column,
        })
    }
}

impl fmt::Display for SwapSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.position_a, self.position_b)?;
        if let Some(column) = &self.column {
            write!(f, "@{column}")?;
        }
        Ok(())
    }
}

/// What `rowmatch match` did, for printing.
#[derive(Debug)]
pub struct MatchOutcome {
    pub incoming: PathBuf,
    pub reference: PathBuf,
    pub snapshot: MatchSnapshot,
    pub weights: ColumnWeights,
    pub optimize_threshold: f64,
    pub description: ResultsDescription,
    pub issues: Vec<DataShapeIssue>,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

/// JSON run report written by `--report`.
#[derive(Debug, Serialize)]
pub struct MatchReport<'a> {
    pub incoming: &'a std::path::Path,
    pub reference: &'a std::path::Path,
    pub settings: &'a MatchSnapshot,
    pub weights: &'a ColumnWeights,
    pub optimize_threshold: f64,
    pub description: ResultsDescription,
    pub issues: &'a [DataShapeIssue],
    pub rows: &'a MatchResultTable,
}

#[derive(Debug)]
pub struct AnalyzeOutcome {
    pub file: PathBuf,
    pub rows: usize,
    pub profiles: Vec<ColumnProfile>,
    pub missing: Vec<String>,
}

#[derive(Debug)]
pub struct PriorityOutcome {
    pub profile: PathBuf,
    pub priorities: PriorityConfig,
    pub saved: bool,
}
