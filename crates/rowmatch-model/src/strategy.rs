//! Similarity strategies and the per-column order in which they are tried.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// One of the four cell comparison strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Cells are equal.
    Exact,
    /// Whole-string similarity ratio.
    FuzzySimple,
    /// Best alignment of the shorter string inside the longer one.
    FuzzyPartial,
    /// Order and duplicate insensitive token comparison.
    TokenSet,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Exact,
        Strategy::FuzzySimple,
        Strategy::FuzzyPartial,
        Strategy::TokenSet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::FuzzySimple => "fuzzy_simple",
            Self::FuzzyPartial => "fuzzy_partial",
            Self::TokenSet => "token_set",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| ConfigError::UnknownStrategy(s.to_string()))
    }
}

/// Ordered permutation of all strategies; the first nonzero score wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Strategy>", into = "Vec<Strategy>")]
pub struct PriorityList([Strategy; 4]);

impl PriorityList {
    pub const LEN: usize = Strategy::ALL.len();

    pub fn new(order: Vec<Strategy>) -> Result<Self> {
        Self::try_from(order)
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Strategy> + '_ {
        self.0.iter().copied()
    }

    /// Exchange two 1-based positions.
    pub fn swap(&mut self, position_a: usize, position_b: usize) -> Result<()> {
        let a = Self::index_of(position_a)?;
        let b = Self::index_of(position_b)?;
        self.0.swap(a, b);
        Ok(())
    }

    fn index_of(position: usize) -> Result<usize> {
        if (1..=Self::LEN).contains(&position) {
            Ok(position - 1)
        } else {
            Err(ConfigError::InvalidPosition {
                position,
                len: Self::LEN,
            })
        }
    }
}

impl Default for PriorityList {
    fn default() -> Self {
        Self(Strategy::ALL)
    }
}

impl TryFrom<Vec<Strategy>> for PriorityList {
    type Error = ConfigError;

    fn try_from(order: Vec<Strategy>) -> Result<Self> {
        let is_permutation = order.len() == Self::LEN
            && Strategy::ALL.iter().all(|strategy| order.contains(strategy));
        if !is_permutation {
            return Err(ConfigError::NotAPermutation(order));
        }
        let mut list = [Strategy::Exact; 4];
        list.copy_from_slice(&order);
        Ok(Self(list))
    }
}

impl From<PriorityList> for Vec<Strategy> {
    fn from(list: PriorityList) -> Self {
        list.0.to_vec()
    }
}

impl fmt::Display for PriorityList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, strategy) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{strategy}")?;
        }
        Ok(())
    }
}

/// Global strategy order plus per-column overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityConfig {
    pub default: PriorityList,
    pub overrides: BTreeMap<String, PriorityList>,
}

impl PriorityConfig {
    /// Column overrides tuned for matching people records (names, party,
    /// office and district columns).
    pub fn recommended() -> Self {
        use Strategy::{Exact, FuzzyPartial, FuzzySimple, TokenSet};

        let overrides = [
            ("middlename", [FuzzyPartial, Exact, FuzzySimple, TokenSet]),
            ("suffix", [FuzzyPartial, TokenSet, FuzzySimple, Exact]),
            ("party", [TokenSet, FuzzyPartial, Exact, FuzzySimple]),
            ("office", [FuzzyPartial, Exact, FuzzySimple, TokenSet]),
            ("district", [TokenSet, FuzzyPartial, Exact, FuzzySimple]),
        ]
        .into_iter()
        .map(|(column, order)| (column.to_string(), PriorityList(order)))
        .collect();

        Self {
            default: PriorityList::default(),
            overrides,
        }
    }

    /// Strategy order used for `column`.
    pub fn priority_for(&self, column: &str) -> &PriorityList {
        self.overrides.get(column).unwrap_or(&self.default)
    }

    /// Exchange two 1-based positions in the default list, or in the override
    /// for `column`. A missing override is seeded from the current default.
    ///
    /// Invalid positions leave the configuration untouched.
    pub fn swap(&mut self, position_a: usize, position_b: usize, column: Option<&str>) -> Result<()> {
        PriorityList::index_of(position_a)?;
        PriorityList::index_of(position_b)?;
        match column {
            None => self.default.swap(position_a, position_b),
            Some(column) => {
                let default = self.default;
                self.overrides
                    .entry(column.to_string())
                    .or_insert(default)
                    .swap(position_a, position_b)
            }
        }
    }

    pub fn set_override(&mut self, column: impl Into<String>, list: PriorityList) {
        self.overrides.insert(column.into(), list);
    }

    /// Drop the override for `column`, or every override when `None`.
    pub fn reset(&mut self, column: Option<&str>) {
        match column {
            Some(column) => {
                self.overrides.remove(column);
            }
            None => self.overrides.clear(),
        }
    }

    /// Merge `other`'s overrides into this config, replacing same-named columns.
    pub fn extend_overrides(&mut self, other: &PriorityConfig) {
        for (column, list) in &other.overrides {
            self.overrides.insert(column.clone(), *list);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strategy_names() {
        assert_eq!("exact".parse::<Strategy>().unwrap(), Strategy::Exact);
        assert_eq!("Token-Set".parse::<Strategy>().unwrap(), Strategy::TokenSet);
        assert!(matches!(
            "soundex".parse::<Strategy>(),
            Err(ConfigError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn rejects_lists_that_are_not_permutations() {
        let duplicated = vec![
            Strategy::Exact,
            Strategy::Exact,
            Strategy::FuzzyPartial,
            Strategy::TokenSet,
        ];
        assert!(PriorityList::new(duplicated).is_err());
        assert!(PriorityList::new(vec![Strategy::Exact]).is_err());
    }

    #[test]
    fn display_joins_in_order() {
        assert_eq!(
            PriorityList::default().to_string(),
            "exact > fuzzy_simple > fuzzy_partial > token_set"
        );
    }
}
