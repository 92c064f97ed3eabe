//! Match settings and the immutable snapshot a run operates on.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::strategy::{PriorityConfig, PriorityList, Strategy};

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.75;
pub const DEFAULT_PARTIAL_FUZZY_THRESHOLD: f64 = 0.75;
pub const DEFAULT_TOKEN_SET_THRESHOLD: f64 = 0.75;
pub const DEFAULT_TOTAL_THRESHOLD: f64 = 0.80;
pub const DEFAULT_OPTIMIZE_THRESHOLD: f64 = 0.50;

/// Names every configurable threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdKind {
    Fuzzy,
    PartialFuzzy,
    TokenSet,
    Total,
    Optimize,
}

impl ThresholdKind {
    pub const ALL: [ThresholdKind; 5] = [
        ThresholdKind::Fuzzy,
        ThresholdKind::PartialFuzzy,
        ThresholdKind::TokenSet,
        ThresholdKind::Total,
        ThresholdKind::Optimize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fuzzy => "fuzzy_threshold",
            Self::PartialFuzzy => "partial_fuzzy_threshold",
            Self::TokenSet => "token_set_threshold",
            Self::Total => "total_threshold",
            Self::Optimize => "optimize_threshold",
        }
    }
}

impl fmt::Display for ThresholdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the candidate pruning threshold is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pruning {
    /// Use `optimize_threshold` as configured.
    #[default]
    Threshold,
    /// Use the largest column weight of the run.
    Auto,
    /// Prune at `total_threshold`, so only accepted matches survive.
    Disabled,
}

/// Which dataset's column uniqueness drives the weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSide {
    #[default]
    Incoming,
    Reference,
}

/// Per-strategy acceptance thresholds for the fuzzy strategies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyThresholds {
    pub fuzzy_simple: f64,
    pub fuzzy_partial: f64,
    pub token_set: f64,
}

impl StrategyThresholds {
    /// Threshold applied to `strategy`; `exact` has none.
    pub fn for_strategy(&self, strategy: Strategy) -> f64 {
        match strategy {
            Strategy::Exact => 0.0,
            Strategy::FuzzySimple => self.fuzzy_simple,
            Strategy::FuzzyPartial => self.fuzzy_partial,
            Strategy::TokenSet => self.token_set,
        }
    }
}

impl Default for StrategyThresholds {
    fn default() -> Self {
        Self {
            fuzzy_simple: DEFAULT_FUZZY_THRESHOLD,
            fuzzy_partial: DEFAULT_PARTIAL_FUZZY_THRESHOLD,
            token_set: DEFAULT_TOKEN_SET_THRESHOLD,
        }
    }
}

/// Editable match configuration, also the on-disk profile format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    pub fuzzy_threshold: f64,
    pub partial_fuzzy_threshold: f64,
    pub token_set_threshold: f64,
    pub total_threshold: f64,
    pub optimize_threshold: f64,
    pub pruning: Pruning,
    pub weight_side: WeightSide,
    pub columns: Vec<String>,
    pub priorities: PriorityConfig,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            partial_fuzzy_threshold: DEFAULT_PARTIAL_FUZZY_THRESHOLD,
            token_set_threshold: DEFAULT_TOKEN_SET_THRESHOLD,
            total_threshold: DEFAULT_TOTAL_THRESHOLD,
            optimize_threshold: DEFAULT_OPTIMIZE_THRESHOLD,
            pruning: Pruning::default(),
            weight_side: WeightSide::default(),
            columns: Vec::new(),
            priorities: PriorityConfig::default(),
        }
    }
}

impl MatchSettings {
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Apply the recommended per-column priorities and enable pruning.
    pub fn apply_recommended(&mut self) {
        self.pruning = Pruning::Threshold;
        self.priorities
            .extend_overrides(&PriorityConfig::recommended());
    }

    pub fn threshold(&self, kind: ThresholdKind) -> f64 {
        match kind {
            ThresholdKind::Fuzzy => self.fuzzy_threshold,
            ThresholdKind::PartialFuzzy => self.partial_fuzzy_threshold,
            ThresholdKind::TokenSet => self.token_set_threshold,
            ThresholdKind::Total => self.total_threshold,
            ThresholdKind::Optimize => self.optimize_threshold,
        }
    }

    /// Set one threshold, rejecting values outside `[0, 1]`.
    pub fn set_threshold(&mut self, kind: ThresholdKind, value: f64) -> Result<()> {
        check_threshold(kind, value)?;
        let slot = match kind {
            ThresholdKind::Fuzzy => &mut self.fuzzy_threshold,
            ThresholdKind::PartialFuzzy => &mut self.partial_fuzzy_threshold,
            ThresholdKind::TokenSet => &mut self.token_set_threshold,
            ThresholdKind::Total => &mut self.total_threshold,
            ThresholdKind::Optimize => &mut self.optimize_threshold,
        };
        *slot = value;
        Ok(())
    }

    /// Swap two 1-based priority positions; see [`PriorityConfig::swap`].
    pub fn swap_priority(
        &mut self,
        position_a: usize,
        position_b: usize,
        column: Option<&str>,
    ) -> Result<()> {
        self.priorities.swap(position_a, position_b, column)
    }

    pub fn validate(&self) -> Result<()> {
        for kind in ThresholdKind::ALL {
            check_threshold(kind, self.threshold(kind))?;
        }
        if self.columns.is_empty() {
            return Err(ConfigError::NoMatchableColumns);
        }
        let mut seen = BTreeSet::new();
        for column in &self.columns {
            if !seen.insert(column.as_str()) {
                return Err(ConfigError::DuplicateColumn(column.clone()));
            }
        }
        Ok(())
    }

    /// Validate and freeze the settings for one run.
    pub fn snapshot(&self) -> Result<MatchSnapshot> {
        self.validate()?;
        Ok(MatchSnapshot {
            strategy_thresholds: StrategyThresholds {
                fuzzy_simple: self.fuzzy_threshold,
                fuzzy_partial: self.partial_fuzzy_threshold,
                token_set: self.token_set_threshold,
            },
            total_threshold: self.total_threshold,
            optimize_threshold: self.optimize_threshold,
            pruning: self.pruning,
            weight_side: self.weight_side,
            columns: self.columns.clone(),
            priorities: self.priorities.clone(),
        })
    }
}

fn check_threshold(kind: ThresholdKind, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ThresholdOutOfRange { kind, value })
    }
}

/// Validated, read-only copy of [`MatchSettings`] captured before a run.
///
/// Editing the settings afterwards has no effect on a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSnapshot {
    strategy_thresholds: StrategyThresholds,
    total_threshold: f64,
    optimize_threshold: f64,
    pruning: Pruning,
    weight_side: WeightSide,
    columns: Vec<String>,
    priorities: PriorityConfig,
}

impl MatchSnapshot {
    pub fn strategy_thresholds(&self) -> &StrategyThresholds {
        &self.strategy_thresholds
    }

    pub fn total_threshold(&self) -> f64 {
        self.total_threshold
    }

    /// The configured optimize threshold, before pruning mode is applied.
    pub fn optimize_threshold(&self) -> f64 {
        self.optimize_threshold
    }

    pub fn pruning(&self) -> Pruning {
        self.pruning
    }

    pub fn weight_side(&self) -> WeightSide {
        self.weight_side
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn priority_for(&self, column: &str) -> &PriorityList {
        self.priorities.priority_for(column)
    }

    pub fn priorities(&self) -> &PriorityConfig {
        &self.priorities
    }

    /// Pruning threshold for a run whose largest column weight is `max_weight`.
    pub fn effective_optimize_threshold(&self, max_weight: f64) -> f64 {
        match self.pruning {
            Pruning::Threshold => self.optimize_threshold,
            Pruning::Auto => max_weight,
            Pruning::Disabled => self.total_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = MatchSettings::default();
        assert_eq!(settings.fuzzy_threshold, 0.75);
        assert_eq!(settings.partial_fuzzy_threshold, 0.75);
        assert_eq!(settings.token_set_threshold, 0.75);
        assert_eq!(settings.total_threshold, 0.80);
        assert_eq!(settings.optimize_threshold, 0.50);
        assert_eq!(settings.pruning, Pruning::Threshold);
        assert_eq!(settings.weight_side, WeightSide::Incoming);
    }

    #[test]
    fn effective_threshold_follows_pruning_mode() {
        let mut settings = MatchSettings::with_columns(["lastname"]);
        let snapshot = settings.snapshot().unwrap();
        assert_eq!(snapshot.effective_optimize_threshold(0.9), 0.50);

        settings.pruning = Pruning::Auto;
        assert_eq!(settings.snapshot().unwrap().effective_optimize_threshold(0.9), 0.9);

        settings.pruning = Pruning::Disabled;
        assert_eq!(settings.snapshot().unwrap().effective_optimize_threshold(0.9), 0.80);
    }
}
