//! Subgame configuration.
//!
//! A [`Configuration`] describes one scenario: stacks, pot, bet sizing,
//! range weights, the equity matrix, the utility model and the solver
//! hyperparameters. It deserializes from the flat camelCase shape used by
//! the presentation layer, e.g.
//!
//! ```text
//! { "heroStack": 100, "villainStack": 100, "potSize": 20, "maxActions": 4,
//!   "heroBet": 1.0, "villainBet": 1.0, "heroRaise": 1.0, "villainRaise": 1.0,
//!   "hero3bet": 1.0, "heroRanges": [45, 55], "villainRanges": [55, 45],
//!   "equities": [[0.53, 1.0], [0.0, 0.53]], "utility": "linear",
//!   "iterations": 2500, "learningRate": 0.01, "convergenceThreshold": 0.01 }
//! ```

use serde::{Deserialize, Serialize};

use super::model::Depth;
use crate::equilibrium::SolverSettings;
use crate::error::{Result, SolverError};

/// Floor applied inside the logarithm so that busted stacks stay finite.
pub const LOG_UTILITY_FLOOR: f64 = 0.01;

/// How monetary outcomes are turned into utility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtilityKind {
    /// Utility equals the monetary amount.
    #[default]
    Linear,
    /// `ln(max(amount + stack, 0.01))`.
    Logarithmic,
}

impl UtilityKind {
    /// Transform a monetary amount for a player holding `stack`.
    pub fn apply(&self, amount: f64, stack: f64) -> f64 {
        match self {
            UtilityKind::Linear => amount,
            UtilityKind::Logarithmic => (amount + stack).max(LOG_UTILITY_FLOOR).ln(),
        }
    }
}

/// Bet and raise sizes as fractions of the pot at the moment of the action.
///
/// Each size is applied to the pot as it would stand after every earlier
/// bet on the same line had been called; see
/// [`BetSizes`](super::payoff::BetSizes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetFractions {
    /// Hero's opening bet.
    pub hero_bet: f64,
    /// Villain's bet after hero checks.
    pub villain_bet: f64,
    /// Hero's check-raise over villain's bet.
    pub hero_raise: f64,
    /// Villain's raise over hero's bet.
    pub villain_raise: f64,
    /// Hero's 3-bet over villain's raise.
    #[serde(rename = "hero3bet")]
    pub hero_3bet: f64,
}

impl Default for BetFractions {
    fn default() -> Self {
        Self {
            hero_bet: 1.0,
            villain_bet: 1.0,
            hero_raise: 1.0,
            villain_raise: 1.0,
            hero_3bet: 1.0,
        }
    }
}

impl BetFractions {
    /// Same fraction for every action.
    pub fn uniform(fraction: f64) -> Self {
        Self {
            hero_bet: fraction,
            villain_bet: fraction,
            hero_raise: fraction,
            villain_raise: fraction,
            hero_3bet: fraction,
        }
    }

    fn validate(&self) -> Result<()> {
        let named = [
            ("heroBet", self.hero_bet),
            ("villainBet", self.villain_bet),
            ("heroRaise", self.hero_raise),
            ("villainRaise", self.villain_raise),
            ("hero3bet", self.hero_3bet),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(SolverError::config(format!(
                    "{} fraction {} must be a non-negative number",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Complete input for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Hero's stack behind, used by the logarithmic utility.
    pub hero_stack: f64,
    /// Villain's stack behind, used by the logarithmic utility.
    pub villain_stack: f64,
    /// Pot before the first action.
    pub pot_size: f64,
    /// Maximum number of actions on the street (2, 3 or 4).
    pub max_actions: u8,
    /// Pot-fraction bet sizing.
    #[serde(flatten)]
    pub bets: BetFractions,
    /// Relative weights of hero's range categories.
    pub hero_ranges: Vec<f64>,
    /// Relative weights of villain's range categories.
    pub villain_ranges: Vec<f64>,
    /// Hero win probability, `equities[hero_range][villain_range]`.
    pub equities: Vec<Vec<f64>>,
    /// Utility model.
    #[serde(default)]
    pub utility: UtilityKind,
    /// Solver hyperparameters.
    #[serde(flatten)]
    pub solver: SolverSettings,
    /// Optional preset pinning hero's mixed strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_fixed_strategy: Option<String>,
    /// Optional preset pinning villain's mixed strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub villain_fixed_strategy: Option<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            hero_stack: 100.0,
            villain_stack: 100.0,
            pot_size: 20.0,
            max_actions: 4,
            bets: BetFractions::default(),
            hero_ranges: vec![45.0, 55.0],
            villain_ranges: vec![55.0, 45.0],
            equities: vec![vec![0.53, 1.0], vec![0.0, 0.53]],
            utility: UtilityKind::Linear,
            solver: SolverSettings::default(),
            hero_fixed_strategy: None,
            villain_fixed_strategy: None,
        }
    }
}

impl Configuration {
    /// Create a configuration with the reference defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set both stacks.
    pub fn with_stacks(mut self, hero: f64, villain: f64) -> Self {
        self.hero_stack = hero;
        self.villain_stack = villain;
        self
    }

    /// Builder method: set the starting pot.
    pub fn with_pot(mut self, pot: f64) -> Self {
        self.pot_size = pot;
        self
    }

    /// Builder method: set the action depth.
    pub fn with_max_actions(mut self, max_actions: u8) -> Self {
        self.max_actions = max_actions;
        self
    }

    /// Builder method: set bet sizing.
    pub fn with_bets(mut self, bets: BetFractions) -> Self {
        self.bets = bets;
        self
    }

    /// Builder method: set range weights and the matching equity matrix.
    pub fn with_ranges(
        mut self,
        hero_ranges: Vec<f64>,
        villain_ranges: Vec<f64>,
        equities: Vec<Vec<f64>>,
    ) -> Self {
        self.hero_ranges = hero_ranges;
        self.villain_ranges = villain_ranges;
        self.equities = equities;
        self
    }

    /// Builder method: set the utility model.
    pub fn with_utility(mut self, utility: UtilityKind) -> Self {
        self.utility = utility;
        self
    }

    /// Builder method: set solver hyperparameters.
    pub fn with_solver(mut self, solver: SolverSettings) -> Self {
        self.solver = solver;
        self
    }

    /// Builder method: pin hero to a preset (`frequency,"label"` lines).
    pub fn with_hero_fixed(mut self, preset: impl Into<String>) -> Self {
        self.hero_fixed_strategy = Some(preset.into());
        self
    }

    /// Builder method: pin villain to a preset.
    pub fn with_villain_fixed(mut self, preset: impl Into<String>) -> Self {
        self.villain_fixed_strategy = Some(preset.into());
        self
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SolverError::parse(format!("invalid configuration JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validated action depth.
    pub fn depth(&self) -> Result<Depth> {
        Depth::new(self.max_actions)
    }

    /// Hero range weights normalized to probabilities.
    pub fn hero_range_probs(&self) -> Result<Vec<f64>> {
        normalize_weights("hero", &self.hero_ranges)
    }

    /// Villain range weights normalized to probabilities.
    pub fn villain_range_probs(&self) -> Result<Vec<f64>> {
        normalize_weights("villain", &self.villain_ranges)
    }

    /// Hero equity for one range pair.
    pub fn equity(&self, hero_range: usize, villain_range: usize) -> Result<f64> {
        self.equities
            .get(hero_range)
            .and_then(|row| row.get(villain_range))
            .copied()
            .ok_or_else(|| {
                SolverError::config(format!(
                    "no equity for range pair H{} / V{}",
                    hero_range + 1,
                    villain_range + 1
                ))
            })
    }

    /// Check every structural invariant.
    pub fn validate(&self) -> Result<()> {
        self.depth()?;

        for (name, value) in [
            ("heroStack", self.hero_stack),
            ("villainStack", self.villain_stack),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SolverError::config(format!(
                    "{} {} must be a non-negative number",
                    name, value
                )));
            }
        }
        if !self.pot_size.is_finite() || self.pot_size <= 0.0 {
            return Err(SolverError::config(format!(
                "potSize {} must be positive",
                self.pot_size
            )));
        }

        self.bets.validate()?;
        self.hero_range_probs()?;
        self.villain_range_probs()?;

        if self.equities.len() != self.hero_ranges.len() {
            return Err(SolverError::config(format!(
                "equity matrix has {} rows, expected {}",
                self.equities.len(),
                self.hero_ranges.len()
            )));
        }
        for (i, row) in self.equities.iter().enumerate() {
            if row.len() != self.villain_ranges.len() {
                return Err(SolverError::config(format!(
                    "equity row {} has {} values, expected {}",
                    i + 1,
                    row.len(),
                    self.villain_ranges.len()
                )));
            }
            if let Some(bad) = row.iter().find(|e| !(0.0..=1.0).contains(*e)) {
                return Err(SolverError::config(format!(
                    "equity {} in row {} is outside [0, 1]",
                    bad,
                    i + 1
                )));
            }
        }

        self.solver.validate()
    }
}

fn normalize_weights(player: &str, weights: &[f64]) -> Result<Vec<f64>> {
    if weights.is_empty() {
        return Err(SolverError::config(format!("{} has no range categories", player)));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(SolverError::config(format!(
            "{} range weights must be non-negative numbers",
            player
        )));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(SolverError::config(format!(
            "{} range weights cannot all be zero",
            player
        )));
    }
    Ok(weights.iter().map(|w| w / total).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Configuration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.depth().unwrap().get(), 4);
    }

    #[test]
    fn test_range_normalization() {
        let config = Configuration::default();
        let probs = config.hero_range_probs().unwrap();
        assert!((probs[0] - 0.45).abs() < 1e-12);
        assert!((probs[1] - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_unsupported_depth() {
        let config = Configuration::default().with_max_actions(5);
        assert!(matches!(config.validate(), Err(SolverError::Configuration(_))));
    }

    #[test]
    fn test_zero_weights_rejected() {
        let config = Configuration::default().with_ranges(
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
        );
        assert!(matches!(config.validate(), Err(SolverError::Configuration(_))));
    }

    #[test]
    fn test_equity_shape_mismatch() {
        let config = Configuration::default().with_ranges(
            vec![1.0, 1.0],
            vec![1.0],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
        );
        assert!(config.validate().is_err());

        let config = Configuration::default().with_ranges(vec![1.0], vec![1.0], vec![vec![1.2]]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_learning_rate_rejected() {
        let solver = SolverSettings::default().with_learning_rate(0.0);
        let config = Configuration::default().with_solver(solver);
        assert!(matches!(config.validate(), Err(SolverError::Configuration(_))));
    }

    #[test]
    fn test_log_utility_floor() {
        let u = UtilityKind::Logarithmic;
        assert!((u.apply(0.0, 100.0) - 100.0f64.ln()).abs() < 1e-12);
        assert!((u.apply(-500.0, 100.0) - LOG_UTILITY_FLOOR.ln()).abs() < 1e-12);
        assert_eq!(UtilityKind::Linear.apply(-3.5, 100.0), -3.5);
    }

    #[test]
    fn test_deserialize_presentation_shape() {
        let json = r#"{
            "heroStack": 100, "villainStack": 80, "potSize": 4, "maxActions": 2,
            "heroBet": 0.5, "villainBet": 1.0, "heroRaise": 1.0, "villainRaise": 1.0,
            "hero3bet": 1.0, "heroRanges": [1], "villainRanges": [1],
            "equities": [[0.7]], "utility": "logarithmic",
            "iterations": 500, "learningRate": 0.05, "convergenceThreshold": 0.01,
            "heroFixedStrategy": "1,\"H1:be\""
        }"#;
        let config = Configuration::from_json_str(json).unwrap();
        assert_eq!(config.villain_stack, 80.0);
        assert_eq!(config.bets.hero_bet, 0.5);
        assert_eq!(config.bets.hero_3bet, 1.0);
        assert_eq!(config.utility, UtilityKind::Logarithmic);
        assert_eq!(config.solver.iterations, 500);
        assert_eq!(config.hero_fixed_strategy.as_deref(), Some("1,\"H1:be\""));
        assert!(config.villain_fixed_strategy.is_none());
    }

    #[test]
    fn test_json_errors() {
        assert!(matches!(
            Configuration::from_json_str("{ not json"),
            Err(SolverError::Parse(_))
        ));

        let mut value = serde_json::to_value(Configuration::default()).unwrap();
        value["maxActions"] = serde_json::json!(5);
        assert!(matches!(
            Configuration::from_json_str(&value.to_string()),
            Err(SolverError::Configuration(_))
        ));
    }
}
