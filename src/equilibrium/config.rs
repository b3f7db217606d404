//! Solver hyperparameters and convergence statistics.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Configuration for the equilibrium solver.
///
/// # Example
/// ```
/// use subgame_solver::equilibrium::SolverSettings;
///
/// let settings = SolverSettings::default().with_iterations(500);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverSettings {
    /// Maximum number of iterations.
    pub iterations: usize,

    /// Softmax temperature (eta).
    ///
    /// Smaller values make the per-iteration response closer to a pure best
    /// response. Must be strictly positive.
    pub learning_rate: f64,

    /// Exploitability below which a free player is considered converged.
    pub convergence_threshold: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            iterations: 2500,
            learning_rate: 0.01,
            convergence_threshold: 0.01,
        }
    }
}

impl SolverSettings {
    /// Create settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the iteration cap.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Builder method: set the softmax temperature.
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Builder method: set the convergence threshold.
    pub fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    /// Validate the settings.
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(SolverError::config("iterations must be at least 1"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(SolverError::config(format!(
                "learningRate {} must be positive",
                self.learning_rate
            )));
        }
        if !self.convergence_threshold.is_finite() || self.convergence_threshold < 0.0 {
            return Err(SolverError::config(format!(
                "convergenceThreshold {} must be non-negative",
                self.convergence_threshold
            )));
        }
        Ok(())
    }
}

/// Utilities and exploitabilities after one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracePoint {
    /// Zero-based iteration index.
    pub iteration: usize,
    /// Hero's expected utility under the averaged strategies.
    pub hero_utility: f64,
    /// Villain's expected utility under the averaged strategies.
    pub villain_utility: f64,
    /// Hero's best-response gain over the averaged strategy.
    pub hero_exploitability: f64,
    /// Villain's best-response gain over the averaged strategy.
    pub villain_exploitability: f64,
}
