//! Smoothed fictitious-play solver for the bimatrix game.
//!
//! Each iteration both free players compute payoffs against the opponent's
//! averaged strategy, take a softmax response with temperature `eta`, and
//! blend it into their average with weight `2 / (t + 2)`. Exploitability is
//! each player's best pure payoff minus their current utility.
//!
//! Either player may be pinned to a [`FixedStrategy`]; a fixed player never
//! updates and is ignored by the convergence test.

use serde::Serialize;

use super::config::{SolverSettings, TracePoint};
use super::matrix::PayoffMatrix;
use crate::error::{Result, SolverError};

/// A mixed strategy supplied by the caller, as `(pure strategy index, weight)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedStrategy {
    weights: Vec<(usize, f64)>,
}

impl FixedStrategy {
    /// Create from positive weights. Weights need not sum to one.
    pub fn new(weights: Vec<(usize, f64)>) -> Result<Self> {
        if weights.is_empty() {
            return Err(SolverError::config("fixed strategy has no entries"));
        }
        if let Some((index, w)) = weights.iter().find(|(_, w)| !w.is_finite() || *w <= 0.0) {
            return Err(SolverError::config(format!(
                "fixed strategy weight {} for strategy {} must be positive",
                w, index
            )));
        }
        Ok(Self { weights })
    }

    /// Entries as given.
    pub fn weights(&self) -> &[(usize, f64)] {
        &self.weights
    }

    /// Normalized distribution over `len` pure strategies.
    pub fn distribution(&self, len: usize) -> Result<Vec<f64>> {
        let mut dist = vec![0.0; len];
        for (index, w) in &self.weights {
            let slot = dist.get_mut(*index).ok_or_else(|| {
                SolverError::config(format!(
                    "fixed strategy index {} is out of range ({} strategies)",
                    index, len
                ))
            })?;
            *slot += w;
        }
        let total: f64 = dist.iter().sum();
        Ok(dist.into_iter().map(|w| w / total).collect())
    }
}

/// Result of a solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    /// Hero's averaged mixed strategy.
    pub hero_strategy: Vec<f64>,
    /// Villain's averaged mixed strategy.
    pub villain_strategy: Vec<f64>,
    /// Hero's expected utility under the final profile.
    pub hero_utility: f64,
    /// Villain's expected utility under the final profile.
    pub villain_utility: f64,
    /// One point per completed iteration.
    pub trace: Vec<TracePoint>,
    /// Iteration at which the convergence test first passed.
    pub converged_at: Option<usize>,
}

impl Solution {
    /// Exploitabilities at the last recorded iteration.
    pub fn final_exploitability(&self) -> Option<(f64, f64)> {
        self.trace
            .last()
            .map(|p| (p.hero_exploitability, p.villain_exploitability))
    }
}

/// Iterative equilibrium solver over a [`PayoffMatrix`].
///
/// # Example
/// ```
/// use subgame_solver::equilibrium::{EquilibriumSolver, PayoffMatrix, SolverSettings};
///
/// // matching pennies
/// let matrix = PayoffMatrix::from_rows(
///     vec![vec![1.0, -1.0], vec![-1.0, 1.0]],
///     vec![vec![-1.0, 1.0], vec![1.0, -1.0]],
/// ).unwrap();
/// let solution = EquilibriumSolver::new(&matrix, SolverSettings::default())
///     .solve()
///     .unwrap();
/// let total: f64 = solution.hero_strategy.iter().sum();
/// assert!((total - 1.0).abs() < 1e-9);
/// ```
pub struct EquilibriumSolver<'a> {
    matrix: &'a PayoffMatrix,
    settings: SolverSettings,
    hero_fixed: Option<FixedStrategy>,
    villain_fixed: Option<FixedStrategy>,
}

impl<'a> EquilibriumSolver<'a> {
    /// Create a solver with both players free.
    pub fn new(matrix: &'a PayoffMatrix, settings: SolverSettings) -> Self {
        Self {
            matrix,
            settings,
            hero_fixed: None,
            villain_fixed: None,
        }
    }

    /// Pin hero's strategy.
    pub fn with_hero_fixed(mut self, fixed: FixedStrategy) -> Self {
        self.hero_fixed = Some(fixed);
        self
    }

    /// Pin villain's strategy.
    pub fn with_villain_fixed(mut self, fixed: FixedStrategy) -> Self {
        self.villain_fixed = Some(fixed);
        self
    }

    /// Run to convergence or the iteration cap.
    pub fn solve(&self) -> Result<Solution> {
        self.solve_with_callback(|_| {})
    }

    /// Run the solver, invoking `callback` after every iteration.
    pub fn solve_with_callback<F>(&self, mut callback: F) -> Result<Solution>
    where
        F: FnMut(&TracePoint),
    {
        self.settings.validate()?;
        let matrix = self.matrix;
        let eta = self.settings.learning_rate;
        let epsilon = self.settings.convergence_threshold;

        let mut hero_avg = initial_strategy(self.hero_fixed.as_ref(), matrix.rows())?;
        let mut villain_avg = initial_strategy(self.villain_fixed.as_ref(), matrix.cols())?;
        let hero_free = self.hero_fixed.is_none();
        let villain_free = self.villain_fixed.is_none();
        let iterations = if hero_free || villain_free {
            self.settings.iterations
        } else {
            1
        };

        log::debug!(
            "solving {} x {} game (hero {}, villain {}), eta {}, epsilon {}",
            matrix.rows(),
            matrix.cols(),
            if hero_free { "free" } else { "fixed" },
            if villain_free { "free" } else { "fixed" },
            eta,
            epsilon
        );

        let mut trace = Vec::new();
        let mut converged_at = None;

        for iteration in 0..iterations {
            if hero_free || villain_free {
                let weight = 2.0 / (iteration as f64 + 2.0);
                let hero_payoffs = matrix.hero_payoffs_against(&villain_avg);
                let villain_payoffs = matrix.villain_payoffs_against(&hero_avg);
                if hero_free {
                    blend(&mut hero_avg, &softmax(&hero_payoffs, eta), weight);
                }
                if villain_free {
                    blend(&mut villain_avg, &softmax(&villain_payoffs, eta), weight);
                }
            }

            let (hero_utility, villain_utility) = matrix.expected_utilities(&hero_avg, &villain_avg);
            let hero_best = max(&matrix.hero_payoffs_against(&villain_avg));
            let villain_best = max(&matrix.villain_payoffs_against(&hero_avg));
            let point = TracePoint {
                iteration,
                hero_utility,
                villain_utility,
                hero_exploitability: hero_best - hero_utility,
                villain_exploitability: villain_best - villain_utility,
            };
            callback(&point);
            trace.push(point);

            if hero_free || villain_free {
                let hero_done = !hero_free || point.hero_exploitability < epsilon;
                let villain_done = !villain_free || point.villain_exploitability < epsilon;
                if hero_done && villain_done {
                    converged_at = Some(iteration);
                    break;
                }
            }
        }

        match converged_at {
            Some(at) => log::info!("converged at iteration {}", at),
            None if hero_free || villain_free => log::warn!(
                "no convergence after {} iterations (exploitability {:?})",
                trace.len(),
                trace
                    .last()
                    .map(|p| (p.hero_exploitability, p.villain_exploitability))
            ),
            None => {}
        }

        let (hero_utility, villain_utility) = matrix.expected_utilities(&hero_avg, &villain_avg);
        Ok(Solution {
            hero_strategy: hero_avg,
            villain_strategy: villain_avg,
            hero_utility,
            villain_utility,
            trace,
            converged_at,
        })
    }
}

fn initial_strategy(fixed: Option<&FixedStrategy>, len: usize) -> Result<Vec<f64>> {
    match fixed {
        Some(f) => f.distribution(len),
        None => Ok(vec![1.0 / len as f64; len]),
    }
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Softmax of `payoffs / eta`, shifted by the maximum for stability.
fn softmax(payoffs: &[f64], eta: f64) -> Vec<f64> {
    let top = max(payoffs);
    let exps: Vec<f64> = payoffs.iter().map(|p| ((p - top) / eta).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

fn blend(average: &mut [f64], current: &[f64], weight: f64) {
    for (avg, cur) in average.iter_mut().zip(current) {
        *avg = *avg * (1.0 - weight) + cur * weight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pennies() -> PayoffMatrix {
        PayoffMatrix::from_rows(
            vec![vec![1.0, -1.0], vec![-1.0, 1.0]],
            vec![vec![-1.0, 1.0], vec![1.0, -1.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_softmax_is_distribution() {
        let p = softmax(&[1.0, 2.0, 3.0], 0.5);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(p[2] > p[1] && p[1] > p[0]);

        // huge payoffs stay finite
        let p = softmax(&[1e6, 0.0], 0.01);
        assert!((p[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_dominant_strategy_found() {
        // row 1 strictly dominates for hero; villain indifferent
        let matrix = PayoffMatrix::from_rows(
            vec![vec![0.0, 0.0], vec![1.0, 1.0]],
            vec![vec![0.0, 0.0], vec![0.0, 0.0]],
        )
        .unwrap();
        let solution = EquilibriumSolver::new(&matrix, SolverSettings::default())
            .solve()
            .unwrap();
        assert!(solution.hero_strategy[1] > 0.99);
        assert_eq!(solution.converged_at, Some(0));
        assert_eq!(solution.trace.len(), 1);
    }

    #[test]
    fn test_trace_and_strategies_are_distributions() {
        let settings = SolverSettings::default().with_iterations(200);
        let mut seen = 0;
        let solution = EquilibriumSolver::new(&pennies(), settings)
            .solve_with_callback(|_| seen += 1)
            .unwrap();
        assert_eq!(seen, solution.trace.len());
        assert!(solution.trace.len() <= 200);
        for mix in [&solution.hero_strategy, &solution.villain_strategy] {
            assert!((mix.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert!(mix.iter().all(|p| *p >= 0.0));
        }
        for (i, point) in solution.trace.iter().enumerate() {
            assert_eq!(point.iteration, i);
            assert!(point.hero_exploitability >= -1e-12);
        }
    }

    #[test]
    fn test_budget_exhausted_without_convergence() {
        let settings = SolverSettings::default()
            .with_iterations(37)
            .with_convergence_threshold(0.0);
        let solution = EquilibriumSolver::new(&pennies(), settings).solve().unwrap();
        assert_eq!(solution.trace.len(), 37);
        assert_eq!(solution.converged_at, None);
        assert_eq!(solution.trace.last().map(|p| p.iteration), Some(36));
    }

    #[test]
    fn test_both_fixed_runs_once() {
        let solution = EquilibriumSolver::new(&pennies(), SolverSettings::default())
            .with_hero_fixed(FixedStrategy::new(vec![(0, 1.0)]).unwrap())
            .with_villain_fixed(FixedStrategy::new(vec![(0, 1.0), (1, 3.0)]).unwrap())
            .solve()
            .unwrap();
        assert_eq!(solution.trace.len(), 1);
        assert_eq!(solution.converged_at, None);
        assert_eq!(solution.villain_strategy, vec![0.25, 0.75]);
        assert!((solution.hero_utility - -0.5).abs() < 1e-12);
    }

    #[test]
    fn test_fixed_hero_villain_best_responds() {
        let solution = EquilibriumSolver::new(&pennies(), SolverSettings::default())
            .with_hero_fixed(FixedStrategy::new(vec![(0, 1.0)]).unwrap())
            .solve()
            .unwrap();
        assert_eq!(solution.hero_strategy, vec![1.0, 0.0]);
        assert!(solution.villain_strategy[1] > 0.99);
        assert!(solution.converged_at.is_some());
    }

    #[test]
    fn test_fixed_strategy_validation() {
        assert!(FixedStrategy::new(vec![]).is_err());
        assert!(FixedStrategy::new(vec![(0, 0.0)]).is_err());
        let fixed = FixedStrategy::new(vec![(5, 1.0)]).unwrap();
        assert!(matches!(
            fixed.distribution(2),
            Err(SolverError::Configuration(_))
        ));
    }
}
