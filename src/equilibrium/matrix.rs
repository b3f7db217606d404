//! Bimatrix construction.
//!
//! Cell `(i, j)` holds each player's expected utility when hero plays pure
//! strategy `i` and villain plays pure strategy `j`, averaged over the range
//! priors:
//!
//! ```text
//! cell(i, j) = sum_h sum_v  p_h * p_v * U(payoff(line_i(h), line_j(v), equity[h][v]))
//! ```
//!
//! The utility transform is applied per range pair, before averaging.

use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Result, SolverError};
use crate::game::{BetSizes, Configuration, PayoffTable, StrategySpace};

/// Hero and villain payoff matrices of equal shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoffMatrix {
    hero: Vec<Vec<f64>>,
    villain: Vec<Vec<f64>>,
}

impl PayoffMatrix {
    /// Wrap explicit matrices. Both must be rectangular, non-empty and of the
    /// same shape.
    pub fn from_rows(hero: Vec<Vec<f64>>, villain: Vec<Vec<f64>>) -> Result<Self> {
        let rows = hero.len();
        let cols = hero.first().map(Vec::len).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(SolverError::config("payoff matrix is empty"));
        }
        let same_shape = villain.len() == rows
            && hero.iter().all(|r| r.len() == cols)
            && villain.iter().all(|r| r.len() == cols);
        if !same_shape {
            return Err(SolverError::config(
                "hero and villain payoff matrices must share one rectangular shape",
            ));
        }
        if hero.iter().chain(villain.iter()).flatten().any(|x| !x.is_finite()) {
            return Err(SolverError::logic("payoff matrix contains a non-finite cell"));
        }
        Ok(Self { hero, villain })
    }

    /// Build the matrix for `config` over `space`.
    pub fn build(config: &Configuration, space: &StrategySpace) -> Result<Self> {
        let table = PayoffTable::new(space.depth())?;
        let sizes = BetSizes::new(config.pot_size, &config.bets);
        let hero_probs = config.hero_range_probs()?;
        let villain_probs = config.villain_range_probs()?;

        if hero_probs.len() != space.hero_ranges() || villain_probs.len() != space.villain_ranges() {
            return Err(SolverError::config(
                "range count does not match the strategy space",
            ));
        }

        // Weighted utility of every (hero range, villain range, hero line,
        // villain line) combination, computed once.
        let hero_lines = space.hero_lines();
        let villain_lines = space.villain_lines();
        let line_pairs = hero_lines.len() * villain_lines.len();
        let range_pairs = hero_probs.len() * villain_probs.len();
        let mut weighted = vec![(0.0, 0.0); range_pairs * line_pairs];

        for (h, p_h) in hero_probs.iter().enumerate() {
            for (v, p_v) in villain_probs.iter().enumerate() {
                let equity = config.equity(h, v)?;
                let weight = p_h * p_v;
                let base = (h * villain_probs.len() + v) * line_pairs;
                for (a, hero_line) in hero_lines.iter().enumerate() {
                    for (b, villain_line) in villain_lines.iter().enumerate() {
                        let (hero_pay, villain_pay) =
                            table.payoffs(hero_line, villain_line, equity, &sizes)?;
                        weighted[base + a * villain_lines.len() + b] = (
                            weight * config.utility.apply(hero_pay, config.hero_stack),
                            weight * config.utility.apply(villain_pay, config.villain_stack),
                        );
                    }
                }
            }
        }

        let rows = space.num_hero_strategies();
        let cols = space.num_villain_strategies();
        let villain_digits: Vec<Vec<usize>> =
            (0..cols).map(|j| space.villain_line_indices(j)).collect();

        log::debug!(
            "building {} x {} payoff matrix over {} range pairs",
            rows,
            cols,
            range_pairs
        );

        let cells: Vec<(Vec<f64>, Vec<f64>)> = (0..rows)
            .into_par_iter()
            .map(|i| {
                let hero_digits = space.hero_line_indices(i);
                let mut hero_row = Vec::with_capacity(cols);
                let mut villain_row = Vec::with_capacity(cols);
                for digits in &villain_digits {
                    let mut cell = (0.0, 0.0);
                    for (h, a) in hero_digits.iter().enumerate() {
                        for (v, b) in digits.iter().enumerate() {
                            let base = (h * villain_probs.len() + v) * line_pairs;
                            let (x, y) = weighted[base + a * villain_lines.len() + b];
                            cell.0 += x;
                            cell.1 += y;
                        }
                    }
                    hero_row.push(cell.0);
                    villain_row.push(cell.1);
                }
                (hero_row, villain_row)
            })
            .collect();

        let (hero, villain): (Vec<_>, Vec<_>) = cells.into_iter().unzip();
        Self::from_rows(hero, villain)
    }

    /// Number of hero pure strategies.
    pub fn rows(&self) -> usize {
        self.hero.len()
    }

    /// Number of villain pure strategies.
    pub fn cols(&self) -> usize {
        self.hero[0].len()
    }

    /// Hero's payoff matrix.
    pub fn hero(&self) -> &[Vec<f64>] {
        &self.hero
    }

    /// Villain's payoff matrix.
    pub fn villain(&self) -> &[Vec<f64>] {
        &self.villain
    }

    /// Hero's expected payoff for each pure strategy against `villain_mix`.
    pub fn hero_payoffs_against(&self, villain_mix: &[f64]) -> Vec<f64> {
        self.hero
            .iter()
            .map(|row| row.iter().zip(villain_mix).map(|(u, q)| u * q).sum())
            .collect()
    }

    /// Villain's expected payoff for each pure strategy against `hero_mix`.
    pub fn villain_payoffs_against(&self, hero_mix: &[f64]) -> Vec<f64> {
        let mut payoffs = vec![0.0; self.cols()];
        for (row, p) in self.villain.iter().zip(hero_mix) {
            if *p == 0.0 {
                continue;
            }
            for (acc, u) in payoffs.iter_mut().zip(row) {
                *acc += p * u;
            }
        }
        payoffs
    }

    /// Expected `(hero, villain)` utility of a mixed strategy profile.
    pub fn expected_utilities(&self, hero_mix: &[f64], villain_mix: &[f64]) -> (f64, f64) {
        let mut hero = 0.0;
        let mut villain = 0.0;
        for (i, p) in hero_mix.iter().enumerate() {
            if *p == 0.0 {
                continue;
            }
            for (j, q) in villain_mix.iter().enumerate() {
                hero += p * q * self.hero[i][j];
                villain += p * q * self.villain[i][j];
            }
        }
        (hero, villain)
    }
}
