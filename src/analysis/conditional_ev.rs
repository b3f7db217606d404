//! Expected value conditioned on each pair of range categories.
//!
//! For hero range `h` and villain range `v`, the solved mixed strategies
//! induce a distribution over the lines each range plays. The conditional
//! EV is the utility of the pair's outcomes under those distributions.
//! Weighting every cell by its joint prior must reproduce the solver's
//! overall utility; [`ConditionalEvMatrix::verify`] checks that.

use serde::Serialize;

use crate::equilibrium::Solution;
use crate::error::{Result, SolverError};
use crate::game::{BetSizes, Configuration, PayoffTable};
use crate::strategy::{HeroStrategy, PureStrategy, RangePlan, VillainStrategy};

/// Relative tolerance of the verification identity.
pub const VERIFICATION_TOLERANCE: f64 = 1e-6;

/// Conditional EV of one range pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalEv {
    /// Prior probability of the pair, `p_h * p_v`.
    pub joint_probability: f64,
    /// Hero's expected utility given the pair.
    pub hero_ev: f64,
    /// Villain's expected utility given the pair.
    pub villain_ev: f64,
}

/// Conditional EVs of every range pair, indexed `[hero_range][villain_range]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalEvMatrix {
    /// Per-pair results.
    pub cells: Vec<Vec<ConditionalEv>>,
    /// Prior-weighted sum of hero's conditional EVs.
    pub hero_verification: f64,
    /// Prior-weighted sum of villain's conditional EVs.
    pub villain_verification: f64,
}

impl ConditionalEvMatrix {
    /// Compute the matrix from a solution and its parsed pure strategies.
    ///
    /// `hero` and `villain` must be in matrix order, matching
    /// `solution.hero_strategy` and `solution.villain_strategy`.
    pub fn compute(
        config: &Configuration,
        hero: &[HeroStrategy],
        villain: &[VillainStrategy],
        solution: &Solution,
    ) -> Result<Self> {
        if hero.len() != solution.hero_strategy.len()
            || villain.len() != solution.villain_strategy.len()
        {
            return Err(SolverError::config(
                "parsed strategies do not match the solution dimensions",
            ));
        }

        let table = PayoffTable::new(config.depth()?)?;
        let sizes = BetSizes::new(config.pot_size, &config.bets);
        let hero_probs = config.hero_range_probs()?;
        let villain_probs = config.villain_range_probs()?;

        let hero_lines = (0..hero_probs.len())
            .map(|h| line_distribution(hero, &solution.hero_strategy, h))
            .collect::<Result<Vec<_>>>()?;
        let villain_lines = (0..villain_probs.len())
            .map(|v| line_distribution(villain, &solution.villain_strategy, v))
            .collect::<Result<Vec<_>>>()?;

        let mut cells = Vec::with_capacity(hero_probs.len());
        let mut hero_verification = 0.0;
        let mut villain_verification = 0.0;

        for (h, p_h) in hero_probs.iter().enumerate() {
            let mut row = Vec::with_capacity(villain_probs.len());
            for (v, p_v) in villain_probs.iter().enumerate() {
                let equity = config.equity(h, v)?;
                let mut hero_ev = 0.0;
                let mut villain_ev = 0.0;
                for (hero_line, q_h) in &hero_lines[h] {
                    for (villain_line, q_v) in &villain_lines[v] {
                        let (hero_pay, villain_pay) =
                            table.payoffs(hero_line, villain_line, equity, &sizes)?;
                        let q = q_h * q_v;
                        hero_ev += q * config.utility.apply(hero_pay, config.hero_stack);
                        villain_ev += q * config.utility.apply(villain_pay, config.villain_stack);
                    }
                }

                let joint_probability = p_h * p_v;
                hero_verification += joint_probability * hero_ev;
                villain_verification += joint_probability * villain_ev;
                row.push(ConditionalEv {
                    joint_probability,
                    hero_ev,
                    villain_ev,
                });
            }
            cells.push(row);
        }

        Ok(Self {
            cells,
            hero_verification,
            villain_verification,
        })
    }

    /// Cell for one range pair.
    pub fn cell(&self, hero_range: usize, villain_range: usize) -> Option<&ConditionalEv> {
        self.cells.get(hero_range).and_then(|row| row.get(villain_range))
    }

    /// Check the verification sums against the solver's utilities.
    pub fn verify(&self, solution: &Solution) -> Result<()> {
        let pairs = [
            ("hero", self.hero_verification, solution.hero_utility),
            ("villain", self.villain_verification, solution.villain_utility),
        ];
        for (player, verified, expected) in pairs {
            let tolerance = VERIFICATION_TOLERANCE * expected.abs().max(1.0);
            if (verified - expected).abs() > tolerance {
                return Err(SolverError::logic(format!(
                    "{} conditional EV sums to {} but solver utility is {}",
                    player, verified, expected
                )));
            }
        }
        log::debug!(
            "conditional EV verified: hero {:.6}, villain {:.6}",
            self.hero_verification,
            self.villain_verification
        );
        Ok(())
    }
}

/// Probability of each line `range` plays under the mixed strategy `mix`.
///
/// Lines with zero probability are omitted.
fn line_distribution<P: RangePlan>(
    strategies: &[PureStrategy<P>],
    mix: &[f64],
    range: usize,
) -> Result<Vec<(P::Line, f64)>> {
    let mut lines: Vec<(P::Line, f64)> = Vec::new();
    for (strategy, p) in strategies.iter().zip(mix) {
        if *p <= 0.0 {
            continue;
        }
        let plan = strategy.plan_for(range).ok_or_else(|| {
            SolverError::config(format!(
                "strategy '{}' has no plan for {}{}",
                strategy,
                P::PLAYER.tag(),
                range + 1
            ))
        })?;
        match lines.iter_mut().find(|(line, _)| line == plan.line()) {
            Some((_, q)) => *q += p,
            None => lines.push((plan.line().clone(), *p)),
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equilibrium::{EquilibriumSolver, PayoffMatrix};
    use crate::game::StrategySpace;

    fn solve(config: &Configuration) -> (StrategySpace, Solution) {
        let space = StrategySpace::new(
            config.depth().unwrap(),
            config.hero_ranges.len(),
            config.villain_ranges.len(),
        )
        .unwrap();
        let matrix = PayoffMatrix::build(config, &space).unwrap();
        let solution = EquilibriumSolver::new(&matrix, config.solver.clone())
            .solve()
            .unwrap();
        (space, solution)
    }

    fn strategies(space: &StrategySpace) -> (Vec<HeroStrategy>, Vec<VillainStrategy>) {
        (
            (0..space.num_hero_strategies()).map(|i| space.hero_strategy(i)).collect(),
            (0..space.num_villain_strategies()).map(|j| space.villain_strategy(j)).collect(),
        )
    }

    #[test]
    fn test_verification_matches_default_solution() {
        let config = Configuration::default();
        let (space, solution) = solve(&config);
        let (hero, villain) = strategies(&space);
        let cev = ConditionalEvMatrix::compute(&config, &hero, &villain, &solution).unwrap();

        assert_eq!(cev.cells.len(), 2);
        assert!((cev.cell(0, 1).unwrap().joint_probability - 0.45 * 0.45).abs() < 1e-12);
        assert!(cev.verify(&solution).is_ok());
    }

    #[test]
    fn test_tampered_utility_fails_verification() {
        let config = Configuration::default().with_max_actions(2);
        let (space, mut solution) = solve(&config);
        let (hero, villain) = strategies(&space);
        let cev = ConditionalEvMatrix::compute(&config, &hero, &villain, &solution).unwrap();
        solution.hero_utility += 1.0;
        assert!(matches!(cev.verify(&solution), Err(SolverError::Logic(_))));
    }

    #[test]
    fn test_dimension_mismatch() {
        let config = Configuration::default().with_max_actions(2);
        let (space, solution) = solve(&config);
        let (hero, villain) = strategies(&space);
        let err = ConditionalEvMatrix::compute(&config, &hero[..1], &villain, &solution).unwrap_err();
        assert!(matches!(err, SolverError::Configuration(_)));
    }
}
