//! Post-solve analysis and the end-to-end pipeline.
//!
//! ```text
//! Configuration ─► StrategySpace ─► PayoffMatrix ─► EquilibriumSolver
//!                                                        │ Solution
//!                          labels ─► strategy parser ◄───┘
//!                                         │
//!                 ┌───────────────────────┼──────────────────────┐
//!                 ▼                       ▼                      ▼
//!        ConditionalEvMatrix          GameTree            RangePosteriors
//! ```
//!
//! [`Analysis::run`] performs every stage up to the conditional EV matrix
//! and verifies it. Trees and posteriors are computed on demand.

pub mod conditional_ev;
pub mod explorer;
pub mod tree;

pub use conditional_ev::{ConditionalEv, ConditionalEvMatrix};
pub use explorer::{range_posteriors, RangePosteriors};
pub use tree::{Conditioning, GameTree, GameTreeBuilder, GameTreeNode, DEFAULT_PRUNING_THRESHOLD};

use serde::Serialize;

use crate::equilibrium::{EquilibriumSolver, PayoffMatrix, Solution, TracePoint};
use crate::error::{Result, SolverError};
use crate::game::{ActionStep, BetSizes, Configuration, StrategySpace};
use crate::strategy::{
    fixed_strategy, format_preset, HeroRangePlan, HeroStrategy, PureStrategy, RangePlan,
    VillainRangePlan, VillainStrategy, WeightedStrategy,
};

/// Everything derived from one configuration.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The validated input.
    pub config: Configuration,
    /// Absolute bet sizes.
    pub bet_sizes: BetSizes,
    /// Pure strategy enumeration.
    pub space: StrategySpace,
    /// Hero pure strategy labels, in row order.
    pub hero_labels: Vec<String>,
    /// Villain pure strategy labels, in column order.
    pub villain_labels: Vec<String>,
    /// The bimatrix game.
    pub matrix: PayoffMatrix,
    /// Solver output.
    pub solution: Solution,
    /// Per range pair EV, verified against the solution.
    pub conditional_ev: ConditionalEvMatrix,
    hero_strategies: Vec<HeroStrategy>,
    villain_strategies: Vec<VillainStrategy>,
}

impl Analysis {
    /// Run the pipeline.
    pub fn run(config: &Configuration) -> Result<Self> {
        Self::run_with_callback(config, |_| {})
    }

    /// Run the pipeline, reporting every solver iteration to `callback`.
    pub fn run_with_callback<F>(config: &Configuration, callback: F) -> Result<Self>
    where
        F: FnMut(&TracePoint),
    {
        config.validate()?;
        let space = StrategySpace::new(
            config.depth()?,
            config.hero_ranges.len(),
            config.villain_ranges.len(),
        )?;
        let hero_labels = space.hero_labels();
        let villain_labels = space.villain_labels();

        let hero_fixed = fixed_strategy::<HeroRangePlan>(
            config.hero_fixed_strategy.as_deref().unwrap_or(""),
            &hero_labels,
        )?;
        let villain_fixed = fixed_strategy::<VillainRangePlan>(
            config.villain_fixed_strategy.as_deref().unwrap_or(""),
            &villain_labels,
        )?;

        log::info!(
            "analysing depth {} subgame: {} hero x {} villain strategies",
            config.max_actions,
            space.num_hero_strategies(),
            space.num_villain_strategies()
        );

        let matrix = PayoffMatrix::build(config, &space)?;
        let mut solver = EquilibriumSolver::new(&matrix, config.solver.clone());
        if let Some(fixed) = hero_fixed {
            solver = solver.with_hero_fixed(fixed);
        }
        if let Some(fixed) = villain_fixed {
            solver = solver.with_villain_fixed(fixed);
        }
        let solution = solver.solve_with_callback(callback)?;

        let hero_strategies = parse_labels::<HeroRangePlan>(&hero_labels)?;
        let villain_strategies = parse_labels::<VillainRangePlan>(&villain_labels)?;
        let conditional_ev =
            ConditionalEvMatrix::compute(config, &hero_strategies, &villain_strategies, &solution)?;
        conditional_ev.verify(&solution)?;

        Ok(Self {
            config: config.clone(),
            bet_sizes: BetSizes::new(config.pot_size, &config.bets),
            space,
            hero_labels,
            villain_labels,
            matrix,
            solution,
            conditional_ev,
            hero_strategies,
            villain_strategies,
        })
    }

    /// Hero's solved mixed strategy as weighted pure strategies.
    pub fn hero_mix(&self) -> Vec<WeightedStrategy<HeroRangePlan>> {
        weighted(&self.hero_strategies, &self.solution.hero_strategy)
    }

    /// Villain's solved mixed strategy as weighted pure strategies.
    pub fn villain_mix(&self) -> Vec<WeightedStrategy<VillainRangePlan>> {
        weighted(&self.villain_strategies, &self.solution.villain_strategy)
    }

    /// Game tree of the solved profile.
    pub fn game_tree(&self, conditioning: Conditioning, pruning_threshold: f64) -> Result<GameTree> {
        let hero = self.hero_mix();
        let villain = self.villain_mix();
        let hero_priors = self.config.hero_range_probs()?;
        let villain_priors = self.config.villain_range_probs()?;
        GameTreeBuilder::new(self.space.depth(), &hero, &villain, &hero_priors, &villain_priors)
            .with_conditioning(conditioning)
            .with_pruning_threshold(pruning_threshold)
            .build()
    }

    /// Range posteriors after `selection` under the solved profile.
    pub fn range_posteriors(&self, selection: &[ActionStep]) -> Result<RangePosteriors> {
        range_posteriors(
            self.space.depth(),
            selection,
            &self.hero_mix(),
            &self.villain_mix(),
            &self.config.hero_range_probs()?,
            &self.config.villain_range_probs()?,
        )
    }

    /// Serialize the analysis results as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        let report = AnalysisReport {
            config: &self.config,
            bet_sizes: &self.bet_sizes,
            hero_labels: &self.hero_labels,
            villain_labels: &self.villain_labels,
            solution: &self.solution,
            conditional_ev: &self.conditional_ev,
        };
        serde_json::to_string_pretty(&report)
            .map_err(|e| SolverError::logic(format!("failed to serialize analysis: {}", e)))
    }

    /// Hero's solved strategy in preset form.
    pub fn hero_preset(&self) -> String {
        format_preset(&self.solution.hero_strategy, &self.hero_labels)
    }

    /// Villain's solved strategy in preset form.
    pub fn villain_preset(&self) -> String {
        format_preset(&self.solution.villain_strategy, &self.villain_labels)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisReport<'a> {
    config: &'a Configuration,
    bet_sizes: &'a BetSizes,
    hero_labels: &'a [String],
    villain_labels: &'a [String],
    solution: &'a Solution,
    conditional_ev: &'a ConditionalEvMatrix,
}

fn parse_labels<P: RangePlan>(labels: &[String]) -> Result<Vec<PureStrategy<P>>> {
    labels.iter().map(|l| l.parse()).collect()
}

fn weighted<P: RangePlan>(strategies: &[PureStrategy<P>], mix: &[f64]) -> Vec<WeightedStrategy<P>> {
    strategies
        .iter()
        .zip(mix)
        .filter(|(_, p)| **p > 0.0)
        .map(|(s, p)| WeightedStrategy::new(*p, s.clone()))
        .collect()
}
