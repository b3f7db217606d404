//! # Subgame Solver
//!
//! Approximate equilibrium and range analysis for a two-player, single-street
//! poker betting subgame.
//!
//! ## Features
//!
//! - **Normal-form reduction**: every combination of per-range action lines
//!   becomes a pure strategy; payoffs are averaged over range priors
//! - **Iterative solver**: smoothed fictitious play with exploitability trace
//! - **Fixed strategies**: pin either player to a preset mixed strategy
//! - **Conditional EV**: per range-pair decomposition, verified against the
//!   solver's utility
//! - **Game tree**: the extensive-form view of the solution with pruning and
//!   range conditioning
//! - **Range explorer**: posterior ranges after an observed action sequence
//!
//! ## Quick Start
//!
//! ```
//! use subgame_solver::{Analysis, Conditioning, Configuration};
//!
//! let config = Configuration::default().with_max_actions(2);
//! let analysis = Analysis::run(&config).unwrap();
//!
//! println!("hero utility {:.3}", analysis.solution.hero_utility);
//! println!("{}", analysis.hero_preset());
//!
//! let tree = analysis.game_tree(Conditioning::none(), 0.001).unwrap();
//! assert!(!tree.is_empty());
//! ```
//!
//! ## Modules
//!
//! - [`game`]: configuration, actions, lines, bet sizing, payoffs
//! - [`equilibrium`]: payoff matrix and solver
//! - [`strategy`]: strategy labels, structured plans, presets
//! - [`analysis`]: conditional EV, game tree, range explorer, pipeline
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Configuration (game::config)                 │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//!      StrategySpace ──► PayoffTable ──► PayoffMatrix (rayon rows)
//!                                              │
//!                                              ▼
//!                                     EquilibriumSolver
//!                                              │ Solution
//!                                              ▼
//!                                   strategy labels ─► plans
//!                                              │
//!         ┌────────────────────────────────────┼───────────────────┐
//!         ▼                                    ▼                   ▼
//!  ┌──────────────┐                    ┌───────────┐      ┌────────────────┐
//!  │ Conditional  │                    │ Game Tree │      │ Range Explorer │
//!  │     EV       │                    └───────────┘      └────────────────┘
//!  └──────────────┘
//! ```

#![warn(missing_docs)]

/// Error types.
pub mod error;

/// The betting subgame: configuration, model, payoffs, betting rules.
pub mod game;

/// Payoff matrix construction and the equilibrium solver.
pub mod equilibrium;

/// Strategy labels, plans and presets.
pub mod strategy;

/// Conditional EV, game tree, range explorer and the analysis pipeline.
pub mod analysis;

// Re-export commonly used types at crate root for convenience
pub use analysis::{Analysis, Conditioning, ConditionalEvMatrix, GameTree, RangePosteriors};
pub use equilibrium::{EquilibriumSolver, PayoffMatrix, Solution, SolverSettings};
pub use error::{Result, SolverError};
pub use game::{Action, BetFractions, Configuration, UtilityKind};
