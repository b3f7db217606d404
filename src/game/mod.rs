//! The betting subgame: configuration, actions, lines, payoffs and betting
//! rules.
//!
//! Hero acts first with a fixed set of range categories, villain responds.
//! Everything here is deterministic and independent of any solved strategy.

pub mod action;
pub mod betting;
pub mod config;
pub mod model;
pub mod payoff;

pub use action::{Action, ActionStep, Player};
pub use betting::{analyze_sequence, available_actions, simulate_lines, PotState};
pub use config::{BetFractions, Configuration, UtilityKind};
pub use model::{Depth, HeroLine, StrategySpace, VillainLine, MAX_MATRIX_CELLS, MAX_PURE_STRATEGIES};
pub use payoff::{BetSizes, Outcome, PayoffTable, Stake};
