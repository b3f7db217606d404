//! Equilibrium computation for the normal-form game.
//!
//! # Overview
//!
//! The subgame is reduced to a bimatrix game: rows are hero's pure
//! strategies, columns are villain's, and each cell holds both players'
//! prior-weighted expected utility ([`PayoffMatrix`]). The
//! [`EquilibriumSolver`] then iterates a smoothed fictitious play:
//!
//! ```text
//! current = softmax(payoffs_vs_opponent_average / eta)
//! average = average * (1 - w) + current * w,   w = 2 / (t + 2)
//! ```
//!
//! and stops once every free player's exploitability drops below the
//! threshold.
//!
//! Under logarithmic utility the game is not zero-sum; the two utilities
//! are reported independently.

pub mod config;
pub mod matrix;
pub mod solver;

pub use config::{SolverSettings, TracePoint};
pub use matrix::PayoffMatrix;
pub use solver::{EquilibriumSolver, FixedStrategy, Solution};
