//! Betting actions and the two seats of the subgame.
//!
//! Actions carry no amounts: every bet and raise is sized from the pot by
//! [`BetSizes`](super::payoff::BetSizes), so an action is fully described by
//! its kind.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SolverError};

/// The two players. Hero always acts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// First to act; owns the matrix rows.
    Hero,
    /// Second to act; owns the matrix columns.
    Villain,
}

impl Player {
    /// The other player.
    pub fn opponent(&self) -> Player {
        match self {
            Player::Hero => Player::Villain,
            Player::Villain => Player::Hero,
        }
    }

    /// Prefix used in range tags (`H1`, `V2`).
    pub fn tag(&self) -> char {
        match self {
            Player::Hero => 'H',
            Player::Villain => 'V',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Hero => write!(f, "Hero"),
            Player::Villain => write!(f, "Villain"),
        }
    }
}

/// A betting action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    /// Pass when not facing a bet.
    Check,
    /// Open the betting.
    Bet,
    /// Give up the pot when facing a bet.
    Fold,
    /// Match the outstanding bet; closes the action.
    Call,
    /// Re-raise an outstanding bet (raise or 3-bet).
    Raise,
}

impl Action {
    /// Bets and raises.
    pub fn is_aggressive(&self) -> bool {
        matches!(self, Action::Bet | Action::Raise)
    }

    /// Two-letter token used in strategy labels.
    pub fn token(&self) -> &'static str {
        match self {
            Action::Check => "ch",
            Action::Bet => "be",
            Action::Fold => "fo",
            Action::Call => "ca",
            Action::Raise => "ra",
        }
    }

    /// Parse a label token. `3b` is accepted as a raise.
    pub fn from_token(token: &str) -> Result<Self> {
        match token {
            "ch" => Ok(Action::Check),
            "be" => Ok(Action::Bet),
            "fo" => Ok(Action::Fold),
            "ca" => Ok(Action::Call),
            "ra" | "3b" => Ok(Action::Raise),
            other => Err(SolverError::parse(format!("unknown action token '{}'", other))),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Check => write!(f, "Check"),
            Action::Bet => write!(f, "Bet"),
            Action::Fold => write!(f, "Fold"),
            Action::Call => write!(f, "Call"),
            Action::Raise => write!(f, "Raise"),
        }
    }
}

/// One action taken by one player in a betting history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionStep {
    /// Who acted.
    pub player: Player,
    /// What they did.
    pub action: Action,
}

impl ActionStep {
    /// Create a step.
    pub fn new(player: Player, action: Action) -> Self {
        Self { player, action }
    }
}

impl fmt::Display for ActionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.player.tag(), self.action.token())
    }
}
