//! Game model: action depth, per-range action lines and the pure strategy
//! space.
//!
//! A *line* is the complete sequence of actions one range category plans to
//! take on the street. Hero has a single line; villain has one line for the
//! case where hero checks and one for the case where hero bets. The set of
//! legal lines (the *vocabulary*) depends only on the action depth.
//!
//! A pure strategy picks one line per range category. With `k` lines and `n`
//! ranges there are `k^n` pure strategies, and strategy `i` assigns range `r`
//! the line at index `(i / k^r) % k` (range 0 varies fastest).

use serde::{Deserialize, Serialize};

use super::action::{Action, ActionStep, Player};
use crate::error::{Result, SolverError};
use crate::strategy::{HeroRangePlan, HeroStrategy, PureStrategy, VillainRangePlan, VillainStrategy};

/// Upper bound on pure strategies per player.
pub const MAX_PURE_STRATEGIES: usize = 1 << 20;

/// Upper bound on payoff matrix cells (hero strategies times villain
/// strategies).
pub const MAX_MATRIX_CELLS: usize = 1 << 24;

/// Maximum number of actions on the street. Only 2, 3 and 4 are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Depth(u8);

impl Depth {
    /// Smallest supported depth.
    pub const MIN: u8 = 2;
    /// Largest supported depth.
    pub const MAX: u8 = 4;

    /// Validate a raw depth.
    pub fn new(max_actions: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&max_actions) {
            Ok(Depth(max_actions))
        } else {
            Err(SolverError::config(format!(
                "maxActions {} is not supported (expected {}..={})",
                max_actions,
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// Raw action count.
    pub fn get(&self) -> u8 {
        self.0
    }

    /// Action count as an index bound.
    pub fn max_actions(&self) -> usize {
        self.0 as usize
    }

    /// Hard bound on game tree depth.
    pub fn tree_depth_bound(&self) -> usize {
        2 * self.max_actions() + 2
    }
}

/// Hero's planned action sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeroLine {
    /// Hero's own actions in order.
    pub actions: Vec<Action>,
}

impl HeroLine {
    /// Create a line from hero's actions.
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// Hero's first action.
    pub fn opening(&self) -> Option<Action> {
        self.actions.first().copied()
    }

    /// The action this line prescribes after `history`, if hero is still on
    /// the line. Hero's past actions must be a prefix of the line.
    pub fn next_action(&self, history: &[ActionStep]) -> Option<Action> {
        let taken: Vec<Action> = actions_of(history, Player::Hero).collect();
        if taken.len() >= self.actions.len() || self.actions[..taken.len()] != taken[..] {
            return None;
        }
        Some(self.actions[taken.len()])
    }
}

/// Villain's planned responses, one branch per hero opening.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VillainLine {
    /// Responses after hero checks. Empty means check back.
    pub if_hero_checks: Vec<Action>,
    /// Responses after hero bets.
    pub if_hero_bets: Vec<Action>,
}

const CHECK_BACK: &[Action] = &[Action::Check];

impl VillainLine {
    /// Create a line from both branches.
    pub fn new(if_hero_checks: Vec<Action>, if_hero_bets: Vec<Action>) -> Self {
        Self {
            if_hero_checks,
            if_hero_bets,
        }
    }

    /// Effective action sequence after hero opens with `opening`.
    pub fn branch(&self, opening: Action) -> &[Action] {
        match opening {
            Action::Bet => &self.if_hero_bets,
            _ if self.if_hero_checks.is_empty() => CHECK_BACK,
            _ => &self.if_hero_checks,
        }
    }

    /// The action this line prescribes after `history`.
    pub fn next_action(&self, history: &[ActionStep]) -> Option<Action> {
        let opening = history.iter().find(|s| s.player == Player::Hero)?.action;
        let branch = self.branch(opening);
        let taken = actions_of(history, Player::Villain).count();
        branch.get(taken).copied()
    }
}

fn actions_of(history: &[ActionStep], player: Player) -> impl Iterator<Item = Action> + '_ {
    history
        .iter()
        .filter(move |s| s.player == player)
        .map(|s| s.action)
}

/// Hero's legal lines at `depth`.
pub fn hero_vocabulary(depth: Depth) -> Vec<HeroLine> {
    use Action::*;
    let lines: &[&[Action]] = match depth.get() {
        2 => &[&[Check], &[Bet]],
        3 => &[&[Check, Fold], &[Check, Call], &[Bet, Fold], &[Bet, Call]],
        _ => &[
            &[Check, Fold],
            &[Check, Call],
            &[Check, Raise],
            &[Bet, Fold],
            &[Bet, Call],
            &[Bet, Raise],
        ],
    };
    lines.iter().map(|l| HeroLine::new(l.to_vec())).collect()
}

/// Villain's legal lines at `depth`.
pub fn villain_vocabulary(depth: Depth) -> Vec<VillainLine> {
    use Action::*;
    let checked: &[&[Action]] = match depth.get() {
        2 => &[&[]],
        3 => &[&[], &[Bet]],
        _ => &[&[], &[Bet, Fold], &[Bet, Call]],
    };
    let bet: &[&[Action]] = match depth.get() {
        2 => &[&[Fold], &[Call]],
        3 => &[&[Fold], &[Call], &[Raise]],
        _ => &[&[Fold], &[Call], &[Raise, Fold], &[Raise, Call]],
    };
    checked
        .iter()
        .flat_map(|c| bet.iter().map(move |b| VillainLine::new(c.to_vec(), b.to_vec())))
        .collect()
}

/// Enumerates both players' pure strategies for one configuration.
#[derive(Debug, Clone)]
pub struct StrategySpace {
    depth: Depth,
    hero_lines: Vec<HeroLine>,
    villain_lines: Vec<VillainLine>,
    hero_ranges: usize,
    villain_ranges: usize,
    hero_count: usize,
    villain_count: usize,
}

impl StrategySpace {
    /// Build the space for `depth` with the given number of range categories.
    pub fn new(depth: Depth, hero_ranges: usize, villain_ranges: usize) -> Result<Self> {
        let hero_lines = hero_vocabulary(depth);
        let villain_lines = villain_vocabulary(depth);
        let hero_count = strategy_count(Player::Hero, hero_lines.len(), hero_ranges)?;
        let villain_count = strategy_count(Player::Villain, villain_lines.len(), villain_ranges)?;
        hero_count
            .checked_mul(villain_count)
            .filter(|cells| *cells <= MAX_MATRIX_CELLS)
            .ok_or_else(|| {
                SolverError::config(format!(
                    "{} x {} payoff matrix is too large (limit {} cells)",
                    hero_count, villain_count, MAX_MATRIX_CELLS
                ))
            })?;

        Ok(Self {
            depth,
            hero_lines,
            villain_lines,
            hero_ranges,
            villain_ranges,
            hero_count,
            villain_count,
        })
    }

    /// Action depth.
    pub fn depth(&self) -> Depth {
        self.depth
    }

    /// Hero's vocabulary.
    pub fn hero_lines(&self) -> &[HeroLine] {
        &self.hero_lines
    }

    /// Villain's vocabulary.
    pub fn villain_lines(&self) -> &[VillainLine] {
        &self.villain_lines
    }

    /// Number of hero range categories.
    pub fn hero_ranges(&self) -> usize {
        self.hero_ranges
    }

    /// Number of villain range categories.
    pub fn villain_ranges(&self) -> usize {
        self.villain_ranges
    }

    /// Number of hero pure strategies (matrix rows).
    pub fn num_hero_strategies(&self) -> usize {
        self.hero_count
    }

    /// Number of villain pure strategies (matrix columns).
    pub fn num_villain_strategies(&self) -> usize {
        self.villain_count
    }

    /// Vocabulary index of the line hero strategy `strategy` plays in `range`.
    pub fn hero_line_index(&self, strategy: usize, range: usize) -> usize {
        line_digit(strategy, self.hero_lines.len(), range)
    }

    /// Vocabulary index of the line villain strategy `strategy` plays in `range`.
    pub fn villain_line_index(&self, strategy: usize, range: usize) -> usize {
        line_digit(strategy, self.villain_lines.len(), range)
    }

    /// Line indices of one hero strategy, by range.
    pub fn hero_line_indices(&self, strategy: usize) -> Vec<usize> {
        (0..self.hero_ranges)
            .map(|r| self.hero_line_index(strategy, r))
            .collect()
    }

    /// Line indices of one villain strategy, by range.
    pub fn villain_line_indices(&self, strategy: usize) -> Vec<usize> {
        (0..self.villain_ranges)
            .map(|r| self.villain_line_index(strategy, r))
            .collect()
    }

    /// Structured form of hero strategy `strategy`.
    pub fn hero_strategy(&self, strategy: usize) -> HeroStrategy {
        PureStrategy::new(
            self.hero_line_indices(strategy)
                .into_iter()
                .enumerate()
                .map(|(range, idx)| HeroRangePlan::new(range, self.hero_lines[idx].clone()))
                .collect(),
        )
    }

    /// Structured form of villain strategy `strategy`.
    pub fn villain_strategy(&self, strategy: usize) -> VillainStrategy {
        PureStrategy::new(
            self.villain_line_indices(strategy)
                .into_iter()
                .enumerate()
                .map(|(range, idx)| VillainRangePlan::new(range, self.villain_lines[idx].clone()))
                .collect(),
        )
    }

    /// Labels of every hero pure strategy, in matrix row order.
    pub fn hero_labels(&self) -> Vec<String> {
        (0..self.hero_count)
            .map(|i| self.hero_strategy(i).to_string())
            .collect()
    }

    /// Labels of every villain pure strategy, in matrix column order.
    pub fn villain_labels(&self) -> Vec<String> {
        (0..self.villain_count)
            .map(|j| self.villain_strategy(j).to_string())
            .collect()
    }
}

fn line_digit(strategy: usize, base: usize, position: usize) -> usize {
    // base^position never overflows: base^ranges was checked at construction.
    (strategy / base.pow(position as u32)) % base
}

fn strategy_count(player: Player, lines: usize, ranges: usize) -> Result<usize> {
    if ranges == 0 {
        return Err(SolverError::config(format!("{} has no range categories", player)));
    }
    u32::try_from(ranges)
        .ok()
        .and_then(|n| lines.checked_pow(n))
        .filter(|count| *count <= MAX_PURE_STRATEGIES)
        .ok_or_else(|| {
            SolverError::config(format!(
                "{} with {} ranges has too many pure strategies (limit {})",
                player, ranges, MAX_PURE_STRATEGIES
            ))
        })
}
