//! Structured pure strategies.
//!
//! A [`PureStrategy`] is one plan per range category. Hero and villain
//! plans differ only in the shape of their line, so both implement
//! [`RangePlan`] and share the generic strategy containers.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::SolverError;
use crate::game::{Action, ActionStep, HeroLine, Player, VillainLine};

/// A range category's planned line.
pub trait RangePlan: Clone + fmt::Debug + Send + Sync {
    /// The line type for this player.
    type Line: Clone
        + PartialEq
        + fmt::Debug
        + fmt::Display
        + FromStr<Err = SolverError>
        + Send
        + Sync;

    /// Which player the plan belongs to.
    const PLAYER: Player;

    /// Create a plan for `range` (zero-based).
    fn new(range: usize, line: Self::Line) -> Self;

    /// Zero-based range index.
    fn range(&self) -> usize;

    /// The planned line.
    fn line(&self) -> &Self::Line;

    /// Action the plan prescribes after `history`.
    fn next_action(&self, history: &[ActionStep]) -> Option<Action>;
}

/// One hero range category and its line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HeroRangePlan {
    /// Zero-based range index.
    pub range: usize,
    /// Hero's line for this range.
    pub line: HeroLine,
}

impl RangePlan for HeroRangePlan {
    type Line = HeroLine;
    const PLAYER: Player = Player::Hero;

    fn new(range: usize, line: HeroLine) -> Self {
        Self { range, line }
    }

    fn range(&self) -> usize {
        self.range
    }

    fn line(&self) -> &HeroLine {
        &self.line
    }

    fn next_action(&self, history: &[ActionStep]) -> Option<Action> {
        self.line.next_action(history)
    }
}

impl HeroRangePlan {
    /// Create a plan for `range` (zero-based).
    pub fn new(range: usize, line: HeroLine) -> Self {
        <Self as RangePlan>::new(range, line)
    }
}

/// One villain range category and its line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VillainRangePlan {
    /// Zero-based range index.
    pub range: usize,
    /// Villain's line for this range.
    pub line: VillainLine,
}

impl RangePlan for VillainRangePlan {
    type Line = VillainLine;
    const PLAYER: Player = Player::Villain;

    fn new(range: usize, line: VillainLine) -> Self {
        Self { range, line }
    }

    fn range(&self) -> usize {
        self.range
    }

    fn line(&self) -> &VillainLine {
        &self.line
    }

    fn next_action(&self, history: &[ActionStep]) -> Option<Action> {
        self.line.next_action(history)
    }
}

impl VillainRangePlan {
    /// Create a plan for `range` (zero-based).
    pub fn new(range: usize, line: VillainLine) -> Self {
        <Self as RangePlan>::new(range, line)
    }
}

/// One plan per range category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PureStrategy<P> {
    /// Plans in label order.
    pub plans: Vec<P>,
}

/// A hero pure strategy.
pub type HeroStrategy = PureStrategy<HeroRangePlan>;
/// A villain pure strategy.
pub type VillainStrategy = PureStrategy<VillainRangePlan>;

impl<P: RangePlan> PureStrategy<P> {
    /// Wrap a list of plans.
    pub fn new(plans: Vec<P>) -> Self {
        Self { plans }
    }

    /// The plan for `range`, if the strategy covers it.
    pub fn plan_for(&self, range: usize) -> Option<&P> {
        self.plans.iter().find(|p| p.range() == range)
    }
}

impl<P: RangePlan> fmt::Display for PureStrategy<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, plan) in self.plans.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}{}:{}", P::PLAYER.tag(), plan.range() + 1, plan.line())?;
        }
        Ok(())
    }
}

/// A pure strategy with its probability in a mixed strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedStrategy<P> {
    /// Probability mass.
    pub probability: f64,
    /// The pure strategy.
    pub strategy: PureStrategy<P>,
}

impl<P: RangePlan> WeightedStrategy<P> {
    /// Pair a strategy with its probability.
    pub fn new(probability: f64, strategy: PureStrategy<P>) -> Self {
        Self {
            probability,
            strategy,
        }
    }

    /// Combined prescription weight of `action` after `history`.
    ///
    /// Sums `range_weight(r)` over every range whose plan prescribes
    /// `action`, scaled by this strategy's probability.
    pub fn action_weight<W>(&self, action: Action, history: &[ActionStep], range_weight: W) -> f64
    where
        W: Fn(usize) -> f64,
    {
        if self.probability <= 0.0 {
            return 0.0;
        }
        let covered: f64 = self
            .strategy
            .plans
            .iter()
            .filter(|plan| plan.next_action(history) == Some(action))
            .map(|plan| range_weight(plan.range()))
            .sum();
        self.probability * covered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label() {
        let strategy = HeroStrategy::new(vec![
            HeroRangePlan::new(0, HeroLine::new(vec![Action::Check, Action::Call])),
            HeroRangePlan::new(1, HeroLine::new(vec![Action::Bet, Action::Raise])),
        ]);
        assert_eq!(strategy.to_string(), "H1:ch-ca,H2:be-3b");
    }

    #[test]
    fn test_plan_lookup() {
        let strategy = VillainStrategy::new(vec![VillainRangePlan::new(
            2,
            VillainLine::new(vec![], vec![Action::Call]),
        )]);
        assert!(strategy.plan_for(2).is_some());
        assert!(strategy.plan_for(0).is_none());
        assert_eq!(strategy.to_string(), "V3:ch/ca");
    }

    #[test]
    fn test_action_weight() {
        let strategy = HeroStrategy::new(vec![
            HeroRangePlan::new(0, HeroLine::new(vec![Action::Bet])),
            HeroRangePlan::new(1, HeroLine::new(vec![Action::Check])),
        ]);
        let weighted = WeightedStrategy::new(0.5, strategy);
        let priors = [0.25, 0.75];
        let w = weighted.action_weight(Action::Bet, &[], |r| priors[r]);
        assert!((w - 0.125).abs() < 1e-12);
        let w = weighted.action_weight(Action::Check, &[], |r| priors[r]);
        assert!((w - 0.375).abs() < 1e-12);
    }
}
