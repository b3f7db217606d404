//! Bet sizing and terminal payoffs.
//!
//! Every pair of hero and villain lines ends the hand in exactly one way:
//! a showdown, or one player folding. [`PayoffTable`] maps each pair of the
//! depth's vocabularies to that [`Outcome`]; [`Outcome::settle`] turns it into
//! money for a concrete pot, bet sizing and equity.

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::action::Action;
use super::config::BetFractions;
use super::model::{hero_vocabulary, villain_vocabulary, Depth, HeroLine, VillainLine};
use crate::error::{Result, SolverError};

/// Absolute bet totals for one configuration.
///
/// Each value is the total a player has put in by the time that action is
/// complete. Sizes escalate along a line: every action is its fraction times
/// the pot as it would stand with all earlier bets called.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BetSizes {
    /// Pot before the first action.
    pub pot: f64,
    /// Hero's opening bet.
    pub hero_bet: f64,
    /// Villain's raise total over hero's bet.
    pub villain_raise: f64,
    /// Hero's 3-bet total.
    #[serde(rename = "hero3bet")]
    pub hero_3bet: f64,
    /// Villain's bet after hero checks.
    pub villain_bet: f64,
    /// Hero's check-raise total.
    pub hero_raise: f64,
}

impl BetSizes {
    /// Derive the totals for `pot` and `fractions`.
    pub fn new(pot: f64, fractions: &BetFractions) -> Self {
        let hero_opens = escalate(
            pot,
            &[fractions.hero_bet, fractions.villain_raise, fractions.hero_3bet],
        );
        let hero_checks = escalate(pot, &[fractions.villain_bet, fractions.hero_raise]);

        Self {
            pot,
            hero_bet: hero_opens[0],
            villain_raise: hero_opens[1],
            hero_3bet: hero_opens[2],
            villain_bet: hero_checks[0],
            hero_raise: hero_checks[1],
        }
    }

    /// Amount each player has committed at `stake`.
    pub fn committed(&self, stake: Stake) -> f64 {
        match stake {
            Stake::Nothing => 0.0,
            Stake::HeroBet => self.hero_bet,
            Stake::VillainBet => self.villain_bet,
            Stake::HeroRaise => self.hero_raise,
            Stake::VillainRaise => self.villain_raise,
            Stake::Hero3Bet => self.hero_3bet,
        }
    }
}

fn escalate(pot: f64, fractions: &[f64]) -> Vec<f64> {
    let mut pot = pot;
    let mut total = 0.0;
    fractions
        .iter()
        .map(|fraction| {
            let size = pot * fraction;
            pot += 2.0 * size;
            total += size;
            total
        })
        .collect()
}

/// The amount matched by both players when the hand ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stake {
    /// No money beyond the pot.
    Nothing,
    /// Hero's bet.
    HeroBet,
    /// Villain's bet.
    VillainBet,
    /// Hero's check-raise.
    HeroRaise,
    /// Villain's raise.
    VillainRaise,
    /// Hero's 3-bet.
    Hero3Bet,
}

/// How a line pair ends.
///
/// For folds the stake is what the folding player had already matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    /// Both players put in the stake and equity decides.
    Showdown(Stake),
    /// Villain folds.
    HeroTakesPot(Stake),
    /// Hero folds.
    VillainTakesPot(Stake),
}

impl Outcome {
    /// Monetary result `(hero, villain)` relative to the start of the street.
    pub fn settle(&self, equity: f64, sizes: &BetSizes) -> (f64, f64) {
        let pot = sizes.pot;
        match *self {
            Outcome::Showdown(stake) => {
                let s = sizes.committed(stake);
                let final_pot = pot + 2.0 * s;
                (equity * final_pot - s, (1.0 - equity) * final_pot - s)
            }
            Outcome::HeroTakesPot(stake) => {
                let s = sizes.committed(stake);
                (pot + s, -s)
            }
            Outcome::VillainTakesPot(stake) => {
                let s = sizes.committed(stake);
                (-s, pot + s)
            }
        }
    }
}

fn resolve(depth: Depth, hero: &HeroLine, villain: &VillainLine) -> Option<Outcome> {
    use Action::*;
    use Outcome::*;

    let d = depth.get();
    let shape = (
        hero.actions.as_slice(),
        villain.if_hero_checks.as_slice(),
        villain.if_hero_bets.as_slice(),
    );
    match (d, shape) {
        (2, ([Check], [], [_])) => Some(Showdown(Stake::Nothing)),
        (2, ([Bet], [], [Fold])) => Some(HeroTakesPot(Stake::Nothing)),
        (2, ([Bet], [], [Call])) => Some(Showdown(Stake::HeroBet)),

        // hero checks
        (3 | 4, ([Check, _], [], _)) => Some(Showdown(Stake::Nothing)),
        (3 | 4, ([Check, Fold], [Bet, ..], _)) => Some(VillainTakesPot(Stake::Nothing)),
        (3 | 4, ([Check, Call], [Bet, ..], _)) => Some(Showdown(Stake::VillainBet)),
        (4, ([Check, Raise], [Bet, Fold], _)) => Some(HeroTakesPot(Stake::VillainBet)),
        (4, ([Check, Raise], [Bet, Call], _)) => Some(Showdown(Stake::HeroRaise)),

        // hero bets
        (3 | 4, ([Bet, _], _, [Fold])) => Some(HeroTakesPot(Stake::Nothing)),
        (3 | 4, ([Bet, _], _, [Call])) => Some(Showdown(Stake::HeroBet)),
        (3 | 4, ([Bet, Fold], _, [Raise, ..])) => Some(VillainTakesPot(Stake::HeroBet)),
        (3 | 4, ([Bet, Call], _, [Raise, ..])) => Some(Showdown(Stake::VillainRaise)),
        (4, ([Bet, Raise], _, [Raise, Fold])) => Some(HeroTakesPot(Stake::VillainRaise)),
        (4, ([Bet, Raise], _, [Raise, Call])) => Some(Showdown(Stake::Hero3Bet)),

        _ => None,
    }
}

/// Outcome of every vocabulary line pair at one depth.
#[derive(Debug, Clone)]
pub struct PayoffTable {
    depth: Depth,
    outcomes: FxHashMap<HeroLine, FxHashMap<VillainLine, Outcome>>,
}

impl PayoffTable {
    /// Build the table for `depth`. Fails if any pair has no outcome.
    pub fn new(depth: Depth) -> Result<Self> {
        let heroes = hero_vocabulary(depth);
        let villains = villain_vocabulary(depth);
        let mut outcomes = FxHashMap::default();

        for hero in &heroes {
            let mut row = FxHashMap::default();
            for villain in &villains {
                let outcome = resolve(depth, hero, villain).ok_or_else(|| {
                    SolverError::logic(format!(
                        "no outcome for {:?} against {:?} at depth {}",
                        hero,
                        villain,
                        depth.get()
                    ))
                })?;
                row.insert(villain.clone(), outcome);
            }
            outcomes.insert(hero.clone(), row);
        }

        log::debug!(
            "payoff table for depth {}: {} x {} line pairs",
            depth.get(),
            heroes.len(),
            villains.len()
        );
        Ok(Self { depth, outcomes })
    }

    /// Depth this table covers.
    pub fn depth(&self) -> Depth {
        self.depth
    }

    /// Outcome of a line pair.
    pub fn outcome(&self, hero: &HeroLine, villain: &VillainLine) -> Result<Outcome> {
        self.outcomes
            .get(hero)
            .and_then(|row| row.get(villain))
            .copied()
            .ok_or_else(|| {
                SolverError::logic(format!(
                    "line pair {:?} / {:?} is not in the depth {} payoff table",
                    hero,
                    villain,
                    self.depth.get()
                ))
            })
    }

    /// Monetary result `(hero, villain)` of a line pair.
    pub fn payoffs(
        &self,
        hero: &HeroLine,
        villain: &VillainLine,
        equity: f64,
        sizes: &BetSizes,
    ) -> Result<(f64, f64)> {
        Ok(self.outcome(hero, villain)?.settle(equity, sizes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth(d: u8) -> Depth {
        Depth::new(d).unwrap()
    }

    fn hero(actions: &[Action]) -> HeroLine {
        HeroLine::new(actions.to_vec())
    }

    fn villain(checked: &[Action], bet: &[Action]) -> VillainLine {
        VillainLine::new(checked.to_vec(), bet.to_vec())
    }

    #[test]
    fn test_bet_sizes_pot_sized() {
        let sizes = BetSizes::new(20.0, &BetFractions::default());
        assert_eq!(sizes.hero_bet, 20.0);
        // 20 + 60 * 1
        assert_eq!(sizes.villain_raise, 80.0);
        // 80 + (20 + 40 + 120) * 1
        assert_eq!(sizes.hero_3bet, 260.0);
        assert_eq!(sizes.villain_bet, 20.0);
        assert_eq!(sizes.hero_raise, 80.0);
    }

    #[test]
    fn test_bet_sizes_fractional() {
        let fractions = BetFractions {
            hero_bet: 0.5,
            villain_bet: 0.75,
            hero_raise: 0.5,
            villain_raise: 1.0,
            hero_3bet: 0.25,
        };
        let sizes = BetSizes::new(10.0, &fractions);
        assert!((sizes.hero_bet - 5.0).abs() < 1e-12);
        assert!((sizes.villain_raise - 25.0).abs() < 1e-12);
        // pot after raise called: 10 + 10 + 40 = 60
        assert!((sizes.hero_3bet - 40.0).abs() < 1e-12);
        assert!((sizes.villain_bet - 7.5).abs() < 1e-12);
        assert!((sizes.hero_raise - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_table_complete_at_every_depth() {
        for d in 2..=4 {
            let table = PayoffTable::new(depth(d)).unwrap();
            for h in hero_vocabulary(depth(d)) {
                for v in villain_vocabulary(depth(d)) {
                    assert!(table.outcome(&h, &v).is_ok(), "{:?} {:?}", h, v);
                }
            }
        }
    }

    #[test]
    fn test_depth_two_reference_values() {
        let table = PayoffTable::new(depth(2)).unwrap();
        let sizes = BetSizes::new(20.0, &BetFractions::default());
        let fold = villain(&[], &[Action::Fold]);
        let call = villain(&[], &[Action::Call]);

        let (h, v) = table.payoffs(&hero(&[Action::Bet]), &fold, 0.4, &sizes).unwrap();
        assert_eq!((h, v), (20.0, 0.0));

        let (h, v) = table.payoffs(&hero(&[Action::Bet]), &call, 0.75, &sizes).unwrap();
        // final pot 60
        assert!((h - 25.0).abs() < 1e-12);
        assert!((v - -5.0).abs() < 1e-12);

        let (h, v) = table.payoffs(&hero(&[Action::Check]), &fold, 0.5, &sizes).unwrap();
        assert_eq!((h, v), (10.0, 10.0));
    }

    #[test]
    fn test_depth_four_raise_lines() {
        let table = PayoffTable::new(depth(4)).unwrap();
        use Action::*;

        assert_eq!(
            table
                .outcome(&hero(&[Check, Raise]), &villain(&[Bet, Fold], &[Call]))
                .unwrap(),
            Outcome::HeroTakesPot(Stake::VillainBet)
        );
        assert_eq!(
            table
                .outcome(&hero(&[Bet, Raise]), &villain(&[], &[Raise, Call]))
                .unwrap(),
            Outcome::Showdown(Stake::Hero3Bet)
        );
        assert_eq!(
            table
                .outcome(&hero(&[Bet, Fold]), &villain(&[Bet, Call], &[Raise, Fold]))
                .unwrap(),
            Outcome::VillainTakesPot(Stake::HeroBet)
        );
        assert_eq!(
            table
                .outcome(&hero(&[Check, Raise]), &villain(&[], &[Fold]))
                .unwrap(),
            Outcome::Showdown(Stake::Nothing)
        );
    }

    #[test]
    fn test_settlement_conserves_money() {
        let sizes = BetSizes::new(20.0, &BetFractions::uniform(0.66));
        let stakes = [
            Stake::Nothing,
            Stake::HeroBet,
            Stake::VillainBet,
            Stake::HeroRaise,
            Stake::VillainRaise,
            Stake::Hero3Bet,
        ];
        for stake in stakes {
            for outcome in [
                Outcome::Showdown(stake),
                Outcome::HeroTakesPot(stake),
                Outcome::VillainTakesPot(stake),
            ] {
                let (h, v) = outcome.settle(0.3, &sizes);
                assert!((h + v - 20.0).abs() < 1e-9, "{:?}", outcome);
            }
        }
    }

    #[test]
    fn test_line_from_other_depth_is_logic_error() {
        let table = PayoffTable::new(depth(2)).unwrap();
        let err = table
            .outcome(&hero(&[Action::Bet, Action::Call]), &villain(&[], &[Action::Call]))
            .unwrap_err();
        assert!(matches!(err, SolverError::Logic(_)));
    }
}
