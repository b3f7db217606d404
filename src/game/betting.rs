//! Betting-state analysis and action generation.
//!
//! Works on a public action history (`&[ActionStep]`). Hero acts on even
//! positions and villain on odd ones. The street closes on a call, a fold,
//! or a check behind a check.

use serde::Serialize;

use super::action::{Action, ActionStep, Player};
use super::model::{HeroLine, VillainLine};

/// Raises allowed on top of the opening bet.
pub const MAX_RAISES_PER_STREET: u8 = 3;

/// Summary of a betting history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PotState {
    /// The player to act faces an outstanding bet.
    pub facing_bet: bool,
    /// Raises made since the opening bet.
    pub raises: u8,
    /// No further action is possible.
    pub closed: bool,
    /// Player who made the last bet or raise.
    pub last_aggressor: Option<Player>,
}

/// Replay `history` and summarize the pot.
pub fn analyze_sequence(history: &[ActionStep]) -> PotState {
    let mut state = PotState::default();
    let mut previous: Option<ActionStep> = None;

    for step in history {
        match step.action {
            Action::Bet => {
                state.facing_bet = true;
                state.raises = 0;
                state.last_aggressor = Some(step.player);
            }
            Action::Raise => {
                state.facing_bet = true;
                state.raises += 1;
                state.last_aggressor = Some(step.player);
            }
            Action::Call => {
                state.facing_bet = false;
                state.closed = true;
            }
            Action::Fold => state.closed = true,
            Action::Check => {
                if let Some(prev) = previous {
                    if prev.action == Action::Check && prev.player != step.player {
                        state.closed = true;
                    }
                }
            }
        }
        previous = Some(*step);
    }

    state
}

/// Player to act after `history`.
pub fn next_to_act(history: &[ActionStep]) -> Player {
    if history.len() % 2 == 0 {
        Player::Hero
    } else {
        Player::Villain
    }
}

/// Legal actions after `history` on a street capped at `max_actions`.
///
/// The final permitted action can only close the street, so bets and
/// raises are withheld there.
pub fn available_actions(history: &[ActionStep], max_actions: usize) -> Vec<Action> {
    if history.len() >= max_actions {
        return vec![];
    }
    let state = analyze_sequence(history);
    if state.closed {
        return vec![];
    }

    let last_node = history.len() + 1 == max_actions;
    let mut actions = Vec::with_capacity(3);
    if state.facing_bet {
        actions.push(Action::Fold);
        actions.push(Action::Call);
        if !last_node && state.raises < MAX_RAISES_PER_STREET {
            actions.push(Action::Raise);
        }
    } else {
        actions.push(Action::Check);
        if !last_node {
            actions.push(Action::Bet);
        }
    }
    actions
}

/// Play one hero line against one villain line and return the history.
///
/// Stops when the street closes, the action cap is reached, or the acting
/// player's line prescribes nothing legal.
pub fn simulate_lines(hero: &HeroLine, villain: &VillainLine, max_actions: usize) -> Vec<ActionStep> {
    let mut history = Vec::with_capacity(max_actions);

    loop {
        let legal = available_actions(&history, max_actions);
        if legal.is_empty() {
            break;
        }
        let player = next_to_act(&history);
        let planned = match player {
            Player::Hero => hero.next_action(&history),
            Player::Villain => villain.next_action(&history),
        };
        match planned {
            Some(action) if legal.contains(&action) => {
                history.push(ActionStep::new(player, action))
            }
            _ => break,
        }
    }

    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use Action::*;

    fn steps(actions: &[Action]) -> Vec<ActionStep> {
        actions
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let player = if i % 2 == 0 { Player::Hero } else { Player::Villain };
                ActionStep::new(player, *a)
            })
            .collect()
    }

    #[test]
    fn test_opening_actions() {
        assert_eq!(available_actions(&[], 4), vec![Check, Bet]);
        assert_eq!(available_actions(&steps(&[Bet]), 4), vec![Fold, Call, Raise]);
    }

    #[test]
    fn test_last_node_withholds_aggression() {
        assert_eq!(available_actions(&[], 1), vec![Check]);
        assert_eq!(available_actions(&steps(&[Bet]), 2), vec![Fold, Call]);
        assert_eq!(available_actions(&steps(&[Check]), 2), vec![Check]);
    }

    #[test]
    fn test_closing_sequences() {
        assert!(analyze_sequence(&steps(&[Check, Check])).closed);
        assert!(analyze_sequence(&steps(&[Bet, Call])).closed);
        assert!(analyze_sequence(&steps(&[Bet, Fold])).closed);
        assert!(!analyze_sequence(&steps(&[Check, Bet])).closed);
        assert!(available_actions(&steps(&[Bet, Call]), 4).is_empty());
        assert!(available_actions(&steps(&[Check, Bet, Call, Fold]), 4).is_empty());
    }

    #[test]
    fn test_raise_cap() {
        let state = analyze_sequence(&steps(&[Bet, Raise, Raise, Raise]));
        assert_eq!(state.raises, 3);
        assert_eq!(state.last_aggressor, Some(Player::Villain));
        assert_eq!(
            available_actions(&steps(&[Bet, Raise, Raise, Raise]), 8),
            vec![Fold, Call]
        );
    }

    #[test]
    fn test_simulate_check_raise() {
        let hero = HeroLine::new(vec![Check, Raise]);
        let villain = VillainLine::new(vec![Bet, Call], vec![Fold]);
        let history = simulate_lines(&hero, &villain, 4);
        assert_eq!(history, steps(&[Check, Bet, Raise, Call]));
    }

    #[test]
    fn test_simulate_check_back() {
        let hero = HeroLine::new(vec![Check]);
        let villain = VillainLine::new(vec![], vec![Call]);
        assert_eq!(simulate_lines(&hero, &villain, 2), steps(&[Check, Check]));
    }

    #[test]
    fn test_simulate_bet_fold() {
        let hero = HeroLine::new(vec![Bet, Call]);
        let villain = VillainLine::new(vec![], vec![Fold]);
        assert_eq!(simulate_lines(&hero, &villain, 3), steps(&[Bet, Fold]));
    }
}
