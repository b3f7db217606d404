//! Text form of lines and pure strategies.
//!
//! ```text
//! H1:ch-ca,H2:be-3b          hero: one line per range
//! V1:ch/fo,V2:be-ca/ra-fo    villain: <if hero checks>/<if hero bets>
//! ```
//!
//! Tokens are `ch`, `be`, `fo`, `ca`, `ra`; hero's re-raise after betting is
//! written `3b`, and either spelling is accepted when parsing. A villain
//! check branch of `ch` means villain checks behind and is stored as an
//! empty sequence. Either villain branch may also be left blank, which
//! parses as an empty sequence.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashSet;

use super::plan::{PureStrategy, RangePlan};
use crate::error::{Result, SolverError};
use crate::game::{Action, HeroLine, VillainLine};

fn write_actions(f: &mut fmt::Formatter<'_>, tokens: impl Iterator<Item = &'static str>) -> fmt::Result {
    for (i, token) in tokens.enumerate() {
        if i > 0 {
            write!(f, "-")?;
        }
        write!(f, "{}", token)?;
    }
    Ok(())
}

impl fmt::Display for HeroLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opened_with_bet = self.opening() == Some(Action::Bet);
        write_actions(
            f,
            self.actions.iter().map(|a| match a {
                Action::Raise if opened_with_bet => "3b",
                other => other.token(),
            }),
        )
    }
}

impl fmt::Display for VillainLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.if_hero_checks.is_empty() {
            write!(f, "{}", Action::Check.token())?;
        } else {
            write_actions(f, self.if_hero_checks.iter().map(Action::token))?;
        }
        write!(f, "/")?;
        write_actions(f, self.if_hero_bets.iter().map(Action::token))
    }
}

fn parse_actions(text: &str) -> Result<Vec<Action>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SolverError::parse("empty action sequence"));
    }
    text.split('-').map(|t| Action::from_token(t.trim())).collect()
}

fn parse_branch(text: &str) -> Result<Vec<Action>> {
    if text.trim().is_empty() {
        Ok(Vec::new())
    } else {
        parse_actions(text)
    }
}

impl FromStr for HeroLine {
    type Err = SolverError;

    fn from_str(text: &str) -> Result<Self> {
        let actions = parse_actions(text)?;
        if actions.contains(&Action::Check) && actions[0] != Action::Check {
            return Err(SolverError::parse(format!("hero line '{}' checks late", text)));
        }
        Ok(HeroLine::new(actions))
    }
}

impl FromStr for VillainLine {
    type Err = SolverError;

    fn from_str(text: &str) -> Result<Self> {
        let (checked, bet) = text.split_once('/').ok_or_else(|| {
            SolverError::parse(format!("villain line '{}' is missing '/'", text))
        })?;
        if bet.contains('/') {
            return Err(SolverError::parse(format!(
                "villain line '{}' has more than one '/'",
                text
            )));
        }

        let mut if_hero_checks = parse_branch(checked)?;
        if if_hero_checks == [Action::Check] {
            if_hero_checks.clear();
        }
        Ok(VillainLine::new(if_hero_checks, parse_branch(bet)?))
    }
}

fn parse_range_tag<P: RangePlan>(tag: &str) -> Result<usize> {
    let tag = tag.trim();
    let mut chars = tag.chars();
    let expected = P::PLAYER.tag();
    if chars.next() != Some(expected) {
        return Err(SolverError::parse(format!(
            "range tag '{}' should start with '{}'",
            tag, expected
        )));
    }
    match chars.as_str().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(SolverError::parse(format!("invalid range number in '{}'", tag))),
    }
}

impl<P: RangePlan> FromStr for PureStrategy<P> {
    type Err = SolverError;

    /// Parse a label such as `H1:ch-ca,H2:be-fo`.
    fn from_str(label: &str) -> Result<Self> {
        let label = label.trim();
        if label.is_empty() {
            return Err(SolverError::parse("empty strategy label"));
        }

        let mut seen = FxHashSet::default();
        let mut plans = Vec::new();
        for part in label.split(',') {
            let (tag, line) = part.split_once(':').ok_or_else(|| {
                SolverError::parse(format!("'{}' is not of the form <tag>:<line>", part.trim()))
            })?;
            let range = parse_range_tag::<P>(tag)?;
            if !seen.insert(range) {
                return Err(SolverError::parse(format!(
                    "range {}{} appears twice in '{}'",
                    P::PLAYER.tag(),
                    range + 1,
                    label
                )));
            }
            plans.push(P::new(range, line.trim().parse()?));
        }
        Ok(PureStrategy::new(plans))
    }
}
