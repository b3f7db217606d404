//! Extensive-form view of a solved strategy profile.
//!
//! The tree is rebuilt from the weighted pure strategies: at every node the
//! probability of an action is the total weight of (strategy, range) plans
//! that prescribe it there, normalized over the legal actions. Optionally
//! one or both players are conditioned on a single range category, which
//! replaces that player's range prior with an indicator.
//!
//! Branches whose overall probability falls below the pruning threshold are
//! dropped, unless the branch is the only candidate at its node.

use serde::Serialize;

use crate::error::{Result, SolverError};
use crate::game::betting::{analyze_sequence, available_actions, next_to_act};
use crate::game::{Action, ActionStep, Depth, Player};
use crate::strategy::{HeroRangePlan, RangePlan, VillainRangePlan, WeightedStrategy};

/// Default minimum overall probability for a retained branch.
pub const DEFAULT_PRUNING_THRESHOLD: f64 = 0.001;

/// Action weights below this are treated as absent when alternatives exist.
const NEGLIGIBLE_WEIGHT: f64 = 1e-9;

/// Restrict either player to one range category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Conditioning {
    /// Hero range index (zero-based).
    pub hero: Option<usize>,
    /// Villain range index (zero-based).
    pub villain: Option<usize>,
}

impl Conditioning {
    /// No conditioning.
    pub fn none() -> Self {
        Self::default()
    }

    /// Condition on hero range `range`.
    pub fn hero(range: usize) -> Self {
        Self {
            hero: Some(range),
            villain: None,
        }
    }

    /// Condition on villain range `range`.
    pub fn villain(range: usize) -> Self {
        Self {
            hero: None,
            villain: Some(range),
        }
    }

    /// Condition on one range of each player.
    pub fn both(hero: usize, villain: usize) -> Self {
        Self {
            hero: Some(hero),
            villain: Some(villain),
        }
    }
}

/// One action in the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameTreeNode {
    /// Player who took the action.
    pub player: Player,
    /// The action.
    pub action: Action,
    /// Probability of the action given its parent.
    pub conditional_probability: f64,
    /// Probability of reaching this node from the root.
    ///
    /// Set on every node, not only terminal ones; pruning compares it
    /// against the threshold at each level. Without pruning a non-terminal
    /// node's value equals the sum over its children.
    pub overall_probability: f64,
    /// No further action follows.
    pub terminal: bool,
    /// The action was the only candidate at its node.
    pub forced: bool,
    /// Follow-up actions.
    pub children: Vec<GameTreeNode>,
}

/// The root's children plus traversal helpers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameTree {
    /// Hero's opening actions.
    pub roots: Vec<GameTreeNode>,
}

impl GameTree {
    /// Every terminal node, depth first.
    pub fn terminal_nodes(&self) -> Vec<&GameTreeNode> {
        fn walk<'a>(node: &'a GameTreeNode, out: &mut Vec<&'a GameTreeNode>) {
            if node.terminal {
                out.push(node);
            }
            for child in &node.children {
                walk(child, out);
            }
        }

        let mut out = Vec::new();
        for root in &self.roots {
            walk(root, &mut out);
        }
        out
    }

    /// Sum of overall probability over terminal nodes.
    pub fn terminal_probability(&self) -> f64 {
        self.terminal_nodes()
            .iter()
            .map(|n| n.overall_probability)
            .sum()
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        fn count(node: &GameTreeNode) -> usize {
            1 + node.children.iter().map(count).sum::<usize>()
        }
        self.roots.iter().map(count).sum()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Builds a [`GameTree`] from both players' weighted strategies.
pub struct GameTreeBuilder<'a> {
    depth: Depth,
    hero: &'a [WeightedStrategy<HeroRangePlan>],
    villain: &'a [WeightedStrategy<VillainRangePlan>],
    hero_priors: &'a [f64],
    villain_priors: &'a [f64],
    conditioning: Conditioning,
    pruning_threshold: f64,
}

impl<'a> GameTreeBuilder<'a> {
    /// Create a builder with no conditioning and the default threshold.
    pub fn new(
        depth: Depth,
        hero: &'a [WeightedStrategy<HeroRangePlan>],
        villain: &'a [WeightedStrategy<VillainRangePlan>],
        hero_priors: &'a [f64],
        villain_priors: &'a [f64],
    ) -> Self {
        Self {
            depth,
            hero,
            villain,
            hero_priors,
            villain_priors,
            conditioning: Conditioning::none(),
            pruning_threshold: DEFAULT_PRUNING_THRESHOLD,
        }
    }

    /// Builder method: set range conditioning.
    pub fn with_conditioning(mut self, conditioning: Conditioning) -> Self {
        self.conditioning = conditioning;
        self
    }

    /// Builder method: set the pruning threshold. Zero keeps every branch.
    pub fn with_pruning_threshold(mut self, threshold: f64) -> Self {
        self.pruning_threshold = threshold;
        self
    }

    /// Build the tree.
    pub fn build(&self) -> Result<GameTree> {
        if !self.pruning_threshold.is_finite() || self.pruning_threshold < 0.0 {
            return Err(SolverError::config(format!(
                "pruning threshold {} must be non-negative",
                self.pruning_threshold
            )));
        }
        for (player, index, priors) in [
            (Player::Hero, self.conditioning.hero, self.hero_priors),
            (Player::Villain, self.conditioning.villain, self.villain_priors),
        ] {
            if let Some(r) = index {
                match priors.get(r) {
                    None => {
                        return Err(SolverError::config(format!(
                            "{} range {} does not exist ({} ranges)",
                            player,
                            r + 1,
                            priors.len()
                        )))
                    }
                    Some(p) if *p <= 0.0 => {
                        log::debug!("{} range {} has zero prior, tree is empty", player, r + 1);
                        return Ok(GameTree { roots: Vec::new() });
                    }
                    Some(_) => {}
                }
            }
        }

        let roots = self.expand(&[], 1.0);
        let tree = GameTree { roots };
        log::debug!(
            "game tree: {} nodes, {} terminal, threshold {}",
            tree.node_count(),
            tree.terminal_nodes().len(),
            self.pruning_threshold
        );
        Ok(tree)
    }

    fn expand(&self, history: &[ActionStep], overall: f64) -> Vec<GameTreeNode> {
        let bound = self.depth.tree_depth_bound();
        if history.len() >= bound || analyze_sequence(history).closed {
            return Vec::new();
        }

        let player = next_to_act(history);
        let legal = available_actions(history, self.depth.max_actions());
        let mut candidates: Vec<(Action, f64)> = legal
            .iter()
            .map(|a| (*a, self.action_weight(player, *a, history)))
            .collect();
        if candidates.len() > 1 {
            candidates.retain(|(_, w)| *w >= NEGLIGIBLE_WEIGHT);
        }
        normalize(&mut candidates);

        let forced = candidates.len() == 1;
        if !forced {
            candidates.retain(|(_, p)| overall * p >= self.pruning_threshold);
            normalize(&mut candidates);
        }

        candidates
            .into_iter()
            .map(|(action, p)| {
                let mut next = history.to_vec();
                next.push(ActionStep::new(player, action));
                let reach = overall * p;
                let children = self.expand(&next, reach);
                let terminal = children.is_empty()
                    || analyze_sequence(&next).closed
                    || next.len() >= bound;
                GameTreeNode {
                    player,
                    action,
                    conditional_probability: p,
                    overall_probability: reach,
                    terminal,
                    forced,
                    children,
                }
            })
            .collect()
    }

    fn action_weight(&self, player: Player, action: Action, history: &[ActionStep]) -> f64 {
        match player {
            Player::Hero => weight_of(
                self.hero,
                self.hero_priors,
                self.conditioning.hero,
                action,
                history,
            ),
            Player::Villain => weight_of(
                self.villain,
                self.villain_priors,
                self.conditioning.villain,
                action,
                history,
            ),
        }
    }
}

fn weight_of<P: RangePlan>(
    strategies: &[WeightedStrategy<P>],
    priors: &[f64],
    conditioned: Option<usize>,
    action: Action,
    history: &[ActionStep],
) -> f64 {
    let range_weight = |r: usize| match conditioned {
        Some(c) if c == r => 1.0,
        Some(_) => 0.0,
        None => priors.get(r).copied().unwrap_or(0.0),
    };
    strategies
        .iter()
        .map(|s| s.action_weight(action, history, range_weight))
        .sum()
}

/// Scale weights to sum to one; uniform if they sum to zero.
fn normalize(candidates: &mut [(Action, f64)]) {
    let total: f64 = candidates.iter().map(|(_, w)| w).sum();
    let n = candidates.len() as f64;
    for (_, w) in candidates.iter_mut() {
        *w = if total > 0.0 { *w / total } else { 1.0 / n };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{HeroStrategy, VillainStrategy};

    fn hero(label: &str, p: f64) -> WeightedStrategy<HeroRangePlan> {
        WeightedStrategy::new(p, label.parse::<HeroStrategy>().unwrap())
    }

    fn villain(label: &str, p: f64) -> WeightedStrategy<VillainRangePlan> {
        WeightedStrategy::new(p, label.parse::<VillainStrategy>().unwrap())
    }

    fn depth(d: u8) -> Depth {
        Depth::new(d).unwrap()
    }

    #[test]
    fn test_depth_two_tree() {
        let heroes = [hero("H1:be,H2:ch", 1.0)];
        let villains = [villain("V1:ch/ca", 1.0)];
        let tree = GameTreeBuilder::new(depth(2), &heroes, &villains, &[0.4, 0.6], &[1.0])
            .with_pruning_threshold(0.0)
            .build()
            .unwrap();

        assert_eq!(tree.roots.len(), 2);
        let check = tree.roots.iter().find(|n| n.action == Action::Check).unwrap();
        assert!((check.overall_probability - 0.6).abs() < 1e-12);
        // villain checks behind with certainty
        assert_eq!(check.children.len(), 1);
        assert!(check.children[0].terminal);
        assert!(check.children[0].forced);

        let bet = tree.roots.iter().find(|n| n.action == Action::Bet).unwrap();
        let call = &bet.children[0];
        assert_eq!(call.action, Action::Call);
        assert!((call.overall_probability - 0.4).abs() < 1e-12);
        assert!((tree.terminal_probability() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_conditioning_on_hero_range() {
        let heroes = [hero("H1:be,H2:ch", 1.0)];
        let villains = [villain("V1:ch/fo", 1.0)];
        let tree = GameTreeBuilder::new(depth(2), &heroes, &villains, &[0.4, 0.6], &[1.0])
            .with_conditioning(Conditioning::hero(0))
            .build()
            .unwrap();
        assert_eq!(tree.roots.len(), 1);
        assert_eq!(tree.roots[0].action, Action::Bet);
        assert!(tree.roots[0].forced);
    }

    #[test]
    fn test_conditioning_on_villain_range() {
        let heroes = [hero("H1:be", 1.0)];
        let villains = [villain("V1:ch/ca,V2:ch/fo", 1.0)];
        let priors = [0.5, 0.5];
        let builder = GameTreeBuilder::new(depth(2), &heroes, &villains, &[1.0], &priors)
            .with_pruning_threshold(0.0);

        let full = builder.build().unwrap();
        assert_eq!(full.roots[0].children.len(), 2);

        // V2's line decides the response to the bet
        let tree = builder.with_conditioning(Conditioning::villain(1)).build().unwrap();
        let response = &tree.roots[0].children;
        assert_eq!(response.len(), 1);
        assert_eq!(response[0].action, Action::Fold);
        assert!(response[0].forced);
        assert!((tree.terminal_probability() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_conditioning_on_both_players() {
        let heroes = [hero("H1:be,H2:ch", 1.0)];
        let villains = [villain("V1:ch/ca,V2:ch/fo", 1.0)];
        let tree = GameTreeBuilder::new(depth(2), &heroes, &villains, &[0.5, 0.5], &[0.5, 0.5])
            .with_pruning_threshold(0.0)
            .with_conditioning(Conditioning::both(0, 0))
            .build()
            .unwrap();
        let terminals = tree.terminal_nodes();
        assert_eq!(terminals.len(), 1);
        assert_eq!(terminals[0].action, Action::Call);
        assert!((terminals[0].overall_probability - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inner_nodes_carry_reach_probability() {
        let heroes = [hero("H1:be,H2:ch", 1.0)];
        let villains = [villain("V1:ch/ca,V2:ch/fo", 1.0)];
        let tree = GameTreeBuilder::new(depth(2), &heroes, &villains, &[0.4, 0.6], &[0.25, 0.75])
            .with_pruning_threshold(0.0)
            .build()
            .unwrap();

        let bet = tree.roots.iter().find(|n| n.action == Action::Bet).unwrap();
        assert!(!bet.terminal);
        assert!((bet.overall_probability - 0.4).abs() < 1e-12);
        let below: f64 = bet.children.iter().map(|c| c.overall_probability).sum();
        assert!((below - bet.overall_probability).abs() < 1e-12);
    }

    #[test]
    fn test_bad_conditioning() {
        let heroes = [hero("H1:be", 1.0)];
        let villains = [villain("V1:ch/fo", 1.0)];
        let builder = GameTreeBuilder::new(depth(2), &heroes, &villains, &[1.0], &[1.0]);
        let err = builder
            .with_conditioning(Conditioning::villain(3))
            .build()
            .unwrap_err();
        assert!(matches!(err, SolverError::Configuration(_)));
    }

    #[test]
    fn test_zero_prior_conditioning_is_empty() {
        let heroes = [hero("H1:be,H2:ch", 1.0)];
        let villains = [villain("V1:ch/fo", 1.0)];
        let tree = GameTreeBuilder::new(depth(2), &heroes, &villains, &[1.0, 0.0], &[1.0])
            .with_conditioning(Conditioning::hero(1))
            .build()
            .unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_pruning_drops_rare_branch() {
        let heroes = [hero("H1:ch-ca", 0.9995), hero("H1:be-ca", 0.0005)];
        let villains = [villain("V1:be-ca/ca", 1.0)];
        let tree = GameTreeBuilder::new(depth(4), &heroes, &villains, &[1.0], &[1.0])
            .build()
            .unwrap();
        assert_eq!(tree.roots.len(), 1);
        assert_eq!(tree.roots[0].action, Action::Check);
        assert!((tree.roots[0].conditional_probability - 1.0).abs() < 1e-12);
        for node in tree.terminal_nodes() {
            assert!(node.overall_probability >= DEFAULT_PRUNING_THRESHOLD || node.forced);
        }
    }

    #[test]
    fn test_uncovered_node_ends_branch() {
        // hero's plan stops after the bet, so nothing covers the response
        // to villain's raise
        let heroes = [hero("H1:be", 1.0)];
        let villains = [villain("V1:ch/ra-fo", 1.0)];
        let tree = GameTreeBuilder::new(depth(4), &heroes, &villains, &[1.0], &[1.0])
            .with_pruning_threshold(0.0)
            .build()
            .unwrap();
        let terminals = tree.terminal_nodes();
        assert_eq!(terminals.len(), 1);
        assert_eq!(terminals[0].action, Action::Raise);
        assert!((tree.terminal_probability() - 1.0).abs() < 1e-12);
    }
}
