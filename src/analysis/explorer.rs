//! Range posteriors after an observed action sequence.
//!
//! Every (weighted strategy, range) plan pair is played out to a complete
//! history. Pairs whose history begins with the selected sequence are
//! consistent with it; their joint weight, renormalized per player, is the
//! posterior over range categories.

use serde::Serialize;

use crate::error::{Result, SolverError};
use crate::game::{simulate_lines, ActionStep, Depth};
use crate::strategy::{HeroRangePlan, VillainRangePlan, WeightedStrategy};

/// Posterior range distributions given an observed sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangePosteriors {
    /// Posterior over hero ranges.
    pub hero: Vec<f64>,
    /// Posterior over villain ranges.
    pub villain: Vec<f64>,
    /// Probability of observing the sequence.
    pub sequence_probability: f64,
}

/// Compute posteriors for `selection`.
///
/// An empty selection returns the priors. A selection no plan pair can
/// produce has probability zero and all-zero posteriors.
pub fn range_posteriors(
    depth: Depth,
    selection: &[ActionStep],
    hero: &[WeightedStrategy<HeroRangePlan>],
    villain: &[WeightedStrategy<VillainRangePlan>],
    hero_priors: &[f64],
    villain_priors: &[f64],
) -> Result<RangePosteriors> {
    if selection.is_empty() {
        return Ok(RangePosteriors {
            hero: hero_priors.to_vec(),
            villain: villain_priors.to_vec(),
            sequence_probability: 1.0,
        });
    }

    let mut hero_mass = vec![0.0; hero_priors.len()];
    let mut villain_mass = vec![0.0; villain_priors.len()];
    let mut total = 0.0;

    for h in hero {
        for hero_plan in &h.strategy.plans {
            let p_h = prior(hero_priors, hero_plan.range)?;
            for v in villain {
                for villain_plan in &v.strategy.plans {
                    let p_v = prior(villain_priors, villain_plan.range)?;
                    let weight = h.probability * p_h * v.probability * p_v;
                    if weight <= 0.0 {
                        continue;
                    }
                    let played = simulate_lines(&hero_plan.line, &villain_plan.line, depth.max_actions());
                    if played.starts_with(selection) {
                        hero_mass[hero_plan.range] += weight;
                        villain_mass[villain_plan.range] += weight;
                        total += weight;
                    }
                }
            }
        }
    }

    let normalize = |mass: Vec<f64>| -> Vec<f64> {
        if total > 0.0 {
            mass.into_iter().map(|m| m / total).collect()
        } else {
            mass
        }
    };

    Ok(RangePosteriors {
        hero: normalize(hero_mass),
        villain: normalize(villain_mass),
        sequence_probability: total,
    })
}

fn prior(priors: &[f64], range: usize) -> Result<f64> {
    priors.get(range).copied().ok_or_else(|| {
        SolverError::config(format!(
            "plan for range {} but only {} priors",
            range + 1,
            priors.len()
        ))
    })
}
