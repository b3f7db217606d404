//! Mixed-strategy presets.
//!
//! A preset is one entry per line, `frequency,"label"`; quotes around the
//! label are optional and frequencies are relative weights:
//!
//! ```text
//! 0.6,"H1:ch-ca,H2:be-fo"
//! 0.4,"H1:be-ca,H2:be-fo"
//! ```

use rustc_hash::{FxHashMap, FxHashSet};

use super::plan::{PureStrategy, RangePlan, WeightedStrategy};
use crate::equilibrium::FixedStrategy;
use crate::error::{Result, SolverError};

/// Smallest probability written by [`format_preset`].
pub const EXPORT_THRESHOLD: f64 = 0.001;

/// One parsed preset line.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetEntry {
    /// Relative weight, strictly positive.
    pub frequency: f64,
    /// Strategy label with quotes removed.
    pub label: String,
}

/// Parse preset text. Blank lines are skipped.
pub fn parse_preset(text: &str) -> Result<Vec<PresetEntry>> {
    let mut entries = Vec::new();
    let mut seen = FxHashSet::default();

    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (freq, label) = line.split_once(',').ok_or_else(|| {
            SolverError::parse(format!("line {}: expected frequency,\"label\"", n + 1))
        })?;

        let frequency: f64 = freq.trim().parse().map_err(|_| {
            SolverError::parse(format!("line {}: invalid frequency '{}'", n + 1, freq.trim()))
        })?;
        if frequency.is_nan() || frequency <= 0.0 {
            return Err(SolverError::parse(format!(
                "line {}: frequency must be positive",
                n + 1
            )));
        }

        let label = label.trim().trim_matches('"').trim();
        if label.is_empty() {
            return Err(SolverError::parse(format!("line {}: empty strategy name", n + 1)));
        }
        if !seen.insert(label.to_string()) {
            return Err(SolverError::parse(format!(
                "line {}: duplicate strategy '{}'",
                n + 1,
                label
            )));
        }

        entries.push(PresetEntry {
            frequency,
            label: label.to_string(),
        });
    }

    if entries.is_empty() {
        return Err(SolverError::parse("preset has no entries"));
    }
    Ok(entries)
}

/// Resolve preset text against the matrix labels of one player.
///
/// Blank text means the player is not fixed. Labels are compared in
/// canonical form, so `be-ra` matches a generated `be-3b`.
pub fn fixed_strategy<P: RangePlan>(text: &str, labels: &[String]) -> Result<Option<FixedStrategy>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let index: FxHashMap<&str, usize> = labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();

    let mut weights = Vec::new();
    let mut used = FxHashSet::default();
    for entry in parse_preset(text)? {
        let canonical = entry.label.parse::<PureStrategy<P>>()?.to_string();
        let i = *index.get(canonical.as_str()).ok_or_else(|| {
            SolverError::config(format!("unknown strategy '{}'", entry.label))
        })?;
        if !used.insert(i) {
            return Err(SolverError::config(format!(
                "strategy '{}' is listed twice",
                canonical
            )));
        }
        weights.push((i, entry.frequency));
    }

    FixedStrategy::new(weights).map(Some)
}

/// Parse preset text into weighted pure strategies, normalized to sum to one.
pub fn parse_weighted<P: RangePlan>(text: &str) -> Result<Vec<WeightedStrategy<P>>> {
    let entries = parse_preset(text)?;
    let total: f64 = entries.iter().map(|e| e.frequency).sum();
    entries
        .into_iter()
        .map(|e| -> Result<WeightedStrategy<P>> {
            Ok(WeightedStrategy::new(e.frequency / total, e.label.parse()?))
        })
        .collect()
}

/// Export a mixed strategy as preset text, most likely first.
pub fn format_preset(probabilities: &[f64], labels: &[String]) -> String {
    let mut kept: Vec<(f64, &String)> = probabilities
        .iter()
        .copied()
        .zip(labels)
        .filter(|(p, _)| *p > EXPORT_THRESHOLD)
        .collect();
    kept.sort_by(|a, b| b.0.total_cmp(&a.0));
    kept.iter()
        .map(|(p, label)| format!("{:.4},\"{}\"", p, label))
        .collect::<Vec<_>>()
        .join("\n")
}
