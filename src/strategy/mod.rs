//! Pure strategy labels, structured plans and presets.
//!
//! Matrix rows and columns are identified by labels such as
//! `H1:ch-ca,H2:be-fo`. This module turns labels into [`PureStrategy`]
//! values that the analysis stages can query ("what does this range do
//! after this history?") and reads and writes the preset format used to pin
//! a player's mixed strategy.

pub mod label;
pub mod plan;
pub mod preset;

pub use plan::{
    HeroRangePlan, HeroStrategy, PureStrategy, RangePlan, VillainRangePlan, VillainStrategy,
    WeightedStrategy,
};
pub use preset::{fixed_strategy, format_preset, parse_preset, parse_weighted, PresetEntry};
