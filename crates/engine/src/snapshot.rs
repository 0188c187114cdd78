//! Decision context snapshots
//!
//! For every entry order the engine records the state that produced it, so
//! an external analytics consumer can score the signal afterwards (post-entry
//! favorable/adverse excursion) without reaching into engine internals.

use meridian_core::{Side, TimestampMs};
use serde::{Deserialize, Serialize};

/// The state of the pipeline at the moment an entry was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionSnapshot {
    pub ts_ms: TimestampMs,
    pub side: Side,
    /// Limit price of the entry.
    pub price: f64,
    pub fair: f64,
    pub spread_ticks: f64,
    pub obi: f64,
    /// Displayed best-level volume on the entry side.
    pub queue_size: f64,
    /// Regime volatility ratio at decision time.
    pub vol_ratio: f64,
}
