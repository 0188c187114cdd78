//! Engine configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineConfigError {
    #[error("{0} must be greater than zero")]
    NonPositive(&'static str),
}

/// Knobs of the decision pipeline itself; each signal component carries its
/// own config.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum |spread| in ticks before a direction is wanted.
    pub spread_threshold_ticks: f64,
    /// Minimum OBI agreement for a long entry.
    pub min_obi_long: f64,
    /// Minimum -OBI agreement for a short entry.
    pub min_obi_short: f64,
    /// Reject entries when the best-level queue on the entry side exceeds
    /// this many contracts; joining a deep queue means filling last, after
    /// the price has already moved away.
    pub max_queue_size: f64,
    /// Cancel a pending entry not acknowledged within this many seconds.
    pub max_wait_secs: f64,
    /// Instrument tick size.
    pub tick_size: f64,
    /// Contracts per entry.
    pub order_quantity: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            spread_threshold_ticks: 2.0,
            min_obi_long: 0.1,
            min_obi_short: 0.1,
            max_queue_size: 200.0,
            max_wait_secs: 10.0,
            tick_size: 0.25,
            order_quantity: 1,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineConfigError> {
        if self.tick_size <= 0.0 {
            return Err(EngineConfigError::NonPositive("tick_size"));
        }
        if self.order_quantity == 0 {
            return Err(EngineConfigError::NonPositive("order_quantity"));
        }
        if self.max_wait_secs <= 0.0 {
            return Err(EngineConfigError::NonPositive("max_wait_secs"));
        }
        Ok(())
    }
}
