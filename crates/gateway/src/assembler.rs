//! Tick assembly
//!
//! The pricing models want one combined tick per primary-instrument print,
//! carrying the latest prices of the correlated instruments alongside. This
//! fold keeps a per-symbol last-price cache and emits a [`TickEvent`] only
//! when the primary symbol trades; auxiliary and risk-index prints just
//! refresh the cache.

use meridian_core::{TickEvent, TradeEvent};
use serde::{Deserialize, Serialize};

/// Which symbol plays which role in the combined tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMap {
    pub primary: String,
    pub aux1: String,
    pub aux2: String,
    pub risk_index: String,
}

impl Default for SymbolMap {
    fn default() -> Self {
        Self {
            primary: "ES".to_string(),
            aux1: "NQ".to_string(),
            aux2: "YM".to_string(),
            risk_index: "BTC".to_string(),
        }
    }
}

/// Folds per-symbol trade prints into engine-ready combined ticks.
pub struct TickAssembler {
    symbols: SymbolMap,
    last_aux1: Option<f64>,
    last_aux2: Option<f64>,
    last_risk: Option<f64>,
}

impl TickAssembler {
    pub fn new(symbols: SymbolMap) -> Self {
        Self {
            symbols,
            last_aux1: None,
            last_aux2: None,
            last_risk: None,
        }
    }

    /// Fold one trade print. Returns a combined tick when the primary
    /// symbol printed, `None` otherwise.
    pub fn on_trade(&mut self, symbol: &str, trade: &TradeEvent) -> Option<TickEvent> {
        if symbol == self.symbols.aux1 {
            self.last_aux1 = Some(trade.price);
            return None;
        }
        if symbol == self.symbols.aux2 {
            self.last_aux2 = Some(trade.price);
            return None;
        }
        if symbol == self.symbols.risk_index {
            self.last_risk = Some(trade.price);
            return None;
        }
        if symbol == self.symbols.primary {
            return Some(TickEvent {
                ts_ms: trade.ts_ms,
                primary: trade.price,
                aux1: self.last_aux1,
                aux2: self.last_aux2,
                risk_index: self.last_risk,
            });
        }
        log::debug!("ignoring trade on unmapped symbol {symbol}");
        None
    }

    /// True when `symbol` is the primary instrument.
    pub fn is_primary(&self, symbol: &str) -> bool {
        symbol == self.symbols.primary
    }
}
