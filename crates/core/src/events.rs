//! Inbound market events
//!
//! Normalized, wire-agnostic event types. The feed layer is responsible for
//! decoding whatever the venue sends into these; the decision pipeline only
//! ever sees well-typed events.

use crate::order::Side;
use serde::{Deserialize, Serialize};

/// Event time in epoch milliseconds.
///
/// All components compare timestamps per symbol and assume they are
/// monotonically non-decreasing; the feed layer owns that guarantee.
pub type TimestampMs = i64;

/// One trade print on a single instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub ts_ms: TimestampMs,
    pub price: f64,
    pub volume: f64,
    /// Side of the aggressor (the order that crossed the spread).
    pub aggressor: Side,
}

/// Combined multi-instrument tick.
///
/// Carries the primary instrument's latest price plus the most recent prices
/// of up to two correlated instruments and an optional risk-index price.
/// Auxiliary fields are `None` when that instrument has not printed since the
/// last tick; consumers fill them with the last observed value, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickEvent {
    pub ts_ms: TimestampMs,
    /// Latest price of the traded instrument.
    pub primary: f64,
    /// Latest price of the first correlated instrument, if seen.
    pub aux1: Option<f64>,
    /// Latest price of the second correlated instrument, if seen.
    pub aux2: Option<f64>,
    /// Latest risk-index price, if seen. Feeds the regime monitor.
    pub risk_index: Option<f64>,
}

impl TickEvent {
    /// True when every series required by the pricing models has a value.
    pub fn fully_populated(&self) -> bool {
        self.aux1.is_some() && self.aux2.is_some()
    }
}

/// One displayed price level of the book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: f64,
    pub volume: f64,
}

impl BookLevel {
    pub fn new(price: f64, volume: f64) -> Self {
        Self { price, volume }
    }
}

/// Depth-of-market snapshot, best level first on both sides.
///
/// Levels are aggregated (price, volume) pairs, not per-order data; length is
/// bounded by the feed's configured depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomSnapshot {
    pub ts_ms: TimestampMs,
    pub best_bid: f64,
    pub best_ask: f64,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

impl DomSnapshot {
    pub fn mid(&self) -> f64 {
        (self.best_bid + self.best_ask) / 2.0
    }

    /// Displayed volume at the best level of `side`, clamped to zero.
    pub fn best_volume(&self, side: Side) -> f64 {
        let level = match side {
            Side::Buy => self.bids.first(),
            Side::Sell => self.asks.first(),
        };
        level.map(|l| l.volume.max(0.0)).unwrap_or(0.0)
    }
}
