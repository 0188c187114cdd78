//! Typed inbound market events
//!
//! Whatever the wire protocol looks like, the decoder thread turns it into
//! these before anything else sees it. Unparseable input is dropped at the
//! decoder; the core only ever receives well-typed events with per-symbol
//! non-decreasing timestamps and last-value-wins field semantics.

use meridian_core::{DomSnapshot, TimestampMs, TradeEvent};
use serde::{Deserialize, Serialize};

/// One decoded inbound event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarketEvent {
    /// A trade print on some instrument.
    Trade { symbol: String, trade: TradeEvent },
    /// A depth update on some instrument.
    Depth { symbol: String, dom: DomSnapshot },
}

impl MarketEvent {
    pub fn symbol(&self) -> &str {
        match self {
            MarketEvent::Trade { symbol, .. } => symbol,
            MarketEvent::Depth { symbol, .. } => symbol,
        }
    }

    pub fn ts_ms(&self) -> TimestampMs {
        match self {
            MarketEvent::Trade { trade, .. } => trade.ts_ms,
            MarketEvent::Depth { dom, .. } => dom.ts_ms,
        }
    }
}
