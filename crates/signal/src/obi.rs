//! Weighted order-book imbalance
//!
//! Measures relative bid/ask pressure in the visible book with exponentially
//! decaying per-level weights, best level first. The inner levels are the
//! ones that matter; deep levels are frequently spoofed or stale, so they get
//! discounted rather than dropped.
//!
//! `OBI = (Σ bid_i·w_i − Σ ask_i·w_i) / (Σ bid_i·w_i + Σ ask_i·w_i)`, with
//! `w_i = exp(-decay·i)`. Result is in [-1, +1]: +1 is a bid-only book, -1
//! ask-only, 0 balanced.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use meridian_core::{BookLevel, DomSnapshot};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObiConfig {
    /// Number of levels per side to include.
    pub depth: usize,
    /// Per-level weight decay. 0.5 weighs level 2 at ~61%, level 3 at ~37%.
    pub decay: f64,
}

impl Default for ObiConfig {
    fn default() -> Self {
        Self {
            depth: 10,
            decay: 0.5,
        }
    }
}

/// Decomposition of one OBI calculation, for logs and analytics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObiBreakdown {
    pub obi: f64,
    pub weighted_bid: f64,
    pub weighted_ask: f64,
    pub weighted_total: f64,
}

/// Weighted order-book imbalance calculator.
///
/// Weights are precomputed at construction; per-snapshot work is two dot
/// products over at most `depth` levels.
pub struct ObiCalculator {
    cfg: ObiConfig,
    weights: Vec<f64>,
}

impl ObiCalculator {
    pub fn new(cfg: ObiConfig) -> Result<Self, ConfigError> {
        if cfg.depth == 0 {
            return Err(ConfigError::NonPositive("obi depth"));
        }
        let weights = (0..cfg.depth)
            .map(|i| (-cfg.decay * i as f64).exp())
            .collect();
        Ok(Self { cfg, weights })
    }

    /// Weighted imbalance of the snapshot, in [-1, +1].
    ///
    /// Depth adapts to the shorter side of the book; an empty side or a book
    /// with no volume yields 0.0.
    pub fn calculate(&self, dom: &DomSnapshot) -> f64 {
        self.calculate_detailed(dom).obi
    }

    /// Imbalance plus its weighted-volume decomposition.
    pub fn calculate_detailed(&self, dom: &DomSnapshot) -> ObiBreakdown {
        let depth = self.cfg.depth.min(dom.bids.len()).min(dom.asks.len());
        if depth == 0 {
            return ObiBreakdown {
                obi: 0.0,
                weighted_bid: 0.0,
                weighted_ask: 0.0,
                weighted_total: 0.0,
            };
        }

        let weighted = |levels: &[BookLevel]| -> f64 {
            levels
                .iter()
                .take(depth)
                .zip(&self.weights)
                .map(|(l, w)| l.volume.max(0.0) * w)
                .sum()
        };

        let weighted_bid = weighted(&dom.bids);
        let weighted_ask = weighted(&dom.asks);
        let weighted_total = weighted_bid + weighted_ask;

        if weighted_total <= 0.0 {
            return ObiBreakdown {
                obi: 0.0,
                weighted_bid,
                weighted_ask,
                weighted_total,
            };
        }

        ObiBreakdown {
            obi: (weighted_bid - weighted_ask) / weighted_total,
            weighted_bid,
            weighted_ask,
            weighted_total,
        }
    }
}

/// Unweighted whole-book imbalance.
///
/// Every level counts equally; used when the feed's depth is too thin for
/// the weighted variant to mean anything.
pub fn simple_obi(bids: &[BookLevel], asks: &[BookLevel]) -> f64 {
    let total_bid: f64 = bids.iter().map(|l| l.volume.max(0.0)).sum();
    let total_ask: f64 = asks.iter().map(|l| l.volume.max(0.0)).sum();
    let total = total_bid + total_ask;
    if total <= 0.0 {
        return 0.0;
    }
    (total_bid - total_ask) / total
}
