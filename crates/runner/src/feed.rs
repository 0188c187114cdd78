//! Synthetic market feed
//!
//! Generates a correlated random walk over the primary, auxiliary and
//! risk-index instruments plus periodic depth snapshots, as a stand-in for
//! the real decoder in demos and integration tests. Seedable for
//! reproducible runs.

use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use meridian_core::{BookLevel, DomSnapshot, Side, TimestampMs, TradeEvent};
use meridian_gateway::{MarketEvent, SymbolMap};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeedConfig {
    pub start_ms: TimestampMs,
    /// Average event spacing.
    pub step_ms: i64,
    pub primary_start: f64,
    pub aux1_start: f64,
    pub aux2_start: f64,
    pub risk_start: f64,
    /// Per-event primary move scale; aux moves scale with price magnitude.
    pub volatility: f64,
    /// Book depth per side in snapshots.
    pub depth: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            start_ms: 0,
            step_ms: 50,
            primary_start: 6_800.0,
            aux1_start: 24_000.0,
            aux2_start: 43_000.0,
            risk_start: 42_000.0,
            volatility: 0.25,
            depth: 5,
        }
    }
}

/// Seeded generator of [`MarketEvent`]s.
pub struct SyntheticFeed {
    cfg: FeedConfig,
    symbols: SymbolMap,
    rng: StdRng,
    ts: TimestampMs,
    primary: f64,
    aux1: f64,
    aux2: f64,
    risk: f64,
}

impl SyntheticFeed {
    pub fn with_seed(cfg: FeedConfig, symbols: SymbolMap, seed: u64) -> Self {
        Self {
            symbols,
            rng: StdRng::seed_from_u64(seed),
            ts: cfg.start_ms,
            primary: cfg.primary_start,
            aux1: cfg.aux1_start,
            aux2: cfg.aux2_start,
            risk: cfg.risk_start,
            cfg,
        }
    }

    /// Generate the next event.
    pub fn next_event(&mut self) -> MarketEvent {
        self.ts += self.rng.gen_range(1..=self.cfg.step_ms.max(1) * 2);

        // one common factor drives the correlated legs; each instrument
        // keeps an idiosyncratic component so spreads open and close
        let factor = self.rng.gen_range(-1.0..1.0);
        let vol = self.cfg.volatility;
        self.primary += vol * (factor + 0.4 * self.rng.gen_range(-1.0..1.0));
        self.aux1 += 3.0 * vol * (factor + 0.6 * self.rng.gen_range(-1.0..1.0));
        self.aux2 += 5.0 * vol * (factor + 0.6 * self.rng.gen_range(-1.0..1.0));
        self.risk += 6.0 * vol * self.rng.gen_range(-1.0..1.0);

        match self.rng.gen_range(0..10) {
            0..=2 => self.trade(self.symbols.primary.clone(), self.primary),
            3..=4 => self.trade(self.symbols.aux1.clone(), self.aux1),
            5 => self.trade(self.symbols.aux2.clone(), self.aux2),
            6 => self.trade(self.symbols.risk_index.clone(), self.risk),
            _ => self.depth_snapshot(),
        }
    }

    fn trade(&mut self, symbol: String, price: f64) -> MarketEvent {
        MarketEvent::Trade {
            symbol,
            trade: TradeEvent {
                ts_ms: self.ts,
                price: round_tick(price, 0.25),
                volume: self.rng.gen_range(1.0..50.0),
                aggressor: if self.rng.gen_bool(0.5) {
                    Side::Buy
                } else {
                    Side::Sell
                },
            },
        }
    }

    fn depth_snapshot(&mut self) -> MarketEvent {
        let best_bid = round_tick(self.primary, 0.25) - 0.25;
        let best_ask = best_bid + 0.25;
        let depth = self.cfg.depth;

        let mut bids = Vec::with_capacity(depth);
        let mut asks = Vec::with_capacity(depth);
        for i in 0..depth {
            bids.push(BookLevel::new(
                best_bid - 0.25 * i as f64,
                self.rng.gen_range(5.0..250.0),
            ));
            asks.push(BookLevel::new(
                best_ask + 0.25 * i as f64,
                self.rng.gen_range(5.0..250.0),
            ));
        }

        MarketEvent::Depth {
            symbol: self.symbols.primary.clone(),
            dom: DomSnapshot {
                ts_ms: self.ts,
                best_bid,
                best_ask,
                bids,
                asks,
            },
        }
    }
}

fn round_tick(price: f64, tick: f64) -> f64 {
    (price / tick).round() * tick
}
