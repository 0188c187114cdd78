//! Hidden-liquidity (iceberg) detection
//!
//! Infers resting liquidity that is not displayed by reconciling executed
//! trade volume against the displayed size at the touched price: when an
//! aggregated execution at the touch meets or exceeds what the book showed,
//! the excess was hidden replenishment.
//!
//! Detected levels live in a decaying map keyed by price: positive hidden
//! volume is ask-side (resistance above), negative is bid-side (support
//! below). Entries expire once no detection has refreshed them within the
//! decay horizon.
//!
//! The feed may fragment one execution into several prints with the same
//! timestamp, so trades are buffered per arrival timestamp and aggregated by
//! (price, aggressor side) before detection.

use serde::{Deserialize, Serialize};

use meridian_core::{DomSnapshot, Side, TimestampMs};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IcebergConfig {
    /// Smallest hidden excess worth recording, in contracts.
    pub min_hidden_size: f64,
    /// Price match tolerance against the touch and for level queries.
    pub price_tolerance: f64,
    /// Seconds a detection stays alive without being refreshed.
    pub decay_secs: f64,
    /// Default query range in ticks above/below the reference price.
    pub check_range_ticks: u32,
    /// Hidden volume at/beyond which a direction is considered blocked.
    pub significance_threshold: f64,
    /// Instrument tick size, for range walking.
    pub tick_size: f64,
}

impl Default for IcebergConfig {
    fn default() -> Self {
        Self {
            min_hidden_size: 10.0,
            price_tolerance: 0.01,
            decay_secs: 60.0,
            check_range_ticks: 5,
            significance_threshold: 200.0,
            tick_size: 0.25,
        }
    }
}

/// One detected hidden-liquidity level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IcebergLevel {
    pub price: f64,
    /// Signed hidden volume: positive = ask-side (resistance), negative =
    /// bid-side (support).
    pub hidden: f64,
    pub last_detected_ms: TimestampMs,
}

/// Best bid/ask snapshot used for trade-vs-displayed comparison.
#[derive(Debug, Clone, Copy)]
struct QuoteState {
    best_bid_price: f64,
    best_bid_size: f64,
    best_ask_price: f64,
    best_ask_size: f64,
    ts_ms: TimestampMs,
}

/// Streaming iceberg detector.
pub struct IcebergDetector {
    cfg: IcebergConfig,
    quote: Option<QuoteState>,
    levels: Vec<IcebergLevel>,
    /// Prints buffered within the current arrival-timestamp window.
    trade_buffer: Vec<(f64, f64, Side, TimestampMs)>,
    last_trade_ms: Option<TimestampMs>,
}

impl IcebergDetector {
    pub fn new(cfg: IcebergConfig) -> Self {
        Self {
            cfg,
            quote: None,
            levels: Vec::new(),
            trade_buffer: Vec::new(),
            last_trade_ms: None,
        }
    }

    pub fn reset(&mut self) {
        self.quote = None;
        self.levels.clear();
        self.trade_buffer.clear();
        self.last_trade_ms = None;
    }

    /// Track the touch from a depth update.
    ///
    /// Buffered trades are flushed against the quote they executed into
    /// before it is replaced, then stale levels are evicted.
    pub fn on_dom(&mut self, dom: &DomSnapshot) {
        if !self.trade_buffer.is_empty() {
            self.flush_buffer();
        }

        let (Some(bid), Some(ask)) = (dom.bids.first(), dom.asks.first()) else {
            return;
        };

        self.quote = Some(QuoteState {
            best_bid_price: dom.best_bid,
            best_bid_size: bid.volume,
            best_ask_price: dom.best_ask,
            best_ask_size: ask.volume,
            ts_ms: dom.ts_ms,
        });

        self.evict_expired(dom.ts_ms);
    }

    /// Buffer one trade print.
    ///
    /// A print with a newer timestamp closes the previous window and runs
    /// detection over its aggregate.
    pub fn on_trade(&mut self, price: f64, volume: f64, aggressor: Side, ts_ms: TimestampMs) {
        if let Some(last) = self.last_trade_ms
            && ts_ms > last
        {
            self.flush_buffer();
        }
        self.trade_buffer.push((price, volume, aggressor, ts_ms));
        self.last_trade_ms = Some(ts_ms);
    }

    /// Force detection over whatever is buffered.
    pub fn flush_trades(&mut self) {
        if !self.trade_buffer.is_empty() {
            self.flush_buffer();
        }
    }

    fn flush_buffer(&mut self) {
        if self.quote.is_none() {
            self.trade_buffer.clear();
            return;
        }

        // Aggregate fragmented prints by (price, aggressor side).
        let mut aggregated: Vec<(f64, Side, f64)> = Vec::new();
        for &(price, volume, side, _) in &self.trade_buffer {
            match aggregated
                .iter_mut()
                .find(|(p, s, _)| p.to_bits() == price.to_bits() && *s == side)
            {
                Some((_, _, total)) => *total += volume,
                None => aggregated.push((price, side, volume)),
            }
        }
        self.trade_buffer.clear();

        for (price, side, volume) in aggregated {
            self.detect(price, volume, side);
        }
    }

    fn detect(&mut self, price: f64, volume: f64, aggressor: Side) {
        let Some(quote) = self.quote else {
            return;
        };

        let (touch_price, displayed, sign) = match aggressor {
            Side::Buy => (quote.best_ask_price, quote.best_ask_size, 1.0),
            Side::Sell => (quote.best_bid_price, quote.best_bid_size, -1.0),
        };

        if (price - touch_price).abs() >= self.cfg.price_tolerance {
            return;
        }
        if displayed <= 0.0 || volume < displayed {
            return;
        }

        let hidden = volume - displayed;
        if hidden < self.cfg.min_hidden_size {
            return;
        }

        log::debug!(
            "iceberg detected at {price:.2}: hidden {hidden:.0} ({})",
            if sign > 0.0 { "ask" } else { "bid" },
        );
        self.record(price, sign * hidden, quote.ts_ms);
    }

    fn record(&mut self, price: f64, hidden: f64, ts_ms: TimestampMs) {
        match self
            .levels
            .iter_mut()
            .find(|l| (l.price - price).abs() < self.cfg.price_tolerance)
        {
            Some(level) => {
                if level.hidden.signum() == hidden.signum() {
                    // Same direction: repeated replenishment accumulates.
                    level.hidden += hidden;
                } else if hidden.abs() > level.hidden.abs() {
                    // Opposite direction: larger magnitude wins.
                    level.hidden = hidden;
                }
                level.last_detected_ms = ts_ms;
            }
            None => self.levels.push(IcebergLevel {
                price,
                hidden,
                last_detected_ms: ts_ms,
            }),
        }
    }

    fn evict_expired(&mut self, now_ms: TimestampMs) {
        let decay_ms = (self.cfg.decay_secs * 1_000.0) as i64;
        self.levels
            .retain(|l| now_ms - l.last_detected_ms <= decay_ms);
    }

    /// Total ask-side hidden volume within `range_ticks` ticks above `price`.
    pub fn resistance(&self, price: f64, range_ticks: u32) -> f64 {
        self.scan(price, range_ticks, 1.0)
    }

    /// Total bid-side hidden volume (absolute) within `range_ticks` ticks
    /// below `price`.
    pub fn support(&self, price: f64, range_ticks: u32) -> f64 {
        self.scan(price, range_ticks, -1.0)
    }

    fn scan(&self, price: f64, range_ticks: u32, direction: f64) -> f64 {
        let mut total = 0.0;
        for i in 1..=range_ticks {
            let check = price + direction * (i as f64) * self.cfg.tick_size;
            for level in &self.levels {
                if (level.price - check).abs() < self.cfg.price_tolerance
                    && level.hidden * direction > 0.0
                {
                    total += level.hidden.abs();
                }
            }
        }
        total
    }

    /// Pass/fail filter: is the intended direction blocked by significant
    /// hidden liquidity? Longs are blocked by resistance above, shorts by
    /// support below.
    pub fn blocks(&self, price: f64, intended: Side) -> bool {
        let range = self.cfg.check_range_ticks;
        match intended {
            Side::Buy => self.resistance(price, range) > self.cfg.significance_threshold,
            Side::Sell => self.support(price, range) > self.cfg.significance_threshold,
        }
    }

    /// Current detected levels, for logs and analytics.
    pub fn levels(&self) -> &[IcebergLevel] {
        &self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::BookLevel;

    fn dom(ts_ms: TimestampMs, bid: (f64, f64), ask: (f64, f64)) -> DomSnapshot {
        DomSnapshot {
            ts_ms,
            best_bid: bid.0,
            best_ask: ask.0,
            bids: vec![BookLevel::new(bid.0, bid.1)],
            asks: vec![BookLevel::new(ask.0, ask.1)],
        }
    }

    fn detector() -> IcebergDetector {
        IcebergDetector::new(IcebergConfig::default())
    }

    #[test]
    fn buy_sweep_through_displayed_ask_records_resistance() {
        let mut det = detector();
        det.on_dom(&dom(1_000, (6800.00, 40.0), (6800.25, 50.0)));

        // one execution fragmented into two prints at the same millisecond
        det.on_trade(6800.25, 50.0, Side::Buy, 1_001);
        det.on_trade(6800.25, 30.0, Side::Buy, 1_001);
        det.flush_trades();

        let levels = det.levels();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].hidden, 30.0);

        // visible from one tick below the detection price
        assert_eq!(det.resistance(6800.00, 4), 30.0);
        assert_eq!(det.support(6800.50, 4), 0.0);
    }

    #[test]
    fn sell_sweep_through_displayed_bid_records_support() {
        let mut det = detector();
        det.on_dom(&dom(1_000, (6800.00, 20.0), (6800.25, 50.0)));

        det.on_trade(6800.00, 45.0, Side::Sell, 1_001);
        det.flush_trades();

        assert_eq!(det.levels()[0].hidden, -25.0);
        assert_eq!(det.support(6800.25, 4), 25.0);
        assert_eq!(det.resistance(6799.75, 4), 0.0);
    }

    #[test]
    fn below_displayed_size_or_min_hidden_is_ignored() {
        let mut det = detector();
        det.on_dom(&dom(1_000, (6800.00, 40.0), (6800.25, 50.0)));

        // volume below displayed size: normal fill, not an iceberg
        det.on_trade(6800.25, 49.0, Side::Buy, 1_001);
        det.flush_trades();
        assert!(det.levels().is_empty());

        // excess below min_hidden_size
        det.on_trade(6800.25, 55.0, Side::Buy, 1_002);
        det.flush_trades();
        assert!(det.levels().is_empty());
    }

    #[test]
    fn away_from_touch_is_ignored() {
        let mut det = detector();
        det.on_dom(&dom(1_000, (6800.00, 40.0), (6800.25, 50.0)));

        det.on_trade(6801.00, 90.0, Side::Buy, 1_001);
        det.flush_trades();
        assert!(det.levels().is_empty());
    }

    #[test]
    fn repeat_detection_accumulates_same_direction() {
        let mut det = detector();
        det.on_dom(&dom(1_000, (6800.00, 40.0), (6800.25, 50.0)));
        det.on_trade(6800.25, 80.0, Side::Buy, 1_001);

        // new timestamp flushes the previous window
        det.on_trade(6800.25, 70.0, Side::Buy, 1_050);
        det.on_dom(&dom(1_100, (6800.00, 40.0), (6800.25, 50.0)));

        det.on_trade(6800.25, 70.0, Side::Buy, 1_150);
        det.flush_trades();

        // 30 + 20 + 20
        assert_eq!(det.levels()[0].hidden, 70.0);
    }

    #[test]
    fn opposite_direction_keeps_larger_magnitude() {
        let mut det = detector();
        det.on_dom(&dom(1_000, (6800.00, 50.0), (6800.00, 50.0)));

        det.on_trade(6800.00, 80.0, Side::Buy, 1_001); // +30 ask-side
        det.flush_trades();
        assert_eq!(det.levels()[0].hidden, 30.0);

        det.on_trade(6800.00, 70.0, Side::Sell, 1_002); // -20: smaller, kept out
        det.flush_trades();
        assert_eq!(det.levels()[0].hidden, 30.0);

        det.on_trade(6800.00, 100.0, Side::Sell, 1_003); // -50: larger, wins
        det.flush_trades();
        assert_eq!(det.levels()[0].hidden, -50.0);
    }

    #[test]
    fn entries_decay_after_horizon() {
        let mut det = detector();
        det.on_dom(&dom(1_000, (6800.00, 40.0), (6800.25, 50.0)));
        det.on_trade(6800.25, 80.0, Side::Buy, 1_001);
        det.flush_trades();
        assert_eq!(det.resistance(6800.00, 4), 30.0);

        // 59s later: still alive
        det.on_dom(&dom(60_000, (6800.00, 40.0), (6800.25, 50.0)));
        assert_eq!(det.resistance(6800.00, 4), 30.0);

        // past the 60s horizon: evicted
        det.on_dom(&dom(62_000, (6800.00, 40.0), (6800.25, 50.0)));
        assert_eq!(det.resistance(6800.00, 4), 0.0);
        assert!(det.levels().is_empty());
    }

    #[test]
    fn blocks_only_beyond_significance_threshold() {
        let mut det = detector();
        det.on_dom(&dom(1_000, (6800.00, 40.0), (6800.25, 100.0)));
        det.on_trade(6800.25, 250.0, Side::Buy, 1_001); // +150 hidden
        det.flush_trades();
        assert!(!det.blocks(6800.00, Side::Buy));

        det.on_trade(6800.25, 200.0, Side::Buy, 1_002); // +100 more
        det.flush_trades();
        assert!(det.blocks(6800.00, Side::Buy));
        assert!(!det.blocks(6800.50, Side::Sell));
    }

    #[test]
    fn trades_without_quote_are_dropped() {
        let mut det = detector();
        det.on_trade(6800.25, 500.0, Side::Buy, 1_001);
        det.flush_trades();
        assert!(det.levels().is_empty());
    }
}
