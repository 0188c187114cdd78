//! The decision engine
//!
//! One instance per traded instrument. Holds the pricing model, the three
//! filters and the position state machine, and turns inbound events into at
//! most one outstanding entry order at a time.
//!
//! Filters run cheapest-first: the regime flag is a boolean read, the iceberg
//! query scans a handful of levels, the OBI is two dot products over the
//! book. A rejected signal stops at the first failing layer.

use std::sync::Arc;

use log::{debug, info};
use uuid::Uuid;

use crate::config::{EngineConfig, EngineConfigError};
use crate::sink::OrderSink;
use crate::snapshot::DecisionSnapshot;
use meridian_core::{Clock, DomSnapshot, OrderCommand, Side, TickEvent, TradeEvent};
use meridian_signal::{IcebergDetector, ObiCalculator, PricingModel, RegimeMonitor, Valuation};

/// At most one outstanding entry per engine instance.
///
/// Created when an entry is emitted, cleared when the pending-order timeout
/// cancels it. There is no fill-acknowledgement channel in the current
/// contract: the execution collaborator owns fills, and wiring its reports
/// back into this state is an open integration point.
#[derive(Debug, Clone, Default)]
pub struct PositionState {
    pub active_order_id: Option<String>,
    pub entry_price: f64,
    pub entry_time_ms: i64,
    pub side: Option<Side>,
}

/// Single-position market-making decision engine.
pub struct DecisionEngine {
    cfg: EngineConfig,
    model: Box<dyn PricingModel>,
    obi: ObiCalculator,
    iceberg: IcebergDetector,
    regime: RegimeMonitor,
    position: PositionState,
    last_dom: Option<DomSnapshot>,
    sink: Box<dyn OrderSink>,
    clock: Arc<dyn Clock>,
    valuation: Valuation,
    spread_ticks: Option<f64>,
    last_decision: Option<DecisionSnapshot>,
}

impl DecisionEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cfg: EngineConfig,
        model: Box<dyn PricingModel>,
        obi: ObiCalculator,
        iceberg: IcebergDetector,
        regime: RegimeMonitor,
        sink: Box<dyn OrderSink>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EngineConfigError> {
        cfg.validate()?;
        info!("decision engine up, pricing model {}", model.name());
        Ok(Self {
            cfg,
            model,
            obi,
            iceberg,
            regime,
            position: PositionState::default(),
            last_dom: None,
            sink,
            clock,
            valuation: Valuation::default(),
            spread_ticks: None,
            last_decision: None,
        })
    }

    /// Depth update: remember the book and track the touch for iceberg
    /// detection.
    pub fn on_dom(&mut self, dom: &DomSnapshot) {
        self.iceberg.on_dom(dom);
        self.last_dom = Some(dom.clone());
    }

    /// Primary-instrument trade print, for hidden-liquidity reconciliation.
    pub fn on_trade(&mut self, trade: &TradeEvent) {
        self.iceberg
            .on_trade(trade.price, trade.volume, trade.aggressor, trade.ts_ms);
    }

    /// Tick entry point: update models, manage the pending order, and decide.
    pub fn on_tick(&mut self, tick: &TickEvent) {
        if let Some(risk_price) = tick.risk_index {
            self.regime.on_price(risk_price, tick.ts_ms);
        }

        let valuation = self.model.update(tick);
        self.valuation = valuation;
        self.spread_ticks = valuation.spread.map(|s| s / self.cfg.tick_size);

        self.manage_pending();

        // Never a second entry while one is outstanding.
        if self.position.active_order_id.is_some() {
            return;
        }

        let (Some(fair), Some(spread)) = (valuation.fair, valuation.spread) else {
            return;
        };
        let spread_ticks = spread / self.cfg.tick_size;

        let threshold = self.threshold();
        let side = if spread_ticks > threshold {
            Side::Buy
        } else if spread_ticks < -threshold {
            Side::Sell
        } else {
            return;
        };

        if !self.passes_filters(tick, side) {
            return;
        }

        self.place_entry(tick, side, fair, spread_ticks);
    }

    /// Entry threshold in ticks.
    ///
    /// Static for now; the seam where a volatility-adaptive threshold will
    /// plug in.
    fn threshold(&self) -> f64 {
        self.cfg.spread_threshold_ticks
    }

    /// Layered veto pipeline, strictly regime → iceberg → OBI.
    fn passes_filters(&self, tick: &TickEvent, side: Side) -> bool {
        if !self.regime.is_safe() {
            debug!(
                "signal vetoed: regime unsafe (ratio {:.2})",
                self.regime.vol_ratio()
            );
            return false;
        }

        let Some(dom) = &self.last_dom else {
            return false;
        };

        if self.iceberg.blocks(tick.primary, side) {
            debug!("signal vetoed: hidden liquidity against {side:?}");
            return false;
        }

        let obi = self.obi.calculate(dom);
        match side {
            Side::Buy if obi < self.cfg.min_obi_long => {
                debug!("signal vetoed: obi {obi:.3} below long threshold");
                false
            }
            Side::Sell if obi > -self.cfg.min_obi_short => {
                debug!("signal vetoed: obi {obi:.3} above short threshold");
                false
            }
            _ => true,
        }
    }

    fn place_entry(&mut self, tick: &TickEvent, side: Side, fair: f64, spread_ticks: f64) {
        let (queue_size, price, obi) = {
            let Some(dom) = &self.last_dom else {
                return;
            };
            let price = match side {
                Side::Buy => dom.best_bid,
                Side::Sell => dom.best_ask,
            };
            (dom.best_volume(side), price, self.obi.calculate(dom))
        };

        // Join the queue only while it is short; deep queues fill last,
        // typically after the edge is gone.
        if queue_size > self.cfg.max_queue_size {
            debug!("signal vetoed: queue {queue_size:.0} too deep for {side:?}");
            return;
        }

        let order_id = Uuid::new_v4().to_string();
        let reason = match side {
            Side::Buy => "maker_entry_buy",
            Side::Sell => "maker_entry_sell",
        };
        let cmd = OrderCommand::limit(
            order_id.clone(),
            side,
            price,
            self.cfg.order_quantity,
            reason,
        );

        self.position = PositionState {
            active_order_id: Some(order_id),
            entry_price: price,
            entry_time_ms: self.clock.now_ms(),
            side: Some(side),
        };
        self.last_decision = Some(DecisionSnapshot {
            ts_ms: tick.ts_ms,
            side,
            price,
            fair,
            spread_ticks,
            obi,
            queue_size,
            vol_ratio: self.regime.vol_ratio(),
        });

        info!(
            "entry {side:?} {}@{price:.2} (spread {spread_ticks:.1}t, queue {queue_size:.0})",
            self.cfg.order_quantity
        );
        self.sink.submit(cmd);
    }

    /// Pending-order management: `IDLE → PENDING_ENTRY → IDLE`.
    ///
    /// The only transition back to idle is the timeout cancel. Spread
    /// reversal and queue-collapse pre-emptive cancels are future hooks
    /// here.
    fn manage_pending(&mut self) {
        let Some(order_id) = self.position.active_order_id.clone() else {
            return;
        };

        let elapsed_secs = (self.clock.now_ms() - self.position.entry_time_ms) as f64 / 1_000.0;
        if elapsed_secs > self.cfg.max_wait_secs {
            info!("entry {order_id} unfilled after {elapsed_secs:.1}s, cancelling");
            self.sink
                .submit(OrderCommand::cancel(order_id, "timeout_cancel"));
            self.position = PositionState::default();
        }
    }

    /// Latest model output, for external query.
    pub fn valuation(&self) -> Valuation {
        self.valuation
    }

    /// Latest spread in ticks, when defined.
    pub fn spread_ticks(&self) -> Option<f64> {
        self.spread_ticks
    }

    pub fn position(&self) -> &PositionState {
        &self.position
    }

    pub fn is_idle(&self) -> bool {
        self.position.active_order_id.is_none()
    }

    /// Context of the most recent entry, for outcome analytics.
    pub fn last_decision(&self) -> Option<&DecisionSnapshot> {
        self.last_decision.as_ref()
    }
}
