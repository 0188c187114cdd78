//! The event loop
//!
//! Single consumer: pops typed events in strict FIFO arrival order and
//! drives the assembler and engine synchronously. Ends when the queue is
//! closed and drained.

use log::info;

use meridian_engine::DecisionEngine;
use meridian_gateway::{EventQueue, MarketEvent, TickAssembler};

/// Counters from one loop run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub trades: u64,
    pub depth_updates: u64,
    pub ticks: u64,
}

/// Drain the queue into the engine until it closes.
pub async fn run_loop(
    queue: &EventQueue,
    assembler: &mut TickAssembler,
    engine: &mut DecisionEngine,
) -> RunStats {
    let mut stats = RunStats::default();

    while let Some(event) = queue.pop().await {
        match event {
            MarketEvent::Trade { symbol, trade } => {
                stats.trades += 1;
                // primary prints feed hidden-liquidity reconciliation before
                // they roll into the combined tick
                if assembler.is_primary(&symbol) {
                    engine.on_trade(&trade);
                }
                if let Some(tick) = assembler.on_trade(&symbol, &trade) {
                    stats.ticks += 1;
                    engine.on_tick(&tick);
                }
            }
            MarketEvent::Depth { symbol, dom } => {
                stats.depth_updates += 1;
                if assembler.is_primary(&symbol) {
                    engine.on_dom(&dom);
                }
            }
        }
    }

    info!(
        "event loop done: {} trades, {} depth updates, {} ticks",
        stats.trades, stats.depth_updates, stats.ticks
    );
    stats
}
