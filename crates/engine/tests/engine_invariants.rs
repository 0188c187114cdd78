//! Engine invariants under adversarial event sequences
//!
//! Drives the full engine with a long seeded pseudo-random interleaving of
//! tick, depth and trade events and checks the order-command stream for the
//! structural invariants that must hold for any input:
//! - never a second entry while one is outstanding
//! - entries and cancels strictly alternate, starting with an entry
//! - every cancel references the entry it cancels

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use meridian_core::{BookLevel, DomSnapshot, ManualClock, Side, TickEvent, TradeEvent};
use meridian_engine::{ChannelSink, DecisionEngine, EngineConfig};
use meridian_signal::{
    IcebergConfig, IcebergDetector, KalmanConfig, ObiCalculator, ObiConfig, OnlineKalman,
    RegimeConfig, RegimeMonitor,
};

fn build_engine(
    clock: Arc<ManualClock>,
) -> (
    DecisionEngine,
    tokio::sync::mpsc::UnboundedReceiver<meridian_core::OrderCommand>,
) {
    let (sink, rx) = ChannelSink::pair();
    let engine = DecisionEngine::new(
        EngineConfig::default(),
        Box::new(OnlineKalman::new(KalmanConfig::default())),
        ObiCalculator::new(ObiConfig::default()).unwrap(),
        IcebergDetector::new(IcebergConfig::default()),
        RegimeMonitor::new(RegimeConfig::default()).unwrap(),
        Box::new(sink),
        clock,
    )
    .unwrap();
    (engine, rx)
}

#[test]
fn fuzzed_event_stream_never_double_enters() {
    let mut rng = StdRng::seed_from_u64(7);
    let clock = Arc::new(ManualClock::new(0));
    let (mut engine, mut rx) = build_engine(clock.clone());

    let mut ts: i64 = 0;
    let mut primary = 6800.0;
    let mut aux1 = 24_000.0;
    let mut aux2 = 42_000.0;

    // known-good preamble so the run is guaranteed to contain at least one
    // entry before the random phase starts
    engine.on_dom(&DomSnapshot {
        ts_ms: ts,
        best_bid: primary - 0.25,
        best_ask: primary,
        bids: vec![BookLevel::new(primary - 0.25, 150.0)],
        asks: vec![BookLevel::new(primary, 40.0)],
    });
    engine.on_tick(&TickEvent {
        ts_ms: ts,
        primary,
        aux1: Some(aux1),
        aux2: Some(aux2),
        risk_index: None,
    });
    engine.on_tick(&TickEvent {
        ts_ms: ts + 100,
        primary,
        aux1: Some(aux1 + 10.0),
        aux2: Some(aux2),
        risk_index: None,
    });
    ts += 200;

    for _ in 0..10_000 {
        // time moves forward erratically; occasionally far enough to trip
        // the pending-order timeout
        let step = if rng.gen_bool(0.01) {
            rng.gen_range(10_000..20_000)
        } else {
            rng.gen_range(1..200)
        };
        ts += step;
        clock.advance(step);

        // correlated random walks with occasional decoupling so the model
        // sees real spreads in both directions
        primary += rng.gen_range(-0.5..0.5);
        aux1 += rng.gen_range(-8.0..8.0);
        aux2 += rng.gen_range(-12.0..12.0);

        match rng.gen_range(0..10) {
            0..=4 => {
                engine.on_tick(&TickEvent {
                    ts_ms: ts,
                    primary,
                    aux1: rng.gen_bool(0.8).then_some(aux1),
                    aux2: rng.gen_bool(0.8).then_some(aux2),
                    risk_index: rng.gen_bool(0.5).then_some(42_000.0 + rng.gen_range(-50.0..50.0)),
                });
            }
            5..=8 => {
                let best_bid = primary - 0.25;
                let mut bids = Vec::new();
                let mut asks = Vec::new();
                for i in 0..rng.gen_range(0..6) {
                    bids.push(BookLevel::new(
                        best_bid - 0.25 * i as f64,
                        rng.gen_range(0.0..400.0),
                    ));
                    asks.push(BookLevel::new(
                        primary + 0.25 * i as f64,
                        rng.gen_range(0.0..400.0),
                    ));
                }
                engine.on_dom(&DomSnapshot {
                    ts_ms: ts,
                    best_bid,
                    best_ask: primary,
                    bids,
                    asks,
                });
            }
            _ => {
                engine.on_trade(&TradeEvent {
                    ts_ms: ts,
                    price: primary,
                    volume: rng.gen_range(1.0..300.0),
                    aggressor: if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell },
                });
            }
        }
    }

    // replay the command stream: entries and cancels must alternate
    let mut active: Option<String> = None;
    let mut entries = 0u32;
    while let Ok(cmd) = rx.try_recv() {
        if cmd.is_cancel {
            let pending = active.take().expect("cancel without an active entry");
            assert_eq!(Some(pending), cmd.client_order_id);
        } else {
            assert!(
                active.is_none(),
                "second entry emitted while one was outstanding"
            );
            active = cmd.client_order_id.clone();
            entries += 1;
            assert_eq!(cmd.quantity, Some(1));
            assert!(cmd.price.is_some());
        }
    }

    // the walk decouples often enough that the engine actually traded
    assert!(entries > 0, "fuzz run produced no entries at all");
}

#[test]
fn timeout_produces_one_cancel_and_returns_to_idle() {
    let clock = Arc::new(ManualClock::new(0));
    let (mut engine, mut rx) = build_engine(clock.clone());

    engine.on_dom(&DomSnapshot {
        ts_ms: 900,
        best_bid: 6799.75,
        best_ask: 6800.00,
        bids: vec![BookLevel::new(6799.75, 150.0)],
        asks: vec![BookLevel::new(6800.00, 40.0)],
    });
    engine.on_tick(&TickEvent {
        ts_ms: 1_000,
        primary: 6800.0,
        aux1: Some(24_000.0),
        aux2: Some(42_000.0),
        risk_index: None,
    });
    engine.on_tick(&TickEvent {
        ts_ms: 1_100,
        primary: 6800.0,
        aux1: Some(24_010.0),
        aux2: Some(42_000.0),
        risk_index: None,
    });

    let entry = rx.try_recv().expect("entry");
    assert!(!entry.is_cancel);
    assert!(!engine.is_idle());

    // no intervening tick for a long while, then one arrives
    clock.advance(30_000);
    engine.on_tick(&TickEvent {
        ts_ms: 31_100,
        primary: 6800.0,
        aux1: Some(24_010.0),
        aux2: Some(42_000.0),
        risk_index: None,
    });

    let cancel = rx.try_recv().expect("cancel");
    assert!(cancel.is_cancel);
    assert_eq!(cancel.client_order_id, entry.client_order_id);
    assert!(engine.is_idle());

    let mut extra_cancels = 0;
    while let Ok(cmd) = rx.try_recv() {
        if cmd.is_cancel {
            extra_cancels += 1;
        }
    }
    assert_eq!(extra_cancels, 0, "exactly one cancel per timed-out entry");
}
