//! Demo runner: synthetic feed → bounded queue → decision engine.
//!
//! Usage: `meridian [config.json]`

use std::sync::Arc;

use log::info;

use meridian_core::SystemClock;
use meridian_engine::ChannelSink;
use meridian_gateway::{EventQueue, TickAssembler};
use meridian_runner::{FeedConfig, SyntheticFeed, build_engine, init_logging, load_config, run_loop};

const FEED_EVENTS: usize = 200_000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let cfg = match std::env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => Default::default(),
    };

    let (sink, mut orders_rx) = ChannelSink::pair();
    let clock = Arc::new(SystemClock::new());
    let mut engine = build_engine(&cfg, Box::new(sink), clock)?;
    let mut assembler = TickAssembler::new(cfg.symbols.clone());
    let queue = Arc::new(EventQueue::new(cfg.queue_capacity)?);

    // producer thread, as the real decoder would be
    let producer_queue = queue.clone();
    let symbols = cfg.symbols.clone();
    let producer = std::thread::spawn(move || {
        let mut feed = SyntheticFeed::with_seed(FeedConfig::default(), symbols, 42);
        for _ in 0..FEED_EVENTS {
            if producer_queue.push(feed.next_event()).is_err() {
                break;
            }
        }
        producer_queue.close();
    });

    // execution stand-in: log every command the engine emits
    let orders = tokio::spawn(async move {
        let mut entries = 0u64;
        let mut cancels = 0u64;
        while let Some(cmd) = orders_rx.recv().await {
            if cmd.is_cancel {
                cancels += 1;
                info!("order out: cancel {:?} ({})", cmd.client_order_id, cmd.reason);
            } else {
                entries += 1;
                info!(
                    "order out: {:?} {:?}@{:?} ({})",
                    cmd.side, cmd.quantity, cmd.price, cmd.reason
                );
            }
        }
        (entries, cancels)
    });

    let stats = run_loop(&queue, &mut assembler, &mut engine).await;
    drop(engine); // closes the sink channel so the order task ends

    let (entries, cancels) = orders.await?;
    producer.join().expect("producer thread");

    info!(
        "run complete: {} ticks, {} depth updates, {} entries, {} cancels, {} shed",
        stats.ticks,
        stats.depth_updates,
        entries,
        cancels,
        queue.shed_count()
    );
    Ok(())
}
