//! Meridian Runner
//!
//! Wires the pieces together: configuration and logging bootstrap, the
//! single-consumer event loop that drives the decision engine, and a seeded
//! synthetic feed for integration tests and demos.
//!
//! Threading model: one producer (decoder or synthetic feed) pushes typed
//! events into the bounded queue; one consumer task pops them in FIFO order
//! and drives the engine synchronously. All engine state is owned by the
//! consumer; the queue is the only shared structure.

pub mod bootstrap;
pub mod feed;
pub mod run;

pub use bootstrap::{BootstrapError, ModelKind, RunnerConfig, build_engine, init_logging, load_config};
pub use feed::{FeedConfig, SyntheticFeed};
pub use run::{RunStats, run_loop};
