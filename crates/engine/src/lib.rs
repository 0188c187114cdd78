//! Meridian Decision Engine
//!
//! Orchestrates the signal components into a layered filter pipeline and a
//! single-order position state machine:
//!
//! ```text
//! TickEvent ──► pricing model ──► spread (ticks)
//!                    │
//!                    ▼
//!          regime filter ─► iceberg filter ─► OBI filter ─► queue gate
//!                    │ (fail-fast, cheapest first)
//!                    ▼
//!              OrderCommand ──► OrderSink
//! ```
//!
//! The engine owns all mutable state and is driven by exactly one consumer
//! thread; it never locks and never blocks on I/O.

pub mod config;
pub mod engine;
pub mod sink;
pub mod snapshot;

pub use config::EngineConfig;
pub use engine::{DecisionEngine, PositionState};
pub use sink::{ChannelSink, OrderSink};
pub use snapshot::DecisionSnapshot;
