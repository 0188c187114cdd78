//! Meridian Gateway
//!
//! The boundary between wire decoding and the decision core:
//! - [`MarketEvent`]: the typed inbound event stream (the core never sees
//!   raw wire data)
//! - [`EventQueue`]: the bounded producer/consumer hand-off with an explicit
//!   drop-oldest overflow policy
//! - [`TickAssembler`]: folds per-symbol trade prints into the combined
//!   multi-instrument ticks the pricing models consume

pub mod assembler;
pub mod error;
pub mod events;
pub mod queue;

pub use assembler::{SymbolMap, TickAssembler};
pub use error::TransportError;
pub use events::MarketEvent;
pub use queue::EventQueue;
