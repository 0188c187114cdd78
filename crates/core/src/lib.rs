//! Meridian Core Domain
//!
//! Pure domain types for the Meridian trading engine.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod clock;
pub mod events;
pub mod order;

// Re-export commonly used types at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use events::{BookLevel, DomSnapshot, TickEvent, TimestampMs, TradeEvent};
pub use order::{OrderCommand, OrderType, Side};
