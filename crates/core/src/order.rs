//! Order commands emitted by the decision engine
//!
//! The engine does not talk to a venue. It emits `OrderCommand` values and an
//! external execution collaborator maps them onto real order ids, venue
//! submission and fill/cancel acknowledgement.

use serde::{Deserialize, Serialize};

/// Order side (Buy or Sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order type. Entries are always limit orders; market is reserved for
/// emergency flattening by the execution layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
}

/// Instruction to the execution collaborator: place a new order or cancel an
/// existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCommand {
    pub is_cancel: bool,
    /// Set by the engine for tracking; the execution layer may re-map it to
    /// a venue order id.
    pub client_order_id: Option<String>,
    pub side: Option<Side>,
    pub order_type: Option<OrderType>,
    pub price: Option<f64>,
    pub quantity: Option<u32>,
    /// Free-text tag for logs and post-trade analysis.
    pub reason: String,
}

impl OrderCommand {
    /// New limit entry.
    pub fn limit(
        client_order_id: impl Into<String>,
        side: Side,
        price: f64,
        quantity: u32,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            is_cancel: false,
            client_order_id: Some(client_order_id.into()),
            side: Some(side),
            order_type: Some(OrderType::Limit),
            price: Some(price),
            quantity: Some(quantity),
            reason: reason.into(),
        }
    }

    /// Cancel of a previously emitted order.
    pub fn cancel(client_order_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            is_cancel: true,
            client_order_id: Some(client_order_id.into()),
            side: None,
            order_type: None,
            price: None,
            quantity: None,
            reason: reason.into(),
        }
    }
}
