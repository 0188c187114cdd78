//! Order sink port
//!
//! The engine never calls an execution API. It hands `OrderCommand`s to an
//! `OrderSink`; the execution collaborator behind it owns venue order ids,
//! submission and acknowledgement.

use meridian_core::OrderCommand;
use tokio::sync::mpsc;

/// Outbound boundary for order commands.
pub trait OrderSink: Send {
    fn submit(&mut self, cmd: OrderCommand);
}

/// Channel-backed sink: commands are handed to a tokio mpsc channel whose
/// receiver lives with the execution collaborator.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<OrderCommand>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<OrderCommand>) -> Self {
        Self { tx }
    }

    /// Create a sink plus the receiver end for the consumer.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<OrderCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl OrderSink for ChannelSink {
    fn submit(&mut self, cmd: OrderCommand) {
        // A gone consumer means shutdown; dropping the command is the only
        // sensible thing left.
        if self.tx.send(cmd).is_err() {
            log::warn!("order sink channel closed, dropping command");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::Side;

    #[test]
    fn channel_sink_delivers() {
        let (mut sink, mut rx) = ChannelSink::pair();
        sink.submit(OrderCommand::limit("id-1", Side::Buy, 6800.0, 1, "test"));
        let cmd = rx.try_recv().unwrap();
        assert_eq!(cmd.client_order_id.as_deref(), Some("id-1"));
    }

    #[test]
    fn channel_sink_survives_dropped_receiver() {
        let (mut sink, rx) = ChannelSink::pair();
        drop(rx);
        sink.submit(OrderCommand::cancel("id-1", "test"));
    }
}
