//! Bounded drop-oldest event queue
//!
//! The hand-off between the decoder thread and the engine loop. Capacity is
//! fixed; when the consumer falls behind, the oldest queued event is shed to
//! admit the newest. Bounded staleness is the contract here: a stale tick is
//! worthless, and neither unbounded memory growth nor blocking the network
//! thread is acceptable.
//!
//! `push` is synchronous and never blocks, so the producer can be a plain
//! thread; `pop` is async for the tokio-side consumer.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::Notify;

use crate::error::TransportError;
use crate::events::MarketEvent;

struct Inner {
    queue: VecDeque<MarketEvent>,
    closed: bool,
    shed_count: u64,
}

/// Fixed-capacity FIFO with overwrite-oldest-on-full overflow.
pub struct EventQueue {
    inner: Mutex<Inner>,
    notify: Notify,
    capacity: usize,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Result<Self, TransportError> {
        if capacity == 0 {
            return Err(TransportError::ZeroCapacity);
        }
        Ok(Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::with_capacity(capacity),
                closed: false,
                shed_count: 0,
            }),
            notify: Notify::new(),
            capacity,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a panicking thread; the queue state
        // itself is always consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Enqueue one event. Returns `true` when an older event was shed to
    /// make room.
    pub fn push(&self, event: MarketEvent) -> Result<bool, TransportError> {
        let shed = {
            let mut inner = self.lock();
            if inner.closed {
                return Err(TransportError::QueueClosed);
            }
            let shed = inner.queue.len() == self.capacity;
            if shed {
                inner.queue.pop_front();
                inner.shed_count += 1;
                if inner.shed_count.is_power_of_two() {
                    log::warn!("event queue full, {} events shed so far", inner.shed_count);
                }
            }
            inner.queue.push_back(event);
            shed
        };
        self.notify.notify_one();
        Ok(shed)
    }

    /// Dequeue the oldest event, waiting while the queue is empty.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub async fn pop(&self) -> Option<MarketEvent> {
        loop {
            {
                let mut inner = self.lock();
                if let Some(event) = inner.queue.pop_front() {
                    return Some(event);
                }
                if inner.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    /// Close the queue: pushes start failing, pops drain what is left.
    pub fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Events discarded under backpressure since creation.
    pub fn shed_count(&self) -> u64 {
        self.lock().shed_count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::{Side, TradeEvent};

    fn trade(ts_ms: i64) -> MarketEvent {
        MarketEvent::Trade {
            symbol: "ES".to_string(),
            trade: TradeEvent {
                ts_ms,
                price: 6800.0,
                volume: 1.0,
                aggressor: Side::Buy,
            },
        }
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(EventQueue::new(0).is_err());
    }

    #[tokio::test]
    async fn fifo_order_is_preserved() {
        let q = EventQueue::new(8).unwrap();
        for i in 0..5 {
            assert!(!q.push(trade(i)).unwrap());
        }
        for i in 0..5 {
            assert_eq!(q.pop().await.unwrap().ts_ms(), i);
        }
    }

    #[tokio::test]
    async fn overflow_sheds_the_oldest() {
        let q = EventQueue::new(3).unwrap();
        for i in 1..=3 {
            assert!(!q.push(trade(i)).unwrap());
        }
        // full: 4 and 5 shed 1 and 2
        assert!(q.push(trade(4)).unwrap());
        assert!(q.push(trade(5)).unwrap());
        assert_eq!(q.len(), 3);
        assert_eq!(q.shed_count(), 2);

        // survivors come out newest-preserving, in FIFO order
        assert_eq!(q.pop().await.unwrap().ts_ms(), 3);
        assert_eq!(q.pop().await.unwrap().ts_ms(), 4);
        assert_eq!(q.pop().await.unwrap().ts_ms(), 5);
    }

    #[tokio::test]
    async fn close_drains_then_ends() {
        let q = EventQueue::new(4).unwrap();
        q.push(trade(1)).unwrap();
        q.close();

        assert_eq!(q.push(trade(2)), Err(TransportError::QueueClosed));
        assert_eq!(q.pop().await.unwrap().ts_ms(), 1);
        assert!(q.pop().await.is_none());
    }

    #[tokio::test]
    async fn waiting_pop_wakes_on_push() {
        use std::sync::Arc;
        let q = Arc::new(EventQueue::new(4).unwrap());
        let q2 = q.clone();

        let consumer = tokio::spawn(async move { q2.pop().await });
        tokio::task::yield_now().await;
        q.push(trade(9)).unwrap();

        let got = consumer.await.unwrap().unwrap();
        assert_eq!(got.ts_ms(), 9);
    }

    #[tokio::test]
    async fn waiting_pop_wakes_on_close() {
        use std::sync::Arc;
        let q = Arc::new(EventQueue::new(4).unwrap());
        let q2 = q.clone();

        let consumer = tokio::spawn(async move { q2.pop().await });
        tokio::task::yield_now().await;
        q.close();

        assert!(consumer.await.unwrap().is_none());
    }
}
