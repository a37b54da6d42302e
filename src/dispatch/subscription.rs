//! Unsolicited packet subscriptions
//!
//! Backed by a `tokio::sync::broadcast` channel: every subscriber sees every
//! unsolicited packet, and the reader never waits for a slow subscriber.
//! When a subscriber falls more than `capacity` packets behind, the oldest
//! packets are dropped for that subscriber only and counted in
//! [`Subscription::dropped`].

use crate::packet::Packet;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::warn;

/// Receiver of unsolicited packets, in arrival order
pub struct Subscription {
    rx: broadcast::Receiver<Packet>,
    dropped: u64,
}

impl Subscription {
    pub(crate) fn new(rx: broadcast::Receiver<Packet>) -> Self {
        Self { rx, dropped: 0 }
    }

    /// Next packet
    ///
    /// Skips over packets lost to overflow. Returns `None` once the
    /// connection is closed and every buffered packet has been received.
    pub async fn recv(&mut self) -> Option<Packet> {
        loop {
            match self.rx.recv().await {
                Ok(packet) => return Some(packet),
                Err(RecvError::Lagged(n)) => self.record_lag(n),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next packet if one is buffered, without waiting
    pub fn try_recv(&mut self) -> Option<Packet> {
        loop {
            match self.rx.try_recv() {
                Ok(packet) => return Some(packet),
                Err(TryRecvError::Lagged(n)) => self.record_lag(n),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Packets dropped because this subscriber fell behind
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn record_lag(&mut self, n: u64) {
        warn!("Subscriber lagged, {} packets dropped", n);
        self.dropped += n;
    }
}
