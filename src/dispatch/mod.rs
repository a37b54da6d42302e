//! Connection dispatcher
//!
//! Owns one connection to a module:
//! - a reader task feeding transport bytes through the frame codec and the
//!   frame type registry
//! - the correlation table matching responses to waiting requests by
//!   frame ID
//! - the unsolicited packet broadcast
//!
//! ```text
//! transport rx ─► ApiFrameCodec ─► decode_frame ─┬─► pending request (oneshot)
//!                                                └─► subscribers (broadcast)
//! caller ─► Packet ─► ApiFrameCodec::encode ─► transport tx
//! ```
//!
//! A response resolves a request only if it carries the same frame ID and
//! belongs to the request's response family. Dispatch is at-most-once: the
//! first matching response wins, later duplicates are unsolicited.

pub mod stats;
pub mod subscription;

pub use stats::{Stats, StatsSnapshot};
pub use subscription::Subscription;

use crate::codec::hex::hex_pretty;
use crate::codec::{ApiFrameCodec, Codec, FrameEvent, OperatingMode};
use crate::config::ConnectionConfig;
use crate::constants::MAX_WIRE_PAYLOAD_LEN;
use crate::error::{DispatchError, Result};
use crate::packet::{decode_frame, FrameType, Packet};
use crate::transport::{Transport, TransportChannels};
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// What a waiting request is woken with
enum Outcome {
    Response(Packet),
    Cancelled,
    Closed,
}

/// Correlation table entry
struct Pending {
    /// Distinguishes successive requests reusing the same frame ID
    token: u64,
    request_type: FrameType,
    tx: oneshot::Sender<Outcome>,
}

/// State shared between the reader task and callers
struct Shared {
    pending: Mutex<HashMap<u8, Pending>>,
    next_token: AtomicU64,
    /// Set while holding `pending`, so no entry is added after the drain
    closed: AtomicBool,
    unsolicited: RwLock<Option<broadcast::Sender<Packet>>>,
    stats: Stats,
}

impl Shared {
    fn handle_event(&self, event: FrameEvent) {
        match event {
            FrameEvent::Frame(payload) => {
                self.stats.inc_frames_in();
                match decode_frame(&payload) {
                    Ok(packet) => {
                        debug!("RX {} [{}]", packet.frame_type(), hex_pretty(&payload));
                        self.dispatch(packet);
                    }
                    Err(e) => {
                        self.stats.inc_decode_errors();
                        warn!("Undecodable frame [{}]: {}", hex_pretty(&payload), e);
                    }
                }
            }
            FrameEvent::Malformed(e) => {
                self.stats.inc_malformed();
                warn!("Dropped malformed frame: {}", e);
            }
        }
    }

    /// Resolve a pending request or publish to subscribers
    fn dispatch(&self, packet: Packet) {
        let Some(frame_id) = packet.frame_id() else {
            self.publish(packet);
            return;
        };

        let matched = {
            let mut pending = self.pending.lock();
            match pending.entry(frame_id) {
                Entry::Occupied(entry)
                    if entry.get().request_type.is_answered_by(packet.frame_type()) =>
                {
                    Some(entry.remove())
                }
                _ => None,
            }
        };

        let Some(entry) = matched else {
            self.publish(packet);
            return;
        };

        match entry.tx.send(Outcome::Response(packet)) {
            Ok(()) => {
                self.stats.inc_correlated();
                debug!("Resolved request with frame ID {}", frame_id);
            }
            // Waiter went away between lookup and delivery
            Err(Outcome::Response(packet)) => self.publish(packet),
            Err(_) => {}
        }
    }

    fn publish(&self, packet: Packet) {
        self.stats.inc_unsolicited();
        if let Some(tx) = self.unsolicited.read().as_ref() {
            // Err only means nobody is subscribed
            let _ = tx.send(packet);
        }
    }

    /// Fail every pending request and end all subscriptions
    fn close(&self) {
        let drained: Vec<Pending> = {
            let mut pending = self.pending.lock();
            if self.closed.swap(true, Ordering::SeqCst) {
                return;
            }
            pending.drain().map(|(_, entry)| entry).collect()
        };
        for entry in drained {
            let _ = entry.tx.send(Outcome::Closed);
        }
        self.unsolicited.write().take();
        debug!("Connection closed");
    }
}

/// Removes its correlation entry when the waiting future ends or is dropped
struct PendingGuard<'a> {
    shared: &'a Shared,
    frame_id: u8,
    token: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut pending = self.shared.pending.lock();
        if pending
            .get(&self.frame_id)
            .is_some_and(|entry| entry.token == self.token)
        {
            pending.remove(&self.frame_id);
        }
    }
}

/// Request/response dispatcher for one connection
///
/// # Example
///
/// ```ignore
/// let transport = SerialTransport::from_config(&config.serial);
/// let dispatcher = Dispatcher::connect(transport, &config.connection)?;
/// let mut events = dispatcher.subscribe();
///
/// let ni = AtCommand::new(1, AtCommandName::new("NI")?, Vec::new());
/// let response = dispatcher.send_and_wait(&ni.into(), Duration::from_secs(2)).await?;
/// ```
pub struct Dispatcher {
    shared: Arc<Shared>,
    outbound: mpsc::Sender<Bytes>,
    encoder: ApiFrameCodec,
    response_timeout: Duration,
    shutdown: CancellationToken,
    reader: JoinHandle<()>,
}

impl Dispatcher {
    /// Spawn `transport` and start dispatching on it
    pub fn connect<T: Transport>(transport: T, config: &ConnectionConfig) -> Result<Self> {
        let shutdown = CancellationToken::new();
        let channels = transport.spawn(shutdown.clone())?;
        Ok(Self::new(channels, config, shutdown))
    }

    /// Start dispatching on already spawned transport channels
    ///
    /// Cancelling `shutdown` closes the connection. A `max_payload_len`
    /// beyond the 16-bit length field is capped to it. Must be called from
    /// within a tokio runtime.
    pub fn new(
        channels: TransportChannels,
        config: &ConnectionConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let (unsolicited, _) = broadcast::channel(config.subscriber_capacity.max(1));
        let shared = Arc::new(Shared {
            pending: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            unsolicited: RwLock::new(Some(unsolicited)),
            stats: Stats::new(),
        });

        if config.max_payload_len > MAX_WIRE_PAYLOAD_LEN {
            warn!(
                "max_payload_len {} exceeds the frame length field, capped to {}",
                config.max_payload_len, MAX_WIRE_PAYLOAD_LEN
            );
        }
        let decoder = ApiFrameCodec::with_max_payload(config.mode, config.max_payload_len);
        let reader = tokio::spawn(run_reader(
            shared.clone(),
            channels.rx,
            decoder,
            shutdown.clone(),
        ));

        Self {
            shared,
            outbound: channels.tx,
            encoder: ApiFrameCodec::with_max_payload(config.mode, config.max_payload_len),
            response_timeout: config.response_timeout(),
            shutdown,
            reader,
        }
    }

    pub fn mode(&self) -> OperatingMode {
        self.encoder.mode()
    }

    /// Longest payload `send` accepts
    pub fn max_payload_len(&self) -> usize {
        self.encoder.max_payload_len()
    }

    /// Receive unsolicited packets from now on
    ///
    /// After the connection closes the subscription yields nothing.
    pub fn subscribe(&self) -> Subscription {
        match self.shared.unsolicited.read().as_ref() {
            Some(tx) => Subscription::new(tx.subscribe()),
            None => {
                let (_, rx) = broadcast::channel(1);
                Subscription::new(rx)
            }
        }
    }

    /// Write a packet without waiting for any response
    ///
    /// Waits for room in the transport queue; closing the connection ends
    /// the wait with `ConnectionClosed`.
    pub async fn send(&self, packet: &Packet) -> std::result::Result<(), DispatchError> {
        if self.is_closed() {
            return Err(DispatchError::ConnectionClosed);
        }
        let payload = packet.to_payload();

        let mut frame = Vec::with_capacity(payload.len() + 8);
        self.encoder
            .encode(&payload, &mut frame)
            .map_err(|_| DispatchError::PayloadTooLarge {
                len: payload.len(),
                max: self.encoder.max_payload_len(),
            })?;
        let len = frame.len();
        debug!("TX {} [{}]", packet.frame_type(), hex_pretty(&frame));

        tokio::select! {
            sent = self.outbound.send(Bytes::from(frame)) => {
                sent.map_err(|_| DispatchError::ConnectionClosed)?;
            }
            _ = self.shutdown.cancelled() => return Err(DispatchError::ConnectionClosed),
        }
        self.shared.stats.add_tx_frame(len);
        Ok(())
    }

    /// Write a request and wait for its response
    ///
    /// The packet must carry a non-zero frame ID and have a response family.
    /// Exactly one outcome is returned: the response, `Timeout`,
    /// `ConnectionClosed` or `Cancelled`. `timeout` covers the whole exchange,
    /// including waiting for room in the transport queue. The correlation
    /// entry is removed in every case, including when the returned future is
    /// dropped.
    pub async fn send_and_wait(
        &self,
        packet: &Packet,
        timeout: Duration,
    ) -> std::result::Result<Packet, DispatchError> {
        let frame_type = packet.frame_type();
        let frame_id = match packet.frame_id() {
            Some(id) if id != 0 && !frame_type.response_types().is_empty() => id,
            _ => return Err(DispatchError::NotCorrelatable(frame_type.code())),
        };

        let (tx, rx) = oneshot::channel();
        let token = self.shared.next_token.fetch_add(1, Ordering::Relaxed);
        {
            let mut pending = self.shared.pending.lock();
            if self.shared.closed.load(Ordering::SeqCst) {
                return Err(DispatchError::ConnectionClosed);
            }
            if pending.contains_key(&frame_id) {
                return Err(DispatchError::FrameIdInUse(frame_id));
            }
            pending.insert(
                frame_id,
                Pending {
                    token,
                    request_type: frame_type,
                    tx,
                },
            );
        }
        let _guard = PendingGuard {
            shared: &self.shared,
            frame_id,
            token,
        };

        let exchange = async {
            self.send(packet).await?;
            match rx.await {
                Ok(Outcome::Response(response)) => Ok(response),
                Ok(Outcome::Cancelled) => Err(DispatchError::Cancelled(frame_id)),
                Ok(Outcome::Closed) | Err(_) => Err(DispatchError::ConnectionClosed),
            }
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(outcome) => outcome,
            Err(_) => {
                self.shared.stats.inc_timeouts();
                debug!("No response for frame ID {} within {:?}", frame_id, timeout);
                Err(DispatchError::Timeout { frame_id, timeout })
            }
        }
    }

    /// `send_and_wait` with the configured response timeout
    pub async fn request(&self, packet: &Packet) -> std::result::Result<Packet, DispatchError> {
        self.send_and_wait(packet, self.response_timeout).await
    }

    /// Stop waiting for the response to `frame_id`
    ///
    /// The waiting caller gets `DispatchError::Cancelled`.
    pub fn cancel(&self, frame_id: u8) -> std::result::Result<(), DispatchError> {
        let entry = self
            .shared
            .pending
            .lock()
            .remove(&frame_id)
            .ok_or(DispatchError::NoPendingRequest(frame_id))?;
        let _ = entry.tx.send(Outcome::Cancelled);
        Ok(())
    }

    /// Number of requests waiting for a response
    pub fn pending_count(&self) -> usize {
        self.shared.pending.lock().len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Close the connection
    ///
    /// Pending requests fail with `ConnectionClosed`, subscriptions end and
    /// the transport is told to stop.
    pub fn close(&self) {
        self.shutdown.cancel();
        self.shared.close();
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.close();
        self.reader.abort();
    }
}

/// Reader loop: one per connection, owns the decoder
async fn run_reader(
    shared: Arc<Shared>,
    mut rx: mpsc::Receiver<Bytes>,
    mut decoder: ApiFrameCodec,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,

            msg = rx.recv() => match msg {
                Some(data) => {
                    trace!("Transport chunk [{}]", hex_pretty(&data));
                    shared.stats.add_rx_bytes(data.len());
                    decoder.decode(&data, |event| shared.handle_event(event));
                }
                None => {
                    // Channel closed = transport stopped
                    debug!("Transport stopped");
                    break;
                }
            },
        }
    }

    shared.close();
    shutdown.cancel();
}
