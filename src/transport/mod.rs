//! Byte links to a radio
//!
//! A transport only moves bytes. Frame boundaries, checksums and escaping
//! belong to `crate::codec`; matching responses to requests belongs to
//! `crate::dispatch`.
//!
//! Implementations pick their own execution model:
//! - [`SerialTransport`]: two blocking threads around a `serialport` handle
//! - [`StreamTransport`]: two tokio tasks around any `AsyncRead + AsyncWrite`

pub mod serial;
pub mod stream;

pub use serial::SerialTransport;
pub use stream::StreamTransport;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Both directions of a running link
///
/// Closing is signalled by the channels themselves: `rx` yields `None` once
/// the link is gone, and dropping `tx` asks the transport to stop writing.
pub struct TransportChannels {
    /// Chunks read from the link, in arrival order, with arbitrary boundaries
    pub rx: mpsc::Receiver<Bytes>,

    /// Complete frames to write
    ///
    /// Each message is written whole before the next, so frames sent from
    /// different tasks never interleave on the wire.
    pub tx: mpsc::Sender<Bytes>,
}

/// A link that can be started in the background
///
/// The link stays up until `shutdown` is cancelled, the peer goes away
/// (EOF, unplugged adapter, write failure) or every `tx` sender is dropped.
/// In all cases the transport drops its end of the channels on exit.
pub trait Transport: Send + 'static {
    /// Open the link and start moving bytes
    ///
    /// # Errors
    ///
    /// Fails when the link cannot be opened, e.g. a missing or busy serial
    /// port. Errors after this point surface as closed channels.
    fn spawn(self, shutdown: CancellationToken) -> Result<TransportChannels>;
}
