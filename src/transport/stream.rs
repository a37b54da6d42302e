//! Transport over any async byte stream
//!
//! Wraps anything implementing `AsyncRead + AsyncWrite` (a TCP stream to a
//! serial server, a pipe, `tokio::io::duplex` in tests...).
//!
//! Uses async tokio tasks for I/O:
//! - RX task: reads chunks, sends to channel
//! - TX task: receives from channel, writes and flushes each message

use super::{Transport, TransportChannels};
use crate::constants::{CHANNEL_CAPACITY, READ_BUFFER_SIZE};
use crate::error::Result;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Async stream transport
///
/// Must be spawned from within a tokio runtime.
///
/// # Example
///
/// ```ignore
/// let (client, device) = tokio::io::duplex(1024);
/// let channels = StreamTransport::new(client).spawn(shutdown)?;
/// ```
pub struct StreamTransport<S> {
    stream: S,
}

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }
}

impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    fn spawn(self, shutdown: CancellationToken) -> Result<TransportChannels> {
        let (in_tx, in_rx) = mpsc::channel::<Bytes>(CHANNEL_CAPACITY);
        let (out_tx, mut out_rx) = mpsc::channel::<Bytes>(CHANNEL_CAPACITY);

        let (mut reader, mut writer) = tokio::io::split(self.stream);

        // RX task (async)
        let shutdown_rx = shutdown.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; READ_BUFFER_SIZE];

            loop {
                tokio::select! {
                    _ = shutdown_rx.cancelled() => break,
                    result = reader.read(&mut buf) => match result {
                        Ok(0) => {
                            debug!("Stream closed by peer");
                            break;
                        }
                        Ok(n) => {
                            trace!("Stream: read {} bytes", n);
                            if in_tx.send(Bytes::copy_from_slice(&buf[..n])).await.is_err() {
                                // Receiver dropped
                                break;
                            }
                        }
                        Err(e) => {
                            debug!("Stream read error: {}", e);
                            break;
                        }
                    },
                }
            }
        });

        // TX task (async)
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    msg = out_rx.recv() => match msg {
                        Some(data) => {
                            if writer.write_all(&data).await.is_err() || writer.flush().await.is_err() {
                                break;
                            }
                        }
                        // Every sender dropped
                        None => break,
                    },
                }
            }
            let _ = writer.shutdown().await;
        });

        Ok(TransportChannels {
            rx: in_rx,
            tx: out_tx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stream_transport_relays_both_ways() {
        let (client, mut device) = tokio::io::duplex(64);
        let shutdown = CancellationToken::new();
        let mut channels = StreamTransport::new(client).spawn(shutdown.clone()).unwrap();

        channels.tx.send(Bytes::from_static(b"\x7E\x00")).await.unwrap();
        let mut buf = [0u8; 2];
        device.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"\x7E\x00");

        device.write_all(b"\x8A\x06").await.unwrap();
        let received = channels.rx.recv().await.unwrap();
        assert_eq!(&received[..], b"\x8A\x06");

        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_stream_transport_closes_on_eof() {
        let (client, device) = tokio::io::duplex(64);
        let mut channels = StreamTransport::new(client)
            .spawn(CancellationToken::new())
            .unwrap();

        drop(device);
        assert!(channels.rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_transport_stops_on_shutdown() {
        let (client, _device) = tokio::io::duplex(64);
        let shutdown = CancellationToken::new();
        let mut channels = StreamTransport::new(client).spawn(shutdown.clone()).unwrap();

        shutdown.cancel();
        assert!(channels.rx.recv().await.is_none());
    }
}
