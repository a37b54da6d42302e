//! Serial transport for XBee modules on a UART or USB adapter
//!
//! Uses blocking threads for low-latency I/O:
//! - Reader thread: reads from serial port, sends to channel
//! - Writer thread: receives from channel, writes to serial port
//!
//! The transport stops when:
//! - `shutdown` is cancelled
//! - Serial port disconnects (detected via consecutive empty reads)
//! - Write error occurs

use super::{Transport, TransportChannels};
use crate::config::SerialConfig;
use crate::constants::{CHANNEL_CAPACITY, READ_BUFFER_SIZE, SERIAL_DISCONNECT_THRESHOLD};
use crate::error::{Error, Result};
use bytes::Bytes;
use std::io::{Read, Write};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Serial transport
///
/// # Example
///
/// ```ignore
/// let transport = SerialTransport::new("/dev/ttyUSB0", 9600);
/// let channels = transport.spawn(shutdown)?;
/// ```
pub struct SerialTransport {
    port_name: String,
    baud_rate: u32,
    read_timeout: Duration,
}

impl SerialTransport {
    /// Create a transport with the default read timeout
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self::from_config(&SerialConfig {
            port: port_name.into(),
            baud_rate,
            ..SerialConfig::default()
        })
    }

    pub fn from_config(config: &SerialConfig) -> Self {
        Self {
            port_name: config.port.clone(),
            baud_rate: config.baud_rate,
            read_timeout: config.read_timeout(),
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Names of the serial ports present on this machine
    pub fn available_ports() -> Vec<String> {
        serialport::available_ports()
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.port_name)
            .collect()
    }

    /// Open the serial port (8N1, no flow control)
    pub fn open(&self) -> Result<Box<dyn serialport::SerialPort>> {
        if self.port_name.is_empty() {
            return Err(Error::ConfigValidation {
                field: "serial.port",
                reason: "no serial port configured".into(),
            });
        }
        serialport::new(&self.port_name, self.baud_rate)
            .timeout(self.read_timeout)
            .open()
            .map_err(|e| self.open_error(e))
    }

    fn open_error(&self, e: serialport::Error) -> Error {
        Error::SerialOpen {
            port: self.port_name.clone(),
            source: std::io::Error::other(e.to_string()),
        }
    }
}

impl Transport for SerialTransport {
    fn spawn(self, shutdown: CancellationToken) -> Result<TransportChannels> {
        let (in_tx, in_rx) = mpsc::channel::<Bytes>(CHANNEL_CAPACITY);
        let (out_tx, mut out_rx) = mpsc::channel::<Bytes>(CHANNEL_CAPACITY);

        let port_read = self.open()?;
        let port_write = port_read.try_clone().map_err(|e| self.open_error(e))?;
        debug!("Opened {} at {} baud", self.port_name, self.baud_rate);

        // Reader thread (blocking)
        let shutdown_reader = shutdown.clone();
        let port_name = self.port_name.clone();
        std::thread::spawn(move || {
            let mut port = port_read;
            let mut buf = [0u8; READ_BUFFER_SIZE];
            let mut consecutive_empty = 0u32;

            while !shutdown_reader.is_cancelled() {
                match port.read(&mut buf) {
                    Ok(n) if n > 0 => {
                        consecutive_empty = 0;
                        trace!("{}: read {} bytes", port_name, n);
                        if in_tx
                            .blocking_send(Bytes::copy_from_slice(&buf[..n]))
                            .is_err()
                        {
                            // Receiver dropped
                            break;
                        }
                    }
                    Ok(_) => {
                        // Zero bytes read - could be normal or port gone
                        consecutive_empty += 1;
                        if consecutive_empty > SERIAL_DISCONNECT_THRESHOLD {
                            warn!("{}: port disconnected", port_name);
                            break;
                        }
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {
                        consecutive_empty = 0;
                    }
                    Err(e) => {
                        warn!("{}: read error: {}", port_name, e);
                        break;
                    }
                }
            }
            // Channel closes when in_tx is dropped
        });

        // Writer thread (blocking)
        std::thread::spawn(move || {
            let mut port = port_write;

            // Returns None once every sender is dropped
            while let Some(data) = out_rx.blocking_recv() {
                if shutdown.is_cancelled() {
                    break;
                }
                if port.write_all(&data).and_then(|_| port.flush()).is_err() {
                    // Write error - port disconnected
                    break;
                }
            }
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

    #[test]
    fn test_serial_transport_new() {
        let transport = SerialTransport::new("COM3", 115_200);
        assert_eq!(transport.port_name(), "COM3");
        assert_eq!(transport.baud_rate, 115_200);
    }

    #[test]
    fn test_serial_transport_from_config() {
        let config = SerialConfig {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            read_timeout_ms: 25,
        };
        let transport = SerialTransport::from_config(&config);
        assert_eq!(transport.port_name(), "/dev/ttyUSB0");
        assert_eq!(transport.read_timeout, Duration::from_millis(25));
    }

    #[test]
    fn test_spawn_without_port_fails() {
        let transport = SerialTransport::new("", 9600);
        let result = transport.spawn(CancellationToken::new());
        assert!(matches!(
            result,
            Err(Error::ConfigValidation {
                field: "serial.port",
                ..
            })
        ));
    }

    #[test]
    fn test_open_missing_port_fails() {
        let transport = SerialTransport::new("/dev/xbee-api-does-not-exist", 9600);
        assert!(matches!(transport.open(), Err(Error::SerialOpen { .. })));
    }
}
