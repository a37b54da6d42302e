//! XBee API-mode frame codec and request/response dispatcher
//!
//! Layers, bottom up:
//! - `codec`: frame envelope (delimiter, length, checksum, escaping)
//! - `packet`: typed payload of every frame type, IO samples, registry
//! - `transport`: byte I/O (serial port, any async stream)
//! - `dispatch`: reader task, response correlation, unsolicited packets
//!
//! ```ignore
//! use xbee_api::{config, Dispatcher, SerialTransport};
//!
//! let config = config::load(Path::new("xbee.toml"))?;
//! let dispatcher = Dispatcher::connect(SerialTransport::from_config(&config.serial), &config.connection)?;
//! let mut unsolicited = dispatcher.subscribe();
//! while let Some(packet) = unsolicited.recv().await {
//!     tracing::info!("{:?}", packet);
//! }
//! ```

pub mod codec;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod packet;
pub mod transport;

pub use codec::{ApiFrameCodec, Codec, FrameEvent, OperatingMode};
pub use config::{Config, ConnectionConfig, SerialConfig};
pub use dispatch::{Dispatcher, StatsSnapshot, Subscription};
pub use error::{
    ConstructionError, DecodeError, DispatchError, Error, IoSampleError, MalformedFrame, Result,
};
pub use packet::{decode_frame, FramePayload, FrameType, IoSample, Packet};
pub use transport::{SerialTransport, StreamTransport, Transport, TransportChannels};
