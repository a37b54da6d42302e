//! Configuration management
//!
//! A connection is configured from a TOML file with two sections:
//!
//! ```toml
//! [connection]
//! mode = "api_escaped"
//! response_timeout_ms = 2000
//!
//! [serial]
//! port = "/dev/ttyUSB0"
//! baud_rate = 9600
//! ```
//!
//! Every field has a default, so partial files (or an empty one) are valid.

use crate::codec::OperatingMode;
use crate::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_MAX_PAYLOAD_LEN, DEFAULT_RESPONSE_TIMEOUT_MS,
    DEFAULT_SERIAL_READ_TIMEOUT_MS, DEFAULT_SUBSCRIBER_CAPACITY, MAX_WIRE_PAYLOAD_LEN,
};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

// =============================================================================
// Application Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub serial: SerialConfig,
}

// =============================================================================
// Connection Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// API operating mode of the radio (`api` or `api_escaped`)
    pub mode: OperatingMode,

    /// Default timeout for `send_and_wait`
    pub response_timeout_ms: u64,

    /// Unsolicited packets buffered per subscriber before the oldest are dropped
    pub subscriber_capacity: usize,

    /// Longer frames are dropped on receive and refused on send
    pub max_payload_len: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            mode: OperatingMode::Api,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }
}

impl ConnectionConfig {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

// =============================================================================
// Serial Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Serial port name (empty = must be supplied by the caller)
    pub port: String,

    pub baud_rate: u32,

    /// Blocking read timeout of the reader thread
    pub read_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_SERIAL_READ_TIMEOUT_MS,
        }
    }
}

impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<()> {
        let conn = &self.connection;
        if conn.response_timeout_ms == 0 {
            return Err(invalid("connection.response_timeout_ms", "must be > 0"));
        }
        if conn.subscriber_capacity == 0 {
            return Err(invalid("connection.subscriber_capacity", "must be > 0"));
        }
        if conn.max_payload_len == 0 || conn.max_payload_len > MAX_WIRE_PAYLOAD_LEN {
            return Err(invalid(
                "connection.max_payload_len",
                format!("must be in 1..={MAX_WIRE_PAYLOAD_LEN}"),
            ));
        }
        if self.serial.baud_rate == 0 {
            return Err(invalid("serial.baud_rate", "must be > 0"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
    Error::ConfigValidation {
        field,
        reason: reason.into(),
    }
}

/// Load and validate a config file
pub fn load(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| Error::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config = Config::from_toml_str(&content)?;
    debug!("Loaded config from {:?}", path);
    Ok(config)
}

/// Save config to file
pub fn save(path: &Path, config: &Config) -> Result<()> {
    let content =
        toml::to_string_pretty(config).map_err(|e| invalid("config", e.to_string()))?;
    fs::write(path, content).map_err(|e| Error::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Default values tests
    // =========================================================================

    #[test]
    fn test_default_connection_config_values() {
        let config = ConnectionConfig::default();

        assert_eq!(config.mode, OperatingMode::Api);
        assert_eq!(config.response_timeout_ms, DEFAULT_RESPONSE_TIMEOUT_MS);
        assert_eq!(config.response_timeout(), Duration::from_secs(2));
        assert_eq!(config.subscriber_capacity, DEFAULT_SUBSCRIBER_CAPACITY);
        assert_eq!(config.max_payload_len, DEFAULT_MAX_PAYLOAD_LEN);
    }

    #[test]
    fn test_default_serial_config_values() {
        let config = SerialConfig::default();

        assert_eq!(config.port, "");
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.read_timeout(), Duration::from_millis(10));
    }

    // =========================================================================
    // Operating mode serialization tests
    // =========================================================================

    #[test]
    fn test_mode_toml_serialization() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            mode: OperatingMode,
        }

        let api = toml::to_string(&Wrapper {
            mode: OperatingMode::Api,
        })
        .unwrap();
        let escaped = toml::to_string(&Wrapper {
            mode: OperatingMode::ApiEscaped,
        })
        .unwrap();

        assert!(api.contains("mode = \"api\""));
        assert!(escaped.contains("mode = \"api_escaped\""));
    }

    #[test]
    fn test_mode_toml_deserialization() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            mode: OperatingMode,
        }

        let api: Wrapper = toml::from_str("mode = \"api\"").unwrap();
        let escaped: Wrapper = toml::from_str("mode = \"api_escaped\"").unwrap();

        assert_eq!(api.mode, OperatingMode::Api);
        assert_eq!(escaped.mode, OperatingMode::ApiEscaped);
        assert!(toml::from_str::<Wrapper>("mode = \"transparent\"").is_err());
    }

    // =========================================================================
    // Config roundtrip tests
    // =========================================================================

    #[test]
    fn test_config_serialize_deserialize_roundtrip() {
        let config = Config {
            connection: ConnectionConfig {
                mode: OperatingMode::ApiEscaped,
                response_timeout_ms: 500,
                subscriber_capacity: 16,
                max_payload_len: 256,
            },
            serial: SerialConfig {
                port: "/dev/ttyUSB0".to_string(),
                baud_rate: 115_200,
                read_timeout_ms: 5,
            },
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let restored = Config::from_toml_str(&toml_str).unwrap();

        assert_eq!(restored, config);
    }

    #[test]
    fn test_config_partial_section() {
        let partial_toml = r#"
[connection]
mode = "api_escaped"

[serial]
port = "COM3"
"#;

        let config = Config::from_toml_str(partial_toml).unwrap();

        assert_eq!(config.connection.mode, OperatingMode::ApiEscaped);
        assert_eq!(config.serial.port, "COM3");
        // Rest should be defaults
        assert_eq!(config.connection.response_timeout_ms, DEFAULT_RESPONSE_TIMEOUT_MS);
        assert_eq!(config.serial.baud_rate, DEFAULT_BAUD_RATE);
    }

    #[test]
    fn test_config_empty_file() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let err = Config::from_toml_str("[connection]\nresponse_timeout_ms = 0").unwrap_err();
        assert!(matches!(
            err,
            Error::ConfigValidation {
                field: "connection.response_timeout_ms",
                ..
            }
        ));
    }

    #[test]
    fn test_validation_rejects_payload_limit_above_wire_limit() {
        let mut config = Config::default();
        config.connection.max_payload_len = 70_000;
        assert!(config.validate().is_err());
        config.connection.max_payload_len = 65_535;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_error() {
        let err = Config::from_toml_str("[connection\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("xbee-api-config-{}.toml", std::process::id()));
        let mut config = Config::default();
        config.serial.port = "/dev/ttyS1".to_string();

        save(&path, &config).unwrap();
        let loaded = load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/xbee-api.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
