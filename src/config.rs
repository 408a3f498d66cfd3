//! Adapter configuration
//!
//! Every field has a default, so an empty document is a valid configuration.
//! Example:
//!
//! ```toml
//! mode = 0
//! default_bitrate = "500K"
//! tx_busy_retry = "unbounded"
//!
//! [device]
//! port = "COM4"
//! baudrate = 115200
//!
//! [[properties]]
//! id = 5
//! width = 8
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::DeviceDescriptor;
use crate::error::{AdapterError, Result};
use crate::legacy::{HW_TYPE_LEN, SERIAL_NUM_LEN};
use crate::property::{PropertyTable, DEFAULT_PROPERTY_WIDTH};
use crate::timing::BitrateIndex;
use crate::types::{Config, PropertyId};

const MAX_PROPERTY_WIDTH: usize = 64;

/// Configuration of a device session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Device handed to the backend on open
    pub device: DeviceDescriptor,
    /// Backend operation mode
    pub mode: u8,
    /// Bitrate used until the channel is initialized
    pub default_bitrate: BitrateIndex,
    /// Handling of a transmitter that keeps reporting busy
    pub tx_busy_retry: BusyRetry,
    /// Transfer width of properties without an explicit entry
    pub default_property_width: usize,
    /// Explicit property widths
    pub properties: Vec<PropertyWidth>,
    /// Board identification fallbacks
    pub board: BoardConfig,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            device: DeviceDescriptor::default(),
            mode: 0,
            default_bitrate: BitrateIndex::Rate250K,
            tx_busy_retry: BusyRetry::default(),
            default_property_width: DEFAULT_PROPERTY_WIDTH,
            properties: Vec::new(),
            board: BoardConfig::default(),
        }
    }
}

/// Busy-retry policy of the transmit loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusyRetry {
    /// Retry until the backend accepts the frame
    Unbounded,
    /// Give up on the frame after the timeout
    Bounded { timeout_ms: u64 },
}

impl Default for BusyRetry {
    /// Bounded at one second. The legacy library retried forever; use
    /// `Unbounded` (`tx_busy_retry = "unbounded"`) for that behavior.
    fn default() -> Self {
        Self::Bounded { timeout_ms: 1000 }
    }
}

impl BusyRetry {
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            Self::Unbounded => None,
            Self::Bounded { timeout_ms } => Some(Duration::from_millis(*timeout_ms)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyWidth {
    pub id: PropertyId,
    pub width: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Hardware type reported when the backend has no device name
    pub fallback_hw_type: String,
    pub serial_number: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            fallback_hw_type: "SerialCAN".to_string(),
            serial_number: "N/A".to_string(),
        }
    }
}

impl Config for AdapterConfig {
    fn validate(&self) -> Result<()> {
        if self.device.port.is_empty() {
            return Err(AdapterError::Config("device port is empty".into()));
        }
        if self.device.baudrate == 0 {
            return Err(AdapterError::Config("device baudrate is zero".into()));
        }
        let widths = std::iter::once(self.default_property_width)
            .chain(self.properties.iter().map(|p| p.width));
        for width in widths {
            if width == 0 || width > MAX_PROPERTY_WIDTH {
                return Err(AdapterError::Config(format!(
                    "property width {} out of range 1..={}",
                    width, MAX_PROPERTY_WIDTH
                )));
            }
        }
        if self.board.fallback_hw_type.len() >= HW_TYPE_LEN {
            return Err(AdapterError::Config("hardware type name too long".into()));
        }
        if self.board.serial_number.len() >= SERIAL_NUM_LEN {
            return Err(AdapterError::Config("serial number too long".into()));
        }
        Ok(())
    }
}

impl AdapterConfig {
    /// Parses and validates a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| AdapterError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| AdapterError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Property width table with the configured overrides applied
    pub fn property_table(&self) -> PropertyTable {
        let mut table = PropertyTable::new(self.default_property_width);
        for entry in &self.properties {
            table.set_width(entry.id, entry.width);
        }
        table
    }
}
