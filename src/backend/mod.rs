//! Backend driver interface consumed by the adapter.
//!
//! The backend is a CAN API V3 style driver: a device is initialized into a
//! handle, the controller is started with a bitrate index and frames are
//! exchanged one at a time. Every call reports failure through
//! [`BackendError`] instead of a raw signed return code.
//!
//! The adapter never implements the driver itself. Platform crates provide a
//! [`Backend`] for the real hardware; [`mock::MockBackend`] serves tests.

mod error;
pub mod mock;

pub use error::*;

use std::time::Duration;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::timing::BitrateIndex;
use crate::types::{CanId, Handle, PropertyId, MAX_DLC};

/// Backend frame representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CanMessage {
    pub id: CanId,
    pub xtd: bool,
    pub rtr: bool,
    pub sts: bool,
    pub dlc: u8,
    pub data: [u8; MAX_DLC],
}

impl CanMessage {
    /// Valid payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.data[..usize::from(self.dlc).min(MAX_DLC)]
    }
}

/// Per-frame wait applied by [`Backend::read`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadTimeout {
    /// Block until a frame arrives
    Infinite,
    /// Return at once if nothing is pending
    NonBlocking,
    /// Wait at most this long
    Bounded(Duration),
}

impl ReadTimeout {
    /// Legacy wait-time convention: negative blocks, zero polls, positive waits that many milliseconds.
    pub fn from_millis(wait_time: i32) -> Self {
        match wait_time {
            t if t < 0 => Self::Infinite,
            0 => Self::NonBlocking,
            t => Self::Bounded(Duration::from_millis(u64::from(t.unsigned_abs()))),
        }
    }
}

bitflags! {
    /// Controller status byte reported by the backend
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BackendStatus: u8 {
        const RESET = 0x80;
        const BUS_OFF = 0x40;
        const WARNING_LEVEL = 0x20;
        const BUS_ERROR = 0x10;
        const TX_BUSY = 0x08;
        const RX_EMPTY = 0x04;
        const MESSAGE_LOST = 0x02;
        const QUEUE_OVERRUN = 0x01;
    }
}

/// Serial line parameters of the device to initialize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceDescriptor {
    /// Serial port name (e.g., "COM1", "/dev/ttyACM0")
    pub port: String,
    /// UART speed
    pub baudrate: u32,
    /// Serial CAN protocol flavour
    pub protocol: String,
}

impl Default for DeviceDescriptor {
    fn default() -> Self {
        Self {
            port: "COM1".to_string(),
            baudrate: 57_600,
            protocol: "canable".to_string(),
        }
    }
}

/// Backend driver trait that must be implemented by platform-specific code
pub trait Backend: Send + Sync {
    fn initialize(&self, device: &DeviceDescriptor, mode: u8) -> Result<Handle, BackendError>;
    fn terminate(&self, handle: Handle) -> Result<(), BackendError>;
    fn start(&self, handle: Handle, bitrate: BitrateIndex) -> Result<(), BackendError>;
    /// Stops the controller. Reports [`BackendError::Offline`] if it was not running.
    fn reset(&self, handle: Handle) -> Result<(), BackendError>;
    /// Queues one frame. Reports [`BackendError::TxBusy`] while the transmit queue is full.
    fn write(&self, handle: Handle, message: &CanMessage) -> Result<(), BackendError>;
    /// Fetches one frame. Reports [`BackendError::RxEmpty`] when nothing arrived in time.
    fn read(&self, handle: Handle, timeout: ReadTimeout) -> Result<CanMessage, BackendError>;
    fn status(&self, handle: Handle) -> Result<BackendStatus, BackendError>;
    fn read_property(
        &self,
        handle: Handle,
        id: PropertyId,
        buf: &mut [u8],
    ) -> Result<(), BackendError>;
    fn write_property(&self, handle: Handle, id: PropertyId, buf: &[u8])
        -> Result<(), BackendError>;
}

impl<B: Backend + ?Sized> Backend for std::sync::Arc<B> {
    fn initialize(&self, device: &DeviceDescriptor, mode: u8) -> Result<Handle, BackendError> {
        (**self).initialize(device, mode)
    }

    fn terminate(&self, handle: Handle) -> Result<(), BackendError> {
        (**self).terminate(handle)
    }

    fn start(&self, handle: Handle, bitrate: BitrateIndex) -> Result<(), BackendError> {
        (**self).start(handle, bitrate)
    }

    fn reset(&self, handle: Handle) -> Result<(), BackendError> {
        (**self).reset(handle)
    }

    fn write(&self, handle: Handle, message: &CanMessage) -> Result<(), BackendError> {
        (**self).write(handle, message)
    }

    fn read(&self, handle: Handle, timeout: ReadTimeout) -> Result<CanMessage, BackendError> {
        (**self).read(handle, timeout)
    }

    fn status(&self, handle: Handle) -> Result<BackendStatus, BackendError> {
        (**self).status(handle)
    }

    fn read_property(
        &self,
        handle: Handle,
        id: PropertyId,
        buf: &mut [u8],
    ) -> Result<(), BackendError> {
        (**self).read_property(handle, id, buf)
    }

    fn write_property(
        &self,
        handle: Handle,
        id: PropertyId,
        buf: &[u8],
    ) -> Result<(), BackendError> {
        (**self).write_property(handle, id, buf)
    }
}
