//! Device session: the single open backend device and its lifecycle.
//!
//! ```text
//!            open              start
//!  Closed ---------> Configured ------> Running
//!    ^                 |  ^  <------      |
//!    |     close       |  |   stop        |
//!    +-----------------+  +- configure    |
//!    +------------------------------------+
//! ```
//!
//! Every operation takes `&self`. Lifecycle calls are expected from one
//! controlling thread while other threads poll transmit and receive through a
//! shared reference. Receives are serialized; lifecycle calls and writes are
//! not, and the device state lock is never held across a backend call, so a
//! reset or close goes through while a reader is blocked in the backend.

mod receive;

pub use receive::ReceiveSerializer;

use std::time::Instant;

use parking_lot::Mutex;

use crate::backend::{Backend, BackendError, BackendStatus, CanMessage, ReadTimeout};
use crate::config::AdapterConfig;
use crate::error::{AdapterError, Result};
use crate::frame;
use crate::legacy::{ErrorFlags, VciCanObj};
use crate::property::{PropertyTable, PROPERTY_DEVICE_NAME, PROPERTY_RECEIVE_QUEUE_LEVEL};
use crate::status;
use crate::timing::{self, BitrateIndex};
use crate::types::{Config, Handle, PropertyId};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    /// Device open, controller stopped
    Configured,
    /// Controller started, frames may flow
    Running,
}

/// Identification strings of the open device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardInfo {
    pub hw_type: String,
    pub serial_number: String,
    pub channels: u8,
}

#[derive(Debug, Clone, Copy)]
struct DeviceState {
    handle: Option<Handle>,
    bitrate: BitrateIndex,
    started: bool,
}

/// Device session owning the backend handle
pub struct Session<B: Backend> {
    backend: B,
    config: AdapterConfig,
    properties: PropertyTable,
    device: Mutex<DeviceState>,
    receiver: ReceiveSerializer,
}

impl<B: Backend> Session<B> {
    /// Creates a closed session with the default configuration
    pub fn new(backend: B) -> Self {
        Self::build(backend, AdapterConfig::default())
    }

    /// Creates a closed session with a validated configuration
    pub fn with_config(backend: B, config: AdapterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(backend, config))
    }

    fn build(backend: B, config: AdapterConfig) -> Self {
        Self {
            backend,
            properties: config.property_table(),
            device: Mutex::new(DeviceState {
                handle: None,
                bitrate: config.default_bitrate,
                started: false,
            }),
            config,
            receiver: ReceiveSerializer::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn handle(&self) -> Option<Handle> {
        self.device.lock().handle
    }

    /// Bitrate the controller is (or will be) started with
    pub fn bitrate(&self) -> BitrateIndex {
        self.device.lock().bitrate
    }

    pub fn state(&self) -> SessionState {
        let device = *self.device.lock();
        match (device.handle, device.started) {
            (None, _) => SessionState::Closed,
            (Some(_), false) => SessionState::Configured,
            (Some(_), true) => SessionState::Running,
        }
    }

    /// Opens the device. Opening an already open session is a no-op.
    pub fn open(&self) -> Result<Handle> {
        if let Some(handle) = self.handle() {
            tracing::debug!(%handle, "device already open");
            return Ok(handle);
        }

        tracing::debug!(port = %self.config.device.port, mode = self.config.mode, "initializing backend");
        let handle = self
            .backend
            .initialize(&self.config.device, self.config.mode)
            .map_err(|err| {
                tracing::warn!(%err, code = err.code(), "initialize failed");
                AdapterError::OpenFailed(err)
            })?;

        *self.device.lock() = DeviceState {
            handle: Some(handle),
            bitrate: self.config.default_bitrate,
            started: false,
        };
        tracing::info!(%handle, bitrate = %self.config.default_bitrate, "device opened");
        Ok(handle)
    }

    /// Stores the bitrate for the given legacy timing registers.
    ///
    /// Never starts or stops the controller. On failure the stored bitrate is
    /// left untouched.
    pub fn configure(&self, timing0: u8, timing1: u8) -> Result<BitrateIndex> {
        self.require_handle()?;

        let btr = timing::composite(timing0, timing1);
        let index = timing::translate_timing(timing0, timing1).map_err(|err| {
            tracing::warn!(btr = format_args!("0x{:04X}", btr), "no matching bit timing");
            err
        })?;

        self.device.lock().bitrate = index;
        tracing::debug!(btr = format_args!("0x{:04X}", btr), index = index.code(), bitrate = %index, "bit timing matched");
        Ok(index)
    }

    /// Starts the controller with the stored bitrate.
    ///
    /// Calling it while running issues the start again.
    pub fn start(&self) -> Result<()> {
        let handle = self.require_handle()?;
        let bitrate = self.bitrate();

        self.backend.start(handle, bitrate).map_err(|err| {
            tracing::warn!(%handle, %bitrate, %err, "start failed");
            AdapterError::from(err)
        })?;

        self.device.lock().started = true;
        tracing::info!(%handle, %bitrate, "controller started");
        Ok(())
    }

    /// Stops the controller. A controller that is already offline counts as stopped.
    pub fn stop(&self) -> Result<()> {
        let handle = self.require_handle()?;

        match self.backend.reset(handle) {
            Ok(()) => {}
            Err(err) if err.is_benign_offline() => {
                tracing::debug!(%handle, "controller already offline");
            }
            Err(err) => {
                tracing::warn!(%handle, %err, code = err.code(), "reset failed");
                return Err(err.into());
            }
        }

        self.device.lock().started = false;
        tracing::info!(%handle, "controller stopped");
        Ok(())
    }

    /// Stops the controller and, if it was running, starts it again with the
    /// last bitrate.
    ///
    /// The restart is attempted even when the stop fails. On failure the
    /// session keeps the state it had before the call.
    pub fn clear_buffer(&self) -> Result<()> {
        let was_running = self.device.lock().started;
        let stopped = self.stop();
        if !was_running {
            return stopped;
        }

        let restarted = self.start();
        if restarted.is_err() {
            self.device.lock().started = was_running;
        }
        stopped.and(restarted)
    }

    /// Releases the backend handle. Always leaves the session closed.
    pub fn close(&self) {
        let handle = {
            let mut device = self.device.lock();
            device.started = false;
            device.handle.take()
        };
        if let Some(handle) = handle {
            match self.backend.terminate(handle) {
                Ok(()) => tracing::info!(%handle, "device closed"),
                Err(err) => tracing::warn!(%handle, %err, "terminate failed, handle dropped"),
            }
        }
    }

    /// Sends frames in order and returns how many the backend accepted.
    ///
    /// Stops at the first rejected frame. Returns 0 unless the controller is running.
    pub fn transmit(&self, frames: &[VciCanObj]) -> usize {
        let Some(handle) = self.running_handle() else {
            tracing::debug!(count = frames.len(), "transmit while controller not running");
            return 0;
        };

        let mut sent = 0;
        for (index, obj) in frames.iter().enumerate() {
            tracing::debug!(frame = %obj, "TX");
            let message = frame::to_backend(obj);
            if let Err(err) = self.write_with_retry(handle, &message) {
                tracing::warn!(index, %err, code = err.code(), "write failed");
                break;
            }
            sent += 1;
        }
        sent
    }

    /// Receives up to `out.len()` frames and returns how many were stored.
    ///
    /// `wait_time` follows the legacy convention: negative blocks, zero polls,
    /// positive waits that many milliseconds for each frame. Returns 0 unless
    /// the controller is running.
    pub fn receive(&self, out: &mut [VciCanObj], wait_time: i32) -> usize {
        let Some(handle) = self.running_handle() else {
            tracing::debug!(max_count = out.len(), "receive while controller not running");
            return 0;
        };

        self.receiver
            .receive(&self.backend, handle, out, ReadTimeout::from_millis(wait_time))
    }

    /// Raw controller status byte
    pub fn status_byte(&self) -> Result<BackendStatus> {
        let handle = self.require_handle()?;
        let status = self.backend.status(handle)?;
        tracing::debug!(%handle, status = format_args!("0x{:02X}", status.bits()), "controller status");
        Ok(status)
    }

    /// Controller status translated to legacy error flags
    pub fn error_flags(&self) -> Result<ErrorFlags> {
        self.status_byte().map(status::map_status)
    }

    /// Reads property `id` into the front of `buf`, returning the transfer width
    pub fn get_property(&self, id: PropertyId, buf: &mut [u8]) -> Result<usize> {
        let handle = self.require_handle()?;
        let width = self.property_width(id, buf.len())?;
        self.backend.read_property(handle, id, &mut buf[..width])?;
        Ok(width)
    }

    /// Writes property `id` from the front of `buf`, returning the transfer width
    pub fn set_property(&self, id: PropertyId, buf: &[u8]) -> Result<usize> {
        let handle = self.require_handle()?;
        let width = self.property_width(id, buf.len())?;
        self.backend.write_property(handle, id, &buf[..width])?;
        Ok(width)
    }

    /// Identification of the open device
    pub fn board_info(&self) -> Result<BoardInfo> {
        let handle = self.require_handle()?;

        let mut name = vec![0u8; self.properties.width(PROPERTY_DEVICE_NAME)];
        let hw_type = match self.backend.read_property(handle, PROPERTY_DEVICE_NAME, &mut name) {
            Ok(()) => {
                let end = name.iter().position(|b| *b == 0).unwrap_or(name.len());
                String::from_utf8_lossy(&name[..end]).into_owned()
            }
            Err(err) => {
                tracing::debug!(%err, "device name unavailable");
                self.config.board.fallback_hw_type.clone()
            }
        };

        Ok(BoardInfo {
            hw_type,
            serial_number: self.config.board.serial_number.clone(),
            channels: 1,
        })
    }

    /// Frames waiting in the backend receive queue, or 0 if unknown
    pub fn pending_receive(&self) -> u32 {
        let Some(handle) = self.handle() else {
            return 0;
        };

        let mut level = [0u8; 4];
        match self
            .backend
            .read_property(handle, PROPERTY_RECEIVE_QUEUE_LEVEL, &mut level)
        {
            Ok(()) => u32::from_le_bytes(level),
            Err(err) => {
                tracing::debug!(%err, "receive queue level not supported");
                0
            }
        }
    }

    fn require_handle(&self) -> Result<Handle> {
        self.handle().ok_or(AdapterError::NotOpen)
    }

    fn running_handle(&self) -> Option<Handle> {
        let device = self.device.lock();
        device.handle.filter(|_| device.started)
    }

    fn property_width(&self, id: PropertyId, available: usize) -> Result<usize> {
        let width = self.properties.width(id);
        if available < width {
            return Err(AdapterError::InvalidParameter(format!(
                "property {} needs {} bytes, buffer has {}",
                id, width, available
            )));
        }
        Ok(width)
    }

    fn write_with_retry(
        &self,
        handle: Handle,
        message: &CanMessage,
    ) -> std::result::Result<(), BackendError> {
        let deadline = self
            .config
            .tx_busy_retry
            .timeout()
            .map(|timeout| Instant::now() + timeout);

        loop {
            match self.backend.write(handle, message) {
                Err(err) if err.is_busy() => {
                    if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                        return Err(err);
                    }
                    std::thread::yield_now();
                }
                result => return result,
            }
        }
    }
}

impl<B: Backend> Drop for Session<B> {
    fn drop(&mut self) {
        self.close();
    }
}
