//! In-memory backend for testing

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use super::{Backend, BackendError, BackendStatus, CanMessage, DeviceDescriptor, ReadTimeout};
use crate::timing::BitrateIndex;
use crate::types::{Handle, PropertyId};

/// Backend entry points, used to script failures and inspect the call journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    Initialize,
    Terminate,
    Start,
    Reset,
    Write,
    Read,
    Status,
    ReadProperty,
    WriteProperty,
}

#[derive(Debug, Default)]
struct MockState {
    next_handle: i32,
    open: Option<Handle>,
    started: bool,
    bitrate: Option<BitrateIndex>,
    loopback: bool,
    rx_queue: VecDeque<CanMessage>,
    sent: Vec<CanMessage>,
    busy_writes: u32,
    busy_forever: bool,
    accept_writes: Option<usize>,
    status: u8,
    properties: HashMap<PropertyId, Vec<u8>>,
    failures: HashMap<MockCall, BackendError>,
    calls: Vec<MockCall>,
}

/// Mock backend driver for testing
pub struct MockBackend {
    state: Mutex<MockState>,
    rx_ready: Condvar,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Creates a new mock backend with an empty receive queue
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            rx_ready: Condvar::new(),
        }
    }

    /// Creates a new mock backend that echoes every written frame into its receive queue
    pub fn new_loopback() -> Self {
        let mock = Self::new();
        mock.set_loopback(true);
        mock
    }

    pub fn set_loopback(&self, loopback: bool) {
        self.state.lock().loopback = loopback;
    }

    /// Makes every subsequent call to `call` fail with `error` until cleared
    pub fn fail(&self, call: MockCall, error: BackendError) {
        self.state.lock().failures.insert(call, error);
    }

    pub fn clear_failure(&self, call: MockCall) {
        self.state.lock().failures.remove(&call);
    }

    /// Reports busy for the next `count` writes before accepting
    pub fn set_busy_writes(&self, count: u32) {
        self.state.lock().busy_writes = count;
    }

    /// Reports busy for every write
    pub fn set_busy_forever(&self, busy: bool) {
        self.state.lock().busy_forever = busy;
    }

    /// Accepts `count` more writes, then rejects with a bus error
    pub fn accept_writes(&self, count: usize) {
        self.state.lock().accept_writes = Some(count);
    }

    pub fn set_status(&self, status: u8) {
        self.state.lock().status = status;
    }

    pub fn set_property(&self, id: PropertyId, value: &[u8]) {
        self.state.lock().properties.insert(id, value.to_vec());
    }

    pub fn property(&self, id: PropertyId) -> Option<Vec<u8>> {
        self.state.lock().properties.get(&id).cloned()
    }

    /// Injects a frame into the receive queue
    pub fn inject(&self, message: CanMessage) {
        self.state.lock().rx_queue.push_back(message);
        self.rx_ready.notify_all();
    }

    pub fn pending(&self) -> usize {
        self.state.lock().rx_queue.len()
    }

    /// Frames accepted by `write`, in order
    pub fn sent(&self) -> Vec<CanMessage> {
        self.state.lock().sent.clone()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self, call: MockCall) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == call).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().open.is_some()
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().started
    }

    /// Bitrate passed to the most recent successful `start`
    pub fn bitrate(&self) -> Option<BitrateIndex> {
        self.state.lock().bitrate
    }

    fn enter(state: &mut MockState, call: MockCall) -> Result<(), BackendError> {
        state.calls.push(call);
        match state.failures.get(&call) {
            Some(err) => Err(*err),
            None => Ok(()),
        }
    }

    fn check_handle(state: &MockState, handle: Handle) -> Result<(), BackendError> {
        if state.open == Some(handle) {
            Ok(())
        } else {
            Err(BackendError::InvalidHandle)
        }
    }
}

impl Backend for MockBackend {
    fn initialize(&self, _device: &DeviceDescriptor, _mode: u8) -> Result<Handle, BackendError> {
        let mut state = self.state.lock();
        Self::enter(&mut state, MockCall::Initialize)?;
        if state.open.is_some() {
            return Err(BackendError::AlreadyInitialized);
        }
        let handle = Handle(state.next_handle);
        state.next_handle += 1;
        state.open = Some(handle);
        Ok(handle)
    }

    fn terminate(&self, handle: Handle) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        Self::enter(&mut state, MockCall::Terminate)?;
        Self::check_handle(&state, handle)?;
        state.open = None;
        state.started = false;
        self.rx_ready.notify_all();
        Ok(())
    }

    fn start(&self, handle: Handle, bitrate: BitrateIndex) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        Self::enter(&mut state, MockCall::Start)?;
        Self::check_handle(&state, handle)?;
        state.started = true;
        state.bitrate = Some(bitrate);
        Ok(())
    }

    fn reset(&self, handle: Handle) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        Self::enter(&mut state, MockCall::Reset)?;
        Self::check_handle(&state, handle)?;
        if !state.started {
            return Err(BackendError::Offline);
        }
        state.started = false;
        state.rx_queue.clear();
        self.rx_ready.notify_all();
        Ok(())
    }

    fn write(&self, handle: Handle, message: &CanMessage) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        Self::enter(&mut state, MockCall::Write)?;
        Self::check_handle(&state, handle)?;
        if !state.started {
            return Err(BackendError::Offline);
        }
        if state.busy_forever {
            return Err(BackendError::TxBusy);
        }
        if state.busy_writes > 0 {
            state.busy_writes -= 1;
            return Err(BackendError::TxBusy);
        }
        if let Some(remaining) = state.accept_writes.as_mut() {
            if *remaining == 0 {
                return Err(BackendError::BusError);
            }
            *remaining -= 1;
        }
        state.sent.push(*message);
        if state.loopback {
            state.rx_queue.push_back(*message);
            self.rx_ready.notify_all();
        }
        Ok(())
    }

    fn read(&self, handle: Handle, timeout: ReadTimeout) -> Result<CanMessage, BackendError> {
        let mut state = self.state.lock();
        Self::enter(&mut state, MockCall::Read)?;
        let deadline = match timeout {
            ReadTimeout::Bounded(wait) => Some(Instant::now() + wait),
            _ => None,
        };

        // reset and terminate wake blocked readers, which then fail
        loop {
            Self::check_handle(&state, handle)?;
            if !state.started {
                return Err(BackendError::Offline);
            }
            if let Some(message) = state.rx_queue.pop_front() {
                return Ok(message);
            }
            match (timeout, deadline) {
                (ReadTimeout::Infinite, _) => self.rx_ready.wait(&mut state),
                (ReadTimeout::Bounded(_), Some(deadline)) if Instant::now() < deadline => {
                    self.rx_ready.wait_until(&mut state, deadline);
                }
                _ => return Err(BackendError::RxEmpty),
            }
        }
    }

    fn status(&self, handle: Handle) -> Result<BackendStatus, BackendError> {
        let mut state = self.state.lock();
        Self::enter(&mut state, MockCall::Status)?;
        Self::check_handle(&state, handle)?;
        let mut status = BackendStatus::from_bits_retain(state.status);
        if !state.started {
            status |= BackendStatus::RESET;
        }
        if state.rx_queue.is_empty() {
            status |= BackendStatus::RX_EMPTY;
        }
        Ok(status)
    }

    fn read_property(
        &self,
        handle: Handle,
        id: PropertyId,
        buf: &mut [u8],
    ) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        Self::enter(&mut state, MockCall::ReadProperty)?;
        Self::check_handle(&state, handle)?;
        let value = state
            .properties
            .get(&id)
            .ok_or(BackendError::NotSupported)?;
        let len = value.len().min(buf.len());
        buf[..len].copy_from_slice(&value[..len]);
        Ok(())
    }

    fn write_property(
        &self,
        handle: Handle,
        id: PropertyId,
        buf: &[u8],
    ) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        Self::enter(&mut state, MockCall::WriteProperty)?;
        Self::check_handle(&state, handle)?;
        state.properties.insert(id, buf.to_vec());
        Ok(())
    }
}
