use parking_lot::Mutex;

use crate::backend::{Backend, ReadTimeout};
use crate::frame;
use crate::legacy::VciCanObj;
use crate::types::Handle;

/// Serializes receive operations on the shared backend handle.
///
/// At most one receive drains the backend queue at a time; concurrent callers
/// queue up on the lock and are served one whole batch after another.
#[derive(Debug, Default)]
pub struct ReceiveSerializer {
    lock: Mutex<()>,
}

impl ReceiveSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills `out` with up to `out.len()` frames and returns how many were read.
    ///
    /// `timeout` applies to each frame fetch, not to the batch. The batch ends
    /// early when the backend reports an empty queue or a read error.
    pub fn receive<B: Backend + ?Sized>(
        &self,
        backend: &B,
        handle: Handle,
        out: &mut [VciCanObj],
        timeout: ReadTimeout,
    ) -> usize {
        let _guard = self.lock.lock();

        let mut received = 0;
        for slot in out.iter_mut() {
            match backend.read(handle, timeout) {
                Ok(message) => {
                    *slot = frame::from_backend(&message);
                    tracing::debug!(frame = %slot, "RX");
                    received += 1;
                }
                Err(err) if err.is_empty() => break,
                Err(err) => {
                    tracing::warn!(%err, code = err.code(), received, "read failed");
                    break;
                }
            }
        }
        received
    }

    /// True while a receive is in flight
    pub fn is_busy(&self) -> bool {
        self.lock.is_locked()
    }
}
