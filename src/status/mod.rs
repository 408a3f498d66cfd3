//! Mapping of the backend controller status byte onto legacy error flags.

use crate::backend::BackendStatus;
use crate::legacy::ErrorFlags;

/// Builds the legacy error bitmask for a backend status byte.
///
/// Only bus-off and the error limit have a legacy counterpart; every other
/// backend bit, known or not, is ignored.
pub fn map_status(status: BackendStatus) -> ErrorFlags {
    let mut flags = ErrorFlags::empty();
    if status.contains(BackendStatus::BUS_OFF) {
        flags |= ErrorFlags::BUS_OFF;
    }
    if status.contains(BackendStatus::WARNING_LEVEL) {
        flags |= ErrorFlags::PASSIVE;
    }
    flags
}

/// Same as [`map_status`] for a raw status byte
pub fn map_status_byte(status: u8) -> ErrorFlags {
    map_status(BackendStatus::from_bits_retain(status))
}

#[cfg(test)]
mod tests;
