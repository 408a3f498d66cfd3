//! Frame codec between the legacy and backend frame layouts.
//!
//! Both directions are pure, allocation-free copies between fixed-size
//! structures. Payload lengths above 8 are clamped, never rejected.

use crate::backend::CanMessage;
use crate::legacy::VciCanObj;
use crate::types::MAX_DLC;

/// Converts a legacy frame into the backend layout
pub fn to_backend(frame: &VciCanObj) -> CanMessage {
    let dlc = frame.data_len.min(MAX_DLC as u8);
    let mut message = CanMessage {
        id: frame.id,
        xtd: frame.extern_flag != 0,
        rtr: frame.remote_flag != 0,
        sts: false,
        dlc,
        data: [0; MAX_DLC],
    };
    let len = usize::from(dlc);
    message.data[..len].copy_from_slice(&frame.data[..len]);
    message
}

/// Converts a backend frame into the legacy layout.
///
/// Timestamp, send type and reserved fields have no backend counterpart and
/// are always zero.
pub fn from_backend(message: &CanMessage) -> VciCanObj {
    let data_len = message.dlc.min(MAX_DLC as u8);
    let mut frame = VciCanObj {
        id: message.id,
        extern_flag: u8::from(message.xtd),
        remote_flag: u8::from(message.rtr),
        data_len,
        ..Default::default()
    };
    let len = usize::from(data_len);
    frame.data[..len].copy_from_slice(&message.data[..len]);
    frame
}
