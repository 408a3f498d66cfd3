//! Legacy (ControlCAN) API surface.
//!
//! [`ControlCan`] exposes the legacy call set on top of a [`Session`]:
//! every call answers with a coarse [`Status`] or a frame count, and all
//! backend detail is absorbed here (it is only visible in the trace).
//!
//! Device type, device index and channel index are accepted for signature
//! compatibility and logged; exactly one device with one channel is served.
//!
//! # Examples
//!
//! ```rust
//! use controlcan_adapter::backend::mock::MockBackend;
//! use controlcan_adapter::legacy::{ControlCan, Status, VciCanObj, VciInitConfig, VCI_USBCAN2};
//!
//! let can = ControlCan::new(MockBackend::new_loopback());
//! assert_eq!(can.open_device(VCI_USBCAN2, 0, 0), Status::Ok);
//! let init = VciInitConfig::with_timing(0x00, 0x1C); // 500K
//! assert_eq!(can.init_can(VCI_USBCAN2, 0, 0, Some(&init)), Status::Ok);
//! assert_eq!(can.start_can(VCI_USBCAN2, 0, 0), Status::Ok);
//!
//! let frame = VciCanObj::new(0x123, false, &[1, 2, 3]);
//! assert_eq!(can.transmit(VCI_USBCAN2, 0, 0, &[frame]), 1);
//!
//! let mut rx = [VciCanObj::default(); 4];
//! assert_eq!(can.receive(VCI_USBCAN2, 0, 0, &mut rx, 0), 1);
//! assert_eq!(rx[0].payload(), &[1, 2, 3]);
//! ```

mod api;
mod types;

pub use api::ControlCan;
pub use types::*;

#[cfg(test)]
mod tests;
