//! Legacy (ControlCAN) data structures and constants.
//!
//! The structures keep the C layout of the legacy header so that buffers can
//! be shared with callers built against it.

use std::fmt;

use bitflags::bitflags;

use crate::types::MAX_DLC;

// Interface card types (only the USB variants are commonly used with serial adapters)
pub const VCI_USBCAN1: u32 = 3;
pub const VCI_USBCAN2: u32 = 4;
pub const VCI_USBCAN_E_U: u32 = 20;
pub const VCI_USBCAN_2E_U: u32 = 21;

/// Coarse success/failure result of every legacy call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Status {
    Err = 0,
    Ok = 1,
}

impl Status {
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

impl<T, E> From<Result<T, E>> for Status {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Status::Ok,
            Err(_) => Status::Err,
        }
    }
}

bitflags! {
    /// Legacy CAN error code bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ErrorFlags: u32 {
        const OVERFLOW = 0x0001;        // controller internal FIFO overflow
        const ERROR_ALARM = 0x0002;     // controller error warning
        const PASSIVE = 0x0004;         // controller passive error
        const ARBITRATION_LOST = 0x0008;
        const BUS_ERROR = 0x0010;
        const BUS_OFF = 0x0020;
        const BUFFER_OVERFLOW = 0x0040; // controller internal buffer overflow
    }
}

/// Legacy CAN frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct VciCanObj {
    pub id: u32,
    pub time_stamp: u32,
    pub time_flag: u8,
    pub send_type: u8,
    pub remote_flag: u8,
    pub extern_flag: u8,
    pub data_len: u8,
    pub data: [u8; MAX_DLC],
    pub reserved: [u8; 3],
}

impl VciCanObj {
    /// Builds a data frame; payloads longer than 8 bytes are truncated
    pub fn new(id: u32, extended: bool, data: &[u8]) -> Self {
        let len = data.len().min(MAX_DLC);
        let mut frame = Self {
            id,
            extern_flag: u8::from(extended),
            data_len: len as u8,
            ..Default::default()
        };
        frame.data[..len].copy_from_slice(&data[..len]);
        frame
    }

    /// Builds a remote frame requesting `len` bytes
    pub fn remote(id: u32, extended: bool, len: u8) -> Self {
        Self {
            id,
            remote_flag: 1,
            extern_flag: u8::from(extended),
            data_len: len,
            ..Default::default()
        }
    }

    pub fn is_extended(&self) -> bool {
        self.extern_flag != 0
    }

    pub fn is_remote(&self) -> bool {
        self.remote_flag != 0
    }

    /// Valid payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.data[..usize::from(self.data_len).min(MAX_DLC)]
    }
}

impl fmt::Display for VciCanObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID=0x{:08X} {} {} DLC={} DATA:",
            self.id,
            if self.is_extended() { "EXT" } else { "STD" },
            if self.is_remote() { "RTR" } else { "DATA" },
            self.data_len
        )?;
        for byte in self.payload() {
            write!(f, " {:02X}", byte)?;
        }
        Ok(())
    }
}

/// Legacy channel initialization parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct VciInitConfig {
    pub acc_code: u32,
    pub acc_mask: u32,
    pub reserved: u32,
    pub filter: u8,
    pub timing0: u8,
    pub timing1: u8,
    pub mode: u8,
}

impl VciInitConfig {
    /// Accept-all configuration with the given timing registers
    pub fn with_timing(timing0: u8, timing1: u8) -> Self {
        Self {
            acc_code: 0,
            acc_mask: 0xFFFF_FFFF,
            filter: 1,
            timing0,
            timing1,
            ..Default::default()
        }
    }
}

/// Legacy error information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct VciErrInfo {
    pub err_code: u32,
    pub passive_err_data: [u8; 3],
    pub ar_lost_err_data: u8,
}

impl VciErrInfo {
    pub fn flags(&self) -> ErrorFlags {
        ErrorFlags::from_bits_retain(self.err_code)
    }
}

/// Legacy controller status registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct VciCanStatus {
    pub err_interrupt: u8,
    pub reg_mode: u8,
    pub reg_status: u8,
    pub reg_al_capture: u8,
    pub reg_ec_capture: u8,
    pub reg_ew_limit: u8,
    pub reg_re_counter: u8,
    pub reg_te_counter: u8,
    pub reserved: u32,
}

pub const SERIAL_NUM_LEN: usize = 20;
pub const HW_TYPE_LEN: usize = 40;

/// Legacy board information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct VciBoardInfo {
    pub hw_version: u16,
    pub fw_version: u16,
    pub dr_version: u16,
    pub in_version: u16,
    pub irq_num: u16,
    pub can_num: u8,
    pub str_serial_num: [u8; SERIAL_NUM_LEN],
    pub str_hw_type: [u8; HW_TYPE_LEN],
    pub reserved: [u16; 4],
}

impl Default for VciBoardInfo {
    fn default() -> Self {
        Self {
            hw_version: 0,
            fw_version: 0,
            dr_version: 0,
            in_version: 0,
            irq_num: 0,
            can_num: 0,
            str_serial_num: [0; SERIAL_NUM_LEN],
            str_hw_type: [0; HW_TYPE_LEN],
            reserved: [0; 4],
        }
    }
}

impl VciBoardInfo {
    pub fn serial_number(&self) -> &str {
        c_str(&self.str_serial_num)
    }

    pub fn hw_type(&self) -> &str {
        c_str(&self.str_hw_type)
    }
}

/// Copies `src` into a fixed C string field, always leaving a terminating NUL
pub(crate) fn copy_c_str(dst: &mut [u8], src: &str) {
    dst.fill(0);
    let len = src.len().min(dst.len().saturating_sub(1));
    dst[..len].copy_from_slice(&src.as_bytes()[..len]);
}

fn c_str(field: &[u8]) -> &str {
    let end = field.iter().position(|b| *b == 0).unwrap_or(field.len());
    std::str::from_utf8(&field[..end]).unwrap_or("")
}
