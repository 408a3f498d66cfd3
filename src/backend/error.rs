//! Tagged backend failures
//!
//! The backend reports failures as negative integer return codes. Every code the
//! adapter reacts to gets a named variant; the rest are carried as `Other`.

use thiserror::Error;

pub const CANERR_NOERROR: i32 = 0;
pub const CANERR_BOFF: i32 = -1;
pub const CANERR_EWRN: i32 = -2;
pub const CANERR_BERR: i32 = -3;
pub const CANERR_ONLINE: i32 = -8;
pub const CANERR_OFFLINE: i32 = -9;
pub const CANERR_MSG_LST: i32 = -10;
pub const CANERR_TX_BUSY: i32 = -20;
pub const CANERR_RX_EMPTY: i32 = -30;
pub const CANERR_QUE_OVR: i32 = -40;
pub const CANERR_TIMEOUT: i32 = -50;
pub const CANERR_BAUDRATE: i32 = -91;
pub const CANERR_HANDLE: i32 = -92;
pub const CANERR_ILLPARA: i32 = -93;
pub const CANERR_NULLPTR: i32 = -94;
pub const CANERR_NOTINIT: i32 = -95;
pub const CANERR_YETINIT: i32 = -96;
pub const CANERR_LIBRARY: i32 = -97;
pub const CANERR_NOTSUPP: i32 = -98;
pub const CANERR_FATAL: i32 = -99;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BackendError {
    #[error("bus off")]
    BusOff,
    #[error("error warning level reached")]
    ErrorWarning,
    #[error("bus error")]
    BusError,
    #[error("controller already online")]
    Online,
    #[error("controller offline")]
    Offline,
    #[error("message lost")]
    MessageLost,
    #[error("transmitter busy")]
    TxBusy,
    #[error("receiver empty")]
    RxEmpty,
    #[error("queue overrun")]
    QueueOverrun,
    #[error("timed out")]
    Timeout,
    #[error("illegal bitrate")]
    Bitrate,
    #[error("invalid handle")]
    InvalidHandle,
    #[error("illegal parameter")]
    IllegalParameter,
    #[error("interface not initialized")]
    NotInitialized,
    #[error("interface already initialized")]
    AlreadyInitialized,
    #[error("library could not be loaded")]
    Library,
    #[error("operation not supported")]
    NotSupported,
    #[error("fatal driver error")]
    Fatal,
    #[error("backend error code {0}")]
    Other(i32),
}

impl BackendError {
    /// Maps a raw return code to a failure kind. Non-negative codes are not failures.
    ///
    /// For [`Backend`](super::Backend) implementations wrapping the raw C driver.
    pub fn from_code(code: i32) -> Option<Self> {
        let err = match code {
            c if c >= CANERR_NOERROR => return None,
            CANERR_BOFF => Self::BusOff,
            CANERR_EWRN => Self::ErrorWarning,
            CANERR_BERR => Self::BusError,
            CANERR_ONLINE => Self::Online,
            CANERR_OFFLINE => Self::Offline,
            CANERR_MSG_LST => Self::MessageLost,
            CANERR_TX_BUSY => Self::TxBusy,
            CANERR_RX_EMPTY => Self::RxEmpty,
            CANERR_QUE_OVR => Self::QueueOverrun,
            CANERR_TIMEOUT => Self::Timeout,
            CANERR_BAUDRATE => Self::Bitrate,
            CANERR_HANDLE => Self::InvalidHandle,
            CANERR_ILLPARA | CANERR_NULLPTR => Self::IllegalParameter,
            CANERR_NOTINIT => Self::NotInitialized,
            CANERR_YETINIT => Self::AlreadyInitialized,
            CANERR_LIBRARY => Self::Library,
            CANERR_NOTSUPP => Self::NotSupported,
            CANERR_FATAL => Self::Fatal,
            other => Self::Other(other),
        };
        Some(err)
    }

    /// Raw return code for this failure kind
    pub fn code(&self) -> i32 {
        match self {
            Self::BusOff => CANERR_BOFF,
            Self::ErrorWarning => CANERR_EWRN,
            Self::BusError => CANERR_BERR,
            Self::Online => CANERR_ONLINE,
            Self::Offline => CANERR_OFFLINE,
            Self::MessageLost => CANERR_MSG_LST,
            Self::TxBusy => CANERR_TX_BUSY,
            Self::RxEmpty => CANERR_RX_EMPTY,
            Self::QueueOverrun => CANERR_QUE_OVR,
            Self::Timeout => CANERR_TIMEOUT,
            Self::Bitrate => CANERR_BAUDRATE,
            Self::InvalidHandle => CANERR_HANDLE,
            Self::IllegalParameter => CANERR_ILLPARA,
            Self::NotInitialized => CANERR_NOTINIT,
            Self::AlreadyInitialized => CANERR_YETINIT,
            Self::Library => CANERR_LIBRARY,
            Self::NotSupported => CANERR_NOTSUPP,
            Self::Fatal => CANERR_FATAL,
            Self::Other(code) => *code,
        }
    }

    /// Reset found the controller already stopped.
    pub fn is_benign_offline(&self) -> bool {
        matches!(self, Self::Offline)
    }

    /// Transmit queue momentarily full; the write may be retried.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::TxBusy)
    }

    /// Nothing pending in the receive queue.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::RxEmpty)
    }
}

/// Turns a raw backend return code into a tagged result.
///
/// For [`Backend`](super::Backend) implementations wrapping the raw C driver,
/// which return plain `i32` codes from every entry point.
///
/// ```rust
/// use controlcan_adapter::backend::{check, BackendError};
///
/// assert_eq!(check(3), Ok(3));
/// assert_eq!(check(-20), Err(BackendError::TxBusy));
/// ```
pub fn check(code: i32) -> Result<i32, BackendError> {
    match BackendError::from_code(code) {
        Some(err) => Err(err),
        None => Ok(code),
    }
}
