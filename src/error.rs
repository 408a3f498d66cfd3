use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum AdapterError {
    // Configuration errors
    #[error("unsupported bit timing 0x{0:04X}")]
    UnsupportedTiming(u16),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("configuration error: {0}")]
    Config(String),

    // Precondition violations
    #[error("device not open")]
    NotOpen,

    // Backend failures
    #[error("device open failed: {0}")]
    OpenFailed(BackendError),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, AdapterError>;
