//! ControlCAN compatibility adapter core.
//!
//! Lets software written against the ControlCAN API drive a CAN controller
//! through a CAN API V3 style backend driver.

pub mod backend; // Backend driver interface and mock
pub mod config;
pub mod frame; // Legacy <-> backend frame codec
pub mod legacy; // ControlCAN structures and facade
pub mod property;
pub mod session; // Device lifecycle and receive serialization
pub mod status; // Status byte -> legacy error flags
pub mod timing; // BTR0/BTR1 -> bitrate index

// Re-exports for convenience
pub use backend::{Backend, BackendError};
pub use config::AdapterConfig;
pub use legacy::ControlCan;
pub use session::{Session, SessionState};
pub use timing::BitrateIndex;

// Common types and traits
pub mod error;
pub mod types;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
