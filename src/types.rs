use std::fmt;

/// CAN ID type (11-bit standard or 29-bit extended)
pub type CanId = u32;

/// Backend property identifier
pub type PropertyId = u16;

/// Maximum payload of a classic CAN frame
pub const MAX_DLC: usize = 8;

/// Opaque handle returned by the backend for an initialized device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub i32);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration trait that must be implemented by all adapter configurations
pub trait Config {
    fn validate(&self) -> crate::error::Result<()>;
}
