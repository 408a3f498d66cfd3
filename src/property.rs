//! Transfer widths for generic property access.
//!
//! Legacy get/set calls carry no size. Each property id is given an explicit
//! width here; ids without an entry fall back to the default (4 bytes, one
//! legacy DWORD).

use std::collections::HashMap;

use crate::types::PropertyId;

/// Device name string
pub const PROPERTY_DEVICE_NAME: PropertyId = 11;
/// Number of frames waiting in the receive queue (u32, little endian)
pub const PROPERTY_RECEIVE_QUEUE_LEVEL: PropertyId = 27;

pub const DEFAULT_PROPERTY_WIDTH: usize = 4;
pub const DEVICE_NAME_WIDTH: usize = 40;

#[derive(Debug, Clone)]
pub struct PropertyTable {
    widths: HashMap<PropertyId, usize>,
    default_width: usize,
}

impl Default for PropertyTable {
    fn default() -> Self {
        Self::new(DEFAULT_PROPERTY_WIDTH)
    }
}

impl PropertyTable {
    /// Creates a table with the built-in entries and the given fallback width
    pub fn new(default_width: usize) -> Self {
        let mut widths = HashMap::new();
        widths.insert(PROPERTY_DEVICE_NAME, DEVICE_NAME_WIDTH);
        widths.insert(PROPERTY_RECEIVE_QUEUE_LEVEL, 4);
        Self {
            widths,
            default_width,
        }
    }

    pub fn set_width(&mut self, id: PropertyId, width: usize) {
        self.widths.insert(id, width);
    }

    pub fn with_width(mut self, id: PropertyId, width: usize) -> Self {
        self.set_width(id, width);
        self
    }

    /// Number of bytes transferred for `id`
    pub fn width(&self, id: PropertyId) -> usize {
        self.widths.get(&id).copied().unwrap_or(self.default_width)
    }

    pub fn default_width(&self) -> usize {
        self.default_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_property_uses_default_width() {
        let table = PropertyTable::default();
        assert_eq!(table.width(0x1234), 4);
        assert_eq!(PropertyTable::new(8).width(0x1234), 8);
    }

    #[test]
    fn test_builtin_widths() {
        let table = PropertyTable::default();
        assert_eq!(table.width(PROPERTY_DEVICE_NAME), DEVICE_NAME_WIDTH);
        assert_eq!(table.width(PROPERTY_RECEIVE_QUEUE_LEVEL), 4);
    }

    #[test]
    fn test_override_width() {
        let table = PropertyTable::default().with_width(7, 16);
        assert_eq!(table.width(7), 16);
        assert_eq!(table.width(8), 4);
    }
}
