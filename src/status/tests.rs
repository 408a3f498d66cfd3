use super::*;

#[test]
fn test_clear_status_maps_to_no_errors() {
    assert_eq!(map_status(BackendStatus::empty()), ErrorFlags::empty());
}

#[test]
fn test_bus_off() {
    assert_eq!(map_status(BackendStatus::BUS_OFF), ErrorFlags::BUS_OFF);
}

#[test]
fn test_error_limit_is_passive() {
    assert_eq!(map_status(BackendStatus::WARNING_LEVEL), ErrorFlags::PASSIVE);
}

#[test]
fn test_combined_bits() {
    let status = BackendStatus::BUS_OFF | BackendStatus::WARNING_LEVEL;
    assert_eq!(map_status(status), ErrorFlags::BUS_OFF | ErrorFlags::PASSIVE);
}

#[test]
fn test_unmapped_bits_are_ignored() {
    let status = BackendStatus::RESET
        | BackendStatus::BUS_ERROR
        | BackendStatus::TX_BUSY
        | BackendStatus::RX_EMPTY
        | BackendStatus::MESSAGE_LOST
        | BackendStatus::QUEUE_OVERRUN;
    assert_eq!(map_status(status), ErrorFlags::empty());
}

#[test]
fn test_every_status_byte_is_tolerated() {
    for byte in 0..=u8::MAX {
        let flags = map_status_byte(byte);
        assert!((ErrorFlags::BUS_OFF | ErrorFlags::PASSIVE).contains(flags));
        assert_eq!(flags.contains(ErrorFlags::BUS_OFF), byte & 0x40 != 0);
        assert_eq!(flags.contains(ErrorFlags::PASSIVE), byte & 0x20 != 0);
    }
}
