use super::*;
use crate::backend::mock::{MockBackend, MockCall};
use crate::backend::BackendError;
use crate::property::PROPERTY_DEVICE_NAME;
use crate::SessionState;

const DEV: u32 = VCI_USBCAN2;

fn opened() -> ControlCan<MockBackend> {
    let can = ControlCan::new(MockBackend::new());
    assert_eq!(can.open_device(DEV, 0, 0), Status::Ok);
    can
}

fn started() -> ControlCan<MockBackend> {
    let can = opened();
    let init = VciInitConfig::with_timing(0x00, 0x1C);
    assert_eq!(can.init_can(DEV, 0, 0, Some(&init)), Status::Ok);
    assert_eq!(can.start_can(DEV, 0, 0), Status::Ok);
    can
}

#[test]
fn test_open_failure_reports_err() {
    let can = ControlCan::new(MockBackend::new());
    can.session()
        .backend()
        .fail(MockCall::Initialize, BackendError::Library);
    assert_eq!(can.open_device(DEV, 0, 0), Status::Err);
}

#[test]
fn test_init_without_config_fails() {
    let can = opened();
    assert_eq!(can.init_can(DEV, 0, 0, None), Status::Err);
}

#[test]
fn test_init_with_unsupported_timing_fails() {
    let can = opened();
    let init = VciInitConfig::with_timing(0xFF, 0xFF);
    assert_eq!(can.init_can(DEV, 0, 0, Some(&init)), Status::Err);
}

#[test]
fn test_start_before_open_fails() {
    let can = ControlCan::new(MockBackend::new());
    assert_eq!(can.start_can(DEV, 0, 0), Status::Err);
    assert_eq!(can.reset_can(DEV, 0, 0), Status::Err);
    assert_eq!(can.clear_buffer(DEV, 0, 0), Status::Err);
}

#[test]
fn test_reset_and_clear_buffer() {
    let can = started();
    assert_eq!(can.clear_buffer(DEV, 0, 0), Status::Ok);
    assert_eq!(can.session().state(), SessionState::Running);

    assert_eq!(can.reset_can(DEV, 0, 0), Status::Ok);
    assert_eq!(can.reset_can(DEV, 0, 0), Status::Ok);
    assert_eq!(can.session().state(), SessionState::Configured);
}

#[test]
fn test_close_is_always_ok() {
    let can = started();
    can.session()
        .backend()
        .fail(MockCall::Terminate, BackendError::Fatal);
    assert_eq!(can.close_device(DEV, 0), Status::Ok);
    assert_eq!(can.close_device(DEV, 0), Status::Ok);
    assert_eq!(can.session().state(), SessionState::Closed);
}

#[test]
fn test_transmit_and_receive_counts() {
    let can = started();
    can.session().backend().set_loopback(true);

    let frames = [
        VciCanObj::new(0x1, false, &[1]),
        VciCanObj::remote(0x2, true, 4),
    ];
    assert_eq!(can.transmit(DEV, 0, 0, &frames), 2);
    assert_eq!(can.get_receive_num(DEV, 0, 0), 0);

    let mut out = [VciCanObj::default(); 10];
    assert_eq!(can.receive(DEV, 0, 0, &mut out, 0), 2);
    assert!(out[1].is_remote());
    assert!(out[1].is_extended());
    assert_eq!(out[1].data_len, 4);
}

#[test]
fn test_read_err_info_zeroes_and_maps() {
    let can = started();
    can.session().backend().set_status(0x40);

    let mut info = VciErrInfo {
        err_code: 0xFFFF,
        passive_err_data: [1, 2, 3],
        ar_lost_err_data: 4,
    };
    assert_eq!(can.read_err_info(DEV, 0, 0, &mut info), Status::Ok);
    assert_eq!(info.flags(), ErrorFlags::BUS_OFF);
    assert_eq!(info.passive_err_data, [0; 3]);
    assert_eq!(info.ar_lost_err_data, 0);
}

#[test]
fn test_read_err_info_when_closed() {
    let can = ControlCan::new(MockBackend::new());
    let mut info = VciErrInfo::default();
    assert_eq!(can.read_err_info(DEV, 0, 0, &mut info), Status::Err);
}

#[test]
fn test_read_can_status_echoes_raw_byte() {
    let can = started();
    can.session().backend().set_status(0x22);

    let mut status = VciCanStatus {
        reg_mode: 9,
        ..Default::default()
    };
    assert_eq!(can.read_can_status(DEV, 0, 0, &mut status), Status::Ok);
    // receive queue is empty, so the backend adds its RX_EMPTY bit
    assert_eq!(status.reg_status, 0x26);
    assert_eq!(status.reg_mode, 0);
}

#[test]
fn test_read_board_info() {
    let can = opened();
    let mut info = VciBoardInfo::default();
    assert_eq!(can.read_board_info(DEV, 0, &mut info), Status::Ok);
    assert_eq!(info.hw_type(), "SerialCAN");
    assert_eq!(info.serial_number(), "N/A");
    assert_eq!(info.can_num, 1);

    can.session()
        .backend()
        .set_property(PROPERTY_DEVICE_NAME, b"WeAct USB2CAN");
    assert_eq!(can.read_board_info(DEV, 0, &mut info), Status::Ok);
    assert_eq!(info.hw_type(), "WeAct USB2CAN");
}

#[test]
fn test_board_info_name_is_truncated() {
    let can = opened();
    can.session()
        .backend()
        .set_property(PROPERTY_DEVICE_NAME, &[b'x'; 64]);

    let mut info = VciBoardInfo::default();
    assert_eq!(can.read_board_info(DEV, 0, &mut info), Status::Ok);
    assert_eq!(info.hw_type().len(), HW_TYPE_LEN - 1);
    assert_eq!(info.str_hw_type[HW_TYPE_LEN - 1], 0);
}

#[test]
fn test_references() {
    let can = opened();
    assert_eq!(can.set_reference(DEV, 0, 0, 3, &[1, 0, 0, 0]), Status::Ok);

    let mut value = [0u8; 4];
    assert_eq!(can.get_reference(DEV, 0, 0, 3, &mut value), Status::Ok);
    assert_eq!(u32::from_le_bytes(value), 1);

    assert_eq!(can.get_reference(DEV, 0, 0, 3, &mut [0u8; 2]), Status::Err);
    assert_eq!(can.get_reference(DEV, 0, 0, 0x1_0000, &mut value), Status::Err);
}

#[test]
fn test_receive_num_from_queue_level() {
    let can = opened();
    can.session()
        .backend()
        .set_property(crate::property::PROPERTY_RECEIVE_QUEUE_LEVEL, &3u32.to_le_bytes());
    assert_eq!(can.get_receive_num(DEV, 0, 0), 3);
}

#[test]
fn test_frame_display() {
    let frame = VciCanObj::new(0x123, false, &[0x01, 0xAB]);
    assert_eq!(frame.to_string(), "ID=0x00000123 STD DATA DLC=2 DATA: 01 AB");

    let remote = VciCanObj::remote(0x18FF_0001, true, 8);
    assert_eq!(remote.to_string(), "ID=0x18FF0001 EXT RTR DLC=8 DATA: 00 00 00 00 00 00 00 00");
}

#[test]
fn test_new_frame_truncates_payload() {
    let frame = VciCanObj::new(1, false, &[7; 12]);
    assert_eq!(frame.data_len, 8);
    assert_eq!(frame.payload(), &[7; 8]);
}

#[test]
fn test_status_from_result() {
    assert_eq!(Status::from(Ok::<(), ()>(())), Status::Ok);
    assert_eq!(Status::from(Err::<(), ()>(())), Status::Err);
    assert_eq!(Status::Ok as u32, 1);
    assert_eq!(Status::Err as u32, 0);
    assert!(Status::Ok.is_ok());
}

#[test]
fn test_copy_c_str() {
    let mut field = [0xFFu8; 6];
    types::copy_c_str(&mut field, "abcdefgh");
    assert_eq!(&field, b"abcde\0");

    types::copy_c_str(&mut field, "ab");
    assert_eq!(&field, b"ab\0\0\0\0");
}
