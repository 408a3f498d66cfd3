use crate::backend::Backend;
use crate::config::AdapterConfig;
use crate::error::Result;
use crate::legacy::types::copy_c_str;
use crate::legacy::{Status, VciBoardInfo, VciCanObj, VciCanStatus, VciErrInfo, VciInitConfig};
use crate::session::Session;

/// Legacy API facade over a device session
pub struct ControlCan<B: Backend> {
    session: Session<B>,
}

impl<B: Backend> ControlCan<B> {
    pub fn new(backend: B) -> Self {
        Self {
            session: Session::new(backend),
        }
    }

    pub fn with_config(backend: B, config: AdapterConfig) -> Result<Self> {
        Ok(Self {
            session: Session::with_config(backend, config)?,
        })
    }

    pub fn from_session(session: Session<B>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    pub fn open_device(&self, dev_type: u32, dev_index: u32, _reserved: u32) -> Status {
        tracing::debug!(dev_type, dev_index, "VCI_OpenDevice");
        self.session.open().into()
    }

    pub fn close_device(&self, dev_type: u32, dev_index: u32) -> Status {
        tracing::debug!(dev_type, dev_index, "VCI_CloseDevice");
        self.session.close();
        Status::Ok
    }

    /// Applies the timing registers of `config`. Acceptance filter and mode are ignored.
    pub fn init_can(
        &self,
        dev_type: u32,
        dev_index: u32,
        can_index: u32,
        config: Option<&VciInitConfig>,
    ) -> Status {
        let Some(config) = config else {
            tracing::debug!(dev_type, dev_index, can_index, "VCI_InitCAN without config");
            return Status::Err;
        };
        tracing::debug!(
            dev_type,
            dev_index,
            can_index,
            acc_code = format_args!("0x{:08X}", config.acc_code),
            acc_mask = format_args!("0x{:08X}", config.acc_mask),
            filter = config.filter,
            timing0 = format_args!("0x{:02X}", config.timing0),
            timing1 = format_args!("0x{:02X}", config.timing1),
            mode = config.mode,
            "VCI_InitCAN"
        );
        self.session.configure(config.timing0, config.timing1).into()
    }

    pub fn start_can(&self, dev_type: u32, dev_index: u32, can_index: u32) -> Status {
        tracing::debug!(dev_type, dev_index, can_index, "VCI_StartCAN");
        self.session.start().into()
    }

    pub fn reset_can(&self, dev_type: u32, dev_index: u32, can_index: u32) -> Status {
        tracing::debug!(dev_type, dev_index, can_index, "VCI_ResetCAN");
        self.session.stop().into()
    }

    pub fn clear_buffer(&self, dev_type: u32, dev_index: u32, can_index: u32) -> Status {
        tracing::debug!(dev_type, dev_index, can_index, "VCI_ClearBuffer");
        self.session.clear_buffer().into()
    }

    /// Returns the number of frames accepted by the backend
    pub fn transmit(
        &self,
        dev_type: u32,
        dev_index: u32,
        can_index: u32,
        frames: &[VciCanObj],
    ) -> u32 {
        tracing::debug!(dev_type, dev_index, can_index, count = frames.len(), "VCI_Transmit");
        count(self.session.transmit(frames))
    }

    /// Fills the front of `out` and returns the number of frames received
    pub fn receive(
        &self,
        dev_type: u32,
        dev_index: u32,
        can_index: u32,
        out: &mut [VciCanObj],
        wait_time: i32,
    ) -> u32 {
        tracing::debug!(dev_type, dev_index, can_index, max_count = out.len(), wait_time, "VCI_Receive");
        count(self.session.receive(out, wait_time))
    }

    pub fn get_receive_num(&self, dev_type: u32, dev_index: u32, can_index: u32) -> u32 {
        tracing::debug!(dev_type, dev_index, can_index, "VCI_GetReceiveNum");
        self.session.pending_receive()
    }

    pub fn get_reference(
        &self,
        dev_type: u32,
        dev_index: u32,
        can_index: u32,
        ref_type: u32,
        data: &mut [u8],
    ) -> Status {
        tracing::debug!(dev_type, dev_index, can_index, ref_type, "VCI_GetReference");
        match u16::try_from(ref_type) {
            Ok(id) => self.session.get_property(id, data).into(),
            Err(_) => Status::Err,
        }
    }

    pub fn set_reference(
        &self,
        dev_type: u32,
        dev_index: u32,
        can_index: u32,
        ref_type: u32,
        data: &[u8],
    ) -> Status {
        tracing::debug!(dev_type, dev_index, can_index, ref_type, "VCI_SetReference");
        match u16::try_from(ref_type) {
            Ok(id) => self.session.set_property(id, data).into(),
            Err(_) => Status::Err,
        }
    }

    pub fn read_err_info(
        &self,
        dev_type: u32,
        dev_index: u32,
        can_index: u32,
        info: &mut VciErrInfo,
    ) -> Status {
        tracing::debug!(dev_type, dev_index, can_index, "VCI_ReadErrInfo");
        *info = VciErrInfo::default();
        match self.session.error_flags() {
            Ok(flags) => {
                info.err_code = flags.bits();
                Status::Ok
            }
            Err(_) => Status::Err,
        }
    }

    pub fn read_board_info(&self, dev_type: u32, dev_index: u32, info: &mut VciBoardInfo) -> Status {
        tracing::debug!(dev_type, dev_index, "VCI_ReadBoardInfo");
        *info = VciBoardInfo::default();
        match self.session.board_info() {
            Ok(board) => {
                copy_c_str(&mut info.str_hw_type, &board.hw_type);
                copy_c_str(&mut info.str_serial_num, &board.serial_number);
                info.can_num = board.channels;
                Status::Ok
            }
            Err(_) => Status::Err,
        }
    }

    /// Echoes the raw backend status byte in `reg_status`
    pub fn read_can_status(
        &self,
        dev_type: u32,
        dev_index: u32,
        can_index: u32,
        status: &mut VciCanStatus,
    ) -> Status {
        tracing::debug!(dev_type, dev_index, can_index, "VCI_ReadCANStatus");
        *status = VciCanStatus::default();
        match self.session.status_byte() {
            Ok(byte) => {
                status.reg_status = byte.bits();
                Status::Ok
            }
            Err(_) => Status::Err,
        }
    }
}

fn count(frames: usize) -> u32 {
    u32::try_from(frames).unwrap_or(u32::MAX)
}
