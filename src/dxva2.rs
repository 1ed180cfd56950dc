//! Windows monitor configuration status codes.
//!
//! The dxva2 monitor configuration calls only return a success flag; the
//! reason for a failure is left in the thread's last-error value. These
//! helpers turn that value into a [`Fault`]. They are plain data mappings
//! and compile on every platform.

use crate::{ErrorCode, Fault};

#[allow(missing_docs)]
pub mod status {
    pub const ERROR_INVALID_HANDLE: u32 = 6;
    pub const ERROR_SEM_TIMEOUT: u32 = 121;
    pub const ERROR_TIMEOUT: u32 = 1460;

    pub const ERROR_GRAPHICS_I2C_NOT_SUPPORTED: u32 = 0xc026_2580;
    pub const ERROR_GRAPHICS_I2C_DEVICE_DOES_NOT_EXIST: u32 = 0xc026_2581;
    pub const ERROR_GRAPHICS_I2C_ERROR_TRANSMITTING_DATA: u32 = 0xc026_2582;
    pub const ERROR_GRAPHICS_I2C_ERROR_RECEIVING_DATA: u32 = 0xc026_2583;
    pub const ERROR_GRAPHICS_DDCCI_VCP_NOT_SUPPORTED: u32 = 0xc026_2584;
    pub const ERROR_GRAPHICS_DDCCI_INVALID_DATA: u32 = 0xc026_2585;
    pub const ERROR_GRAPHICS_DDCCI_MONITOR_RETURNED_INVALID_TIMING_STATUS_BYTE: u32 = 0xc026_2586;
    pub const ERROR_GRAPHICS_MCA_INVALID_CAPABILITIES_STRING: u32 = 0xc026_2587;
    pub const ERROR_GRAPHICS_MCA_INTERNAL_ERROR: u32 = 0xc026_2588;
    pub const ERROR_GRAPHICS_DDCCI_INVALID_MESSAGE_COMMAND: u32 = 0xc026_2589;
    pub const ERROR_GRAPHICS_DDCCI_INVALID_MESSAGE_LENGTH: u32 = 0xc026_258a;
    pub const ERROR_GRAPHICS_DDCCI_INVALID_MESSAGE_CHECKSUM: u32 = 0xc026_258b;
    pub const ERROR_GRAPHICS_INVALID_PHYSICAL_MONITOR_HANDLE: u32 = 0xc026_258c;
    pub const ERROR_GRAPHICS_MONITOR_NO_LONGER_EXISTS: u32 = 0xc026_258d;
}

use self::status::*;

/// Classify a Win32 error code left behind by a failed dxva2 call.
pub fn classify_status(code: u32) -> Fault {
    match code {
        ERROR_GRAPHICS_DDCCI_VCP_NOT_SUPPORTED => Fault::Reply(ErrorCode::UnsupportedVcp),
        ERROR_GRAPHICS_DDCCI_INVALID_DATA => Fault::Reply(ErrorCode::InvalidData),
        ERROR_GRAPHICS_DDCCI_INVALID_MESSAGE_COMMAND => Fault::Reply(ErrorCode::InvalidOpcode),
        ERROR_GRAPHICS_DDCCI_INVALID_MESSAGE_LENGTH => Fault::Reply(ErrorCode::InvalidLength),
        ERROR_GRAPHICS_DDCCI_INVALID_MESSAGE_CHECKSUM => Fault::Reply(ErrorCode::InvalidChecksum),
        ERROR_GRAPHICS_DDCCI_MONITOR_RETURNED_INVALID_TIMING_STATUS_BYTE =>
            Fault::Reply(ErrorCode::Invalid("invalid timing status byte".into())),
        ERROR_GRAPHICS_I2C_ERROR_TRANSMITTING_DATA =>
            Fault::NoReply("I2C error transmitting data".into()),
        ERROR_GRAPHICS_I2C_ERROR_RECEIVING_DATA =>
            Fault::NoReply("I2C error receiving data".into()),
        ERROR_TIMEOUT | ERROR_SEM_TIMEOUT =>
            Fault::NoReply(format!("timeout (Win32 error {})", code)),
        ERROR_GRAPHICS_INVALID_PHYSICAL_MONITOR_HANDLE =>
            Fault::Disconnected("invalid physical monitor handle".into()),
        ERROR_GRAPHICS_MONITOR_NO_LONGER_EXISTS =>
            Fault::Disconnected("monitor no longer exists".into()),
        ERROR_GRAPHICS_I2C_DEVICE_DOES_NOT_EXIST =>
            Fault::Disconnected("I2C device does not exist".into()),
        ERROR_INVALID_HANDLE =>
            Fault::Disconnected("invalid handle".into()),
        code => Fault::Reply(ErrorCode::Invalid(format!("Win32 error 0x{:08x}", code))),
    }
}

/// Classify an HRESULT, unwrapping Win32 codes carried in `FACILITY_WIN32`.
pub fn classify_hresult(hr: i32) -> Fault {
    let hr = hr as u32;
    if hr & 0xffff_0000 == 0x8007_0000 {
        classify_status(hr & 0xffff)
    } else {
        classify_status(hr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_ddcci_statuses() {
        assert_eq!(classify_status(ERROR_GRAPHICS_DDCCI_VCP_NOT_SUPPORTED), Fault::Reply(ErrorCode::UnsupportedVcp));
        assert_eq!(classify_status(ERROR_GRAPHICS_DDCCI_INVALID_MESSAGE_CHECKSUM), Fault::Reply(ErrorCode::InvalidChecksum));
        assert!(matches!(classify_status(ERROR_GRAPHICS_I2C_ERROR_RECEIVING_DATA), Fault::NoReply(..)));
        assert!(matches!(classify_status(ERROR_SEM_TIMEOUT), Fault::NoReply(..)));
        assert!(matches!(classify_status(ERROR_GRAPHICS_MONITOR_NO_LONGER_EXISTS), Fault::Disconnected(..)));
        assert!(matches!(classify_status(ERROR_INVALID_HANDLE), Fault::Disconnected(..)));
    }

    #[test]
    fn unknown_statuses_are_protocol_errors() {
        assert_eq!(
            classify_status(0x1f),
            Fault::Reply(ErrorCode::Invalid("Win32 error 0x0000001f".into()))
        );
    }

    #[test]
    fn unwraps_win32_hresults() {
        assert!(matches!(classify_hresult(0x8007_05b4u32 as i32), Fault::NoReply(..)));
        assert!(matches!(classify_hresult(ERROR_GRAPHICS_MONITOR_NO_LONGER_EXISTS as i32), Fault::Disconnected(..)));
    }
}
