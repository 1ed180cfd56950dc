//! Single VCP transactions against one monitor.
//!
//! Each call issues exactly one protocol transaction and never retries;
//! retrying, or confirming a write by reading it back, is left to the
//! caller. Host [`Fault`]s are classified here into the crate's [`Error`]
//! kinds.

use std::fmt;
use log::debug;
use crate::caps::{self, Capabilities};
use crate::vcp::codes;
use crate::{DdcHost, Error, ErrorCode, Fault, MonitorHandle, VcpCode, VcpValue};

/// The transaction a failure belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Request {
    /// Read a VCP feature.
    GetVcp(VcpCode),
    /// Write a VCP feature.
    SetVcp(VcpCode, u16),
    /// Fetch the capabilities string.
    Capabilities,
    /// Persist current settings.
    SaveSettings,
    /// Release the OS handle.
    Release,
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Request::GetVcp(code) => write!(f, "get VCP 0x{:02x}", code),
            Request::SetVcp(code, value) => write!(f, "set VCP 0x{:02x} to {}", code, value),
            Request::Capabilities => f.write_str("capabilities request"),
            Request::SaveSettings => f.write_str("save settings"),
            Request::Release => f.write_str("release"),
        }
    }
}

/// Interpret a host fault raised while carrying out `request`.
pub fn classify(request: Request, fault: Fault) -> Error {
    match fault {
        Fault::Reply(ErrorCode::UnsupportedVcp) => Error::Unsupported(request),
        Fault::Reply(ErrorCode::NullMessage) => Error::Timeout {
            request,
            reason: ErrorCode::NullMessage.to_string(),
        },
        Fault::Reply(code) => Error::Protocol {
            request,
            code,
        },
        Fault::NoReply(reason) => Error::Timeout {
            request,
            reason,
        },
        Fault::Disconnected(reason) => Error::DeviceLost(reason),
    }
}

impl<H: DdcHost> MonitorHandle<H> {
    /// Read a VCP feature.
    pub fn get_vcp_feature(&mut self, code: VcpCode) -> Result<VcpValue, Error> {
        self.host_mut()?
            .get_vcp_feature(code)
            .map_err(|fault| classify(Request::GetVcp(code), fault))
    }

    /// Write a VCP feature.
    ///
    /// The value is sent unmodified; range enforcement is up to the
    /// monitor's firmware. Success only means the transaction completed, so
    /// read the feature back if confirmation is needed.
    pub fn set_vcp_feature(&mut self, code: VcpCode, value: u16) -> Result<(), Error> {
        debug!("{}: VCP 0x{:02x} <- {}", self.info().device_path, code, value);
        self.host_mut()?
            .set_vcp_feature(code, value)
            .map_err(|fault| classify(Request::SetVcp(code, value), fault))
    }

    /// Fetch the monitor's raw capabilities string.
    ///
    /// The reply is cut at the first NUL and decoded lossily.
    pub fn capabilities_string(&mut self) -> Result<String, Error> {
        let raw = self.host_mut()?
            .capabilities_string()
            .map_err(|fault| classify(Request::Capabilities, fault))?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    /// Fetch and parse the monitor's capabilities.
    pub fn capabilities(&mut self) -> Result<Capabilities, Error> {
        caps::parse(&self.capabilities_string()?)
    }

    /// Ask the monitor to store its current settings.
    pub fn save_current_settings(&mut self) -> Result<(), Error> {
        self.host_mut()?
            .save_current_settings()
            .map_err(|fault| classify(Request::SaveSettings, fault))
    }

    /// Restore every factory preset.
    pub fn restore_factory_defaults(&mut self) -> Result<(), Error> {
        self.set_vcp_feature(codes::RESTORE_FACTORY_DEFAULTS, 1)
    }

    /// Restore the factory color settings only.
    pub fn restore_factory_color_defaults(&mut self) -> Result<(), Error> {
        self.set_vcp_feature(codes::RESTORE_FACTORY_COLOR_DEFAULTS, 1)
    }

    /// Read the luminance control.
    pub fn brightness(&mut self) -> Result<VcpValue, Error> {
        self.get_vcp_feature(codes::BRIGHTNESS)
    }

    /// Write the luminance control.
    pub fn set_brightness(&mut self, value: u16) -> Result<(), Error> {
        self.set_vcp_feature(codes::BRIGHTNESS, value)
    }

    /// Read the contrast control.
    pub fn contrast(&mut self) -> Result<VcpValue, Error> {
        self.get_vcp_feature(codes::CONTRAST)
    }

    /// Write the contrast control.
    pub fn set_contrast(&mut self, value: u16) -> Result<(), Error> {
        self.set_vcp_feature(codes::CONTRAST, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn classifies_faults() {
        let get = Request::GetVcp(0xd6);
        assert_eq!(classify(get, Fault::Reply(ErrorCode::UnsupportedVcp)).kind(), ErrorKind::Unsupported);
        assert_eq!(classify(get, Fault::Reply(ErrorCode::InvalidChecksum)).kind(), ErrorKind::Protocol);
        assert_eq!(classify(get, Fault::Reply(ErrorCode::NullMessage)).kind(), ErrorKind::Timeout);
        assert_eq!(classify(get, Fault::NoReply("EIO".into())).kind(), ErrorKind::Timeout);
        assert_eq!(classify(get, Fault::Disconnected("ENODEV".into())).kind(), ErrorKind::DeviceLost);
    }

    #[test]
    fn errors_name_their_request() {
        let e = classify(Request::SetVcp(0x10, 150), Fault::NoReply("EIO".into()));
        assert_eq!(e.to_string(), "set VCP 0x10 to 150 timed out: EIO");
    }
}
