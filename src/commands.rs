#![allow(missing_docs)]
use std::fmt;
use serde::Serialize;
use crate::ErrorCode;

/// A DDC/CI request understood by [`I2cDdc::execute`](crate::I2cDdc::execute).
pub trait Command {
    type Ok: CommandResult;
    const DELAY_RESPONSE_MS: u64;
    const DELAY_COMMAND_MS: u64;

    fn encode(&self, data: &mut [u8]) -> Result<usize, ErrorCode>;
}

/// The decoded reply to a [`Command`].
pub trait CommandResult: Sized {
    const MAX_LEN: usize;
    fn decode(data: &[u8]) -> Result<Self, ErrorCode>;
}

/// An 8-bit VCP feature code.
pub type VcpCode = u8;

#[derive(Copy, Clone, Debug)]
pub struct GetVcpFeature {
    pub code: VcpCode,
}

impl GetVcpFeature {
    pub fn new(code: VcpCode) -> Self {
        GetVcpFeature {
            code,
        }
    }
}

impl Command for GetVcpFeature {
    type Ok = VcpReply;
    const DELAY_RESPONSE_MS: u64 = 40;
    const DELAY_COMMAND_MS: u64 = 50;

    fn encode(&self, data: &mut [u8]) -> Result<usize, ErrorCode> {
        if data.len() < 2 {
            return Err(ErrorCode::InvalidLength)
        }
        data[0] = 0x01;
        data[1] = self.code;

        Ok(2)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct SetVcpFeature {
    pub code: VcpCode,
    pub value: u16,
}

impl SetVcpFeature {
    pub fn new(code: VcpCode, value: u16) -> Self {
        SetVcpFeature {
            code,
            value,
        }
    }
}

impl Command for SetVcpFeature {
    type Ok = ();
    const DELAY_RESPONSE_MS: u64 = 0;
    const DELAY_COMMAND_MS: u64 = 50;

    fn encode(&self, data: &mut [u8]) -> Result<usize, ErrorCode> {
        if data.len() < 4 {
            return Err(ErrorCode::InvalidLength)
        }

        data[0] = 0x03;
        data[1] = self.code;
        data[2] = (self.value >> 8) as _;
        data[3] = self.value as _;

        Ok(4)
    }
}

/// How the monitor treats a VCP feature, as reported in the reply's type byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum VcpKind {
    /// A value that persists once written.
    SetParameter,
    /// A write triggers an action; the value does not persist.
    Momentary,
}

impl VcpKind {
    pub fn from_byte(kind: u8) -> Self {
        match kind {
            0x00 => VcpKind::SetParameter,
            _ => VcpKind::Momentary,
        }
    }
}

/// The result of a successful VCP read.
///
/// `current` is meaningful relative to `maximum`; the protocol does not
/// normalize continuous ranges to 0-100.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct VcpValue {
    pub kind: VcpKind,
    pub current: u16,
    pub maximum: u16,
}

impl VcpValue {
    pub fn new(current: u16, maximum: u16) -> Self {
        VcpValue {
            kind: VcpKind::SetParameter,
            current,
            maximum,
        }
    }
}

impl fmt::Display for VcpValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} / {}", self.current, self.maximum)
    }
}

/// A decoded "VCP feature reply" packet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VcpReply {
    /// The feature code echoed by the monitor.
    pub code: VcpCode,
    pub value: VcpValue,
}

impl CommandResult for VcpReply {
    const MAX_LEN: usize = 8;

    fn decode(data: &[u8]) -> Result<Self, ErrorCode> {
        if data.is_empty() {
            return Err(ErrorCode::NullMessage)
        }

        if data.len() != 8 {
            return Err(ErrorCode::InvalidLength)
        }

        if data[0] != 0x02 {
            return Err(ErrorCode::InvalidOpcode)
        }

        match data[1] {
            0x00 => (), // NoError
            0x01 => return Err(ErrorCode::UnsupportedVcp),
            rc => return Err(ErrorCode::Invalid(format!("Unrecognized VCP result code 0x{:02x}", rc))),
        }

        Ok(VcpReply {
            code: data[2],
            value: VcpValue {
                kind: VcpKind::from_byte(data[3]),
                maximum: ((data[4] as u16) << 8) | data[5] as u16,
                current: ((data[6] as u16) << 8) | data[7] as u16,
            },
        })
    }
}

#[derive(Copy, Clone, Debug)]
pub struct SaveCurrentSettings;

impl Command for SaveCurrentSettings {
    type Ok = ();
    const DELAY_RESPONSE_MS: u64 = 0;
    const DELAY_COMMAND_MS: u64 = 200;

    fn encode(&self, data: &mut [u8]) -> Result<usize, ErrorCode> {
        if data.is_empty() {
            return Err(ErrorCode::InvalidLength)
        }
        data[0] = 0x0c;

        Ok(1)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct CapabilitiesRequest {
    pub offset: u16,
}

impl CapabilitiesRequest {
    pub fn new(offset: u16) -> Self {
        CapabilitiesRequest {
            offset,
        }
    }
}

impl Command for CapabilitiesRequest {
    type Ok = CapabilitiesReply;
    const DELAY_RESPONSE_MS: u64 = 40;
    const DELAY_COMMAND_MS: u64 = 50;

    fn encode(&self, data: &mut [u8]) -> Result<usize, ErrorCode> {
        if data.len() < 3 {
            return Err(ErrorCode::InvalidLength)
        }

        data[0] = 0xf3;
        data[1] = (self.offset >> 8) as _;
        data[2] = self.offset as _;

        Ok(3)
    }
}

#[derive(Clone, Debug)]
pub struct CapabilitiesReply {
    pub offset: u16,
    pub data: Box<[u8]>,
}

impl CommandResult for CapabilitiesReply {
    const MAX_LEN: usize = 35;

    fn decode(data: &[u8]) -> Result<Self, ErrorCode> {
        if data.is_empty() {
            return Err(ErrorCode::NullMessage)
        }

        if data.len() < 3 || data.len() > 35 {
            return Err(ErrorCode::InvalidLength)
        }

        if data[0] != 0xe3 {
            return Err(ErrorCode::InvalidOpcode)
        }

        Ok(CapabilitiesReply {
            offset: ((data[1] as u16) << 8) | data[2] as u16,
            data: data[3..].to_owned().into_boxed_slice(),
        })
    }
}

impl CommandResult for () {
    const MAX_LEN: usize = 0;

    fn decode(_data: &[u8]) -> Result<Self, ErrorCode> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_set_with_big_endian_value() {
        let mut data = [0u8; 4];
        assert_eq!(SetVcpFeature::new(0x10, 0x0196).encode(&mut data), Ok(4));
        assert_eq!(data, [0x03, 0x10, 0x01, 0x96]);
    }

    #[test]
    fn decodes_vcp_reply() {
        let reply = VcpReply::decode(&[0x02, 0x00, 0x10, 0x00, 0x00, 0x64, 0x00, 0x32]).unwrap();
        assert_eq!(reply.code, 0x10);
        assert_eq!(reply.value, VcpValue::new(50, 100));

        let reply = VcpReply::decode(&[0x02, 0x00, 0x04, 0x01, 0x00, 0x01, 0x00, 0x00]).unwrap();
        assert_eq!(reply.value.kind, VcpKind::Momentary);
    }

    #[test]
    fn unsupported_bit_is_its_own_error() {
        assert_eq!(
            VcpReply::decode(&[0x02, 0x01, 0xd6, 0x00, 0x00, 0x00, 0x00, 0x00]),
            Err(ErrorCode::UnsupportedVcp)
        );
        assert!(matches!(
            VcpReply::decode(&[0x02, 0x07, 0xd6, 0x00, 0x00, 0x00, 0x00, 0x00]),
            Err(ErrorCode::Invalid(..))
        ));
    }

    #[test]
    fn rejects_malformed_replies() {
        assert_eq!(VcpReply::decode(&[]), Err(ErrorCode::NullMessage));
        assert_eq!(VcpReply::decode(&[0x02, 0x00, 0x10]), Err(ErrorCode::InvalidLength));
        assert_eq!(
            VcpReply::decode(&[0xe3, 0x00, 0x10, 0x00, 0x00, 0x64, 0x00, 0x32]),
            Err(ErrorCode::InvalidOpcode)
        );
        assert!(CapabilitiesReply::decode(&[0x02, 0x00, 0x00]).is_err());
    }

    #[test]
    fn decodes_capabilities_fragment() {
        let reply = CapabilitiesReply::decode(b"\xe3\x00\x20(vcp").unwrap();
        assert_eq!(reply.offset, 0x20);
        assert_eq!(&reply.data[..], b"(vcp");
    }
}
