use std::thread::sleep;
use std::time::Duration;
use std::{iter, cmp, io};
use log::{debug, trace};
use resize_slice::ResizeSlice;
use crate::commands::{self, Command, CommandResult, VcpCode, VcpValue};
use crate::delay::Delay;
use crate::{
    DdcHost, ErrorCode, Fault,
    I2C_ADDRESS_DDC_CI, I2C_ADDRESS_EDID, SUB_ADDRESS_DDC_CI, HOST_ADDRESS_DDC_CI,
    DELAY_COMMAND_FAILED_MS,
};

/// Capabilities strings longer than this are treated as a runaway reply.
const CAPABILITIES_MAX_LEN: usize = 0x8000;

// EDID base block length
const EDID_BLOCK_LEN: usize = 0x80;

/// A handle to provide DDC/CI operations on an I2C device.
#[derive(Clone, Debug)]
pub struct I2cDdc<I> {
    inner: I,
    delay: Delay,
}

/// DDC/CI on Linux i2c-dev
#[cfg(feature = "i2c-linux")]
pub type I2cDeviceDdc = I2cDdc<i2c_linux::I2c<std::fs::File>>;

/// Open a new DDC/CI handle with the specified I2C device node path
#[cfg(feature = "i2c-linux")]
pub fn from_i2c_device<P: AsRef<std::path::Path>>(p: P) -> io::Result<I2cDeviceDdc> {
    Ok(I2cDdc::new(i2c_linux::I2c::from_path(p)?))
}

impl<I> I2cDdc<I> {
    /// Create a new DDC/CI handle with an existing open device.
    pub fn new(i2c: I) -> Self {
        I2cDdc {
            inner: i2c,
            delay: Default::default(),
        }
    }

    /// Consume the handle to return the inner device.
    pub fn into_inner(self) -> I {
        self.inner
    }

    /// Borrow the inner device.
    pub fn inner_ref(&self) -> &I {
        &self.inner
    }

    /// Mutably borrow the inner device.
    pub fn inner_mut(&mut self) -> &mut I {
        &mut self.inner
    }

    /// Wait for any previous command to complete.
    ///
    /// DDC/CI requires a minimum interval between two transactions; this
    /// waits out whatever remains of it. Commands do this internally, so it
    /// only matters when handing the bus to someone else.
    pub fn sleep(&mut self) {
        self.delay.sleep()
    }
}

fn io_error<E: Into<io::Error>>(e: E) -> io::Error {
    e.into()
}

fn io_fault<E: Into<io::Error>>(e: E) -> Fault {
    Fault::from_io(e.into())
}

/// The product name descriptor of an EDID base block, if it has one.
fn product_name(block: &[u8]) -> Option<String> {
    let parsed = edid::parse(block).to_result().ok()?;
    parsed.descriptors.into_iter()
        .find_map(|descriptor| match descriptor {
            edid::Descriptor::ProductName(name) => Some(name.trim().to_owned()),
            _ => None,
        })
        .filter(|name| !name.is_empty())
}

fn checksum<II: IntoIterator<Item=u8>>(iter: II) -> u8 {
    iter.into_iter().fold(0u8, |sum, v| sum ^ v)
}

impl<I> I2cDdc<I> where
    I: i2c::Address + i2c::BlockTransfer,
    I::Error: Into<io::Error>,
{
    /// Read up to 256 bytes of the monitor's EDID.
    pub fn read_edid(&mut self, mut offset: u8, mut data: &mut [u8]) -> io::Result<usize> {
        self.inner.set_slave_address(I2C_ADDRESS_EDID, false).map_err(io_error)?;

        let mut len = 0;
        while !data.is_empty() {
            let datalen = cmp::min(0x80, data.len());
            let read = self.inner.i2c_read_block_data(offset, &mut data[..datalen]).map_err(io_error)?;
            if read == 0 {
                break
            }
            len += read;
            offset = if let Some(offset) = offset.checked_add(read as u8) {
                offset
            } else {
                break
            };
            data.resize_from(read);
        }

        Ok(len)
    }

    /// Read the EDID base block and return the product name it advertises.
    ///
    /// `Ok(None)` means the EDID was readable but carries no usable name.
    pub fn monitor_name(&mut self) -> io::Result<Option<String>> {
        let mut block = [0u8; EDID_BLOCK_LEN];
        let len = self.read_edid(0, &mut block)?;
        Ok(product_name(&block[..len]))
    }
}

impl<I> I2cDdc<I> where
    I: i2c::Address + i2c::ReadWrite,
    I::Error: Into<io::Error>,
{
    /// Execute a DDC/CI command. See the `commands` module for all available
    /// commands. The return type is dependent on the executed command.
    pub fn execute<C: Command>(&mut self, command: C) -> Result<C::Ok, Fault> {
        let mut data = [0u8; 36];
        let len = command.encode(&mut data)?;

        let mut out = [0u8; 36 + 3];
        let out = match C::Ok::MAX_LEN {
            0 => &mut out[..0],
            max => &mut out[..max + 3],
        };
        let res = self.execute_raw(
            &data[..len],
            out,
            Duration::from_millis(C::DELAY_RESPONSE_MS)
        );
        let res = match res {
            Ok(res) => {
                self.delay = Delay::from_millis(C::DELAY_COMMAND_MS);
                res
            },
            Err(e) => {
                self.delay = Delay::from_millis(DELAY_COMMAND_FAILED_MS);
                return Err(e)
            },
        };

        let res = C::Ok::decode(res);

        if res.is_err() {
            self.delay = Delay::from_millis(DELAY_COMMAND_FAILED_MS);
        }

        res.map_err(Fault::Reply)
    }

    fn encode_command<'a>(data: &[u8], packet: &'a mut [u8]) -> &'a [u8] {
        packet[0] = SUB_ADDRESS_DDC_CI;
        packet[1] = 0x80 | data.len() as u8;
        packet[2..2 + data.len()].copy_from_slice(data);
        packet[2 + data.len()] = checksum(
            iter::once((I2C_ADDRESS_DDC_CI as u8) << 1)
            .chain(packet[..2 + data.len()].iter().cloned())
        );

        &packet[..3 + data.len()]
    }

    fn execute_raw<'a>(&mut self, data: &[u8], out: &'a mut [u8], response_delay: Duration) -> Result<&'a mut [u8], Fault> {
        if data.len() > 36 {
            return Err(Fault::Reply(ErrorCode::InvalidLength))
        }

        let mut packet = [0u8; 36 + 3];
        let packet = Self::encode_command(data, &mut packet);
        self.inner.set_slave_address(I2C_ADDRESS_DDC_CI, false).map_err(io_fault)?;

        self.sleep();
        trace!("DDC/CI write {:02x?}", packet);
        self.inner.i2c_write(packet).map_err(io_fault)?;
        if out.is_empty() {
            return Ok(out)
        }

        sleep(response_delay);
        let full_len = self.inner.i2c_read(out).map_err(io_fault)?;
        trace!("DDC/CI read {:02x?}", &out[..cmp::min(full_len, out.len())]);

        if full_len < 2 {
            return Err(Fault::Reply(ErrorCode::InvalidLength))
        }

        let len = (out[1] & 0x7f) as usize;

        if out[1] & 0x80 == 0 {
            return Err(Fault::Reply(ErrorCode::Invalid("Expected DDC/CI length bit".into())))
        }

        if full_len < len + 3 {
            return Err(Fault::Reply(ErrorCode::InvalidLength))
        }

        let checksum = checksum(
            iter::once(HOST_ADDRESS_DDC_CI)
            .chain(out[..2 + len].iter().cloned())
        );

        if out[2 + len] != checksum {
            return Err(Fault::Reply(ErrorCode::InvalidChecksum))
        }

        Ok(&mut out[2..2 + len])
    }
}

impl<I> DdcHost for I2cDdc<I> where
    I: i2c::Address + i2c::ReadWrite,
    I::Error: Into<io::Error>,
{
    fn get_vcp_feature(&mut self, code: VcpCode) -> Result<VcpValue, Fault> {
        let reply = self.execute(commands::GetVcpFeature::new(code))?;
        if reply.code != code {
            return Err(Fault::Reply(ErrorCode::Invalid(format!(
                "reply for VCP 0x{:02x}, expected 0x{:02x}", reply.code, code
            ))))
        }

        debug!("VCP 0x{:02x} = {:?}", code, reply.value);
        Ok(reply.value)
    }

    fn set_vcp_feature(&mut self, code: VcpCode, value: u16) -> Result<(), Fault> {
        debug!("VCP 0x{:02x} <- {}", code, value);
        self.execute(commands::SetVcpFeature::new(code, value))
    }

    /// Retrieve the capability string from the device.
    ///
    /// This executes multiple `CapabilitiesRequest` commands to construct the entire string.
    fn capabilities_string(&mut self) -> Result<Vec<u8>, Fault> {
        let mut string = Vec::new();
        let mut offset = 0u16;
        loop {
            let caps = self.execute(commands::CapabilitiesRequest::new(offset))?;
            if caps.offset != offset {
                return Err(Fault::Reply(ErrorCode::InvalidOffset))
            } else if caps.data.is_empty() {
                break
            }

            string.extend(caps.data.iter());
            if string.len() > CAPABILITIES_MAX_LEN {
                return Err(Fault::Reply(ErrorCode::InvalidLength))
            }

            offset = offset.checked_add(caps.data.len() as u16)
                .ok_or(Fault::Reply(ErrorCode::InvalidOffset))?;
        }

        debug!("capabilities string is {} bytes", string.len());
        Ok(string)
    }

    fn save_current_settings(&mut self) -> Result<(), Fault> {
        self.execute(commands::SaveCurrentSettings)
    }

    fn release(&mut self) -> Result<(), Fault> {
        // leave the bus quiet for whoever opens it next
        self.sleep();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use super::*;

    #[derive(Default)]
    struct Bus {
        address: u16,
        writes: Vec<(u16, Vec<u8>)>,
        reads: VecDeque<io::Result<Vec<u8>>>,
    }

    impl i2c::Master for Bus {
        type Error = io::Error;
    }

    impl i2c::Address for Bus {
        fn set_slave_address(&mut self, addr: u16, _tenbit: bool) -> Result<(), io::Error> {
            self.address = addr;
            Ok(())
        }
    }

    impl i2c::ReadWrite for Bus {
        fn i2c_read(&mut self, value: &mut [u8]) -> Result<usize, io::Error> {
            let reply = self.reads.pop_front().expect("unexpected read")?;
            let len = cmp::min(reply.len(), value.len());
            value[..len].copy_from_slice(&reply[..len]);
            Ok(value.len())
        }

        fn i2c_write(&mut self, value: &[u8]) -> Result<(), io::Error> {
            self.writes.push((self.address, value.to_vec()));
            Ok(())
        }
    }

    fn reply(data: &[u8]) -> io::Result<Vec<u8>> {
        let mut packet = vec![(I2C_ADDRESS_DDC_CI as u8) << 1, 0x80 | data.len() as u8];
        packet.extend_from_slice(data);
        let sum = checksum(iter::once(HOST_ADDRESS_DDC_CI).chain(packet.iter().cloned()));
        packet.push(sum);
        Ok(packet)
    }

    fn ddc(reads: Vec<io::Result<Vec<u8>>>) -> I2cDdc<Bus> {
        I2cDdc::new(Bus {
            reads: reads.into(),
            ..Default::default()
        })
    }

    #[test]
    fn get_frames_request_and_decodes_reply() {
        let mut ddc = ddc(vec![reply(&[0x02, 0x00, 0x10, 0x00, 0x00, 0x64, 0x00, 0x4b])]);
        let value = ddc.get_vcp_feature(0x10).unwrap();
        assert_eq!(value, VcpValue::new(75, 100));

        let (address, packet) = &ddc.inner_ref().writes[0];
        assert_eq!(*address, I2C_ADDRESS_DDC_CI);
        assert_eq!(packet, &[0x51, 0x82, 0x01, 0x10, 0x6e ^ 0x51 ^ 0x82 ^ 0x01 ^ 0x10]);
    }

    #[test]
    fn set_is_write_only_and_unclamped() {
        let mut ddc = ddc(vec![]);
        ddc.set_vcp_feature(0x10, 150).unwrap();
        let (_, packet) = &ddc.inner_ref().writes[0];
        assert_eq!(&packet[..6], &[0x51, 0x84, 0x03, 0x10, 0x00, 150]);
        assert_eq!(packet.len(), 7);
    }

    #[test]
    fn unsupported_reply_is_reported_as_such() {
        let mut ddc = ddc(vec![reply(&[0x02, 0x01, 0xd6, 0x00, 0x00, 0x00, 0x00, 0x00])]);
        assert_eq!(ddc.get_vcp_feature(0xd6), Err(Fault::Reply(ErrorCode::UnsupportedVcp)));
    }

    #[test]
    fn corrupt_replies_are_rejected() {
        let mut bad = reply(&[0x02, 0x00, 0x10, 0x00, 0x00, 0x64, 0x00, 0x4b]).unwrap();
        *bad.last_mut().unwrap() ^= 0xff;
        let mut ddc = ddc(vec![
            Ok(bad),
            reply(&[0x02, 0x00, 0x12, 0x00, 0x00, 0x64, 0x00, 0x4b]),
            reply(&[]),
        ]);
        assert_eq!(ddc.get_vcp_feature(0x10), Err(Fault::Reply(ErrorCode::InvalidChecksum)));
        assert!(matches!(ddc.get_vcp_feature(0x10), Err(Fault::Reply(ErrorCode::Invalid(..)))));
        assert_eq!(ddc.get_vcp_feature(0x10), Err(Fault::Reply(ErrorCode::NullMessage)));
    }

    #[test]
    fn bus_errors_are_classified() {
        let mut ddc = ddc(vec![
            Err(io::Error::from_raw_os_error(6)),
            Err(io::Error::from_raw_os_error(19)),
        ]);
        assert!(matches!(ddc.get_vcp_feature(0x10), Err(Fault::NoReply(..))));
        assert!(matches!(ddc.get_vcp_feature(0x10), Err(Fault::Disconnected(..))));
    }

    #[test]
    fn capabilities_are_read_in_fragments() {
        let mut ddc = ddc(vec![
            reply(b"\xe3\x00\x00(vcp(10 "),
            reply(b"\xe3\x00\x08D6))"),
            reply(b"\xe3\x00\x0c"),
        ]);
        assert_eq!(ddc.capabilities_string().unwrap(), b"(vcp(10 D6))");

        let offsets: Vec<_> = ddc.inner_ref().writes.iter().map(|(_, p)| (p[3], p[4])).collect();
        assert_eq!(offsets, vec![(0x00, 0x00), (0x00, 0x08), (0x00, 0x0c)]);
    }

    fn edid_block(name: &[u8]) -> Vec<u8> {
        let mut block = vec![0u8; EDID_BLOCK_LEN];
        block[..8].copy_from_slice(&[0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00]);
        // DEL
        block[8..10].copy_from_slice(&[0x10, 0xac]);
        block[18] = 1;
        block[19] = 4;
        for offset in [54, 72, 90, 108] {
            block[offset + 3] = 0x10;
        }
        block[90 + 3] = 0xfc;
        let text = &mut block[90 + 5..90 + 18];
        text.copy_from_slice(b"\n            ");
        text[..name.len()].copy_from_slice(name);
        block
    }

    #[test]
    fn edid_product_name() {
        assert_eq!(product_name(&edid_block(b"DELL U2415\n")), Some("DELL U2415".into()));
        assert_eq!(product_name(&edid_block(b"LG ULTRAFINE")), Some("LG ULTRAFINE".into()));
    }

    #[test]
    fn edid_without_a_name() {
        let mut nameless = edid_block(b"x");
        nameless[90 + 3] = 0x10;
        assert_eq!(product_name(&nameless), None);
        assert_eq!(product_name(&edid_block(b"\n")), None);
        assert_eq!(product_name(&edid_block(b"DELL")[..100]), None);
    }

    #[test]
    fn capabilities_offset_mismatch_fails() {
        let mut ddc = ddc(vec![reply(b"\xe3\x00\x04(vcp")]);
        assert_eq!(ddc.capabilities_string(), Err(Fault::Reply(ErrorCode::InvalidOffset)));
    }
}
