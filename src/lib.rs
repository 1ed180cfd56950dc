#![deny(missing_docs)]

//! Discover attached displays and control them using the DDC/CI protocol.
//!
//! Monitors are found through a [`DisplayTopology`](enumerate::DisplayTopology),
//! each physical monitor is owned by a [`MonitorHandle`], and VCP features are
//! read and written through that handle one transaction at a time.
//!
//! # Example
//!
//! ```rust,no_run
//! use ddc_monitor::{system, Selector};
//!
//! let mut monitor = system::find(&Selector::Primary).unwrap();
//! let brightness = monitor.get_vcp_feature(0x10).unwrap();
//! println!("brightness: {} / {}", brightness.current, brightness.maximum);
//! ```

/// EDID EEPROM I2C address
pub const I2C_ADDRESS_EDID: u16 = 0x50;

/// DDC/CI command and control I2C address
pub const I2C_ADDRESS_DDC_CI: u16 = 0x37;

/// DDC sub-address command prefix
pub const SUB_ADDRESS_DDC_CI: u8 = 0x51;

/// Address the display uses as the source of its replies when computing the
/// reply checksum.
pub const HOST_ADDRESS_DDC_CI: u8 = 0x50;

const DELAY_COMMAND_FAILED_MS: u64 = 40;

/// DDC/CI command request and response types.
pub mod commands;
pub use commands::{Command, CommandResult, VcpCode, VcpKind, VcpValue};

mod error;
pub use error::{Error, ErrorCode, ErrorKind, Fault};

/// Inter-command delays mandated by DDC/CI.
pub mod delay;

mod i2c_ddc;
pub use i2c_ddc::I2cDdc;
#[cfg(feature = "i2c-linux")]
pub use i2c_ddc::{from_i2c_device, I2cDeviceDdc};

mod handle;
pub use handle::{MonitorHandle, MonitorInfo};

pub mod channel;
pub use channel::Request;

pub mod scan;
pub use scan::{ScanEntry, ScanReport, VcpQueryResult};

pub mod caps;
pub use caps::Capabilities;

pub mod vcp;

pub mod enumerate;
pub use enumerate::Selector;

pub mod dxva2;

#[cfg(windows)]
pub mod winapi;

#[cfg(all(target_os = "linux", feature = "udev", feature = "i2c-linux"))]
pub mod linux;

pub mod system;

/// A transport able to carry DDC/CI transactions to one physical monitor.
///
/// Implementations perform exactly one protocol transaction per call and
/// report failures as unclassified [`Fault`]s; interpretation into the
/// crate's [`Error`] kinds happens in the [`channel`] layer. Calls take
/// `&mut self` because a monitor's bus carries a single transaction at a
/// time.
pub trait DdcHost {
    /// Read the current and maximum value of a VCP feature.
    fn get_vcp_feature(&mut self, code: VcpCode) -> Result<VcpValue, Fault>;

    /// Write a VCP feature value. The value is passed through as-is.
    fn set_vcp_feature(&mut self, code: VcpCode, value: u16) -> Result<(), Fault>;

    /// Retrieve the raw capabilities string reported by the monitor.
    fn capabilities_string(&mut self) -> Result<Vec<u8>, Fault>;

    /// Ask the monitor to persist its current settings.
    fn save_current_settings(&mut self) -> Result<(), Fault>;

    /// Give the underlying OS resource back. Called at most once by
    /// [`MonitorHandle`].
    fn release(&mut self) -> Result<(), Fault> {
        Ok(())
    }
}

impl<H: DdcHost + ?Sized> DdcHost for Box<H> {
    fn get_vcp_feature(&mut self, code: VcpCode) -> Result<VcpValue, Fault> {
        (**self).get_vcp_feature(code)
    }

    fn set_vcp_feature(&mut self, code: VcpCode, value: u16) -> Result<(), Fault> {
        (**self).set_vcp_feature(code, value)
    }

    fn capabilities_string(&mut self) -> Result<Vec<u8>, Fault> {
        (**self).capabilities_string()
    }

    fn save_current_settings(&mut self) -> Result<(), Fault> {
        (**self).save_current_settings()
    }

    fn release(&mut self) -> Result<(), Fault> {
        (**self).release()
    }
}
