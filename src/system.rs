//! The display backend this build was compiled with.
//!
//! Windows builds walk the desktop through dxva2. Linux builds with the
//! `udev` and `i2c-linux` features walk the i2c-dev buses. Other builds have
//! no backend and fail to enumerate.

use crate::enumerate::{self, Selector};
use crate::{DdcHost, Error, MonitorHandle};

/// A transport of whichever backend is available.
pub type SystemHost = Box<dyn DdcHost + Send>;

/// A monitor handle on the system backend.
pub type SystemMonitor = MonitorHandle<SystemHost>;

/// Open every physical monitor attached to the system.
#[cfg(windows)]
pub fn enumerate() -> Result<Vec<SystemMonitor>, Error> {
    let monitors = enumerate::enumerate(crate::winapi::Dxva2Topology::new())?;
    Ok(monitors.into_iter().map(MonitorHandle::boxed).collect())
}

/// Open every physical monitor attached to the system.
#[cfg(all(target_os = "linux", feature = "udev", feature = "i2c-linux"))]
pub fn enumerate() -> Result<Vec<SystemMonitor>, Error> {
    let monitors = enumerate::enumerate(crate::linux::I2cTopology::new())?;
    Ok(monitors.into_iter().map(MonitorHandle::boxed).collect())
}

/// Open every physical monitor attached to the system.
#[cfg(not(any(windows, all(target_os = "linux", feature = "udev", feature = "i2c-linux"))))]
pub fn enumerate() -> Result<Vec<SystemMonitor>, Error> {
    Err(Error::Enumeration("no display backend compiled in".into()))
}

/// Open the monitor matching `selector`, releasing all the others.
pub fn find(selector: &Selector) -> Result<SystemMonitor, Error> {
    enumerate::select(enumerate()?, selector)
}
