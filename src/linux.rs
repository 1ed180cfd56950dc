//! Monitors on Linux i2c-dev buses, discovered through udev.
//!
//! Every i2c-dev adapter that answers an EDID read counts as one display
//! with one physical monitor. Each bus is opened once: the handle that read
//! the EDID is the one handed out. Linux has no notion of a primary monitor at
//! the bus level, so the lowest numbered qualifying bus is reported as
//! primary.
//!
//! Requires the `udev` and `i2c-linux` features.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use log::{debug, warn};
use crate::enumerate::{DiscoveredMonitor, DisplayTopology, LogicalDisplay};
use crate::i2c_ddc::{from_i2c_device, I2cDeviceDdc};
use crate::Error;

// list stolen from ddcutil's ignorable_i2c_device_sysfs_name
const SKIP_PREFIX: [&str; 5] = [
    "SMBus",
    "soc:i2cdsi",
    "smu",
    "mac-io",
    "u4",
];

fn ignorable(name: &OsStr) -> bool {
    SKIP_PREFIX.iter().any(|p| name.as_bytes().starts_with(p.as_bytes()))
}

/// Bus number of an `/dev/i2c-N` node.
fn bus_number(devnode: &Path) -> Option<usize> {
    devnode.file_name()?
        .to_str()?
        .strip_prefix("i2c-")?
        .parse()
        .ok()
}

/// A bus whose EDID was readable, kept open until it is handed out.
struct OpenBus {
    ddc: I2cDeviceDdc,
    name: Option<String>,
}

fn open_bus(devnode: &Path) -> io::Result<OpenBus> {
    let mut ddc = from_i2c_device(devnode)?;
    let name = ddc.monitor_name()?;
    Ok(OpenBus {
        ddc,
        name,
    })
}

/// The i2c-dev buses udev knows about.
#[derive(Default)]
pub struct I2cTopology {
    open_buses: BTreeMap<usize, OpenBus>,
}

impl I2cTopology {
    /// A topology walker over the current udev device list.
    pub fn new() -> Self {
        Default::default()
    }

    fn scan(&mut self) -> io::Result<Vec<LogicalDisplay>> {
        let udev = udev::Context::new()?;
        let mut en = udev::Enumerator::new(&udev)?;
        en.match_subsystem("i2c-dev")?;

        self.open_buses.clear();
        let mut displays = Vec::new();
        for dev in en.scan_devices()? {
            let (devnode, name) = match dev.devnode().and_then(|devnode| dev.attribute_value("name").map(|name| (devnode, name))) {
                Some(v) => v,
                None => continue,
            };

            if ignorable(name) {
                debug!("{}: ignoring adapter {:?}", devnode.display(), name);
                continue
            }

            let bus = match bus_number(devnode) {
                Some(bus) => bus,
                None => continue,
            };

            match open_bus(devnode) {
                Ok(opened) => {
                    self.open_buses.insert(bus, opened);
                },
                Err(e) => {
                    debug!("{}: no EDID ({})", devnode.display(), e);
                    continue
                },
            }

            displays.push(LogicalDisplay {
                device_name: devnode.display().to_string(),
                description: Some(name.to_string_lossy().trim().to_owned()),
                is_primary: false,
                raw: bus,
            });
        }

        displays.sort_by_key(|display| display.raw);
        if let Some(first) = displays.first_mut() {
            first.is_primary = true;
        }
        Ok(displays)
    }
}

impl DisplayTopology for I2cTopology {
    type Host = I2cDeviceDdc;

    fn logical_displays(&mut self) -> Result<Vec<LogicalDisplay>, Error> {
        self.scan().map_err(|e| Error::Enumeration(format!("udev i2c-dev scan failed: {}", e)))
    }

    fn physical_monitors(&mut self, display: &LogicalDisplay) -> Result<Vec<DiscoveredMonitor<I2cDeviceDdc>>, Error> {
        let open = match self.open_buses.remove(&display.raw) {
            Some(open) => open,
            None => {
                // not from the last scan, so open it now
                let devnode = Path::new(&display.device_name);
                let mut ddc = from_i2c_device(devnode)
                    .map_err(|e| Error::Enumeration(format!("failed to open {}: {}", display.device_name, e)))?;
                let name = ddc.monitor_name().unwrap_or_else(|e| {
                    warn!("{}: EDID read failed: {}", display.device_name, e);
                    None
                });
                OpenBus {
                    ddc,
                    name,
                }
            },
        };

        Ok(vec![DiscoveredMonitor {
            host: open.ddc,
            description: open.name.unwrap_or_default(),
            device_path: Some(display.device_name.clone()),
            raw: display.raw,
        }])
    }
}
