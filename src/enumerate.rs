//! Discovery of physical monitors.
//!
//! The OS is asked for its logical displays first, then for the physical
//! monitors behind each one. A logical display can back several physical
//! monitors (mirrored outputs), and every one of them is returned with its
//! own [`MonitorHandle`].
//!
//! The detection only proves that the OS knows about a monitor. DDC/CI may
//! still be unavailable if the display does not support it, or if its active
//! input belongs to another host.

use std::fmt;
use log::{info, warn};
use crate::{DdcHost, Error, MonitorHandle, MonitorInfo};

/// A display surface as the OS lays out the desktop.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LogicalDisplay {
    /// OS name of the display, e.g. `\\.\DISPLAY1` or `/dev/i2c-4`.
    pub device_name: String,
    /// Adapter-level description, used when a physical monitor reports none.
    pub description: Option<String>,
    /// Whether this display holds the primary desktop.
    pub is_primary: bool,
    /// Backend-specific token identifying the display, such as a native handle.
    pub raw: usize,
}

/// A physical monitor found behind a [`LogicalDisplay`].
#[derive(Debug)]
pub struct DiscoveredMonitor<H> {
    /// The open transport.
    pub host: H,
    /// Hardware description reported by the OS.
    pub description: String,
    /// OS device path, if the OS could provide one.
    pub device_path: Option<String>,
    /// Native handle value, used to derive a synthetic path.
    pub raw: usize,
}

/// A walk of the OS display topology.
pub trait DisplayTopology {
    /// The transport opened for each physical monitor.
    type Host: DdcHost;

    /// All logical displays, in OS order.
    fn logical_displays(&mut self) -> Result<Vec<LogicalDisplay>, Error>;

    /// Open every physical monitor behind `display`.
    fn physical_monitors(&mut self, display: &LogicalDisplay) -> Result<Vec<DiscoveredMonitor<Self::Host>>, Error>;
}

impl<T: DisplayTopology + ?Sized> DisplayTopology for &mut T {
    type Host = T::Host;

    fn logical_displays(&mut self) -> Result<Vec<LogicalDisplay>, Error> {
        (**self).logical_displays()
    }

    fn physical_monitors(&mut self, display: &LogicalDisplay) -> Result<Vec<DiscoveredMonitor<Self::Host>>, Error> {
        (**self).physical_monitors(display)
    }
}

/// Which monitor [`find`] should return.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selector {
    /// The first monitor on the primary display.
    Primary,
    /// The monitor with exactly this device path.
    DevicePath(String),
    /// The first monitor whose friendly name equals this one, ignoring
    /// ASCII case.
    FriendlyName(String),
}

impl Selector {
    /// Whether `info` satisfies the selector.
    pub fn matches(&self, info: &MonitorInfo) -> bool {
        match self {
            Selector::Primary => info.is_primary,
            Selector::DevicePath(path) => info.device_path == *path,
            Selector::FriendlyName(name) => info.friendly_name.eq_ignore_ascii_case(name),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Selector::Primary => f.write_str("primary monitor"),
            Selector::DevicePath(path) => write!(f, "monitor at {}", path),
            Selector::FriendlyName(name) => write!(f, "monitor named {:?}", name),
        }
    }
}

/// Identifier for a monitor whose device path the OS would not report.
///
/// Stable for as long as the native handle is open, but not guaranteed to
/// be unique across boots.
pub fn synthetic_device_path(display: &str, index: usize, raw: usize) -> String {
    format!("{}#{}@{:x}", display, index, raw)
}

/// Decode a fixed-width, NUL padded UTF-16 field.
pub fn decode_fixed_width(text: &[u16]) -> String {
    let end = text.iter().position(|&c| c == 0).unwrap_or(text.len());
    String::from_utf16_lossy(&text[..end]).trim().to_owned()
}

/// Open every physical monitor the topology knows about.
///
/// Fails if the topology cannot be walked or has no logical displays. A
/// display whose monitors cannot be opened is skipped with a warning, unless
/// every display fails that way.
pub fn enumerate<T: DisplayTopology>(mut topology: T) -> Result<Vec<MonitorHandle<T::Host>>, Error> {
    let displays = topology.logical_displays()?;
    if displays.is_empty() {
        return Err(Error::Enumeration("the OS reported no displays".into()))
    }

    let mut handles = Vec::new();
    let mut failures = Vec::new();
    for display in &displays {
        let monitors = match topology.physical_monitors(display) {
            Ok(monitors) => monitors,
            Err(e) => {
                warn!("skipping display {}: {}", display.device_name, e);
                failures.push(format!("{}: {}", display.device_name, e));
                continue
            },
        };

        for (index, monitor) in monitors.into_iter().enumerate() {
            let friendly_name = match (monitor.description.trim(), &display.description) {
                ("", Some(description)) => description.clone(),
                (name, _) => name.to_owned(),
            };
            let (device_path, synthetic_path) = match monitor.device_path {
                Some(path) if !path.is_empty() => (path, false),
                _ => {
                    let path = synthetic_device_path(&display.device_name, index, monitor.raw);
                    warn!("{}: no OS device path, using synthetic {}", friendly_name, path);
                    (path, true)
                },
            };

            handles.push(MonitorHandle::new(monitor.host, MonitorInfo {
                friendly_name,
                device_path,
                synthetic_path,
                is_primary: display.is_primary,
            }));
        }
    }

    if failures.len() == displays.len() {
        return Err(Error::Enumeration(failures.join("; ")))
    }

    info!("found {} monitor(s) on {} display(s)", handles.len(), displays.len());
    Ok(handles)
}

/// Pick the first handle matching `selector`, releasing all the others.
pub fn select<H: DdcHost>(handles: Vec<MonitorHandle<H>>, selector: &Selector) -> Result<MonitorHandle<H>, Error> {
    let mut found = None;
    for mut handle in handles {
        if found.is_none() && selector.matches(handle.info()) {
            found = Some(handle);
        } else if let Err(e) = handle.release() {
            warn!("failed to release monitor {}: {}", handle.info().device_path, e);
        }
    }

    found.ok_or_else(|| Error::NotFound(selector.to_string()))
}

/// Enumerate and return the monitor matching `selector`.
pub fn find<T: DisplayTopology>(topology: T, selector: &Selector) -> Result<MonitorHandle<T::Host>, Error> {
    select(enumerate(topology)?, selector)
}
