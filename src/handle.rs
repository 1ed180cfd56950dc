use std::fmt;
use log::warn;
use serde::Serialize;
use crate::channel::{classify, Request};
use crate::{DdcHost, Error};

/// Metadata cached for a physical monitor at enumeration time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MonitorInfo {
    /// Hardware description reported for the monitor.
    pub friendly_name: String,
    /// OS device path of the monitor.
    ///
    /// When the OS cannot provide one this is a synthetic identifier derived
    /// from the native handle (see `synthetic_path`). Synthetic paths are
    /// best-effort: they are stable within a session, but not guaranteed
    /// unique across boots.
    pub device_path: String,
    /// Whether `device_path` was synthesized rather than reported by the OS.
    pub synthetic_path: bool,
    /// Whether the monitor shows the primary desktop.
    pub is_primary: bool,
}

/// Exclusive owner of one physical monitor's OS handle.
///
/// The handle is released exactly once: either by an explicit
/// [`release`](MonitorHandle::release) or when the value is dropped,
/// including during unwinding. Every operation after release fails with
/// [`Error::UseAfterRelease`]. Operations take `&mut self`, so a handle can
/// only carry one transaction at a time; distinct handles are independent
/// and may be driven from separate threads.
pub struct MonitorHandle<H: DdcHost> {
    host: Option<H>,
    info: MonitorInfo,
}

impl<H: DdcHost> MonitorHandle<H> {
    /// Take ownership of an open host.
    pub fn new(host: H, info: MonitorInfo) -> Self {
        MonitorHandle {
            host: Some(host),
            info,
        }
    }

    /// Metadata captured at enumeration.
    pub fn info(&self) -> &MonitorInfo {
        &self.info
    }

    /// Whether [`release`](MonitorHandle::release) has already run.
    pub fn is_released(&self) -> bool {
        self.host.is_none()
    }

    /// Release the OS handle.
    ///
    /// The first call hands the handle back to the OS; the handle counts as
    /// released even if the OS reports a failure. Later calls do nothing.
    pub fn release(&mut self) -> Result<(), Error> {
        match self.host.take() {
            Some(mut host) => host.release().map_err(|fault| classify(Request::Release, fault)),
            None => Ok(()),
        }
    }

    /// Borrow the live host, failing closed once released.
    pub(crate) fn host_mut(&mut self) -> Result<&mut H, Error> {
        self.host.as_mut().ok_or(Error::UseAfterRelease)
    }

    /// Erase the host type, moving ownership of the OS handle into the
    /// returned value.
    pub fn boxed(mut self) -> MonitorHandle<Box<dyn DdcHost + Send>> where
        H: Send + 'static,
    {
        let info = self.info.clone();
        match self.host.take() {
            Some(host) => MonitorHandle::new(Box::new(host), info),
            None => MonitorHandle {
                host: None,
                info,
            },
        }
    }
}

impl<H: DdcHost> Drop for MonitorHandle<H> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("failed to release monitor {}: {}", self.info.device_path, e);
        }
    }
}

impl<H: DdcHost> fmt::Debug for MonitorHandle<H> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("info", &self.info)
            .field("released", &self.is_released())
            .finish()
    }
}
