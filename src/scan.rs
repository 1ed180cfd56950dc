//! Exhaustive probing of the VCP code space.
//!
//! A scan reads every code from 0x00 to 0xFF in ascending order, one
//! transaction at a time on the calling thread. Codes that are unsupported,
//! time out or come back garbled are left out of the report; only a fault
//! that invalidates the handle itself aborts the scan. To scan several
//! monitors quickly, run one scan per monitor in parallel with
//! [`scan_all`].

use std::{slice, thread, vec};
use log::{debug, info};
use serde::Serialize;
use crate::{DdcHost, Error, MonitorHandle, VcpCode, VcpValue};

/// The outcome of probing one code on one monitor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VcpQueryResult {
    /// The monitor answered with a value.
    Supported(VcpValue),
    /// The monitor flagged the code as not implemented.
    Unsupported,
    /// The monitor did not answer in time.
    Timeout(String),
    /// The reply could not be understood.
    ProtocolError(String),
}

impl VcpQueryResult {
    /// The value, if the code answered.
    pub fn value(&self) -> Option<VcpValue> {
        match *self {
            VcpQueryResult::Supported(value) => Some(value),
            _ => None,
        }
    }
}

/// Read one code, separating per-code outcomes from failures of the
/// handle itself.
///
/// Unsupported, timed out and malformed replies are `Ok`; a lost device or
/// a released handle is `Err`.
pub fn probe<H: DdcHost>(handle: &mut MonitorHandle<H>, code: VcpCode) -> Result<VcpQueryResult, Error> {
    match handle.get_vcp_feature(code) {
        Ok(value) => Ok(VcpQueryResult::Supported(value)),
        Err(Error::Unsupported(..)) => Ok(VcpQueryResult::Unsupported),
        Err(Error::Timeout { reason, .. }) => Ok(VcpQueryResult::Timeout(reason)),
        Err(Error::Protocol { code, .. }) => Ok(VcpQueryResult::ProtocolError(code.to_string())),
        Err(e) => Err(e),
    }
}

/// One supported code and the value it reported.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScanEntry {
    /// The VCP code.
    pub code: VcpCode,
    /// Its value at scan time.
    pub value: VcpValue,
}

/// Every code a monitor answered to, in ascending code order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    entries: Vec<ScanEntry>,
    complete: bool,
}

impl ScanReport {
    /// The supported codes and their values.
    pub fn entries(&self) -> &[ScanEntry] {
        &self.entries
    }

    /// The supported codes.
    pub fn codes(&self) -> Vec<VcpCode> {
        self.entries.iter().map(|e| e.code).collect()
    }

    /// The value reported for `code`, if it answered.
    pub fn get(&self, code: VcpCode) -> Option<VcpValue> {
        self.entries.binary_search_by_key(&code, |e| e.code)
            .ok()
            .map(|i| self.entries[i].value)
    }

    /// Number of supported codes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no code answered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// False when the scan was stopped before reaching 0xFF.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> slice::Iter<ScanEntry> {
        self.entries.iter()
    }
}

impl IntoIterator for ScanReport {
    type Item = ScanEntry;
    type IntoIter = vec::IntoIter<ScanEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ScanReport {
    type Item = &'a ScanEntry;
    type IntoIter = slice::Iter<'a, ScanEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Probe all 256 codes.
pub fn scan<H: DdcHost>(handle: &mut MonitorHandle<H>) -> Result<ScanReport, Error> {
    scan_with(handle, |_| true)
}

/// Probe all 256 codes, asking `keep_going` before each one.
///
/// When `keep_going` returns false the scan stops and returns what it has
/// so far, with [`ScanReport::is_complete`] false. A transaction that is
/// already on the bus is always allowed to finish.
pub fn scan_with<H, F>(handle: &mut MonitorHandle<H>, mut keep_going: F) -> Result<ScanReport, Error> where
    H: DdcHost,
    F: FnMut(VcpCode) -> bool,
{
    let mut report = ScanReport::default();

    for code in 0..=0xffu8 {
        if !keep_going(code) {
            info!("{}: scan stopped before VCP 0x{:02x}", handle.info().device_path, code);
            return Ok(report)
        }

        match probe(handle, code)? {
            VcpQueryResult::Supported(value) => report.entries.push(ScanEntry { code, value }),
            outcome => debug!("VCP 0x{:02x} skipped: {:?}", code, outcome),
        }
    }

    info!("{}: {} VCP codes answered", handle.info().device_path, report.len());
    report.complete = true;
    Ok(report)
}

/// Scan several monitors at once, one thread per monitor.
///
/// Results are in the same order as `handles`.
pub fn scan_all<H: DdcHost + Send>(handles: &mut [MonitorHandle<H>]) -> Vec<Result<ScanReport, Error>> {
    thread::scope(|s| {
        let scans: Vec<_> = handles.iter_mut()
            .map(|handle| s.spawn(move || scan(handle)))
            .collect();

        scans.into_iter()
            .map(|scan| scan.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    })
}
