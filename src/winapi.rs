//! Monitor control through the Windows monitor configuration API (dxva2).

use std::{mem, ptr};
use log::{debug, warn};
use windows::core::{BOOL, PCWSTR};
use windows::Win32::Devices::Display::{
    CapabilitiesRequestAndCapabilitiesReply, DestroyPhysicalMonitor, GetCapabilitiesStringLength,
    GetNumberOfPhysicalMonitorsFromHMONITOR, GetPhysicalMonitorsFromHMONITOR,
    GetVCPFeatureAndVCPFeatureReply, SaveCurrentMonitorSettings, SetVCPFeature,
    MC_MOMENTARY, MC_VCP_CODE_TYPE, PHYSICAL_MONITOR,
};
use windows::Win32::Foundation::{GetLastError, HANDLE, LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayDevicesW, EnumDisplayMonitors, GetMonitorInfoW, DISPLAY_DEVICEW, HDC, HMONITOR,
    MONITORINFO, MONITORINFOEXW, MONITORINFOF_PRIMARY,
};
use crate::dxva2::{classify_hresult, classify_status};
use crate::enumerate::{decode_fixed_width, DiscoveredMonitor, DisplayTopology, LogicalDisplay};
use crate::{DdcHost, Error, Fault, VcpCode, VcpKind, VcpValue};

const EDD_GET_DEVICE_INTERFACE_NAME: u32 = 0x0000_0001;

fn last_error() -> Fault {
    classify_status(unsafe { GetLastError() }.0)
}

/// A physical monitor handle obtained from `GetPhysicalMonitorsFromHMONITOR`.
#[derive(Debug)]
pub struct Dxva2Monitor {
    handle: Option<HANDLE>,
}

// A physical monitor handle is not tied to the thread that opened it.
unsafe impl Send for Dxva2Monitor {}

impl Dxva2Monitor {
    /// Take ownership of a physical monitor handle.
    ///
    /// # Safety
    ///
    /// `handle` must be a live physical monitor handle owned by no one else.
    pub unsafe fn from_raw(handle: HANDLE) -> Self {
        Dxva2Monitor {
            handle: Some(handle),
        }
    }

    fn handle(&self) -> Result<HANDLE, Fault> {
        self.handle.ok_or_else(|| Fault::Disconnected("physical monitor handle destroyed".into()))
    }
}

impl DdcHost for Dxva2Monitor {
    fn get_vcp_feature(&mut self, code: VcpCode) -> Result<VcpValue, Fault> {
        let handle = self.handle()?;
        let mut kind = MC_VCP_CODE_TYPE::default();
        let mut current = 0u32;
        let mut maximum = 0u32;
        let ok = unsafe {
            GetVCPFeatureAndVCPFeatureReply(handle, code, Some(&mut kind as *mut _), Some(&mut current as *mut _), Some(&mut maximum as *mut _))
        };
        if ok == 0 {
            return Err(last_error())
        }

        Ok(VcpValue {
            kind: if kind == MC_MOMENTARY { VcpKind::Momentary } else { VcpKind::SetParameter },
            current: current as u16,
            maximum: maximum as u16,
        })
    }

    fn set_vcp_feature(&mut self, code: VcpCode, value: u16) -> Result<(), Fault> {
        let handle = self.handle()?;
        if unsafe { SetVCPFeature(handle, code, value as u32) } == 0 {
            return Err(last_error())
        }
        Ok(())
    }

    fn capabilities_string(&mut self) -> Result<Vec<u8>, Fault> {
        let handle = self.handle()?;
        let mut len = 0u32;
        if unsafe { GetCapabilitiesStringLength(handle, &mut len) } == 0 {
            return Err(last_error())
        }

        let mut buffer = vec![0u8; len as usize];
        if unsafe { CapabilitiesRequestAndCapabilitiesReply(handle, &mut buffer) } == 0 {
            return Err(last_error())
        }
        Ok(buffer)
    }

    fn save_current_settings(&mut self) -> Result<(), Fault> {
        let handle = self.handle()?;
        if unsafe { SaveCurrentMonitorSettings(handle) } == 0 {
            return Err(last_error())
        }
        Ok(())
    }

    fn release(&mut self) -> Result<(), Fault> {
        match self.handle.take() {
            Some(handle) => unsafe { DestroyPhysicalMonitor(handle) }
                .map_err(|e| classify_hresult(e.code().0)),
            None => Ok(()),
        }
    }
}

impl Drop for Dxva2Monitor {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("DestroyPhysicalMonitor failed: {}", e);
        }
    }
}

unsafe extern "system" fn collect_hmonitor(hmonitor: HMONITOR, _hdc: HDC, _rect: *mut RECT, data: LPARAM) -> BOOL {
    let monitors = unsafe { &mut *(data.0 as *mut Vec<HMONITOR>) };
    monitors.push(hmonitor);
    BOOL(1)
}

/// Interface path of the `index`th monitor attached to `device_name`.
fn monitor_interface_path(device_name: &[u16], index: u32) -> Option<String> {
    let mut device = DISPLAY_DEVICEW {
        cb: mem::size_of::<DISPLAY_DEVICEW>() as u32,
        ..Default::default()
    };
    let found = unsafe {
        EnumDisplayDevicesW(PCWSTR(device_name.as_ptr()), index, &mut device, EDD_GET_DEVICE_INTERFACE_NAME)
    };
    if !found.as_bool() {
        return None
    }

    Some(decode_fixed_width(&device.DeviceID)).filter(|path| !path.is_empty())
}

/// The desktop's `HMONITOR`s and the physical monitors behind them.
#[derive(Debug, Default)]
pub struct Dxva2Topology {
    _private: (),
}

impl Dxva2Topology {
    /// A topology walker for the current session.
    pub fn new() -> Self {
        Default::default()
    }
}

impl DisplayTopology for Dxva2Topology {
    type Host = Dxva2Monitor;

    fn logical_displays(&mut self) -> Result<Vec<LogicalDisplay>, Error> {
        let mut hmonitors: Vec<HMONITOR> = Vec::new();
        let ok = unsafe {
            EnumDisplayMonitors(None, None, Some(collect_hmonitor), LPARAM(ptr::addr_of_mut!(hmonitors) as isize))
        };
        if !ok.as_bool() {
            return Err(Error::Enumeration(format!("EnumDisplayMonitors failed: {}", last_error())))
        }

        let mut displays = Vec::with_capacity(hmonitors.len());
        for hmonitor in hmonitors {
            let mut info = MONITORINFOEXW::default();
            info.monitorInfo.cbSize = mem::size_of::<MONITORINFOEXW>() as u32;
            if !unsafe { GetMonitorInfoW(hmonitor, &mut info as *mut MONITORINFOEXW as *mut MONITORINFO) }.as_bool() {
                return Err(Error::Enumeration(format!("GetMonitorInfoW failed: {}", last_error())))
            }

            displays.push(LogicalDisplay {
                device_name: decode_fixed_width(&info.szDevice),
                description: None,
                is_primary: info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0,
                raw: hmonitor.0 as usize,
            });
        }

        Ok(displays)
    }

    fn physical_monitors(&mut self, display: &LogicalDisplay) -> Result<Vec<DiscoveredMonitor<Dxva2Monitor>>, Error> {
        let hmonitor = HMONITOR(display.raw as *mut _);
        let failed = |call: &str, e: windows::core::Error| Error::Enumeration(format!("{} failed for {}: {}", call, display.device_name, e));

        let mut count = 0u32;
        unsafe { GetNumberOfPhysicalMonitorsFromHMONITOR(hmonitor, &mut count) }
            .map_err(|e| failed("GetNumberOfPhysicalMonitorsFromHMONITOR", e))?;
        debug!("{}: {} physical monitor(s)", display.device_name, count);
        if count == 0 {
            return Ok(Vec::new())
        }

        let mut physical = vec![PHYSICAL_MONITOR::default(); count as usize];
        unsafe { GetPhysicalMonitorsFromHMONITOR(hmonitor, &mut physical) }
            .map_err(|e| failed("GetPhysicalMonitorsFromHMONITOR", e))?;

        let device_name: Vec<u16> = display.device_name.encode_utf16().chain(Some(0)).collect();
        Ok(physical.iter().enumerate().map(|(index, monitor)| DiscoveredMonitor {
            host: unsafe { Dxva2Monitor::from_raw(monitor.hPhysicalMonitor) },
            description: decode_fixed_width(&monitor.szPhysicalMonitorDescription),
            device_path: monitor_interface_path(&device_name, index as u32),
            raw: monitor.hPhysicalMonitor.0 as usize,
        }).collect())
    }
}
