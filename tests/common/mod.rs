#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use ddc_monitor::enumerate::{DiscoveredMonitor, DisplayTopology, LogicalDisplay};
use ddc_monitor::{DdcHost, Error, ErrorCode, Fault, MonitorHandle, MonitorInfo, VcpCode, VcpValue};

/// How a scripted monitor answers a get for one code.
#[derive(Clone, Debug)]
pub enum Reply {
    Value(VcpValue),
    Fault(Fault),
}

/// Counters shared between a [`MockHost`] and the test that built it.
#[derive(Debug, Default)]
pub struct Probe {
    pub releases: AtomicUsize,
    pub gets: AtomicUsize,
    pub get_order: Mutex<Vec<VcpCode>>,
    pub writes: Mutex<Vec<(VcpCode, u16)>>,
    pub saves: AtomicUsize,
    pub unplugged: AtomicBool,
}

impl Probe {
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<(VcpCode, u16)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn unplug(&self) {
        self.unplugged.store(true, Ordering::SeqCst)
    }
}

/// An in-memory monitor. Codes without a scripted reply answer as
/// unsupported.
#[derive(Debug, Default)]
pub struct MockHost {
    pub replies: BTreeMap<VcpCode, Reply>,
    pub capabilities: Vec<u8>,
    /// Unplug the monitor right before this code is read.
    pub unplug_at: Option<VcpCode>,
    pub release_fault: Option<Fault>,
    pub probe: Arc<Probe>,
}

impl MockHost {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn supporting(values: &[(VcpCode, u16, u16)]) -> Self {
        let mut host = MockHost::new();
        for &(code, current, maximum) in values {
            host.replies.insert(code, Reply::Value(VcpValue::new(current, maximum)));
        }
        host
    }

    pub fn reply(mut self, code: VcpCode, reply: Reply) -> Self {
        self.replies.insert(code, reply);
        self
    }

    pub fn probe(&self) -> Arc<Probe> {
        self.probe.clone()
    }

    fn check_plugged(&self) -> Result<(), Fault> {
        if self.probe.unplugged.load(Ordering::SeqCst) {
            Err(Fault::Disconnected("ENODEV".into()))
        } else {
            Ok(())
        }
    }
}

impl DdcHost for MockHost {
    fn get_vcp_feature(&mut self, code: VcpCode) -> Result<VcpValue, Fault> {
        self.probe.gets.fetch_add(1, Ordering::SeqCst);
        self.probe.get_order.lock().unwrap().push(code);
        if self.unplug_at == Some(code) {
            self.probe.unplug();
        }
        self.check_plugged()?;

        match self.replies.get(&code) {
            Some(Reply::Value(value)) => Ok(*value),
            Some(Reply::Fault(fault)) => Err(fault.clone()),
            None => Err(Fault::Reply(ErrorCode::UnsupportedVcp)),
        }
    }

    fn set_vcp_feature(&mut self, code: VcpCode, value: u16) -> Result<(), Fault> {
        self.check_plugged()?;
        match self.replies.get(&code) {
            Some(Reply::Fault(fault)) => Err(fault.clone()),
            _ => {
                self.probe.writes.lock().unwrap().push((code, value));
                Ok(())
            },
        }
    }

    fn capabilities_string(&mut self) -> Result<Vec<u8>, Fault> {
        self.check_plugged()?;
        Ok(self.capabilities.clone())
    }

    fn save_current_settings(&mut self) -> Result<(), Fault> {
        self.check_plugged()?;
        self.probe.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn release(&mut self) -> Result<(), Fault> {
        self.probe.releases.fetch_add(1, Ordering::SeqCst);
        match self.release_fault.take() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

pub fn info(name: &str) -> MonitorInfo {
    MonitorInfo {
        friendly_name: name.into(),
        device_path: format!("/dev/{}", name),
        synthetic_path: false,
        is_primary: false,
    }
}

pub fn handle(host: MockHost) -> MonitorHandle<MockHost> {
    MonitorHandle::new(host, info("mock"))
}

/// One scripted logical display.
pub struct MockDisplay {
    pub display: LogicalDisplay,
    pub monitors: Result<Vec<(String, Option<String>, MockHost)>, String>,
}

impl MockDisplay {
    pub fn new(name: &str, is_primary: bool) -> Self {
        MockDisplay {
            display: LogicalDisplay {
                device_name: name.into(),
                description: None,
                is_primary,
                raw: 0x1000,
            },
            monitors: Ok(Vec::new()),
        }
    }

    pub fn monitor(mut self, description: &str, device_path: Option<&str>, host: MockHost) -> Self {
        if let Ok(monitors) = &mut self.monitors {
            monitors.push((description.into(), device_path.map(Into::into), host));
        }
        self
    }

    pub fn broken(mut self, reason: &str) -> Self {
        self.monitors = Err(reason.into());
        self
    }
}

/// A scripted display topology.
#[derive(Default)]
pub struct MockTopology {
    pub displays: Vec<MockDisplay>,
    pub walk_error: Option<String>,
}

impl MockTopology {
    pub fn new(displays: Vec<MockDisplay>) -> Self {
        MockTopology {
            displays,
            walk_error: None,
        }
    }
}

impl DisplayTopology for MockTopology {
    type Host = MockHost;

    fn logical_displays(&mut self) -> Result<Vec<LogicalDisplay>, Error> {
        match &self.walk_error {
            Some(e) => Err(Error::Enumeration(e.clone())),
            None => Ok(self.displays.iter().map(|d| d.display.clone()).collect()),
        }
    }

    fn physical_monitors(&mut self, display: &LogicalDisplay) -> Result<Vec<DiscoveredMonitor<MockHost>>, Error> {
        let entry = self.displays.iter_mut()
            .find(|d| d.display.device_name == display.device_name)
            .ok_or_else(|| Error::Enumeration(format!("unknown display {}", display.device_name)))?;

        let monitors = match &mut entry.monitors {
            Ok(monitors) => monitors,
            Err(e) => return Err(Error::Enumeration(e.clone())),
        };

        Ok(monitors.drain(..).enumerate().map(|(i, (description, device_path, host))| DiscoveredMonitor {
            host,
            description,
            device_path,
            raw: 0xbeef + i,
        }).collect())
    }
}
