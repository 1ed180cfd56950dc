//! Talk to one i2c-dev bus directly, bypassing enumeration.
//!
//! `cargo run --example i2c --features i2c-linux -- /dev/i2c-4`

use std::env::args;
use ddc_monitor::{caps, from_i2c_device, DdcHost};
use ddc_monitor::vcp::codes;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = args().nth(1).ok_or_else(|| anyhow::anyhow!("argument: i2c device path"))?;
    let mut ddc = from_i2c_device(&path)?;

    let name = ddc.monitor_name()?;
    println!("{}: {}", path, name.as_deref().unwrap_or("unnamed"));

    let version = ddc.get_vcp_feature(codes::VCP_VERSION)?;
    println!("MCCS version is {:04x}", version.maximum);

    let input = ddc.get_vcp_feature(codes::INPUT_SOURCE)?;
    println!("input is {}", input);

    let raw = ddc.capabilities_string()?;
    let caps = caps::parse(&String::from_utf8_lossy(&raw))?;
    println!("capabilities: {}", caps);

    Ok(())
}
