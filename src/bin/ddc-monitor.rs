use std::process::ExitCode;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, LevelFilter};
use serde::Serialize;
use ddc_monitor::{scan, system, vcp, Selector, VcpCode, VcpValue};
use ddc_monitor::system::SystemMonitor;

#[derive(Parser, Debug)]
#[command(name = "ddc-monitor", version, about = "Query and control monitors over DDC/CI")]
struct Cli {
    /// Log every DDC/CI transaction
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print results
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct Target {
    /// Use the primary monitor (the default)
    #[arg(short, long, conflicts_with_all = ["device", "name"])]
    primary: bool,

    /// Select a monitor by device path
    #[arg(short, long, conflicts_with = "name")]
    device: Option<String>,

    /// Select a monitor by friendly name
    #[arg(short, long)]
    name: Option<String>,
}

impl Target {
    fn selector(&self) -> Selector {
        match (&self.device, &self.name) {
            (Some(device), _) => Selector::DevicePath(device.clone()),
            (None, Some(name)) => Selector::FriendlyName(name.clone()),
            (None, None) => Selector::Primary,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List attached monitors
    List {
        #[arg(short, long)]
        json: bool,
    },
    /// Read a VCP feature
    GetVcp {
        #[command(flatten)]
        target: Target,
        /// VCP code, hex with 0x prefix or decimal
        #[arg(value_parser = parse_code)]
        code: VcpCode,
        #[arg(short, long)]
        json: bool,
    },
    /// Write a VCP feature
    SetVcp {
        #[command(flatten)]
        target: Target,
        #[arg(value_parser = parse_code)]
        code: VcpCode,
        #[arg(value_parser = parse_value)]
        value: u16,
    },
    /// Read every VCP code the monitor answers to
    ScanVcp {
        #[command(flatten)]
        target: Target,
        #[arg(short, long)]
        json: bool,
    },
    /// Print the capabilities string
    Capabilities {
        #[command(flatten)]
        target: Target,
        /// Print the supported codes instead of the raw string
        #[arg(long)]
        parsed: bool,
        #[arg(short, long)]
        json: bool,
    },
    /// List the known VCP codes
    ListVcp {
        #[arg(short, long)]
        json: bool,
    },
    /// Read the brightness
    GetBrightness {
        #[command(flatten)]
        target: Target,
        #[arg(short, long)]
        json: bool,
    },
    /// Write the brightness
    SetBrightness {
        #[command(flatten)]
        target: Target,
        #[arg(value_parser = parse_value)]
        value: u16,
    },
    /// Read the contrast
    GetContrast {
        #[command(flatten)]
        target: Target,
        #[arg(short, long)]
        json: bool,
    },
    /// Write the contrast
    SetContrast {
        #[command(flatten)]
        target: Target,
        #[arg(value_parser = parse_value)]
        value: u16,
    },
    /// Make the monitor store its current settings
    SaveSettings {
        #[command(flatten)]
        target: Target,
    },
    /// Restore factory defaults
    ResetDefaults {
        #[command(flatten)]
        target: Target,
        /// Only restore color settings
        #[arg(long)]
        color_only: bool,
    },
}

fn parse_number(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("{:?}: {}", s, e))
}

fn parse_code(s: &str) -> Result<VcpCode, String> {
    let n = parse_number(s)?;
    VcpCode::try_from(n).map_err(|_| format!("VCP code {} is out of range", s))
}

fn parse_value(s: &str) -> Result<u16, String> {
    let n = parse_number(s)?;
    u16::try_from(n).map_err(|_| format!("value {} is out of range", s))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct Reading {
    code: VcpCode,
    name: &'static str,
    #[serde(flatten)]
    value: VcpValue,
}

fn print_reading(code: VcpCode, value: VcpValue, json: bool) -> Result<()> {
    if json {
        print_json(&Reading { code, name: vcp::name(code), value })
    } else {
        println!("0x{:02X} {}: {}", code, vcp::name(code), value);
        Ok(())
    }
}

fn open(target: &Target) -> Result<SystemMonitor> {
    let selector = target.selector();
    let monitor = system::find(&selector)?;
    info!("using {} ({})", monitor.info().friendly_name, monitor.info().device_path);
    Ok(monitor)
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::List { json } => {
            let monitors = system::enumerate()?;
            let infos: Vec<_> = monitors.iter().map(|m| m.info()).collect();
            if json {
                return print_json(&infos)
            }
            for (i, info) in infos.iter().enumerate() {
                println!("{}: {}{}", i, info.friendly_name, if info.is_primary { " (primary)" } else { "" });
                println!("   {}{}", info.device_path, if info.synthetic_path { " (synthetic)" } else { "" });
            }
        },
        Command::GetVcp { target, code, json } => {
            let value = open(&target)?.get_vcp_feature(code)?;
            print_reading(code, value, json)?;
        },
        Command::SetVcp { target, code, value } => {
            open(&target)?.set_vcp_feature(code, value)?;
            info!("VCP 0x{:02X} set to {}", code, value);
        },
        Command::ScanVcp { target, json } => {
            let report = scan::scan(&mut open(&target)?)?;
            if json {
                return print_json(&report)
            }
            for entry in &report {
                println!("0x{:02X} {}: {}", entry.code, vcp::name(entry.code), entry.value);
            }
            info!("{} supported codes", report.len());
        },
        Command::Capabilities { target, parsed, json } => {
            let mut monitor = open(&target)?;
            if !parsed && !json {
                println!("{}", monitor.capabilities_string()?);
                return Ok(())
            }
            let caps = monitor.capabilities()?;
            if json {
                return print_json(&caps.features())
            }
            for (code, values) in caps.features() {
                match values {
                    Some(values) => {
                        let values: Vec<_> = values.iter().map(|v| format!("{:02X}", v)).collect();
                        println!("0x{:02X} {}: {}", code, vcp::name(code), values.join(" "));
                    },
                    None => println!("0x{:02X} {}", code, vcp::name(code)),
                }
            }
        },
        Command::ListVcp { json } => {
            let known: Vec<_> = vcp::known_codes().collect();
            if json {
                return print_json(&known)
            }
            for info in known {
                println!("{}: {}", info, info.description);
            }
        },
        Command::GetBrightness { target, json } => {
            let value = open(&target)?.brightness()?;
            print_reading(vcp::codes::BRIGHTNESS, value, json)?;
        },
        Command::SetBrightness { target, value } => {
            open(&target)?.set_brightness(value)?;
        },
        Command::GetContrast { target, json } => {
            let value = open(&target)?.contrast()?;
            print_reading(vcp::codes::CONTRAST, value, json)?;
        },
        Command::SetContrast { target, value } => {
            open(&target)?.set_contrast(value)?;
        },
        Command::SaveSettings { target } => {
            open(&target)?.save_current_settings()?;
        },
        Command::ResetDefaults { target, color_only } => {
            let mut monitor = open(&target)?;
            if color_only {
                monitor.restore_factory_color_defaults()?;
            } else {
                monitor.restore_factory_defaults()?;
            }
        },
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match (cli.verbose, cli.quiet) {
        (true, _) => LevelFilter::Debug,
        (false, true) => LevelFilter::Error,
        (false, false) => LevelFilter::Warn,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(cli.command).context("ddc-monitor failed") {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_codes() {
        assert_eq!(parse_code("0x10"), Ok(0x10));
        assert_eq!(parse_code("0XD6"), Ok(0xd6));
        assert_eq!(parse_code("16"), Ok(16));
        assert!(parse_code("0x100").is_err());
        assert!(parse_code("brightness").is_err());
        assert_eq!(parse_value("0xffff"), Ok(0xffff));
        assert!(parse_value("65536").is_err());
    }

    #[test]
    fn selects_target() {
        let cli = Cli::try_parse_from(["ddc-monitor", "get-vcp", "--name", "DELL U2415", "0x10"]).unwrap();
        match cli.command {
            Command::GetVcp { target, code, .. } => {
                assert_eq!(code, 0x10);
                assert_eq!(target.selector(), Selector::FriendlyName("DELL U2415".into()));
            },
            c => panic!("unexpected {:?}", c),
        }
        assert_eq!(Target::default().selector(), Selector::Primary);
        assert!(Cli::try_parse_from(["ddc-monitor", "get-brightness", "-p", "-d", "x"]).is_err());
    }
}
