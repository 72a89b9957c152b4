//! USB device lookup through `lsusb`

use super::command;
use super::error::{ToolError, ToolResult};
use super::DeviceLocator;
use async_trait::async_trait;
use regex::Regex;
use std::ffi::OsString;
use std::fmt;
use std::sync::OnceLock;

/// Bus/device pair as printed by `lsusb`, e.g. `001`/`005`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAddress {
    pub bus: String,
    pub device: String,
}

impl DeviceAddress {
    pub fn new(bus: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            bus: bus.into(),
            device: device.into(),
        }
    }

    /// SANE device name for a libusb-attached model
    pub fn sane_name(&self, model: &str) -> String {
        format!("{}:libusb:{}:{}", model, self.bus, self.device)
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bus {} device {}", self.bus, self.device)
    }
}

fn lsusb_line() -> &'static Regex {
    static LINE: OnceLock<Regex> = OnceLock::new();
    LINE.get_or_init(|| {
        Regex::new(r"^Bus (\d{3}) Device (\d{3}): ID [0-9a-fA-F]{4}:[0-9a-fA-F]{4}")
            .expect("lsusb line pattern is valid")
    })
}

/// Parse `lsusb -d <vendor>:` output into exactly one device address
pub fn parse_lsusb(vendor: &str, output: &str) -> ToolResult<DeviceAddress> {
    let mut matches = output.lines().filter_map(|line| {
        lsusb_line()
            .captures(line.trim())
            .map(|caps| DeviceAddress::new(&caps[1], &caps[2]))
    });

    let first = matches.next().ok_or_else(|| ToolError::NoDevice {
        vendor: vendor.to_string(),
    })?;
    let extra = matches.count();
    if extra > 0 {
        return Err(ToolError::AmbiguousDevice {
            vendor: vendor.to_string(),
            count: extra + 1,
        });
    }
    Ok(first)
}

/// Locates the scanner with `lsusb`
#[derive(Debug, Clone)]
pub struct LsusbLocator {
    program: String,
}

impl LsusbLocator {
    pub fn new() -> Self {
        Self {
            program: "lsusb".to_string(),
        }
    }
}

impl Default for LsusbLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceLocator for LsusbLocator {
    async fn locate(&self, vendor_id: &str) -> ToolResult<DeviceAddress> {
        let args = [OsString::from("-d"), OsString::from(format!("{}:", vendor_id))];
        // lsusb exits non-zero when nothing matches; the empty listing says the same
        let output = command::output(&self.program, &args).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let address = parse_lsusb(vendor_id, &stdout)?;
        log::info!("Found scanner for vendor {} at {}", vendor_id, address);
        Ok(address)
    }
}
