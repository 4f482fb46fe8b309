//! Attached device discovery via `adb devices -l`.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::locator::AdbLocator;
use super::oneshot::AdbCommand;
use crate::Result;

/// One row of `adb devices -l`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub serial: String,
    /// Connection state: `device`, `offline`, `unauthorized`, ...
    pub state: String,
    pub model: Option<String>,
    pub product: Option<String>,
    /// USB port as printed, including the `usb:` prefix.
    pub usb: Option<String>,
    pub transport_id: Option<String>,
    /// Display name: friendly name, model, or serial.
    pub name: String,
}

impl DeviceInfo {
    /// Whether the device is online and usable.
    pub fn is_online(&self) -> bool {
        self.state == "device"
    }
}

/// Parse `adb devices -l` output, skipping the header and daemon chatter.
pub fn parse_devices_output(text: &str) -> Vec<DeviceInfo> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| {
            !line.trim().is_empty()
                && !line.starts_with("List of devices")
                && !line.starts_with('*')
                && !line.starts_with("adb ")
        })
        .filter_map(parse_device_line)
        .collect()
}

fn parse_device_line(line: &str) -> Option<DeviceInfo> {
    let mut fields = line.split_whitespace();
    let serial = fields.next()?.to_string();
    let state = fields.next()?.to_string();

    let mut info = DeviceInfo {
        name: serial.clone(),
        serial,
        state,
        model: None,
        product: None,
        usb: None,
        transport_id: None,
    };

    for field in fields {
        if let Some(model) = field.strip_prefix("model:") {
            info.model = Some(model.to_string());
        } else if let Some(product) = field.strip_prefix("product:") {
            info.product = Some(product.to_string());
        } else if field.starts_with("usb:") {
            info.usb = Some(field.to_string());
        } else if let Some(id) = field.strip_prefix("transport_id:") {
            info.transport_id = Some(id.to_string());
        }
    }

    if let Some(model) = &info.model {
        info.name = model.clone();
    }
    Some(info)
}

/// Normalize `settings get global device_name` output; `null` means unset.
pub fn parse_friendly_name(text: &str) -> Option<String> {
    let name = text.trim();
    (!name.is_empty() && name != "null").then(|| name.to_string())
}

/// List online devices with their display names resolved.
pub async fn list_devices(locator: &AdbLocator, timeout: Duration) -> Result<Vec<DeviceInfo>> {
    let adb = locator.resolve().await?;
    let output = AdbCommand::new(adb)
        .args(["devices", "-l"])
        .timeout(timeout)
        .run()
        .await?;

    let mut devices: Vec<DeviceInfo> = parse_devices_output(&output.text)
        .into_iter()
        .filter(DeviceInfo::is_online)
        .collect();

    for device in &mut devices {
        let lookup = AdbCommand::new(adb)
            .serial(Some(&device.serial))
            .args(["shell", "settings", "get", "global", "device_name"])
            .timeout(timeout)
            .run()
            .await;
        match lookup {
            Ok(out) if out.success() => {
                if let Some(name) = parse_friendly_name(&out.text) {
                    device.name = name;
                }
            }
            Ok(out) => debug!(serial = %device.serial, "device_name lookup failed: {}", out.text),
            Err(e) => debug!(serial = %device.serial, "device_name lookup failed: {}", e),
        }
    }

    Ok(devices)
}
