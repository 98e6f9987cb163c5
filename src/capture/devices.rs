// Device enumeration
//
// Host interfaces come from sysinfo; a JSON device list can stand in for them
// when replaying a recorded session.

use crate::error::CaptureError;
use crate::net::{Device, DeviceAddress, DeviceFlags, IfFlags};
use std::path::Path;
use sysinfo::Networks;
use tracing::debug;

/// Interfaces of the running host, sorted by name
pub fn host_devices() -> Vec<Device> {
    let networks = Networks::new_with_refreshed_list();

    let mut devices: Vec<Device> = networks
        .list()
        .iter()
        .map(|(name, data)| {
            let addresses: Vec<DeviceAddress> = data
                .ip_networks()
                .iter()
                .map(|net| DeviceAddress::from_prefix(net.addr, net.prefix))
                .collect();

            let loopback = !addresses.is_empty() && addresses.iter().all(|a| a.addr.is_loopback());
            let up = !addresses.is_empty();
            let running = data.total_received() > 0 || data.total_transmitted() > 0;

            Device {
                name: name.clone(),
                desc: None,
                flags: DeviceFlags {
                    connection_status: up && running,
                    if_flags: IfFlags {
                        loopback,
                        up,
                        running,
                        wireless: is_wireless_name(name),
                    },
                },
                addresses,
            }
        })
        .collect();

    devices.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(count = devices.len(), "Enumerated host devices");
    devices
}

/// Read a JSON array of devices
pub fn load_devices(path: &Path) -> Result<Vec<Device>, CaptureError> {
    let content = std::fs::read_to_string(path)?;
    let devices: Vec<Device> = serde_json::from_str(&content)?;
    Ok(devices)
}

fn is_wireless_name(name: &str) -> bool {
    name.starts_with("wl") || name.starts_with("wifi")
}
