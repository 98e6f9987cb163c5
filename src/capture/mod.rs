// Capture collaborator boundary
//
// The map never captures packets or resolves names itself. It talks to a
// collaborator through these traits: lifecycle commands, device enumeration,
// and name lookups. Captured packets come back on an event channel in the
// order the collaborator emits them.

mod devices;
mod hosts;
mod replay;
mod socket_table;

pub use devices::{host_devices, load_devices};
pub use hosts::{HostsTable, DEFAULT_HOSTS_PATH};
pub use replay::ReplayCapture;
pub use socket_table::SocketTableCapture;

use crate::error::CaptureError;
use crate::net::{Address, Device, Packet};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::info;

/// Events produced by a running capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    NewPacket(Packet),
    /// The feed ended on its own (end of replay, unreadable source)
    Stopped { reason: String },
}

pub type EventSender = UnboundedSender<CaptureEvent>;

/// Name lookups, used exclusively by the domain cache
#[async_trait]
pub trait DomainResolver: Send + Sync {
    async fn domain_to_ips(&self, domain: &str) -> Result<Vec<Address>, CaptureError>;
    async fn ip_to_domain(&self, address: &Address) -> Result<Option<String>, CaptureError>;
}

/// Capture lifecycle and device selection
#[async_trait]
pub trait Collaborator: DomainResolver {
    /// Start emitting events for the selected device
    async fn start_capture(&self, events: EventSender) -> Result<(), CaptureError>;

    /// Stop the running capture; a no-op when nothing runs
    async fn stop_capture(&self);

    /// Select the active device by name
    async fn set_capture_device(&self, name: &str) -> Result<(), CaptureError>;

    async fn get_devices(&self) -> Result<Vec<Device>, CaptureError>;
}

#[derive(Default)]
struct ControlState {
    device: Option<Device>,
    task: Option<JoinHandle<()>>,
}

/// Device selection and feed task bookkeeping shared by collaborators
#[derive(Default)]
pub struct CaptureControl {
    state: Mutex<ControlState>,
}

impl CaptureControl {
    /// Select `name` from `devices`; the previous selection stays on failure
    pub fn select_device(&self, name: &str, devices: &[Device]) -> Result<(), CaptureError> {
        let device = devices
            .iter()
            .find(|d| d.name == name)
            .cloned()
            .ok_or_else(|| CaptureError::DeviceNotFound(name.to_string()))?;

        info!(device = %device.name, "Capture device selected");
        self.lock().device = Some(device);
        Ok(())
    }

    pub fn selected_device(&self) -> Option<Device> {
        self.lock().device.clone()
    }

    pub fn is_running(&self) -> bool {
        self.lock().task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start a feed for the selected device unless one is already running
    pub fn begin<F>(&self, spawn_feed: F) -> Result<(), CaptureError>
    where
        F: FnOnce(Device) -> JoinHandle<()>,
    {
        let mut state = self.lock();
        if state.task.as_ref().is_some_and(|task| !task.is_finished()) {
            return Err(CaptureError::AlreadyRunning);
        }
        let device = state.device.clone().ok_or(CaptureError::NoDeviceSelected)?;

        info!(device = %device.name, "Capture started");
        state.task = Some(spawn_feed(device));
        Ok(())
    }

    pub fn stop(&self) {
        if let Some(task) = self.lock().task.take() {
            task.abort();
            info!("Capture stopped");
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{DeviceAddress, DeviceFlags};
    use std::time::Duration;

    fn devices() -> Vec<Device> {
        vec![Device {
            name: "eth0".to_string(),
            desc: None,
            addresses: vec![DeviceAddress::from_prefix("10.0.0.5".parse().unwrap(), 24)],
            flags: DeviceFlags::default(),
        }]
    }

    #[test]
    fn test_select_unknown_device_keeps_previous() {
        let control = CaptureControl::default();
        control.select_device("eth0", &devices()).unwrap();

        let err = control.select_device("wlan9", &devices()).unwrap_err();
        assert!(matches!(err, CaptureError::DeviceNotFound(name) if name == "wlan9"));
        assert_eq!(control.selected_device().map(|d| d.name), Some("eth0".to_string()));
    }

    #[tokio::test]
    async fn test_begin_requires_device() {
        let control = CaptureControl::default();
        let result = control.begin(|_| tokio::spawn(async {}));
        assert!(matches!(result, Err(CaptureError::NoDeviceSelected)));
    }

    #[tokio::test]
    async fn test_begin_twice_is_rejected_until_stopped() {
        let control = CaptureControl::default();
        control.select_device("eth0", &devices()).unwrap();

        let feed = |_: Device| tokio::spawn(tokio::time::sleep(Duration::from_secs(60)));
        control.begin(feed).unwrap();
        assert!(control.is_running());
        assert!(matches!(control.begin(feed), Err(CaptureError::AlreadyRunning)));

        control.stop();
        control.stop();
        assert!(!control.is_running());
        control.begin(feed).unwrap();
        control.stop();
    }
}
