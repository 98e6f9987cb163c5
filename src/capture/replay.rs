// Replay collaborator
//
// Feeds a recorded session back to the map. One packet per line, either as a
// JSON object `{"src": "...", "dst": "...", "timestamp": ms}` or as two
// whitespace separated addresses. Blank lines and `#` comments are skipped.

use super::{CaptureControl, CaptureEvent, Collaborator, DomainResolver, EventSender, HostsTable};
use crate::error::CaptureError;
use crate::net::{Address, Device, Packet};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct ReplayCapture {
    control: CaptureControl,
    path: PathBuf,
    interval: Duration,
    devices: Vec<Device>,
    hosts: Arc<HostsTable>,
}

impl ReplayCapture {
    pub fn new(path: PathBuf, interval: Duration, devices: Vec<Device>, hosts: HostsTable) -> Self {
        Self {
            control: CaptureControl::default(),
            path,
            interval,
            devices,
            hosts: Arc::new(hosts),
        }
    }
}

#[async_trait]
impl DomainResolver for ReplayCapture {
    async fn domain_to_ips(&self, domain: &str) -> Result<Vec<Address>, CaptureError> {
        Ok(self.hosts.addresses_of(domain))
    }

    async fn ip_to_domain(&self, address: &Address) -> Result<Option<String>, CaptureError> {
        Ok(self.hosts.domain_of(address))
    }
}

#[async_trait]
impl Collaborator for ReplayCapture {
    async fn start_capture(&self, events: EventSender) -> Result<(), CaptureError> {
        let path = self.path.clone();
        let every = self.interval;
        self.control
            .begin(|_| tokio::spawn(replay_file(path, every, events)))
    }

    async fn stop_capture(&self) {
        self.control.stop();
    }

    async fn set_capture_device(&self, name: &str) -> Result<(), CaptureError> {
        self.control.select_device(name, &self.devices)
    }

    async fn get_devices(&self) -> Result<Vec<Device>, CaptureError> {
        Ok(self.devices.clone())
    }
}

async fn replay_file(path: PathBuf, every: Duration, events: EventSender) {
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Cannot read replay file");
            let _ = events.send(CaptureEvent::Stopped {
                reason: format!("cannot read {}: {}", path.display(), e),
            });
            return;
        }
    };

    let mut sent = 0usize;
    for (index, line) in content.lines().enumerate() {
        match parse_replay_line(line) {
            Ok(Some(packet)) => {
                if events.send(CaptureEvent::NewPacket(packet)).is_err() {
                    debug!("Event receiver dropped, ending replay");
                    return;
                }
                sent += 1;
                if !every.is_zero() {
                    tokio::time::sleep(every).await;
                }
            }
            Ok(None) => {}
            Err(e) => warn!(line = index + 1, error = %e, "Skipping malformed replay line"),
        }
    }

    info!(packets = sent, "Replay finished");
    let _ = events.send(CaptureEvent::Stopped {
        reason: "end of replay".to_string(),
    });
}

/// Parse one replay line; `Ok(None)` for blank lines and comments
pub fn parse_replay_line(line: &str) -> Result<Option<Packet>, CaptureError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    if line.starts_with('{') {
        return Ok(Some(serde_json::from_str(line)?));
    }

    let mut fields = line.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(src), Some(dst), None) => Ok(Some(Packet::now(src, dst))),
        _ => Err(CaptureError::Parse(format!("expected `src dst`, got {line:?}"))),
    }
}
