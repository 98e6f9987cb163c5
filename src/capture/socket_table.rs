// Live collaborator backed by the kernel socket table
//
// Without raw capture privileges the best live signal available is the set of
// established TCP connections. Each poll turns every connection whose local
// end belongs to the selected device into one packet. Direction alternates
// between polls so both ends of a conversation show up as senders.

use super::{CaptureControl, CaptureEvent, Collaborator, DomainResolver, EventSender, HostsTable};
use crate::capture::host_devices;
use crate::error::CaptureError;
use crate::net::sockets::{read_socket_table, SocketEntry, SocketState};
use crate::net::{Address, Device, Packet};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct SocketTableCapture {
    control: CaptureControl,
    hosts: Arc<HostsTable>,
    poll_interval: Duration,
}

impl SocketTableCapture {
    pub fn new(hosts: HostsTable, poll_interval: Duration) -> Self {
        Self {
            control: CaptureControl::default(),
            hosts: Arc::new(hosts),
            poll_interval,
        }
    }
}

#[async_trait]
impl DomainResolver for SocketTableCapture {
    async fn domain_to_ips(&self, domain: &str) -> Result<Vec<Address>, CaptureError> {
        Ok(self.hosts.addresses_of(domain))
    }

    async fn ip_to_domain(&self, address: &Address) -> Result<Option<String>, CaptureError> {
        Ok(self.hosts.domain_of(address))
    }
}

#[async_trait]
impl Collaborator for SocketTableCapture {
    async fn start_capture(&self, events: EventSender) -> Result<(), CaptureError> {
        if !cfg!(target_os = "linux") {
            return Err(CaptureError::Unavailable(
                "socket table capture needs /proc/net (Linux only)".to_string(),
            ));
        }
        let every = self.poll_interval;
        self.control
            .begin(|device| tokio::spawn(poll_sockets(device, every, events)))
    }

    async fn stop_capture(&self) {
        self.control.stop();
    }

    async fn set_capture_device(&self, name: &str) -> Result<(), CaptureError> {
        let devices = self.get_devices().await?;
        self.control.select_device(name, &devices)
    }

    async fn get_devices(&self) -> Result<Vec<Device>, CaptureError> {
        tokio::task::spawn_blocking(host_devices)
            .await
            .map_err(|e| CaptureError::Unavailable(e.to_string()))
    }
}

async fn poll_sockets(device: Device, every: Duration, events: EventSender) {
    let mut ticker = tokio::time::interval(every);
    let mut outbound = true;

    loop {
        ticker.tick().await;

        let table = match tokio::task::spawn_blocking(read_socket_table).await {
            Ok(Ok(table)) => table,
            Ok(Err(e)) => {
                warn!(error = %e, "Socket table unreadable, stopping capture");
                let _ = events.send(CaptureEvent::Stopped {
                    reason: e.to_string(),
                });
                return;
            }
            Err(e) => {
                warn!(error = %e, "Socket table task failed, stopping capture");
                let _ = events.send(CaptureEvent::Stopped {
                    reason: e.to_string(),
                });
                return;
            }
        };

        for packet in socket_packets(&table, &device, outbound) {
            if events.send(CaptureEvent::NewPacket(packet)).is_err() {
                debug!("Event receiver dropped, ending socket poll");
                return;
            }
        }
        outbound = !outbound;
    }
}

/// One packet per distinct established conversation on `device`
fn socket_packets(entries: &[SocketEntry], device: &Device, outbound: bool) -> Vec<Packet> {
    let pairs: BTreeSet<(Address, Address)> = entries
        .iter()
        .filter(|e| e.state == SocketState::Established && device.has_address(&e.local))
        .map(|e| (e.local, e.remote))
        .collect();

    pairs
        .into_iter()
        .map(|(local, remote)| {
            if outbound {
                Packet::now(local.to_string(), remote.to_string())
            } else {
                Packet::now(remote.to_string(), local.to_string())
            }
        })
        .collect()
}
