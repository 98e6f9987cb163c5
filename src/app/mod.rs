// Application state management
//
// AppState is the single owner of the topology session. Capture events and
// finished label lookups arrive over channels and are applied on each tick,
// so every map mutation happens on the UI thread in arrival order.

pub mod config;
pub mod event;

pub use config::{MapSettings, RefreshConfig};

use crate::capture::{CaptureEvent, Collaborator};
use crate::error::CaptureError;
use crate::net::{Address, Device, Packet};
use crate::topology::{DomainCache, Topology};
use config::{PACKET_LOG_CAPACITY, TICK_INTERVAL_MS, TRAFFIC_HISTORY_LEN};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

type LabelResult = (Address, Option<String>);

/// Main application state
pub struct AppState {
    /// Whether the application is running
    pub running: bool,

    /// The map session
    pub topology: Topology,

    /// Devices reported by the collaborator, in its order
    pub devices: Vec<Device>,

    /// Whether a capture feed is running
    pub capturing: bool,

    /// Last capture or device error, shown in the status bar
    pub capture_error: Option<String>,

    /// Last informational message (feed ended, device switched)
    pub status_message: Option<String>,

    /// Recent packets, newest last
    pub packet_log: VecDeque<Packet>,

    /// Packets per tick, oldest first
    pub traffic_history: Vec<u64>,

    pub total_packets: u64,

    /// Packets rejected for a malformed endpoint
    pub dropped_packets: u64,

    /// Pulse phase for particle animation (0.0 ~ 1.0)
    pub pulse_phase: f32,

    pub refresh_config: RefreshConfig,

    pub map_settings: MapSettings,

    runtime: Handle,
    collaborator: Arc<dyn Collaborator>,
    events_tx: UnboundedSender<CaptureEvent>,
    events_rx: UnboundedReceiver<CaptureEvent>,
    labels_tx: UnboundedSender<LabelResult>,
    labels_rx: UnboundedReceiver<LabelResult>,
    packets_since_sample: u64,
    last_tick: Instant,
}

impl AppState {
    /// Create the app and load the device list
    pub fn new(runtime: Handle, collaborator: Arc<dyn Collaborator>, domains: Arc<DomainCache>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (labels_tx, labels_rx) = mpsc::unbounded_channel();

        let mut state = Self {
            running: true,
            topology: Topology::new(domains),
            devices: Vec::new(),
            capturing: false,
            capture_error: None,
            status_message: None,
            packet_log: VecDeque::with_capacity(PACKET_LOG_CAPACITY),
            traffic_history: vec![0; TRAFFIC_HISTORY_LEN],
            total_packets: 0,
            dropped_packets: 0,
            pulse_phase: 0.0,
            refresh_config: RefreshConfig::new(),
            map_settings: MapSettings::default(),
            runtime,
            collaborator,
            events_tx,
            events_rx,
            labels_tx,
            labels_rx,
            packets_since_sample: 0,
            last_tick: Instant::now(),
        };

        state.refresh_devices();
        state
    }

    // ========================================================================
    // Devices and capture
    // ========================================================================

    /// Re-query the collaborator's device list
    pub fn refresh_devices(&mut self) {
        match self.runtime.block_on(self.collaborator.get_devices()) {
            Ok(devices) => {
                debug!(count = devices.len(), "Device list refreshed");
                self.devices = devices;
            }
            Err(e) => {
                warn!(error = %e, "Failed to list devices");
                self.capture_error = Some(format!("Cannot list devices: {}", e));
            }
        }
    }

    pub fn current_device(&self) -> Option<&Device> {
        self.topology.device()
    }

    /// Make `name` the capture device; the map starts a new session
    ///
    /// An unknown name leaves the current device and capture untouched. A
    /// running capture is restarted on the new device.
    pub fn select_device(&mut self, name: &str) -> Result<(), CaptureError> {
        if !self.devices.iter().any(|d| d.name == name) {
            self.refresh_devices();
        }
        let Some(device) = self.devices.iter().find(|d| d.name == name).cloned() else {
            let e = CaptureError::DeviceNotFound(name.to_string());
            self.capture_error = Some(e.to_string());
            return Err(e);
        };

        let was_capturing = self.capturing;
        if was_capturing {
            self.stop_capture();
        }

        if let Err(e) = self.runtime.block_on(self.collaborator.set_capture_device(name)) {
            warn!(device = %name, error = %e, "Collaborator rejected device");
            if was_capturing {
                self.start_capture();
            }
            self.capture_error = Some(e.to_string());
            return Err(e);
        }

        info!(device = %device.name, addresses = %device.address_summary(), "Session reset for device");
        self.topology.set_device(Some(device));
        self.reset_events();
        self.capture_error = None;
        self.status_message = Some(format!("Device {}", name));

        if was_capturing {
            self.start_capture();
        }
        Ok(())
    }

    /// Swap in a fresh event channel so nothing queued by the previous
    /// session's feed reaches the new one
    fn reset_events(&mut self) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        self.events_tx = events_tx;
        self.events_rx = events_rx;
    }

    /// Cycle to the next device in the list
    pub fn next_device(&mut self) {
        if self.devices.is_empty() {
            self.refresh_devices();
        }
        if self.devices.is_empty() {
            self.capture_error = Some("No capture devices available".to_string());
            return;
        }

        let index = self
            .current_device()
            .and_then(|current| self.devices.iter().position(|d| d.name == current.name))
            .map_or(0, |i| (i + 1) % self.devices.len());
        let name = self.devices[index].name.clone();
        // errors are already recorded in capture_error
        let _ = self.select_device(&name);
    }

    pub fn start_capture(&mut self) {
        match self
            .runtime
            .block_on(self.collaborator.start_capture(self.events_tx.clone()))
        {
            Ok(()) => {
                self.capturing = true;
                self.capture_error = None;
                self.status_message = None;
            }
            Err(e) => {
                warn!(error = %e, "Capture could not start");
                self.capture_error = Some(e.to_string());
            }
        }
    }

    pub fn stop_capture(&mut self) {
        self.runtime.block_on(self.collaborator.stop_capture());
        self.capturing = false;
    }

    pub fn toggle_capture(&mut self) {
        if self.capturing {
            self.stop_capture();
        } else {
            self.start_capture();
        }
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Update state on each loop iteration
    pub fn on_tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Apply everything that arrived since the last tick, as of `now`
    pub fn tick_at(&mut self, now: Instant) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                CaptureEvent::NewPacket(packet) => self.handle_packet(packet, now),
                CaptureEvent::Stopped { reason } => {
                    info!(reason = %reason, "Capture feed ended");
                    self.capturing = false;
                    self.status_message = Some(format!("Capture stopped: {}", reason));
                }
            }
        }

        while let Ok((address, domain)) = self.labels_rx.try_recv() {
            self.topology.apply_label(&address, domain);
        }
        self.spawn_label_lookups();

        self.topology.expire_edges(now);

        if now.saturating_duration_since(self.last_tick).as_millis() >= TICK_INTERVAL_MS {
            self.last_tick = now;
            self.pulse_phase += 0.05;
            if self.pulse_phase >= 1.0 {
                self.pulse_phase = 0.0;
            }
            self.sample_traffic();
        }
    }

    fn handle_packet(&mut self, packet: Packet, now: Instant) {
        self.total_packets += 1;
        self.packets_since_sample += 1;

        if self.topology.render_packet(&packet, now).is_err() {
            self.dropped_packets += 1;
        }

        if self.packet_log.len() == PACKET_LOG_CAPACITY {
            self.packet_log.pop_front();
        }
        self.packet_log.push_back(packet);
    }

    fn sample_traffic(&mut self) {
        if self.traffic_history.len() >= TRAFFIC_HISTORY_LEN {
            self.traffic_history.remove(0);
        }
        self.traffic_history.push(self.packets_since_sample);
        self.packets_since_sample = 0;
    }

    /// Resolve queued label requests on the runtime; results come back
    /// through the label channel
    fn spawn_label_lookups(&mut self) {
        for address in self.topology.take_label_requests() {
            let domains = Arc::clone(self.topology.domains());
            let results = self.labels_tx.clone();
            self.runtime.spawn(async move {
                let domain = domains.get_domain(&address).await;
                let _ = results.send((address, domain));
            });
        }
    }

    // ========================================================================
    // Map controls
    // ========================================================================

    /// Toggle domain labels; redraws every node
    pub fn toggle_domain_labels(&mut self) {
        self.set_domain_labels(!self.map_settings.domain_labels_enabled);
    }

    pub fn set_domain_labels(&mut self, on: bool) {
        self.map_settings.domain_labels_enabled = on;
        self.topology.set_show_domains(on);
        self.spawn_label_lookups();
    }

    pub fn select_next_node(&mut self) {
        self.topology.select_next();
    }

    pub fn select_previous_node(&mut self) {
        self.topology.select_previous();
    }

    pub fn clear_map(&mut self) {
        self.topology.clear();
        self.status_message = Some("Map cleared".to_string());
    }

    /// Increase refresh rate (decrease interval, clamp to the minimum)
    pub fn increase_refresh_rate(&mut self) {
        let new_interval = self
            .refresh_config
            .refresh_ms
            .saturating_sub(config::REFRESH_STEP);
        self.refresh_config.refresh_ms = new_interval.max(config::MIN_REFRESH_MS);
        self.refresh_config.last_change = Some(Instant::now());
    }

    /// Decrease refresh rate (increase interval, clamp to the maximum)
    pub fn decrease_refresh_rate(&mut self) {
        let new_interval = self
            .refresh_config
            .refresh_ms
            .saturating_add(config::REFRESH_STEP);
        self.refresh_config.refresh_ms = new_interval.min(config::MAX_REFRESH_MS);
        self.refresh_config.last_change = Some(Instant::now());
    }
}
