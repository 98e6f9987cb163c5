// Application configuration types
//
// This module contains constants and settings structs for:
// - Map display toggles
// - Refresh intervals
// - Packet log and traffic history sizing

use std::time::{Duration, Instant};

// ============================================================================
// Constants
// ============================================================================

/// Minimum refresh interval in milliseconds
pub const MIN_REFRESH_MS: u64 = 50;

/// Maximum refresh interval in milliseconds
pub const MAX_REFRESH_MS: u64 = 2000;

/// Refresh interval adjustment step in milliseconds
pub const REFRESH_STEP: u64 = 50;

/// Duration to highlight recently changed refresh intervals
pub const CHANGE_HIGHLIGHT_DURATION: Duration = Duration::from_millis(500);

/// Tick interval for pulse animation and traffic sampling (100ms)
pub const TICK_INTERVAL_MS: u128 = 100;

/// Packets kept in the packet log, newest last
pub const PACKET_LOG_CAPACITY: usize = 200;

/// Samples kept for the traffic sparkline
pub const TRAFFIC_HISTORY_LEN: usize = 60;

/// Socket table poll interval for live capture
pub const DEFAULT_POLL_MS: u64 = 1000;

/// Delay between packets when replaying a recording
pub const DEFAULT_REPLAY_INTERVAL_MS: u64 = 250;

// ============================================================================
// Configuration Structs
// ============================================================================

/// Visual settings for the network map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSettings {
    /// Show resolved domain labels (toggle with 'n'); changing it redraws every node
    pub domain_labels_enabled: bool,

    /// Show address text next to nodes (toggle with 't')
    pub address_labels_enabled: bool,

    /// Animate particles along edges (toggle with 'a')
    pub animations_enabled: bool,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            domain_labels_enabled: false,
            address_labels_enabled: true,
            animations_enabled: true,
        }
    }
}

/// Configuration for the UI refresh interval
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Refresh interval in milliseconds
    pub refresh_ms: u64,

    /// Timestamp of last interval change (for visual feedback)
    pub last_change: Option<Instant>,
}

impl RefreshConfig {
    pub fn new() -> Self {
        Self {
            refresh_ms: 200,
            last_change: None,
        }
    }

    pub fn ui_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    /// Whether the interval changed recently enough to highlight it
    pub fn recently_changed(&self, now: Instant) -> bool {
        self.last_change
            .is_some_and(|t| now.duration_since(t) < CHANGE_HIGHLIGHT_DURATION)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self::new()
    }
}
