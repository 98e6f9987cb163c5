// Observed transmissions and the hops derived from them

use super::Address;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// An observed transmission as emitted by a capture collaborator
///
/// Endpoints stay as raw text until the topology validates them, so a
/// malformed address only ever drops the one packet that carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    pub src: String,
    pub dst: String,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: u64,
}

impl Packet {
    /// Packet stamped with the current wall-clock time
    pub fn now(src: impl Into<String>, dst: impl Into<String>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Packet {
            src: src.into(),
            dst: dst.into(),
            timestamp,
        }
    }

    /// One-line summary for the packet log
    pub fn summary(&self) -> String {
        format!("{} → {}", self.src, self.dst)
    }
}

/// A rendering request: one source → destination edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hop {
    pub from: Address,
    pub to: Address,
    /// Hosts between the endpoints are not known (capture never sees routers)
    pub has_unknown_intermediates: bool,
    pub is_broadcast: bool,
    pub is_multicast: bool,
}

impl Hop {
    /// Classification tags in a stable order
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags = Vec::with_capacity(3);
        if self.has_unknown_intermediates {
            tags.push("unknown-intermediates");
        }
        if self.is_broadcast {
            tags.push("broadcast");
        }
        if self.is_multicast {
            tags.push("multicast");
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_json_shape() {
        let packet: Packet =
            serde_json::from_str(r#"{"src": "10.0.0.5", "dst": "10.0.0.255", "timestamp": 1700000000000}"#)
                .unwrap();
        assert_eq!(packet.src, "10.0.0.5");
        assert_eq!(packet.dst, "10.0.0.255");
        assert_eq!(packet.timestamp, 1_700_000_000_000);

        let untimed: Packet = serde_json::from_str(r#"{"src": "a", "dst": "b"}"#).unwrap();
        assert_eq!(untimed.timestamp, 0);
    }

    #[test]
    fn test_hop_tags() {
        let hop = Hop {
            from: Address::parse("10.0.0.1").unwrap(),
            to: Address::parse("224.0.0.251").unwrap(),
            has_unknown_intermediates: true,
            is_broadcast: false,
            is_multicast: true,
        };
        assert_eq!(hop.tags(), vec!["unknown-intermediates", "multicast"]);
    }
}
