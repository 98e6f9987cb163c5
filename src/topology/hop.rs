// Hop rendering
//
// A packet becomes a hop; a hop aimed at a broadcast address fans out into
// one hop per matching device address; every concrete hop becomes an edge
// that lives for EDGE_TTL and then disappears no matter what else happens.

use super::position::Point;
use crate::error::TopologyError;
use crate::net::{Address, Device, Hop, Packet};
use rand::Rng;
use std::f64::consts::TAU;
use std::time::{Duration, Instant};

/// Lifetime of a drawn edge
pub const EDGE_TTL: Duration = Duration::from_secs(10);

/// Max source-end jitter, as a multiple of the node size relative to the canvas
pub const EDGE_JITTER_FACTOR: f64 = 10.0;

/// Rendered sizes used to bound edge jitter, in any consistent unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub node_width: f64,
    pub node_height: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            node_width: 1.0,
            node_height: 1.0,
            canvas_width: 100.0,
            canvas_height: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u64);

/// A drawn hop
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub hop: Hop,
    /// Source position including jitter
    pub from: Point,
    pub to: Point,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl Edge {
    pub fn expires_at(&self) -> Instant {
        self.created_at + self.ttl
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }

    /// Share of the lifetime left, 1.0 when fresh and 0.0 once expired
    pub fn remaining_fraction(&self, now: Instant) -> f64 {
        if self.ttl.is_zero() {
            return 0.0;
        }
        let left = self.expires_at().saturating_duration_since(now);
        (left.as_secs_f64() / self.ttl.as_secs_f64()).clamp(0.0, 1.0)
    }
}

/// Live edges, oldest first
#[derive(Debug, Default)]
pub struct EdgeSet {
    edges: Vec<Edge>,
    next_id: u64,
}

impl EdgeSet {
    pub fn push(&mut self, hop: Hop, from: Point, to: Point, now: Instant) -> EdgeId {
        let id = EdgeId(self.next_id);
        self.next_id += 1;
        self.edges.push(Edge {
            id,
            hop,
            from,
            to,
            created_at: now,
            ttl: EDGE_TTL,
        });
        id
    }

    /// Remove one edge; removing an edge that is already gone is a no-op
    pub fn remove(&mut self, id: EdgeId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        self.edges.len() != before
    }

    /// Drop every edge whose TTL has elapsed, returning how many went
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.edges.len();
        self.edges.retain(|e| !e.is_expired(now));
        before - self.edges.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }

    /// Edges with `address` at either end
    pub fn count_touching(&self, address: &Address) -> usize {
        self.edges
            .iter()
            .filter(|e| e.hop.from == *address || e.hop.to == *address)
            .count()
    }
}

/// Interpret a packet as a hop
///
/// Capture never sees routers, so every packet hop has unknown
/// intermediates. Broadcast is decided later by fan-out.
pub fn classify_packet(packet: &Packet) -> Result<Hop, TopologyError> {
    let from = Address::parse(&packet.src)?;
    let to = Address::parse(&packet.dst)?;
    Ok(Hop {
        from,
        to,
        has_unknown_intermediates: true,
        is_broadcast: false,
        is_multicast: to.is_multicast(),
    })
}

/// Broadcast fan-out against the selected device
///
/// A device address matches when its broadcast address is the hop's
/// destination, or when the destination is the limited broadcast address
/// (IPv4 device addresses only). Each match yields a hop from the same
/// source to that device address; when the source is the device address
/// itself the hop keeps the broadcast address as its target. An empty result
/// means the hop is drawn as is.
pub fn fan_out(hop: &Hop, device: Option<&Device>) -> Vec<Hop> {
    let Some(device) = device else {
        return Vec::new();
    };
    if hop.is_broadcast {
        return Vec::new();
    }

    device
        .addresses
        .iter()
        .filter(|a| {
            a.broadcast_addr == Some(hop.to) || (hop.to.is_broadcast() && !a.addr.is_ipv6())
        })
        .map(|a| Hop {
            from: hop.from,
            to: if a.addr == hop.from { hop.to } else { a.addr },
            has_unknown_intermediates: false,
            is_broadcast: true,
            is_multicast: false,
        })
        .collect()
}

/// Random source-end offset in normalized units
///
/// Angle is uniform over the full turn; each axis radius is uniform up to
/// the node size times EDGE_JITTER_FACTOR relative to the canvas.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, viewport: &Viewport) -> (f64, f64) {
    let max_rx = max_radius(viewport.node_width, viewport.canvas_width);
    let max_ry = max_radius(viewport.node_height, viewport.canvas_height);

    let theta = rng.gen::<f64>() * TAU;
    let rx = rng.gen::<f64>() * max_rx;
    let ry = rng.gen::<f64>() * max_ry;
    (theta.cos() * rx, theta.sin() * ry)
}

fn max_radius(node: f64, canvas: f64) -> f64 {
    if canvas <= 0.0 || node <= 0.0 {
        return 0.0;
    }
    // percent of the canvas → unit square
    node * EDGE_JITTER_FACTOR / canvas / 100.0
}
