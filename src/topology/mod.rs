// Topology session
//
// Owns the node registry, live edges and selection for one capture session,
// plus a handle to the process-wide domain cache. All mutation happens through
// `&mut Topology` on a single thread; label resolutions run elsewhere and come
// back through `apply_label`.

pub mod color;
pub mod domain_cache;
pub mod hop;
pub mod position;
pub mod registry;
pub mod selection;

pub use color::Rgb;
pub use domain_cache::DomainCache;
pub use hop::{EdgeId, Viewport, EDGE_TTL};
pub use position::Point;
pub use registry::{Node, NodeKind};

use crate::error::TopologyError;
use crate::net::{Address, Device, Hop, Packet};
use hop::EdgeSet;
use rand::rngs::StdRng;
use rand::SeedableRng;
use registry::NodeRegistry;
use selection::SelectionState;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

// ============================================================================
// Rendering surface
// ============================================================================

/// What the presentation layer needs to draw one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub address: Address,
    pub x_percent: f64,
    pub y_percent: f64,
    pub rgb: (u8, u8, u8),
    pub kind: NodeKind,
    pub tags: Vec<&'static str>,
    /// `domain (address)` when a domain label is attached
    pub label: Option<String>,
    pub selected: bool,
}

/// What the presentation layer needs to draw one edge
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeView {
    pub id: EdgeId,
    pub from: Address,
    pub to: Address,
    pub from_percent: (f64, f64),
    pub to_percent: (f64, f64),
    pub tags: Vec<&'static str>,
    pub ttl: Duration,
    pub remaining: f64,
    pub is_broadcast: bool,
    pub is_multicast: bool,
}

// ============================================================================
// Session
// ============================================================================

pub struct Topology {
    registry: NodeRegistry,
    edges: EdgeSet,
    selection: SelectionState,
    device: Option<Device>,
    domains: Arc<DomainCache>,
    show_domains: bool,
    viewport: Viewport,
    pending_labels: Vec<Address>,
    rng: StdRng,
}

impl Topology {
    pub fn new(domains: Arc<DomainCache>) -> Self {
        Self::with_rng(domains, StdRng::from_entropy())
    }

    /// Session with a seeded jitter source
    pub fn with_seed(domains: Arc<DomainCache>, seed: u64) -> Self {
        Self::with_rng(domains, StdRng::seed_from_u64(seed))
    }

    fn with_rng(domains: Arc<DomainCache>, rng: StdRng) -> Self {
        Self {
            registry: NodeRegistry::new(),
            edges: EdgeSet::default(),
            selection: SelectionState::default(),
            device: None,
            domains,
            show_domains: false,
            viewport: Viewport::default(),
            pending_labels: Vec::new(),
            rng,
        }
    }

    pub fn domains(&self) -> &Arc<DomainCache> {
        &self.domains
    }

    // ------------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------------

    /// Create the node for `input` unless it exists
    pub fn draw_node(&mut self, input: &str) -> Result<&Node, TopologyError> {
        let address = Address::parse(input).map_err(|e| {
            warn!(input = %input, "Rejected invalid address");
            e
        })?;
        Ok(self.ensure_node(address))
    }

    fn ensure_node(&mut self, address: Address) -> &Node {
        let (_, created) = self.registry.draw_node(address, self.device.as_ref());
        if created {
            trace!(address = %address, "Node created");
            if self.show_domains {
                self.request_label(address);
            }
        }
        // existing entry, now with any cached label attached
        self.registry.draw_node(address, self.device.as_ref()).0
    }

    /// Attach a cached label now, or queue the address for resolution
    fn request_label(&mut self, address: Address) {
        match self.domains.peek(&address) {
            Some(domain) => {
                self.registry.attach_label(&address, domain);
            }
            None if !self.pending_labels.contains(&address) => self.pending_labels.push(address),
            None => {}
        }
    }

    /// Addresses waiting on a domain resolution
    pub fn take_label_requests(&mut self) -> Vec<Address> {
        std::mem::take(&mut self.pending_labels)
    }

    /// Apply a finished resolution; ignored when labels are hidden or the
    /// node is gone
    pub fn apply_label(&mut self, address: &Address, domain: Option<String>) -> bool {
        if !self.show_domains {
            return false;
        }
        self.registry.attach_label(address, domain)
    }

    pub fn show_domains(&self) -> bool {
        self.show_domains
    }

    /// Toggle domain labels; every node is redrawn
    pub fn set_show_domains(&mut self, on: bool) {
        if self.show_domains == on {
            return;
        }
        self.show_domains = on;
        self.pending_labels.clear();

        let redrawn = self.registry.redraw_all(self.device.as_ref());
        debug!(nodes = redrawn.len(), labels = on, "Redrew all nodes");
        if on {
            for address in redrawn {
                self.request_label(address);
            }
        }
    }

    pub fn node(&self, address: &Address) -> Option<&Node> {
        self.registry.get(address)
    }

    pub fn node_count(&self) -> usize {
        self.registry.len()
    }

    // ------------------------------------------------------------------------
    // Hops and edges
    // ------------------------------------------------------------------------

    /// Render a captured packet, returning the edges it produced
    ///
    /// A malformed endpoint drops the packet without touching any state.
    pub fn render_packet(&mut self, packet: &Packet, now: Instant) -> Result<Vec<EdgeId>, TopologyError> {
        let hop = hop::classify_packet(packet).map_err(|e| {
            warn!(src = %packet.src, dst = %packet.dst, error = %e, "Dropped packet");
            e
        })?;
        Ok(self.render_hop(hop, now))
    }

    /// Render a hop, replacing it by its broadcast fan-out when there is one
    pub fn render_hop(&mut self, hop: Hop, now: Instant) -> Vec<EdgeId> {
        let fanned = hop::fan_out(&hop, self.device.as_ref());
        if fanned.is_empty() {
            return vec![self.draw_edge(hop, now)];
        }
        trace!(from = %hop.from, to = %hop.to, edges = fanned.len(), "Broadcast fan-out");
        fanned
            .into_iter()
            .flat_map(|h| self.render_hop(h, now))
            .collect()
    }

    fn draw_edge(&mut self, hop: Hop, now: Instant) -> EdgeId {
        self.ensure_node(hop.from);
        self.ensure_node(hop.to);

        let origin = self.position_of(&hop.from);
        let target = self.position_of(&hop.to);
        let (dx, dy) = hop::jitter(&mut self.rng, &self.viewport);
        let from = Point {
            x: origin.x + dx,
            y: origin.y + dy,
        };

        self.edges.push(hop, from, target, now)
    }

    fn position_of(&self, address: &Address) -> Point {
        self.registry
            .get(address)
            .map(|n| n.position)
            .unwrap_or_else(|| position::placement(address, self.device.as_ref()))
    }

    /// Remove edges past their TTL
    pub fn expire_edges(&mut self, now: Instant) -> usize {
        let removed = self.edges.expire(now);
        if removed > 0 {
            trace!(removed, "Expired edges");
        }
        removed
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        self.edges.remove(id)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges_touching(&self, address: &Address) -> usize {
        self.edges.count_touching(address)
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Select a drawn node; unknown addresses leave the selection alone
    pub fn select(&mut self, address: Address) -> bool {
        if !self.registry.contains(&address) {
            return false;
        }
        self.selection.select(address);
        true
    }

    pub fn selected(&self) -> Option<Address> {
        self.selection.selected()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Move the selection forward in address order, wrapping around
    pub fn select_next(&mut self) -> Option<Address> {
        self.step_selection(true)
    }

    pub fn select_previous(&mut self) -> Option<Address> {
        self.step_selection(false)
    }

    fn step_selection(&mut self, forward: bool) -> Option<Address> {
        let addresses = self.registry.addresses();
        if addresses.is_empty() {
            return None;
        }
        let len = addresses.len();
        let current = self
            .selection
            .selected()
            .and_then(|s| addresses.iter().position(|a| *a == s));
        let index = match (current, forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };
        let next = addresses[index];
        self.selection.select(next);
        Some(next)
    }

    // ------------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------------

    pub fn device(&self) -> Option<&Device> {
        self.device.as_ref()
    }

    /// Switch the capture device; the map starts over
    pub fn set_device(&mut self, device: Option<Device>) {
        self.clear();
        self.device = device;
    }

    /// Drop every node, edge and the selection; cached domains survive
    pub fn clear(&mut self) {
        self.registry.clear();
        self.edges.clear();
        self.selection.clear();
        self.pending_labels.clear();
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    pub fn node_views(&self) -> Vec<NodeView> {
        self.registry
            .iter()
            .map(|node| {
                let (x_percent, y_percent) = node.position.as_percent();
                NodeView {
                    address: node.address,
                    x_percent,
                    y_percent,
                    rgb: node.color.as_tuple(),
                    kind: node.kind,
                    tags: node.tags(),
                    label: node.domain.as_ref().map(|_| node.label()),
                    selected: self.selection.is_selected(&node.address),
                }
            })
            .collect()
    }

    /// Live edges at `now`; expired edges never show even before cleanup
    pub fn edge_views(&self, now: Instant) -> Vec<EdgeView> {
        self.edges
            .iter()
            .filter(|e| !e.is_expired(now))
            .map(|e| EdgeView {
                id: e.id,
                from: e.hop.from,
                to: e.hop.to,
                from_percent: e.from.as_percent(),
                to_percent: e.to.as_percent(),
                tags: e.hop.tags(),
                ttl: e.ttl,
                remaining: e.remaining_fraction(now),
                is_broadcast: e.hop.is_broadcast,
                is_multicast: e.hop.is_multicast,
            })
            .collect()
    }
}
