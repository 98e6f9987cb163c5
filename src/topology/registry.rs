// Node registry
//
// Exactly one node per canonical address. Nodes are created on first
// reference, get a domain label attached at most once per draw, and are only
// ever replaced wholesale by `redraw_all`.

use super::color::{address_color, Rgb};
use super::position::{classify, placement, Locality, Point};
use crate::net::{Address, Device};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Classification shown on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Local,
    Private,
    PublicV4,
    PublicV6,
}

impl NodeKind {
    pub fn classify(address: &Address, device: Option<&Device>) -> Self {
        match classify(address, device) {
            Locality::Local => NodeKind::Local,
            Locality::Private => NodeKind::Private,
            Locality::Public if address.is_ipv6() => NodeKind::PublicV6,
            Locality::Public => NodeKind::PublicV4,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Local => "localhost",
            NodeKind::Private => "lan",
            NodeKind::PublicV4 => "wan",
            NodeKind::PublicV6 => "ipv6-wan",
        }
    }
}

/// Identity of one drawn instance of a node; a redraw hands out new ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub address: Address,
    pub position: Point,
    pub color: Rgb,
    pub kind: NodeKind,
    pub domain: Option<String>,
    pub handle: NodeHandle,
}

impl Node {
    fn build(address: Address, device: Option<&Device>, handle: NodeHandle) -> Self {
        Node {
            address,
            position: placement(&address, device),
            color: address_color(&address),
            kind: NodeKind::classify(&address, device),
            domain: None,
            handle,
        }
    }

    /// Classification tags: the kind, plus `ipv6` for any IPv6 host
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags = vec![self.kind.tag()];
        if self.address.is_ipv6() {
            tags.push("ipv6");
        }
        tags
    }

    /// `domain (address)` once a domain is attached, else the address
    pub fn label(&self) -> String {
        match &self.domain {
            Some(domain) => format!("{} ({})", domain, self.address),
            None => self.address.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: BTreeMap<Address, Node>,
    next_handle: u64,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the node for `address` unless it exists
    ///
    /// Returns the node and whether it was created by this call.
    pub fn draw_node(&mut self, address: Address, device: Option<&Device>) -> (&Node, bool) {
        match self.nodes.entry(address) {
            Entry::Occupied(entry) => (entry.into_mut(), false),
            Entry::Vacant(entry) => {
                let handle = NodeHandle(self.next_handle);
                self.next_handle += 1;
                (entry.insert(Node::build(address, device, handle)), true)
            }
        }
    }

    /// Attach a resolved domain; position, color and kind stay untouched
    ///
    /// Returns false when the node no longer exists.
    pub fn attach_label(&mut self, address: &Address, domain: Option<String>) -> bool {
        match self.nodes.get_mut(address) {
            Some(node) => {
                node.domain = domain;
                true
            }
            None => false,
        }
    }

    /// Rebuild every node in place, keeping the address → node mapping
    ///
    /// Labels are dropped; the caller re-attaches them if they are shown.
    pub fn redraw_all(&mut self, device: Option<&Device>) -> Vec<Address> {
        let addresses = self.addresses();
        for address in &addresses {
            let handle = NodeHandle(self.next_handle);
            self.next_handle += 1;
            self.nodes.insert(*address, Node::build(*address, device, handle));
        }
        addresses
    }

    pub fn get(&self, address: &Address) -> Option<&Node> {
        self.nodes.get(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.nodes.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in address order
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.nodes.keys().copied().collect()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{DeviceAddress, DeviceFlags};

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn eth0() -> Device {
        Device {
            name: "eth0".to_string(),
            desc: None,
            addresses: vec![DeviceAddress::from_prefix("203.0.113.9".parse().unwrap(), 24)],
            flags: DeviceFlags::default(),
        }
    }

    #[test]
    fn test_draw_node_is_idempotent() {
        let mut registry = NodeRegistry::new();
        let (_, created) = registry.draw_node(addr("8.8.8.8"), None);
        assert!(created);
        let (node, created) = registry.draw_node(addr("8.8.8.8"), None);
        assert!(!created);
        assert_eq!(node.handle, NodeHandle(0));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_alternate_spellings_share_a_node() {
        let mut registry = NodeRegistry::new();
        registry.draw_node(addr("2001:db8::1"), None);
        registry.draw_node(addr("2001:0DB8:0:0::1"), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_kinds_and_tags() {
        let device = eth0();
        let mut registry = NodeRegistry::new();
        for ip in ["203.0.113.9", "192.168.1.1", "8.8.8.8", "2001:db8::1"] {
            registry.draw_node(addr(ip), Some(&device));
        }

        let kind = |ip: &str| registry.get(&addr(ip)).map(|n| n.kind);
        assert_eq!(kind("203.0.113.9"), Some(NodeKind::Local));
        assert_eq!(kind("192.168.1.1"), Some(NodeKind::Private));
        assert_eq!(kind("8.8.8.8"), Some(NodeKind::PublicV4));
        assert_eq!(kind("2001:db8::1"), Some(NodeKind::PublicV6));

        let v6 = registry.get(&addr("2001:db8::1")).unwrap();
        assert_eq!(v6.tags(), vec!["ipv6-wan", "ipv6"]);
        assert_eq!(registry.get(&addr("8.8.8.8")).unwrap().tags(), vec!["wan"]);
    }

    #[test]
    fn test_attach_label_only_changes_label() {
        let mut registry = NodeRegistry::new();
        let target = addr("93.184.216.34");
        let before = registry.draw_node(target, None).0.clone();

        assert!(registry.attach_label(&target, Some("example.com".to_string())));
        let after = registry.get(&target).unwrap();
        assert_eq!(after.position, before.position);
        assert_eq!(after.color, before.color);
        assert_eq!(after.kind, before.kind);
        assert_eq!(after.handle, before.handle);
        assert_eq!(after.label(), "example.com (93.184.216.34)");

        assert!(!registry.attach_label(&addr("1.1.1.1"), Some("one.one".to_string())));
    }

    #[test]
    fn test_redraw_keeps_mapping_with_new_handles() {
        let mut registry = NodeRegistry::new();
        registry.draw_node(addr("8.8.8.8"), None);
        registry.draw_node(addr("10.0.0.5"), None);
        registry.attach_label(&addr("8.8.8.8"), Some("dns.google".to_string()));
        let old: Vec<Node> = registry.iter().cloned().collect();

        let redrawn = registry.redraw_all(None);
        assert_eq!(redrawn, vec![addr("8.8.8.8"), addr("10.0.0.5")]);
        assert_eq!(registry.len(), 2);
        for before in old {
            let after = registry.get(&before.address).unwrap();
            assert_ne!(after.handle, before.handle);
            assert_eq!(after.position, before.position);
            assert_eq!(after.domain, None);
        }
    }
}
