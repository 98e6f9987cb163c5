// Host placement
//
// A host's place on the map is a pure function of its canonical address text
// (SHA-256 → two 16-bit words) and of whether it is near or far. Near hosts
// (the capture device's own addresses and RFC1918 hosts) are squeezed into a
// small cluster at the center; far hosts are pushed out of the center band so
// they never land on top of that cluster.

use crate::net::{Address, Device};
use sha2::{Digest, Sha256};

/// Scale applied to near hosts before offsetting them into the cluster
pub const LOCAL_CLUSTER_SCALE: f64 = 0.1;

/// Offset of the near-host cluster; the cluster spans [0.45, 0.55)
pub const LOCAL_CLUSTER_OFFSET: f64 = 0.45;

/// Central band far hosts are kept out of, per axis
pub const CENTER_BAND: (f64, f64) = (0.4, 0.6);

/// Normalized map coordinates, both axes in [0, 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Coordinates as percentages of the canvas
    pub fn as_percent(&self) -> (f64, f64) {
        (self.x * 100.0, self.y * 100.0)
    }
}

/// Locality bucket used for placement and styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locality {
    /// One of the selected device's configured addresses
    Local,
    /// RFC1918 private range
    Private,
    /// Everything else
    Public,
}

impl Locality {
    pub fn is_near(&self) -> bool {
        matches!(self, Locality::Local | Locality::Private)
    }
}

/// Base position: first two big-endian 16-bit words of SHA-256(address text)
pub fn hash_position(address: &Address) -> Point {
    let digest = Sha256::digest(address.to_string().as_bytes());
    let x = u16::from_be_bytes([digest[0], digest[1]]);
    let y = u16::from_be_bytes([digest[2], digest[3]]);
    Point {
        x: f64::from(x) / 65536.0,
        y: f64::from(y) / 65536.0,
    }
}

/// Classify an address against the selected device and the private ranges
///
/// Without a device only the range heuristics apply.
pub fn classify(address: &Address, device: Option<&Device>) -> Locality {
    if device.is_some_and(|d| d.has_address(address)) {
        Locality::Local
    } else if address.is_private() {
        Locality::Private
    } else {
        Locality::Public
    }
}

/// Final map position for an address
pub fn placement(address: &Address, device: Option<&Device>) -> Point {
    place(hash_position(address), classify(address, device))
}

/// Apply the locality remap to a base position
pub fn place(base: Point, locality: Locality) -> Point {
    if locality.is_near() {
        Point {
            x: base.x * LOCAL_CLUSTER_SCALE + LOCAL_CLUSTER_OFFSET,
            y: base.y * LOCAL_CLUSTER_SCALE + LOCAL_CLUSTER_OFFSET,
        }
    } else {
        Point {
            x: push_out_of_band(base.x),
            y: push_out_of_band(base.y),
        }
    }
}

/// Snap a coordinate inside [0.4, 0.6) to the nearer band edge
fn push_out_of_band(v: f64) -> f64 {
    let (low, high) = CENTER_BAND;
    let mid = (low + high) / 2.0;
    if (low..mid).contains(&v) {
        low
    } else if (mid..high).contains(&v) {
        high
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{DeviceAddress, DeviceFlags};
    use proptest::prelude::*;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn device_with(ip: &str) -> Device {
        Device {
            name: "eth0".to_string(),
            desc: None,
            addresses: vec![DeviceAddress::from_prefix(ip.parse().unwrap(), 24)],
            flags: DeviceFlags::default(),
        }
    }

    fn any_address() -> impl Strategy<Value = Address> {
        prop_oneof![
            any::<u32>().prop_map(|v| Address::from(IpAddr::V4(Ipv4Addr::from(v)))),
            any::<u128>().prop_map(|v| Address::from(IpAddr::V6(Ipv6Addr::from(v)))),
        ]
    }

    #[test]
    fn test_hash_position_known_digests() {
        // SHA-256("8.8.8.8") starts 83 8c 4c 25
        let p = hash_position(&addr("8.8.8.8"));
        assert_eq!(p.x, 0x838c as f64 / 65536.0);
        assert_eq!(p.y, 0x4c25 as f64 / 65536.0);
    }

    #[test]
    fn test_hash_uses_canonical_text() {
        assert_eq!(
            hash_position(&addr("2001:0db8::0001")),
            hash_position(&addr("2001:db8::1"))
        );
    }

    #[test]
    fn test_classify() {
        let device = device_with("203.0.113.9");
        assert_eq!(classify(&addr("203.0.113.9"), Some(&device)), Locality::Local);
        assert_eq!(classify(&addr("203.0.113.9"), None), Locality::Public);
        assert_eq!(classify(&addr("192.168.0.4"), Some(&device)), Locality::Private);
        assert_eq!(classify(&addr("1.1.1.1"), Some(&device)), Locality::Public);
    }

    #[test]
    fn test_push_out_of_band_edges() {
        assert_eq!(push_out_of_band(0.4), 0.4);
        assert_eq!(push_out_of_band(0.45), 0.4);
        assert_eq!(push_out_of_band(0.5), 0.6);
        assert_eq!(push_out_of_band(0.5999), 0.6);
        assert_eq!(push_out_of_band(0.6), 0.6);
        assert_eq!(push_out_of_band(0.39), 0.39);
        assert_eq!(push_out_of_band(0.0), 0.0);
    }

    #[test]
    fn test_local_device_address_joins_cluster() {
        let device = device_with("203.0.113.9");
        let p = placement(&addr("203.0.113.9"), Some(&device));
        assert!((0.45..0.55).contains(&p.x));
        assert!((0.45..0.55).contains(&p.y));
    }

    #[test]
    fn test_public_scenario_hosts_avoid_band() {
        for ip in ["8.8.8.8", "203.0.113.5"] {
            let p = placement(&addr(ip), None);
            for v in [p.x, p.y] {
                assert!(!(v > 0.4 && v < 0.6), "{ip} landed in the band at {v}");
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_placement_is_deterministic(address in any_address()) {
            prop_assert_eq!(placement(&address, None), placement(&address, None));
        }

        #[test]
        fn prop_base_position_in_unit_square(address in any_address()) {
            let p = hash_position(&address);
            prop_assert!((0.0..1.0).contains(&p.x));
            prop_assert!((0.0..1.0).contains(&p.y));
        }

        #[test]
        fn prop_near_hosts_cluster(x in 0u16.., y in 0u16..) {
            let base = Point { x: f64::from(x) / 65536.0, y: f64::from(y) / 65536.0 };
            for locality in [Locality::Local, Locality::Private] {
                let p = place(base, locality);
                prop_assert!((0.45..0.55).contains(&p.x));
                prop_assert!((0.45..0.55).contains(&p.y));
            }
        }

        #[test]
        fn prop_far_hosts_avoid_band(x in 0u16.., y in 0u16..) {
            let base = Point { x: f64::from(x) / 65536.0, y: f64::from(y) / 65536.0 };
            let p = place(base, Locality::Public);
            for (before, after) in [(base.x, p.x), (base.y, p.y)] {
                if (0.4..0.6).contains(&before) {
                    prop_assert!(after == 0.4 || after == 0.6);
                } else {
                    prop_assert_eq!(before, after);
                }
            }
        }

        #[test]
        fn prop_private_addresses_cluster(a in 0u8.., b in 0u8.., c in 0u8..) {
            let address = Address::from(IpAddr::V4(Ipv4Addr::new(10, a, b, c)));
            let p = placement(&address, None);
            prop_assert!((0.45..0.55).contains(&p.x));
            prop_assert!((0.45..0.55).contains(&p.y));
        }
    }
}
