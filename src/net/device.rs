// Capture device descriptors
//
// Mirrors the JSON shape capture collaborators hand over:
// {name, desc, addresses[{addr, netmask, broadcast_addr, dst_addr}],
//  flags{connection_status, if_flags{loopback, up, running, wireless}}}

use super::Address;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// A capture interface and its configured addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub addresses: Vec<DeviceAddress>,
    #[serde(default)]
    pub flags: DeviceFlags,
}

/// One address configured on a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAddress {
    pub addr: Address,
    #[serde(default)]
    pub netmask: Option<Address>,
    #[serde(default)]
    pub broadcast_addr: Option<Address>,
    #[serde(default)]
    pub dst_addr: Option<Address>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFlags {
    pub connection_status: bool,
    pub if_flags: IfFlags,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfFlags {
    pub loopback: bool,
    pub up: bool,
    pub running: bool,
    pub wireless: bool,
}

impl Device {
    /// Whether `addr` is one of this device's configured addresses
    pub fn has_address(&self, addr: &Address) -> bool {
        self.addresses.iter().any(|a| a.addr == *addr)
    }

    /// Comma separated list of configured addresses, for display
    pub fn address_summary(&self) -> String {
        if self.addresses.is_empty() {
            return "no addresses".to_string();
        }
        self.addresses
            .iter()
            .map(|a| a.addr.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl DeviceAddress {
    /// Build an address entry from an interface address and prefix length
    ///
    /// The netmask is derived for both families; the broadcast address only
    /// for IPv4 prefixes shorter than /31 (point-to-point links have none).
    pub fn from_prefix(ip: IpAddr, prefix: u8) -> Self {
        let addr = Address::from(ip);
        match addr.ip() {
            IpAddr::V4(v4) => {
                let prefix = prefix.min(32);
                let mask = u32::MAX.checked_shl(32 - prefix as u32).unwrap_or(0);
                let broadcast = (prefix < 31).then(|| {
                    Address::from(IpAddr::V4(Ipv4Addr::from(u32::from(v4) | !mask)))
                });
                DeviceAddress {
                    addr,
                    netmask: Some(Address::from(IpAddr::V4(Ipv4Addr::from(mask)))),
                    broadcast_addr: broadcast,
                    dst_addr: None,
                }
            }
            IpAddr::V6(_) => {
                let prefix = prefix.min(128);
                let mask = u128::MAX.checked_shl(128 - prefix as u32).unwrap_or(0);
                DeviceAddress {
                    addr,
                    netmask: Some(Address::from(IpAddr::V6(Ipv6Addr::from(mask)))),
                    broadcast_addr: None,
                    dst_addr: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    #[test]
    fn test_from_prefix_ipv4_slash_24() {
        let entry = DeviceAddress::from_prefix("10.0.0.5".parse().unwrap(), 24);
        assert_eq!(entry.addr, addr("10.0.0.5"));
        assert_eq!(entry.netmask, Some(addr("255.255.255.0")));
        assert_eq!(entry.broadcast_addr, Some(addr("10.0.0.255")));
    }

    #[test]
    fn test_from_prefix_edge_prefixes() {
        let host = DeviceAddress::from_prefix("192.168.1.7".parse().unwrap(), 32);
        assert_eq!(host.netmask, Some(addr("255.255.255.255")));
        assert_eq!(host.broadcast_addr, None);

        let any = DeviceAddress::from_prefix("192.168.1.7".parse().unwrap(), 0);
        assert_eq!(any.netmask, Some(addr("0.0.0.0")));
        assert_eq!(any.broadcast_addr, Some(addr("255.255.255.255")));
    }

    #[test]
    fn test_from_prefix_ipv6_has_no_broadcast() {
        let entry = DeviceAddress::from_prefix("fe80::1".parse().unwrap(), 64);
        assert_eq!(entry.netmask, Some(addr("ffff:ffff:ffff:ffff::")));
        assert_eq!(entry.broadcast_addr, None);
    }

    #[test]
    fn test_has_address_is_canonical() {
        let device = Device {
            name: "eth0".to_string(),
            desc: None,
            addresses: vec![DeviceAddress::from_prefix("2001:db8::5".parse().unwrap(), 64)],
            flags: DeviceFlags::default(),
        };
        assert!(device.has_address(&addr("2001:0db8:0:0::5")));
        assert!(!device.has_address(&addr("2001:db8::6")));
    }

    #[test]
    fn test_deserialize_collaborator_shape() {
        let json = r#"{
            "name": "wlan0",
            "desc": null,
            "addresses": [
                {"addr": "192.168.1.20", "netmask": "255.255.255.0",
                 "broadcast_addr": "192.168.1.255", "dst_addr": null}
            ],
            "flags": {
                "connection_status": true,
                "if_flags": {"loopback": false, "up": true, "running": true, "wireless": true}
            }
        }"#;
        let device: Device = serde_json::from_str(json).unwrap();
        assert_eq!(device.name, "wlan0");
        assert_eq!(device.addresses[0].broadcast_addr, Some(addr("192.168.1.255")));
        assert!(device.flags.if_flags.wireless);
        assert!(device.flags.connection_status);
    }
}
