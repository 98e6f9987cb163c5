// Canonical host addresses
//
// Every map lookup (node registry, domain cache, device membership) is keyed
// by `Address`, so two spellings of one host must compare equal. Parsing goes
// through std's IpAddr and IPv4-mapped IPv6 addresses fold to plain IPv4.

use crate::error::TopologyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// A canonical IPv4 or IPv6 host address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(IpAddr);

impl Address {
    /// Parse textual input into its canonical form
    ///
    /// Accepts surrounding whitespace, bracketed IPv6 (`[::1]`) and a trailing
    /// IPv6 zone index (`fe80::1%eth0`), which is dropped.
    pub fn parse(input: &str) -> Result<Self, TopologyError> {
        let trimmed = input.trim();
        let unbracketed = trimmed
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(trimmed);
        let without_zone = match unbracketed.split_once('%') {
            Some((addr, _zone)) if addr.contains(':') => addr,
            _ => unbracketed,
        };

        IpAddr::from_str(without_zone)
            .map(Self::from)
            .map_err(|_| TopologyError::InvalidAddress {
                input: input.to_string(),
            })
    }

    pub fn ip(&self) -> IpAddr {
        self.0
    }

    pub fn is_ipv6(&self) -> bool {
        self.0.is_ipv6()
    }

    /// RFC1918 private ranges (10/8, 172.16/12, 192.168/16)
    pub fn is_private(&self) -> bool {
        match self.0 {
            IpAddr::V4(v4) => v4.is_private(),
            IpAddr::V6(_) => false,
        }
    }

    pub fn is_multicast(&self) -> bool {
        self.0.is_multicast()
    }

    /// The IPv4 limited broadcast address; IPv6 has no broadcast range
    pub fn is_broadcast(&self) -> bool {
        match self.0 {
            IpAddr::V4(v4) => v4.is_broadcast(),
            IpAddr::V6(_) => false,
        }
    }

    pub fn is_loopback(&self) -> bool {
        self.0.is_loopback()
    }

    /// Raw address bytes: 4 for IPv4, 16 for IPv6
    pub fn octets(&self) -> Vec<u8> {
        match self.0 {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        }
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        Address(ip.to_canonical())
    }
}

impl FromStr for Address {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = TopologyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::parse(&value)
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
