// Kernel socket table scanning
// Read-only: parses /proc/net/tcp and /proc/net/tcp6 into socket pairs

use super::Address;
use std::fs;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::debug;

const TCP_TABLE: &str = "/proc/net/tcp";
const TCP6_TABLE: &str = "/proc/net/tcp6";

/// TCP states as encoded in the `st` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    Established,
    Opening,
    Closing,
    Listen,
    Unknown,
}

impl SocketState {
    fn from_hex(hex_str: &str) -> Self {
        match hex_str {
            "01" => SocketState::Established,
            "02" | "03" => SocketState::Opening,
            "04" | "05" | "06" | "07" | "08" | "09" | "0B" => SocketState::Closing,
            "0A" => SocketState::Listen,
            _ => SocketState::Unknown,
        }
    }
}

/// One row of the socket table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketEntry {
    pub local: Address,
    pub local_port: u16,
    pub remote: Address,
    pub remote_port: u16,
    pub state: SocketState,
}

/// Read both TCP tables; a missing tcp6 table is not an error
pub fn read_socket_table() -> io::Result<Vec<SocketEntry>> {
    let content = fs::read_to_string(TCP_TABLE)
        .map_err(|e| io::Error::new(e.kind(), format!("Cannot read {}: {}", TCP_TABLE, e)))?;
    let mut entries = parse_socket_table(&content);

    match fs::read_to_string(TCP6_TABLE) {
        Ok(content6) => entries.extend(parse_socket_table(&content6)),
        Err(e) => debug!(error = %e, "Skipping {}", TCP6_TABLE),
    }

    Ok(entries)
}

/// Parse a whole table, skipping the header and any malformed rows
pub fn parse_socket_table(content: &str) -> Vec<SocketEntry> {
    content.lines().skip(1).filter_map(parse_socket_line).collect()
}

fn parse_socket_line(line: &str) -> Option<SocketEntry> {
    // sl  local_address rem_address   st tx_queue rx_queue ...
    // 0: 0100007F:1F90 00000000:0000 0A 00000000:00000000 ...
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return None;
    }

    let (local, local_port) = parse_endpoint(parts[1])?;
    let (remote, remote_port) = parse_endpoint(parts[2])?;

    Some(SocketEntry {
        local,
        local_port,
        remote,
        remote_port,
        state: SocketState::from_hex(parts[3]),
    })
}

/// HEXIP:HEXPORT, e.g. "0100007F:1F90" = 127.0.0.1:8080
fn parse_endpoint(field: &str) -> Option<(Address, u16)> {
    let (hex_ip, hex_port) = field.split_once(':')?;
    let ip = match hex_ip.len() {
        8 => IpAddr::V4(parse_hex_ipv4(hex_ip)?),
        32 => IpAddr::V6(parse_hex_ipv6(hex_ip)?),
        _ => return None,
    };
    let port = u16::from_str_radix(hex_port, 16).ok()?;
    Some((Address::from(ip), port))
}

/// Decode one 32-bit word stored in little-endian byte order
fn parse_le_word(hex: &str) -> Option<[u8; 4]> {
    let mut bytes = [0u8; 4];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(hex.get(i * 2..i * 2 + 2)?, 16).ok()?;
    }
    bytes.reverse();
    Some(bytes)
}

fn parse_hex_ipv4(hex: &str) -> Option<Ipv4Addr> {
    parse_le_word(hex).map(Ipv4Addr::from)
}

/// tcp6 rows hold four little-endian words
fn parse_hex_ipv6(hex: &str) -> Option<Ipv6Addr> {
    let mut octets = [0u8; 16];
    for word in 0..4 {
        let bytes = parse_le_word(hex.get(word * 8..word * 8 + 8)?)?;
        octets[word * 4..word * 4 + 4].copy_from_slice(&bytes);
    }
    Some(Ipv6Addr::from(octets))
}
