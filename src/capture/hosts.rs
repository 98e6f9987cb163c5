// Static name table backing ip_to_domain / domain_to_ips
//
// Lookups come from a hosts(5) file only; nothing here touches the network.

use crate::net::Address;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_HOSTS_PATH: &str = "/etc/hosts";

#[derive(Debug, Clone, Default)]
pub struct HostsTable {
    by_address: HashMap<Address, String>,
    by_name: HashMap<String, Vec<Address>>,
}

impl HostsTable {
    /// Load a hosts file; a missing file yields an empty table
    pub fn load(path: &Path) -> io::Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Hosts file not found, name lookups disabled");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Parse hosts(5) text: `address name [aliases...]`, `#` starts a comment
    ///
    /// The first name seen for an address wins the reverse mapping.
    pub fn parse(content: &str) -> Self {
        let mut table = Self::default();

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or_default();
            let mut fields = line.split_whitespace();
            let Some(address) = fields.next().and_then(|f| Address::parse(f).ok()) else {
                continue;
            };

            for name in fields {
                let name = name.to_ascii_lowercase();
                table.by_address.entry(address).or_insert_with(|| name.clone());
                let addresses = table.by_name.entry(name).or_default();
                if !addresses.contains(&address) {
                    addresses.push(address);
                }
            }
        }

        table
    }

    pub fn domain_of(&self, address: &Address) -> Option<String> {
        self.by_address.get(address).cloned()
    }

    pub fn addresses_of(&self, domain: &str) -> Vec<Address> {
        self.by_name
            .get(&domain.trim_end_matches('.').to_ascii_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }
}
