//! Fixed subsystem state loaded from a JSON file.
//!
//! Used by `meshstat status` / `meshstat metrics` to report on a captured
//! peer state, and by tests as an in-memory router and allocator.

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AllocatorSource, RouterSource, Subsystems};
use crate::model::{EntryStatus, IpamStatus, RouterStatus};
use crate::nameserver::{DnsServerConfig, EntryStore};

/// Error loading a state file.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid state file {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid address {address:?} for DNS entry {hostname:?}")]
    Address { hostname: String, address: String },
}

/// Router returning the same status on every call.
#[derive(Clone, Debug, Default)]
pub struct StaticRouter {
    pub local_peer: String,
    pub status: RouterStatus,
}

impl RouterSource for StaticRouter {
    fn local_peer(&self) -> String {
        self.local_peer.clone()
    }

    fn status(&self) -> RouterStatus {
        self.status.clone()
    }
}

/// Allocator owning a fixed range with a fixed set of leased addresses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticAllocator {
    pub range: IpNet,
    #[serde(default)]
    pub active: Vec<IpAddr>,
}

/// Number of addresses in `net`, saturating for very large IPv6 ranges.
fn range_size(net: &IpNet) -> u64 {
    let host_bits = u32::from(net.max_prefix_len() - net.prefix_len());
    1u64.checked_shl(host_bits).unwrap_or(u64::MAX)
}

impl AllocatorSource for StaticAllocator {
    fn status(&self, range: Option<&IpNet>) -> IpamStatus {
        let selected = match range {
            None => &self.range,
            Some(r) if self.range.contains(r) => r,
            Some(_) => return IpamStatus::default(),
        };
        IpamStatus {
            range_num_ips: range_size(selected),
            active_ips: self.active.iter().filter(|ip| selected.contains(*ip)).count() as u64,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DnsState {
    #[serde(default)]
    pub config: DnsServerConfig,
    #[serde(default)]
    pub entries: Vec<EntryStatus>,
}

/// Captured state of one peer. Absent sections mean the subsystem is not
/// running.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default)]
    pub local_peer: String,
    #[serde(default)]
    pub router: Option<RouterStatus>,
    #[serde(default)]
    pub ipam: Option<StaticAllocator>,
    #[serde(default)]
    pub dns: Option<DnsState>,
}

impl StateFile {
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let content = std::fs::read_to_string(path).map_err(|source| StateError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| StateError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    /// Builds subsystem handles for every section present.
    pub fn into_subsystems(self) -> Result<Subsystems, StateError> {
        let mut subsystems = Subsystems::new();

        if let Some(status) = self.router {
            subsystems = subsystems.with_router(Arc::new(StaticRouter {
                local_peer: self.local_peer,
                status,
            }));
        }
        if let Some(allocator) = self.ipam {
            subsystems = subsystems.with_allocator(Arc::new(allocator));
        }
        if let Some(dns) = self.dns {
            let store = EntryStore::from_statuses(&dns.entries).map_err(|_| {
                // Report the first offending record
                let bad = dns
                    .entries
                    .iter()
                    .find(|e| e.address.parse::<IpAddr>().is_err());
                StateError::Address {
                    hostname: bad.map(|e| e.hostname.clone()).unwrap_or_default(),
                    address: bad.map(|e| e.address.clone()).unwrap_or_default(),
                }
            })?;
            subsystems = subsystems
                .with_entries(Arc::new(store))
                .with_dns(Arc::new(dns.config));
        }

        debug!(?subsystems, "loaded state file");
        Ok(subsystems)
    }
}
