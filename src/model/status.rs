//! Unified status record.

use serde::Serialize;

use super::connection::ConnectionStatus;
use super::dns::EntryStatus;
use super::ipam::IpamStatus;

/// Point-in-time composition of router, allocator and DNS state.
///
/// Built fresh for every request and never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StatusRecord {
    pub domain: String,
    pub upstream: Vec<String>,
    pub address: String,
    pub ttl: u32,
    pub connections: Vec<ConnectionStatus>,
    pub ipam: IpamStatus,
    pub entries: Vec<EntryStatus>,
}
