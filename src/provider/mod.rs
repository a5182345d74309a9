//! Interfaces to the subsystems whose state is snapshotted.
//!
//! The router and allocator are owned elsewhere; this crate only sees them
//! through `RouterSource` and `AllocatorSource`. `Subsystems` bundles the
//! handles that are present on a peer and is passed explicitly to the
//! aggregator and the metrics collector.

mod state;

pub use state::{DnsState, StateError, StateFile, StaticAllocator, StaticRouter};

use std::sync::Arc;

use ipnet::IpNet;

use crate::model::{IpamStatus, RouterStatus};
use crate::nameserver::{DnsServerConfig, EntryStore};

/// Read access to the router's connection state.
pub trait RouterSource: Send + Sync {
    /// Name of this peer, as used for DNS entry origins.
    fn local_peer(&self) -> String;

    /// Takes a snapshot of connections and overlay diagnostics.
    fn status(&self) -> RouterStatus;
}

/// Read access to the IP address allocator.
pub trait AllocatorSource: Send + Sync {
    /// Counters for `range`, or for the whole managed range when `None`.
    fn status(&self, range: Option<&IpNet>) -> IpamStatus;
}

/// Handles to the subsystems running on this peer.
///
/// Any handle may be absent; consumers skip whatever is missing.
#[derive(Clone, Default)]
pub struct Subsystems {
    pub router: Option<Arc<dyn RouterSource>>,
    pub allocator: Option<Arc<dyn AllocatorSource>>,
    pub entries: Option<Arc<EntryStore>>,
    pub dns: Option<Arc<DnsServerConfig>>,
}

impl Subsystems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_router(mut self, router: Arc<dyn RouterSource>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn with_allocator(mut self, allocator: Arc<dyn AllocatorSource>) -> Self {
        self.allocator = Some(allocator);
        self
    }

    pub fn with_entries(mut self, entries: Arc<EntryStore>) -> Self {
        self.entries = Some(entries);
        self
    }

    pub fn with_dns(mut self, dns: Arc<DnsServerConfig>) -> Self {
        self.dns = Some(dns);
        self
    }
}

impl std::fmt::Debug for Subsystems {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subsystems")
            .field("router", &self.router.is_some())
            .field("allocator", &self.allocator.is_some())
            .field("entries", &self.entries.is_some())
            .field("dns", &self.dns.is_some())
            .finish()
    }
}
