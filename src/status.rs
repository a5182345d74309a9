//! Aggregation of subsystem snapshots into one status record.

use tracing::debug;

use crate::model::StatusRecord;
use crate::nameserver::snapshot_entries;
use crate::provider::Subsystems;

/// Composes router, allocator and DNS snapshots into a `StatusRecord`.
#[derive(Clone, Debug)]
pub struct StatusAggregator {
    subsystems: Subsystems,
}

impl StatusAggregator {
    pub fn new(subsystems: Subsystems) -> Self {
        Self { subsystems }
    }

    /// Builds a fresh status record.
    ///
    /// Returns `None` when the DNS server is not running: a status without
    /// it carries nothing its consumers use. Other missing subsystems leave
    /// their fields empty.
    pub fn aggregate(&self) -> Option<StatusRecord> {
        let dns = self.subsystems.dns.as_ref()?;

        let mut record = StatusRecord::default();

        if let Some(router) = &self.subsystems.router {
            record.connections = router.status().connections;
        }
        if let Some(allocator) = &self.subsystems.allocator {
            record.ipam = allocator.status(None);
        }
        if let Some(store) = &self.subsystems.entries {
            record.entries = snapshot_entries(store);
        }

        record.domain = dns.domain.clone();
        record.upstream = dns.upstream.clone();
        record.address = dns.address.clone();
        record.ttl = dns.ttl;

        debug!(
            connections = record.connections.len(),
            entries = record.entries.len(),
            "aggregated status"
        );
        Some(record)
    }
}
