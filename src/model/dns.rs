//! Exported DNS entry records.

use serde::{Deserialize, Serialize};

/// A flat, independently-owned copy of one DNS entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStatus {
    pub hostname: String,
    /// Name of the peer that owns the entry.
    pub origin: String,
    pub container_id: String,
    pub address: String,
    pub version: u64,
    /// Deletion timestamp (seconds since epoch); 0 while the entry is live.
    pub tombstone: i64,
}

impl EntryStatus {
    pub fn is_tombstoned(&self) -> bool {
        self.tombstone != 0
    }
}

/// Counts every entry, tombstoned ones included.
pub fn count_entries(entries: &[EntryStatus]) -> usize {
    entries.len()
}

/// Counts entries whose origin is `peer`, tombstoned ones included.
pub fn count_entries_for_peer(peer: &str, entries: &[EntryStatus]) -> usize {
    entries.iter().filter(|e| e.origin == peer).count()
}
