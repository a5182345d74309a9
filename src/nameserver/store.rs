//! Shared DNS entry store.
//!
//! The owning DNS subsystem mutates the store; everything in this crate
//! reads it through `snapshot_entries`, which only takes the shared lock.

use std::collections::BTreeMap;
use std::net::{AddrParseError, IpAddr};

use parking_lot::RwLock;

use crate::model::EntryStatus;

/// One indexed entry, owned by the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Entry {
    pub hostname: String,
    pub origin: String,
    pub container_id: String,
    pub addr: IpAddr,
    pub version: u64,
    pub tombstone: i64,
}

type EntryKey = (String, String);

/// Entry store guarded by a reader-writer lock.
///
/// Entries are keyed by (hostname, origin). Every mutation of a key bumps
/// its version, so versions strictly increase per key.
#[derive(Debug, Default)]
pub struct EntryStore {
    pub(crate) entries: RwLock<BTreeMap<EntryKey, Entry>>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the entry for (hostname, origin), reviving it if
    /// tombstoned. Returns the new version.
    pub fn add_entry(
        &self,
        hostname: &str,
        container_id: &str,
        origin: &str,
        addr: IpAddr,
    ) -> u64 {
        let mut entries = self.entries.write();
        let key = (hostname.to_string(), origin.to_string());
        let version = entries.get(&key).map_or(1, |e| e.version + 1);
        entries.insert(
            key,
            Entry {
                hostname: hostname.to_string(),
                origin: origin.to_string(),
                container_id: container_id.to_string(),
                addr,
                version,
                tombstone: 0,
            },
        );
        version
    }

    /// Marks the entry for (hostname, origin) deleted at `now`.
    ///
    /// Returns `false` if there is no such entry or it is already tombstoned.
    pub fn tombstone(&self, hostname: &str, origin: &str, now: i64) -> bool {
        let mut entries = self.entries.write();
        let key = (hostname.to_string(), origin.to_string());
        match entries.get_mut(&key) {
            Some(entry) if entry.tombstone == 0 => {
                entry.version += 1;
                entry.tombstone = now;
                true
            }
            _ => false,
        }
    }

    /// Drops tombstoned entries deleted before `before`. Returns how many
    /// were dropped.
    pub fn purge_tombstones(&self, before: i64) -> usize {
        let mut entries = self.entries.write();
        let len = entries.len();
        entries.retain(|_, e| e.tombstone == 0 || e.tombstone >= before);
        len - entries.len()
    }

    /// Rebuilds a store from exported records, keeping their versions and
    /// tombstones. Later records for the same key replace earlier ones.
    pub fn from_statuses(statuses: &[EntryStatus]) -> Result<Self, AddrParseError> {
        let mut entries = BTreeMap::new();
        for s in statuses {
            let entry = Entry {
                hostname: s.hostname.clone(),
                origin: s.origin.clone(),
                container_id: s.container_id.clone(),
                addr: s.address.parse()?,
                version: s.version,
                tombstone: s.tombstone,
            };
            entries.insert((s.hostname.clone(), s.origin.clone()), entry);
        }
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    /// Number of indexed entries, tombstoned ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_add_entry_bumps_version() {
        let store = EntryStore::new();
        assert_eq!(store.add_entry("web", "c1", "peerA", addr("10.32.0.1")), 1);
        assert_eq!(store.add_entry("web", "c2", "peerA", addr("10.32.0.2")), 2);
        // Different origin is a different key
        assert_eq!(store.add_entry("web", "c3", "peerB", addr("10.32.0.3")), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_tombstone_and_revive() {
        let store = EntryStore::new();
        store.add_entry("web", "c1", "peerA", addr("10.32.0.1"));

        assert!(store.tombstone("web", "peerA", 1700000000));
        assert!(!store.tombstone("web", "peerA", 1700000001));
        assert!(!store.tombstone("missing", "peerA", 1700000000));

        {
            let entries = store.entries.read();
            let entry = entries.values().next().unwrap();
            assert_eq!(entry.version, 2);
            assert_eq!(entry.tombstone, 1700000000);
        }

        assert_eq!(store.add_entry("web", "c1", "peerA", addr("10.32.0.1")), 3);
        let entries = store.entries.read();
        assert_eq!(entries.values().next().unwrap().tombstone, 0);
    }

    #[test]
    fn test_from_statuses_keeps_versions() {
        let status = EntryStatus {
            hostname: "web".to_string(),
            origin: "peerA".to_string(),
            container_id: "c1".to_string(),
            address: "10.0.0.1".to_string(),
            version: 7,
            tombstone: 42,
        };
        let store = EntryStore::from_statuses(std::slice::from_ref(&status)).unwrap();
        assert_eq!(store.len(), 1);
        // Next mutation continues from the restored version
        assert_eq!(store.add_entry("web", "c1", "peerA", addr("10.0.0.1")), 8);

        let bad = EntryStatus {
            address: "bogus".to_string(),
            ..status
        };
        assert!(EntryStore::from_statuses(&[bad]).is_err());
    }

    #[test]
    fn test_purge_tombstones() {
        let store = EntryStore::new();
        store.add_entry("a", "c1", "peerA", addr("10.32.0.1"));
        store.add_entry("b", "c2", "peerA", addr("10.32.0.2"));
        store.add_entry("c", "c3", "peerA", addr("10.32.0.3"));
        store.tombstone("a", "peerA", 100);
        store.tombstone("b", "peerA", 200);

        assert_eq!(store.purge_tombstones(150), 1);
        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
    }
}
