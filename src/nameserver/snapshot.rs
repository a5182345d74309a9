//! Consistent snapshots of the DNS entry store.

use super::store::{Entry, EntryStore};
use crate::model::EntryStatus;

/// Copies every indexed entry, live or tombstoned, out of the store.
///
/// Entries are cloned under the shared lock and converted to `EntryStatus`
/// after it is released, so writers are blocked only for the copy. The
/// result reflects a single instant: no entry is seen mid-mutation.
pub fn snapshot_entries(store: &EntryStore) -> Vec<EntryStatus> {
    let copied: Vec<Entry> = {
        let entries = store.entries.read();
        entries.values().cloned().collect()
    };

    copied
        .into_iter()
        .map(|e| EntryStatus {
            hostname: e.hostname,
            origin: e.origin,
            container_id: e.container_id,
            address: e.addr.to_string(),
            version: e.version,
            tombstone: e.tombstone,
        })
        .collect()
}
