//! DNS entry store, its snapshot builder and server settings.

pub mod config;
pub mod snapshot;
pub mod store;

pub use config::DnsServerConfig;
pub use snapshot::snapshot_entries;
pub use store::EntryStore;
