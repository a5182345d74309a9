//! IP address allocator counters.

use serde::{Deserialize, Serialize};

/// Counters for the managed address range.
///
/// All zero when no allocator is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpamStatus {
    /// Total addresses in the managed range.
    pub range_num_ips: u64,
    /// Addresses currently leased by this peer.
    pub active_ips: u64,
}
