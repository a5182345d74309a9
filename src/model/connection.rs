//! Peer connection records as reported by the router.

use serde::{Deserialize, Serialize};

use super::flow::FastDpStatus;

/// State of a peer-to-peer connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Pending,
    Retrying,
    Failed,
    Established,
}

impl ConnectionState {
    pub fn is_established(self) -> bool {
        matches!(self, ConnectionState::Established)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Name of the remote peer.
    pub peer: String,
    /// Remote address, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub state: ConnectionState,
}

/// Diagnostics from the overlay network.
///
/// Each overlay that is running contributes its own section; a missing
/// section means that overlay is not present on this peer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayDiagnostics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fastdp: Option<FastDpStatus>,
}

/// Point-in-time status of the router.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterStatus {
    #[serde(default)]
    pub connections: Vec<ConnectionStatus>,
    #[serde(default)]
    pub overlay: OverlayDiagnostics,
}

impl RouterStatus {
    /// Number of connections in the established state.
    pub fn established_count(&self) -> usize {
        self.connections
            .iter()
            .filter(|c| c.state.is_established())
            .count()
    }
}
