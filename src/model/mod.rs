//! Snapshot records shared by the aggregator, collector and providers.
//!
//! Every type here is an owned copy: once built it needs no lock to read.

pub mod connection;
pub mod dns;
pub mod flow;
pub mod ipam;
pub mod observation;
pub mod status;

pub use connection::{ConnectionState, ConnectionStatus, OverlayDiagnostics, RouterStatus};
pub use dns::EntryStatus;
pub use flow::{
    EthernetAddrs, EthernetFlowKey, FastDpStatus, FlowKey, FlowStatus, HardwareAddr,
    Ipv4FlowKey, TunnelFlowKey,
};
pub use ipam::IpamStatus;
pub use observation::{MetricKind, MetricObservation};
pub use status::StatusRecord;
