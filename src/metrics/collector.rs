//! Per-scrape derivation of metric observations from subsystem snapshots.

use std::collections::BTreeMap;

use tracing::debug;

use super::flow_tag::flow_tag;
use crate::model::dns::{count_entries, count_entries_for_peer};
use crate::model::{MetricObservation, RouterStatus};
use crate::nameserver::snapshot_entries;
use crate::provider::Subsystems;

pub const CONNECTIONS: &str = "connections";
pub const FLOWS: &str = "flows";
pub const BYTES_TOTAL: &str = "bytes_total";
pub const PACKETS_TOTAL: &str = "packets_total";
pub const IPS: &str = "ips";
pub const DNS_ENTRIES: &str = "dns_entries";

/// Label value carrying the sum over all flows.
pub const TOTAL_FLOW: &str = "total";

/// Derives metric observations from fresh snapshots on every call.
///
/// Holds no state between cycles. Subsystems that are absent simply
/// contribute nothing to a cycle.
#[derive(Clone, Debug)]
pub struct MetricsCollector {
    subsystems: Subsystems,
}

impl MetricsCollector {
    pub fn new(subsystems: Subsystems) -> Self {
        Self { subsystems }
    }

    /// Runs one collection cycle.
    pub fn collect(&self) -> Vec<MetricObservation> {
        let mut out = Vec::new();
        let mut local_peer = None;

        if let Some(router) = &self.subsystems.router {
            let status = router.status();
            collect_connections(&status, &mut out);
            collect_flows(&status, &mut out);
            local_peer = Some(router.local_peer());
        }

        if let Some(allocator) = &self.subsystems.allocator {
            let ipam = allocator.status(None);
            out.push(
                MetricObservation::gauge(IPS, ipam.range_num_ips as f64).with_label("state", "total"),
            );
            out.push(
                MetricObservation::gauge(IPS, ipam.active_ips as f64)
                    .with_label("state", "local-used"),
            );
        }

        if let Some(store) = &self.subsystems.entries {
            let entries = snapshot_entries(store);
            out.push(
                MetricObservation::gauge(DNS_ENTRIES, count_entries(&entries) as f64)
                    .with_label("state", "total"),
            );
            if let Some(peer) = &local_peer {
                out.push(
                    MetricObservation::gauge(
                        DNS_ENTRIES,
                        count_entries_for_peer(peer, &entries) as f64,
                    )
                    .with_label("state", "local"),
                );
            }
        }

        debug!(observations = out.len(), "collected metrics");
        out
    }
}

fn collect_connections(status: &RouterStatus, out: &mut Vec<MetricObservation>) {
    let established = status.established_count();
    let others = status.connections.len() - established;

    out.push(
        MetricObservation::gauge(CONNECTIONS, others as f64).with_label("state", "non-established"),
    );
    out.push(
        MetricObservation::gauge(CONNECTIONS, established as f64).with_label("state", "established"),
    );
}

fn collect_flows(status: &RouterStatus, out: &mut Vec<MetricObservation>) {
    let Some(fastdp) = &status.overlay.fastdp else {
        return;
    };

    // Flows sharing a tag are summed so each label set is emitted once
    let mut per_tag: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    let mut total_packets: u64 = 0;
    let mut total_bytes: u64 = 0;

    for flow in &fastdp.flows {
        let (packets, bytes) = per_tag.entry(flow_tag(flow)).or_default();
        *packets = packets.saturating_add(flow.packets);
        *bytes = bytes.saturating_add(flow.bytes);
        total_packets = total_packets.saturating_add(flow.packets);
        total_bytes = total_bytes.saturating_add(flow.bytes);
    }

    for (tag, (packets, bytes)) in per_tag {
        out.push(
            MetricObservation::counter(PACKETS_TOTAL, packets as f64)
                .with_label("flow", tag.clone()),
        );
        out.push(MetricObservation::counter(BYTES_TOTAL, bytes as f64).with_label("flow", tag));
    }

    out.push(MetricObservation::gauge(FLOWS, fastdp.flows.len() as f64));
    out.push(
        MetricObservation::counter(BYTES_TOTAL, total_bytes as f64).with_label("flow", TOTAL_FLOW),
    );
    out.push(
        MetricObservation::counter(PACKETS_TOTAL, total_packets as f64)
            .with_label("flow", TOTAL_FLOW),
    );
}
