//! Flow classification for per-flow metric labels.

use crate::model::{FlowKey, FlowStatus};

/// Tag for flows without a recognized key.
pub const OTHER_FLOW: &str = "other";

/// Derives the `flow` label for a datapath flow.
///
/// The first Ethernet key found gives `"<src>-><dst>"`; its mask is not
/// considered, so flows differing only in mask share a tag. Flows with no
/// Ethernet key are tagged `"other"`.
pub fn flow_tag(flow: &FlowStatus) -> String {
    flow.keys
        .iter()
        .find_map(|key| match key {
            FlowKey::Ethernet(eth) => Some(format!("{}->{}", eth.key.src, eth.key.dst)),
            _ => None,
        })
        .unwrap_or_else(|| OTHER_FLOW.to_string())
}
