//! Prometheus transport for `MetricsCollector`.
//!
//! `PrometheusExporter` implements `prometheus::core::Collector`, so it is
//! registered into a caller-owned `Registry` and scraped on demand.

use prometheus::core::{Collector, Desc};
use prometheus::proto::{Counter, Gauge, LabelPair, Metric, MetricFamily, MetricType};
use prometheus::{Registry, TextEncoder};

use super::collector::{
    BYTES_TOTAL, CONNECTIONS, DNS_ENTRIES, FLOWS, IPS, MetricsCollector, PACKETS_TOTAL,
};
use crate::model::{MetricKind, MetricObservation};

pub const DEFAULT_NAMESPACE: &str = "weave";

/// Metric families in scrape order: (name, help, labels, type).
const FAMILIES: &[(&str, &str, &[&str], MetricType)] = &[
    (
        CONNECTIONS,
        "Number of peer-to-peer connections.",
        &["state"],
        MetricType::GAUGE,
    ),
    (FLOWS, "Number of FastDP flows.", &[], MetricType::GAUGE),
    (
        BYTES_TOTAL,
        "Number of bytes transferred.",
        &["flow"],
        MetricType::COUNTER,
    ),
    (
        PACKETS_TOTAL,
        "Number of packets transferred.",
        &["flow"],
        MetricType::COUNTER,
    ),
    (IPS, "Number of IP addresses.", &["state"], MetricType::GAUGE),
    (
        DNS_ENTRIES,
        "Number of DNS entries.",
        &["state"],
        MetricType::GAUGE,
    ),
];

pub struct PrometheusExporter {
    collector: MetricsCollector,
    /// Unprefixed name and descriptor, in `FAMILIES` order.
    descs: Vec<(&'static str, Desc)>,
}

impl PrometheusExporter {
    /// Creates an exporter whose metric names are prefixed with
    /// `<namespace>_`. An empty namespace leaves names unprefixed.
    pub fn new(collector: MetricsCollector, namespace: &str) -> prometheus::Result<Self> {
        let mut descs = Vec::with_capacity(FAMILIES.len());
        for (name, help, labels, _) in FAMILIES {
            let fq_name = if namespace.is_empty() {
                name.to_string()
            } else {
                format!("{}_{}", namespace, name)
            };
            let desc = Desc::new(
                fq_name,
                help.to_string(),
                labels.iter().map(|l| l.to_string()).collect(),
                Default::default(),
            )?;
            descs.push((*name, desc));
        }
        Ok(Self { collector, descs })
    }
}

impl Collector for PrometheusExporter {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().map(|(_, d)| d).collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let observations = self.collector.collect();

        self.descs
            .iter()
            .zip(FAMILIES)
            .filter_map(|((name, desc), (_, _, _, field_type))| {
                let mut mf = MetricFamily::new();
                for obs in observations.iter().filter(|o| o.name == *name) {
                    mf.mut_metric().push(metric(obs));
                }
                if mf.get_metric().is_empty() {
                    return None;
                }
                mf.set_name(desc.fq_name.clone());
                mf.set_help(desc.help.clone());
                mf.set_field_type(*field_type);
                Some(mf)
            })
            .collect()
    }
}

fn metric(obs: &MetricObservation) -> Metric {
    let mut m = Metric::default();

    for (name, value) in &obs.labels {
        let mut l = LabelPair::default();
        l.set_name(name.to_string());
        l.set_value(value.clone());
        m.mut_label().push(l);
    }

    match obs.kind {
        MetricKind::Gauge => {
            let mut g = Gauge::default();
            g.set_value(obs.value);
            m.set_gauge(g);
        }
        MetricKind::Counter => {
            let mut c = Counter::default();
            c.set_value(obs.value);
            m.set_counter(c);
        }
    }
    m
}

/// Builds a registry holding `exporter` and, on Linux, the `process_*`
/// metrics of this process (CPU, memory, open file descriptors).
pub fn registry_with(exporter: PrometheusExporter) -> prometheus::Result<Registry> {
    let registry = Registry::new();
    registry.register(Box::new(exporter))?;
    #[cfg(target_os = "linux")]
    registry.register(Box::new(
        prometheus::process_collector::ProcessCollector::for_self(),
    ))?;
    Ok(registry)
}

/// Gathers `registry` and encodes it in the Prometheus text format.
pub fn render_text(registry: &Registry) -> prometheus::Result<String> {
    TextEncoder::new().encode_to_string(&registry.gather())
}
