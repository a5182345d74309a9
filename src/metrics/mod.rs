//! Metric derivation and export.
//!
//! `MetricsCollector` turns subsystem snapshots into `MetricObservation`s;
//! `PrometheusExporter` serves them through a `prometheus::Registry`.

pub mod collector;
pub mod exporter;
pub mod flow_tag;

pub use collector::MetricsCollector;
pub use exporter::{DEFAULT_NAMESPACE, PrometheusExporter, registry_with, render_text};
pub use flow_tag::flow_tag;
