//! Metric observations produced by one collection cycle.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// One labeled sample.
///
/// Names are unprefixed (`connections`, `bytes_total`); the exporter adds
/// the namespace.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricObservation {
    pub name: &'static str,
    pub kind: MetricKind,
    pub value: f64,
    pub labels: Vec<(&'static str, String)>,
}

impl MetricObservation {
    pub fn gauge(name: &'static str, value: f64) -> Self {
        Self {
            name,
            kind: MetricKind::Gauge,
            value,
            labels: Vec::new(),
        }
    }

    pub fn counter(name: &'static str, value: f64) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            value,
            labels: Vec::new(),
        }
    }

    pub fn with_label(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.labels.push((name, value.into()));
        self
    }

    /// Returns the value of label `name`, if set.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}
