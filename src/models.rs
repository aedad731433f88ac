// Metric records emitted by the mountstats scanner

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Measurement a metric belongs to. Serializes to the wire name (e.g. "nfs_ops").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measurement {
    /// READ/WRITE summary, always collected.
    #[serde(rename = "nfsstat")]
    Basic,
    #[serde(rename = "nfs_events")]
    Events,
    #[serde(rename = "nfs_bytes")]
    Bytes,
    #[serde(rename = "nfs_xprt_tcp")]
    XprtTcp,
    #[serde(rename = "nfs_xprt_udp")]
    XprtUdp,
    #[serde(rename = "nfs_ops")]
    Ops,
}

impl Measurement {
    pub fn name(&self) -> &'static str {
        match self {
            Measurement::Basic => "nfsstat",
            Measurement::Events => "nfs_events",
            Measurement::Bytes => "nfs_bytes",
            Measurement::XprtTcp => "nfs_xprt_tcp",
            Measurement::XprtUdp => "nfs_xprt_udp",
            Measurement::Ops => "nfs_ops",
        }
    }
}

impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A counter value. Everything is a u64 except `rtt_per_op`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Uint(u64),
    Float(f64),
}

impl FieldValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Uint(v) => Some(*v),
            FieldValue::Float(_) => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            FieldValue::Uint(v) => *v as f64,
            FieldValue::Float(v) => *v,
        }
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::Uint(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

/// One emitted measurement. Fields keep the order they were named in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub measurement: Measurement,
    pub tags: BTreeMap<String, String>,
    pub fields: Vec<(String, FieldValue)>,
}

impl Metric {
    pub fn new(measurement: Measurement, tags: BTreeMap<String, String>) -> Self {
        Self {
            measurement,
            tags,
            fields: Vec::new(),
        }
    }

    pub fn push(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.push((name.to_string(), value.into()));
    }

    pub fn field(&self, name: &str) -> Option<FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }
}

/// All metrics from one collection cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Unix millis when the cycle finished.
    pub timestamp: u64,
    pub metrics: Vec<Metric>,
}
