// Maps one mountstats statistics line to metrics.

use super::filter::OperationTable;
use super::scanner::MountContext;
use crate::models::{Measurement, Metric};
use std::collections::BTreeMap;

/// `events:` counters, in kernel order.
pub const EVENTS_FIELDS: &[&str] = &[
    "inoderevalidates",
    "dentryrevalidates",
    "datainvalidates",
    "attrinvalidates",
    "vfsopen",
    "vfslookup",
    "vfsaccess",
    "vfsupdatepage",
    "vfsreadpage",
    "vfsreadpages",
    "vfswritepage",
    "vfswritepages",
    "vfsgetdents",
    "vfssetattr",
    "vfsflush",
    "vfsfsync",
    "vfslock",
    "vfsrelease",
    "congestionwait",
    "setattrtrunc",
    "extendwrite",
    "sillyrenames",
    "shortreads",
    "shortwrites",
    "delay",
    "pnfsreads",
    "pnfswrites",
];

/// `bytes:` counters.
pub const BYTES_FIELDS: &[&str] = &[
    "normalreadbytes",
    "normalwritebytes",
    "directreadbytes",
    "directwritebytes",
    "serverreadbytes",
    "serverwritebytes",
    "readpages",
    "writepages",
];

pub const XPRT_UDP_FIELDS: &[&str] = &[
    "bind_count",
    "rpcsends",
    "rpcreceives",
    "badxids",
    "inflightsends",
    "backlogutil",
];

pub const XPRT_TCP_FIELDS: &[&str] = &[
    "bind_count",
    "connect_count",
    "connect_time",
    "idle_time",
    "rpcsends",
    "rpcreceives",
    "badxids",
    "inflightsends",
    "backlogutil",
];

/// Per-operation counters.
pub const OPS_FIELDS: &[&str] = &[
    "ops",
    "trans",
    "timeouts",
    "bytes_sent",
    "bytes_recv",
    "queue_time",
    "response_time",
    "total_time",
    "errors",
];

/// xprt numeric fields start with the transport name (converted to 0) and the port.
const XPRT_OFFSET: usize = 2;

/// READ/WRITE summaries read up to field[7].
const BASIC_MIN_FIELDS: usize = 8;

/// Drop the first ':' so "READ:" and "events:" match their bare names.
pub fn category_key(token: &str) -> String {
    token.replacen(':', "", 1)
}

/// Turns statistics lines into metrics for one mount context.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    fullstat: bool,
    operations: &'a OperationTable,
}

impl<'a> Classifier<'a> {
    pub fn new(fullstat: bool, operations: &'a OperationTable) -> Self {
        Self {
            fullstat,
            operations,
        }
    }

    /// `tokens` is the raw split line; `fields` is the converted `tokens[1..]`.
    /// Each rule is checked independently, so one line may yield several metrics.
    pub fn classify(&self, ctx: &MountContext, tokens: &[&str], fields: &[u64]) -> Vec<Metric> {
        let mut out = Vec::new();
        let Some(first) = tokens.first() else {
            return out;
        };
        let key = category_key(first);

        if (key == "READ" || key == "WRITE") && fields.len() >= BASIC_MIN_FIELDS {
            out.push(basic(ctx, &key, fields));
        }

        if !self.fullstat {
            return out;
        }

        match key.as_str() {
            "events" if fields.len() >= EVENTS_FIELDS.len() => {
                out.push(positional(
                    Measurement::Events,
                    tags(ctx, None),
                    EVENTS_FIELDS,
                    fields,
                ));
            }
            "bytes" if fields.len() >= BYTES_FIELDS.len() => {
                out.push(positional(
                    Measurement::Bytes,
                    tags(ctx, None),
                    BYTES_FIELDS,
                    fields,
                ));
            }
            "xprt" => {
                if let Some(metric) = xprt(ctx, tokens.get(1).copied(), fields) {
                    out.push(metric);
                }
            }
            _ => {}
        }

        if self.operations.tracks(&ctx.version, &key) && fields.len() <= OPS_FIELDS.len() {
            let mut metric = Metric::new(Measurement::Ops, tags(ctx, Some(&key)));
            for (name, value) in OPS_FIELDS.iter().zip(fields) {
                metric.push(name, *value);
            }
            out.push(metric);
        }

        out
    }
}

fn tags(ctx: &MountContext, operation: Option<&str>) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    tags.insert("mountpoint".to_string(), ctx.mount.clone());
    tags.insert("serverexport".to_string(), ctx.export.clone());
    if let Some(op) = operation {
        tags.insert("operation".to_string(), op.to_string());
    }
    tags
}

fn basic(ctx: &MountContext, op: &str, f: &[u64]) -> Metric {
    let mut metric = Metric::new(Measurement::Basic, tags(ctx, Some(op)));
    let rtt_per_op = if f[0] > 0 {
        f[6] as f64 / f[0] as f64
    } else {
        0.0
    };
    metric.push("ops", f[0]);
    metric.push("retrans", f[1].saturating_sub(f[0]));
    metric.push("bytes", f[3].saturating_add(f[4]));
    metric.push("rtt", f[6]);
    metric.push("exe", f[7]);
    metric.push("rtt_per_op", rtt_per_op);
    metric
}

fn positional(
    measurement: Measurement,
    tags: BTreeMap<String, String>,
    names: &[&str],
    values: &[u64],
) -> Metric {
    let mut metric = Metric::new(measurement, tags);
    for (name, value) in names.iter().zip(values) {
        metric.push(name, *value);
    }
    metric
}

fn xprt(ctx: &MountContext, transport: Option<&str>, fields: &[u64]) -> Option<Metric> {
    let (measurement, names) = match transport? {
        "tcp" => (Measurement::XprtTcp, XPRT_TCP_FIELDS),
        "udp" => (Measurement::XprtUdp, XPRT_UDP_FIELDS),
        _ => return None,
    };
    if fields.len() < names.len() + XPRT_OFFSET {
        return None;
    }
    Some(positional(
        measurement,
        tags(ctx, None),
        names,
        &fields[XPRT_OFFSET..],
    ))
}
