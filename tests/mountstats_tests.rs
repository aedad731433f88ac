// End-to-end mountstats scanning: file -> NfsClient::gather -> metrics

mod common;

use common::*;
use nfsclient::config::NfsClientConfig;
use nfsclient::error::NfsError;
use nfsclient::models::{FieldValue, Measurement};
use nfsclient::nfs::NfsClient;

#[test]
fn test_basic_mode_emits_only_read_write() {
    let file = write_mountstats(MOUNTSTATS);
    let client = client_for(&NfsClientConfig::default(), &file);
    let metrics = client.collect().unwrap();

    assert_eq!(metrics.len(), 3);
    assert!(metrics.iter().all(|m| m.measurement == Measurement::Basic));

    let read = &metrics[0];
    assert_eq!(read.tag("mountpoint"), Some("/mnt/home"));
    assert_eq!(read.tag("serverexport"), Some("nfs3srv:/export/home"));
    assert_eq!(read.tag("operation"), Some("READ"));
    assert_eq!(read.field("ops"), Some(FieldValue::Uint(10)));
    assert_eq!(read.field("bytes"), Some(FieldValue::Uint(100)));
    assert_eq!(read.field("rtt"), Some(FieldValue::Uint(5)));
    assert_eq!(read.field("exe"), Some(FieldValue::Uint(0)));
    assert_eq!(read.field("rtt_per_op"), Some(FieldValue::Float(0.5)));

    let write = &metrics[1];
    assert_eq!(write.tag("operation"), Some("WRITE"));
    assert_eq!(write.field("retrans"), Some(FieldValue::Uint(2)));
    assert_eq!(write.field("bytes"), Some(FieldValue::Uint(440)));
    assert_eq!(write.field("rtt_per_op"), Some(FieldValue::Float(5.0)));

    let v4_read = &metrics[2];
    assert_eq!(v4_read.tag("mountpoint"), Some("/mnt/scratch"));
    assert_eq!(v4_read.field("rtt_per_op"), Some(FieldValue::Float(0.0)));
}

#[test]
fn test_fullstat_mode_emits_all_categories() {
    let file = write_mountstats(MOUNTSTATS);
    let client = client_for(&fullstat(), &file);
    let metrics = client.collect().unwrap();

    let home: Vec<Measurement> = for_mount(&metrics, "/mnt/home")
        .iter()
        .map(|m| m.measurement)
        .collect();
    assert_eq!(
        home,
        [
            Measurement::Events,
            Measurement::Bytes,
            Measurement::XprtTcp,
            Measurement::Ops,
            Measurement::Ops,
            Measurement::Basic,
            Measurement::Ops,
            Measurement::Basic,
            Measurement::Ops,
        ]
    );

    let scratch: Vec<Measurement> = for_mount(&metrics, "/mnt/scratch")
        .iter()
        .map(|m| m.measurement)
        .collect();
    assert_eq!(
        scratch,
        [
            Measurement::Bytes,
            Measurement::XprtUdp,
            Measurement::Ops,
            Measurement::Basic,
            Measurement::Ops,
            Measurement::Ops,
            Measurement::Ops,
        ]
    );
}

#[test]
fn test_xprt_counters_are_offset_past_port() {
    let file = write_mountstats(MOUNTSTATS);
    let metrics = client_for(&fullstat(), &file).collect().unwrap();

    let tcp = metrics
        .iter()
        .find(|m| m.measurement == Measurement::XprtTcp)
        .unwrap();
    assert_eq!(tcp.field("bind_count"), Some(FieldValue::Uint(1)));
    assert_eq!(tcp.field("connect_count"), Some(FieldValue::Uint(2)));
    assert_eq!(tcp.field("idle_time"), Some(FieldValue::Uint(10)));
    assert_eq!(tcp.field("rpcsends"), Some(FieldValue::Uint(300)));
    assert_eq!(tcp.field("inflightsends"), Some(FieldValue::Uint(300)));
    assert!(tcp.tag("operation").is_none());

    let udp = metrics
        .iter()
        .find(|m| m.measurement == Measurement::XprtUdp)
        .unwrap();
    assert_eq!(udp.fields.len(), 6);
    assert_eq!(udp.field("bind_count"), Some(FieldValue::Uint(1)));
    assert_eq!(udp.field("rpcreceives"), Some(FieldValue::Uint(20)));
}

#[test]
fn test_ops_follow_version_vocabulary() {
    let file = write_mountstats(MOUNTSTATS);
    let metrics = client_for(&fullstat(), &file).collect().unwrap();

    let ops: Vec<(&str, &str)> = metrics
        .iter()
        .filter(|m| m.measurement == Measurement::Ops)
        .map(|m| {
            (
                m.tag("mountpoint").unwrap(),
                m.tag("operation").unwrap(),
            )
        })
        .collect();
    assert_eq!(
        ops,
        [
            ("/mnt/home", "NULL"),
            ("/mnt/home", "GETATTR"),
            ("/mnt/home", "READ"),
            ("/mnt/home", "WRITE"),
            ("/mnt/scratch", "NULL"),
            ("/mnt/scratch", "READ"),
            ("/mnt/scratch", "SEQUENCE"),
            ("/mnt/scratch", "GETATTR"),
        ]
    );

    let getattr = metrics
        .iter()
        .find(|m| m.measurement == Measurement::Ops && m.tag("operation") == Some("GETATTR"))
        .unwrap();
    let values: Vec<u64> = getattr
        .fields
        .iter()
        .map(|(_, v)| v.as_u64().unwrap())
        .collect();
    assert_eq!(values, [5, 5, 0, 0, 0, 2, 1, 0, 0]);
}

#[test]
fn test_include_operations_narrows_ops() {
    let file = write_mountstats(MOUNTSTATS);
    let config = NfsClientConfig {
        fullstat: true,
        include_operations: vec!["SEQUENCE".into(), "READ".into()],
        exclude_operations: vec!["READ".into()],
        ..Default::default()
    };
    let metrics = client_for(&config, &file).collect().unwrap();
    let ops: Vec<&str> = metrics
        .iter()
        .filter(|m| m.measurement == Measurement::Ops)
        .map(|m| m.tag("operation").unwrap())
        .collect();
    assert_eq!(ops, ["SEQUENCE"]);

    // READ/WRITE summaries do not depend on the operation table.
    let basic = metrics
        .iter()
        .filter(|m| m.measurement == Measurement::Basic)
        .count();
    assert_eq!(basic, 3);
}

#[test]
fn test_mount_include_pattern_drops_other_mounts() {
    let file = write_mountstats(MOUNTSTATS);
    let config = NfsClientConfig {
        fullstat: true,
        include_mounts: vec!["^/mnt/sc".into()],
        ..Default::default()
    };
    let metrics = client_for(&config, &file).collect().unwrap();
    assert!(for_mount(&metrics, "/mnt/home").is_empty());
    assert_eq!(for_mount(&metrics, "/mnt/scratch").len(), 7);
}

#[test]
fn test_mount_exclude_wins_over_include() {
    let file = write_mountstats(MOUNTSTATS);
    let config = NfsClientConfig {
        include_mounts: vec!["^/mnt/".into()],
        exclude_mounts: vec!["home$".into()],
        ..Default::default()
    };
    let metrics = client_for(&config, &file).collect().unwrap();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].tag("mountpoint"), Some("/mnt/scratch"));
}

#[test]
fn test_invalid_mount_pattern_fails_at_init() {
    let config = NfsClientConfig {
        exclude_mounts: vec!["(unclosed".into()],
        ..Default::default()
    };
    let err = NfsClient::with_path(&config, "/nonexistent").unwrap_err();
    assert!(matches!(err, NfsError::InvalidPattern { .. }));
    assert!(err.to_string().contains("(unclosed"));
}

#[test]
fn test_rescan_is_identical() {
    let file = write_mountstats(MOUNTSTATS);
    let client = client_for(&fullstat(), &file);
    let first = client.collect().unwrap();
    let second = client.collect().unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_overflow_fails_cycle() {
    let text = format!("{MOUNTSTATS}\t       WRITE: 1 1 0 18446744073709551616 0 0 0 0 0\n");
    let file = write_mountstats(&text);
    let client = client_for(&NfsClientConfig::default(), &file);

    let mut metrics = Vec::new();
    let err = client.gather(&mut metrics).unwrap_err();
    assert!(matches!(err, NfsError::Overflow { .. }));
    // Lines before the bad one were already delivered.
    assert_eq!(metrics.len(), 3);
}

#[test]
fn test_garbage_counter_is_zero_not_error() {
    let text = "\
device srv:/e mounted on /m with fstype nfs statvers=1.1
\tRPC iostats version: 1.0  p/v: 100003/3 (nfs)
\t        READ: 10 ten 0 100 0 50 5 0
";
    let file = write_mountstats(text);
    let metrics = client_for(&NfsClientConfig::default(), &file)
        .collect()
        .unwrap();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].field("retrans"), Some(FieldValue::Uint(0)));
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("mountstats");
    let client = NfsClient::with_path(&NfsClientConfig::default(), &path).unwrap();
    let err = client.collect().unwrap_err();
    match err {
        NfsError::NotFound { path: p } => assert_eq!(p, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_no_nfs_mounts_yields_nothing() {
    let file = write_mountstats(
        "device rootfs mounted on / with fstype rootfs\ndevice proc mounted on /proc with fstype proc\n",
    );
    let metrics = client_for(&fullstat(), &file).collect().unwrap();
    assert!(metrics.is_empty());
}

#[test]
fn test_non_utf8_mount_path_keeps_other_mounts() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"device srv:/a mounted on /mnt/caf\xe9 with fstype ext4\n")
        .unwrap();
    file.write_all(MOUNTSTATS.as_bytes()).unwrap();

    let metrics = client_for(&fullstat(), &file).collect().unwrap();
    assert_eq!(metrics.len(), 16);
    assert_eq!(for_mount(&metrics, "/mnt/home").len(), 9);
    assert_eq!(for_mount(&metrics, "/mnt/scratch").len(), 7);
}
