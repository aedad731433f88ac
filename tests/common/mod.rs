// Shared test helpers

#![allow(dead_code)]

use nfsclient::config::NfsClientConfig;
use nfsclient::models::Metric;
use nfsclient::nfs::NfsClient;
use std::io::Write;

/// Trimmed /proc/self/mountstats with one non-NFS mount, one NFSv3 mount and one NFSv4 mount.
pub const MOUNTSTATS: &str = "\
device rootfs mounted on / with fstype rootfs
device proc mounted on /proc with fstype proc
device nfs3srv:/export/home mounted on /mnt/home with fstype nfs statvers=1.1
\topts:\trw,vers=3,rsize=1048576,wsize=1048576,namlen=255,acregmin=3,proto=tcp
\tage:\t5123
\tcaps:\tcaps=0x3fc7,wtmult=512,dtsize=32768,bsize=0,namlen=255
\tsec:\tflavor=1,pseudoflavor=1
\tevents:\t3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19 20 21 22 23 24 25 26 27 28 29
\tbytes:\t1000 2000 0 0 1000 2000 250 500
\tRPC iostats version: 1.0  p/v: 100003/3 (nfs)
\txprt:\ttcp 875 1 2 0 10 300 300 0 300 0 2 0 0
\tper-op statistics
\t        NULL: 0 0 0 0 0 0 0 0
\t     GETATTR: 5 5 0 0 0 2 1 0 0
\t        READ: 10 10 0 100 0 50 5 0
\t       WRITE: 4 6 0 400 40 8 20 30 0

device nfs4srv:/srv mounted on /mnt/scratch with fstype nfs4 statvers=1.1
\topts:\trw,vers=4.2,rsize=1048576,wsize=1048576,proto=udp
\tage:\t42
\tbytes:\t1 2 3 4 5 6 7 8
\tRPC iostats version: 1.0  p/v: 100003/4 (nfs)
\txprt:\tudp 0 1 20 20 0 20 0
\tper-op statistics
\t        NULL: 1 1 0 44 24 0 0 0 0
\t        READ: 0 0 0 0 0 0 0 0 0
\t    SEQUENCE: 7 7 0 100 200 1 2 3 0
\t     GETATTR: 3 3 0 0 0 1 1 1 0
";

/// Write `contents` to a temp file the caller keeps alive.
pub fn write_mountstats(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write mountstats");
    file
}

pub fn client_for(config: &NfsClientConfig, file: &tempfile::NamedTempFile) -> NfsClient {
    NfsClient::with_path(config, file.path()).expect("client")
}

pub fn fullstat() -> NfsClientConfig {
    NfsClientConfig {
        fullstat: true,
        ..Default::default()
    }
}

pub fn for_mount<'a>(metrics: &'a [Metric], mount: &str) -> Vec<&'a Metric> {
    metrics
        .iter()
        .filter(|m| m.tag("mountpoint") == Some(mount))
        .collect()
}
