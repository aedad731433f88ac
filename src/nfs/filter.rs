// Mount-point regex filters and per-version NFS operation tables.

use crate::error::{NfsError, PatternKind, Result};
use regex::Regex;
use std::collections::HashSet;

/// NFSv3 procedures as they appear in the per-op section of mountstats.
pub const NFS3_OPERATIONS: &[&str] = &[
    "NULL",
    "GETATTR",
    "SETATTR",
    "LOOKUP",
    "ACCESS",
    "READLINK",
    "READ",
    "WRITE",
    "CREATE",
    "MKDIR",
    "SYMLINK",
    "MKNOD",
    "REMOVE",
    "RMDIR",
    "RENAME",
    "LINK",
    "READDIR",
    "READDIRPLUS",
    "FSSTAT",
    "FSINFO",
    "PATHCONF",
    "COMMIT",
];

/// NFSv4 client operations as they appear in the per-op section of mountstats.
pub const NFS4_OPERATIONS: &[&str] = &[
    "NULL",
    "READ",
    "WRITE",
    "COMMIT",
    "OPEN",
    "OPEN_CONFIRM",
    "OPEN_NOATTR",
    "OPEN_DOWNGRADE",
    "CLOSE",
    "SETATTR",
    "FSINFO",
    "RENEW",
    "SETCLIENTID",
    "SETCLIENTID_CONFIRM",
    "LOCK",
    "LOCKT",
    "LOCKU",
    "ACCESS",
    "GETATTR",
    "LOOKUP",
    "LOOKUP_ROOT",
    "REMOVE",
    "RENAME",
    "LINK",
    "SYMLINK",
    "CREATE",
    "PATHCONF",
    "STATFS",
    "READLINK",
    "READDIR",
    "SERVER_CAPS",
    "DELEGRETURN",
    "GETACL",
    "SETACL",
    "FS_LOCATIONS",
    "RELEASE_LOCKOWNER",
    "SECINFO",
    "FSID_PRESENT",
    "EXCHANGE_ID",
    "CREATE_SESSION",
    "DESTROY_SESSION",
    "SEQUENCE",
    "GET_LEASE_TIME",
    "RECLAIM_COMPLETE",
    "LAYOUTGET",
    "GETDEVICEINFO",
    "LAYOUTCOMMIT",
    "LAYOUTRETURN",
    "SECINFO_NO_NAME",
    "TEST_STATEID",
    "FREE_STATEID",
    "GETDEVICELIST",
    "BIND_CONN_TO_SESSION",
    "DESTROY_CLIENTID",
    "SEEK",
    "ALLOCATE",
    "DEALLOCATE",
    "LAYOUTSTATS",
    "CLONE",
    "COPY",
    "OFFLOAD_CANCEL",
    "LOOKUPP",
    "LAYOUTERROR",
    "COPY_NOTIFY",
    "GETXATTR",
    "SETXATTR",
    "LISTXATTRS",
    "REMOVEXATTR",
    "READ_PLUS",
];

/// Compiled include/exclude patterns for mount points.
#[derive(Debug, Clone, Default)]
pub struct MountFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl MountFilter {
    /// Compile all patterns up front; the first bad pattern fails the whole filter.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: compile(include, PatternKind::Include)?,
            exclude: compile(exclude, PatternKind::Exclude)?,
        })
    }

    /// No include patterns means every mount is included.
    pub fn accepts(&self, mount: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|r| r.is_match(mount));
        included && !self.exclude.iter().any(|r| r.is_match(mount))
    }
}

fn compile<S: AsRef<str>>(patterns: &[S], kind: PatternKind) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            let pattern = p.as_ref();
            Regex::new(pattern).map_err(|source| NfsError::InvalidPattern {
                kind,
                pattern: pattern.to_string(),
                source,
            })
        })
        .collect()
}

/// Operations tracked for NFSv3 and NFSv4 after include/exclude narrowing.
#[derive(Debug, Clone)]
pub struct OperationTable {
    nfs3: HashSet<&'static str>,
    nfs4: HashSet<&'static str>,
}

impl Default for OperationTable {
    fn default() -> Self {
        Self::new::<&str>(&[], &[])
    }
}

impl OperationTable {
    /// An empty include list tracks each version's full vocabulary. The same lists
    /// apply to both versions; names outside a version's vocabulary are ignored.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Self {
        Self {
            nfs3: narrow(NFS3_OPERATIONS, include, exclude),
            nfs4: narrow(NFS4_OPERATIONS, include, exclude),
        }
    }

    /// Whether `op` is tracked for the given version string ("3" or "4").
    pub fn tracks(&self, version: &str, op: &str) -> bool {
        match version {
            "3" => self.nfs3.contains(op),
            "4" => self.nfs4.contains(op),
            _ => false,
        }
    }

    pub fn nfs3_len(&self) -> usize {
        self.nfs3.len()
    }

    pub fn nfs4_len(&self) -> usize {
        self.nfs4.len()
    }
}

fn narrow<S: AsRef<str>>(
    vocabulary: &'static [&'static str],
    include: &[S],
    exclude: &[S],
) -> HashSet<&'static str> {
    vocabulary
        .iter()
        .copied()
        .filter(|op| include.is_empty() || include.iter().any(|i| i.as_ref() == *op))
        .filter(|op| !exclude.iter().any(|e| e.as_ref() == *op))
        .collect()
}
