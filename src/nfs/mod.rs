// NFS client statistics from /proc/self/mountstats.
//
// `NfsClient` is built once from config (regexes compiled, operation tables fixed)
// and is read-only afterwards, so one instance can be shared across cycles.

pub mod classify;
pub mod convert;
pub mod filter;
pub mod scanner;

use crate::accumulator::Accumulator;
use crate::config::NfsClientConfig;
use crate::error::{NfsError, Result};
use crate::models::Metric;
use classify::Classifier;
use filter::{MountFilter, OperationTable};
use scanner::Scanner;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

pub use scanner::MountContext;

/// Kernel-provided mountstats for the current process.
pub const DEFAULT_MOUNTSTATS_PATH: &str = "/proc/self/mountstats";

/// Environment variable overriding the mountstats location.
pub const MOUNT_PROC_ENV: &str = "MOUNT_PROC";

/// `$MOUNT_PROC` if set and non-empty, else `/proc/self/mountstats`.
pub fn mountstats_path() -> PathBuf {
    resolve_mountstats_path(std::env::var(MOUNT_PROC_ENV).ok().as_deref())
}

/// Location from an override value; unset and empty both fall back to the default.
pub fn resolve_mountstats_path(override_path: Option<&str>) -> PathBuf {
    match override_path {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => PathBuf::from(DEFAULT_MOUNTSTATS_PATH),
    }
}

#[derive(Debug, Clone)]
pub struct NfsClient {
    fullstat: bool,
    mounts: MountFilter,
    operations: OperationTable,
    path: PathBuf,
}

impl NfsClient {
    /// Build from config, reading the file location from the environment.
    pub fn new(config: &NfsClientConfig) -> Result<Self> {
        Self::with_path(config, mountstats_path())
    }

    /// Build from config with an explicit mountstats location. Fails on a bad mount pattern.
    pub fn with_path(config: &NfsClientConfig, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!(path = %path.display(), "using mountstats file");

        if config.include_mounts.is_empty() {
            debug!("including all mounts");
        } else {
            debug!(patterns = ?config.include_mounts, "including mount patterns");
        }
        if config.exclude_mounts.is_empty() {
            debug!("not excluding any mounts");
        } else {
            debug!(patterns = ?config.exclude_mounts, "excluding mount patterns");
        }
        if config.include_operations.is_empty() {
            debug!("including all operations");
        } else {
            debug!(operations = ?config.include_operations, "including operations");
        }
        if config.exclude_operations.is_empty() {
            debug!("not excluding any operations");
        } else {
            debug!(operations = ?config.exclude_operations, "excluding operations");
        }

        let mounts = MountFilter::new(&config.include_mounts, &config.exclude_mounts)?;
        let operations =
            OperationTable::new(&config.include_operations, &config.exclude_operations);

        Ok(Self {
            fullstat: config.fullstat,
            mounts,
            operations,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fullstat(&self) -> bool {
        self.fullstat
    }

    pub fn operations(&self) -> &OperationTable {
        &self.operations
    }

    /// Scanner borrowing this client's filters.
    pub fn scanner(&self) -> Scanner<'_> {
        Scanner::new(
            &self.mounts,
            Classifier::new(self.fullstat, &self.operations),
        )
    }

    /// One collection cycle: open the file, scan it, close it (on every path).
    #[instrument(skip(self, acc), fields(operation = "gather", path = %self.path.display()))]
    pub fn gather<A: Accumulator + ?Sized>(&self, acc: &mut A) -> Result<()> {
        let file = File::open(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                NfsError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                NfsError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        self.scanner().scan(BufReader::new(file), &self.path, acc)
    }

    /// `gather` into a fresh vec.
    pub fn collect(&self) -> Result<Vec<Metric>> {
        let mut metrics = Vec::new();
        self.gather(&mut metrics)?;
        Ok(metrics)
    }
}
