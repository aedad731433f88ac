// Collector error types

use std::path::PathBuf;
use thiserror::Error;

/// Which mount pattern list a bad regex came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Include,
    Exclude,
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternKind::Include => f.write_str("include"),
            PatternKind::Exclude => f.write_str("exclude"),
        }
    }
}

#[derive(Debug, Error)]
pub enum NfsError {
    #[error("mountstats file not found: {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A counter did not fit in a u64. The kernel format is not what we expect,
    /// so no data from this cycle is trusted past this point.
    #[error("could not parse stat line: value {token:?} out of range in line {line:?}")]
    Overflow { line: String, token: String },

    #[error("failed to compile {kind} mount pattern {pattern:?}: {source}")]
    InvalidPattern {
        kind: PatternKind,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T> = std::result::Result<T, NfsError>;
