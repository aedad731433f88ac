// Line-oriented state machine over /proc/self/mountstats.
//
// A block starts at a "device <export> mounted on <mount> with fstype nfs..." line.
// The "RPC iostats version: ... p/v: <prog>/<vers> (nfs)" line that follows sets the
// protocol version. Every other non-empty line inside a block is a statistics line.

use super::classify::Classifier;
use super::convert::{FieldOverflow, convert_to_u64};
use super::filter::MountFilter;
use crate::accumulator::Accumulator;
use crate::error::{NfsError, Result};
use std::io::BufRead;
use std::path::Path;

/// Mount, export and NFS version the scanner is currently inside.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountContext {
    pub mount: String,
    pub export: String,
    pub version: String,
}

impl MountContext {
    /// Apply a block-start or version-marker line. Returns true if the line changed state.
    pub fn observe(&mut self, tokens: &[&str]) -> bool {
        if let Some((mount, export)) = block_start(tokens) {
            self.mount = mount.to_string();
            self.export = export.to_string();
            return true;
        }
        if let Some(version) = version_marker(tokens) {
            self.version = version.to_string();
            return true;
        }
        false
    }

    pub fn in_mount(&self) -> bool {
        !self.mount.is_empty()
    }
}

/// `(mount, export)` if this line opens an NFS mount block. The version is left alone.
pub fn block_start<'a>(tokens: &[&'a str]) -> Option<(&'a str, &'a str)> {
    if tokens.len() > 4
        && tokens.contains(&"fstype")
        && (tokens.contains(&"nfs") || tokens.contains(&"nfs4"))
    {
        Some((tokens[4], tokens[1]))
    } else {
        None
    }
}

/// Version from the `p/v:` token of an `(nfs)`/`(nfs4)` line.
/// A token without '/' carries no version and leaves the current one untouched.
pub fn version_marker<'a>(tokens: &[&'a str]) -> Option<&'a str> {
    if tokens.len() > 5 && (tokens.contains(&"(nfs)") || tokens.contains(&"(nfs4)")) {
        tokens[5].split('/').nth(1)
    } else {
        None
    }
}

/// One pass over a mountstats snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'a> {
    mounts: &'a MountFilter,
    classifier: Classifier<'a>,
}

impl<'a> Scanner<'a> {
    pub fn new(mounts: &'a MountFilter, classifier: Classifier<'a>) -> Self {
        Self { mounts, classifier }
    }

    /// Walk every line of `reader`, feeding metrics to `acc`.
    ///
    /// A counter overflow stops the scan and is returned; metrics already handed
    /// to `acc` stay there. `path` only labels I/O errors.
    ///
    /// Mount paths are raw kernel bytes, so lines are decoded lossily rather than
    /// rejected when they are not valid UTF-8.
    pub fn scan<R, A>(&self, mut reader: R, path: &Path, acc: &mut A) -> Result<()>
    where
        R: BufRead,
        A: Accumulator + ?Sized,
    {
        let mut ctx = MountContext::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| NfsError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            if read == 0 {
                break;
            }
            let decoded = String::from_utf8_lossy(&buf);
            let line = decoded.trim_end();
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }

            ctx.observe(&tokens);

            // Nothing before the first block belongs to a mount.
            if !ctx.in_mount() {
                continue;
            }

            if !self.mounts.accepts(&ctx.mount) {
                continue;
            }

            let fields = match convert_to_u64(&tokens) {
                Ok(fields) => fields,
                Err(FieldOverflow { token }) => {
                    return Err(NfsError::Overflow {
                        line: line.to_string(),
                        token,
                    });
                }
            };

            if fields.is_empty() {
                tracing::warn!(line = %line, mount = %ctx.mount, "stat line with one field");
                continue;
            }

            for metric in self.classifier.classify(&ctx, &tokens, &fields) {
                acc.add_metric(metric);
            }
        }

        Ok(())
    }
}
