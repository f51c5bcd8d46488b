//! Job fingerprints: the resume key that ties ledger state to an input file.
//!
//! A fingerprint must be stable across process restarts for the *same* file
//! and change when the file does. We build it from the file stem plus size
//! and mtime rather than hashing content: stat is free, the resulting ledger
//! directories are human-readable, and a re-encoded or replaced file gets a
//! fresh key either way.

use std::fmt;
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::error::{Error, Result};

/// A stable identifier for one input file, usable as a directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobFingerprint(String);

impl JobFingerprint {
    /// Fingerprint the file at `path`.
    ///
    /// Fails with `SourceUnreadable` when the file cannot be stat'ed, since a
    /// file we cannot stat is a file we cannot transcribe either.
    pub fn for_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path)
            .map_err(|err| Error::source_unreadable(path, err))?;
        if !meta.is_file() {
            return Err(Error::source_unreadable(path, "not a regular file"));
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("input");
        let mtime_seconds = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Ok(Self(format!(
            "{}-{}-{}",
            sanitize(stem),
            meta.len(),
            mtime_seconds
        )))
    }

    /// The fingerprint as a filesystem-safe string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replace anything outside `[A-Za-z0-9._-]` so the stem is safe as a
/// directory name component on every platform we care about.
fn sanitize(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "input".to_string()
    } else {
        cleaned
    }
}
