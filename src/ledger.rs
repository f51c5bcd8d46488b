//! Resume ledger: persisted per-chunk recognition results.
//!
//! Recognition is the dominant cost of a run (minutes of wall-clock per chunk
//! for larger models), so losing completed chunks to an interruption is the
//! failure this module defends against. Every completed chunk is published as
//! one JSON artifact under a per-job directory:
//!
//! ```text
//! <root>/<job fingerprint>/chunk-00042.json
//! ```
//!
//! Publication is atomic: we serialize into a temporary file in the same
//! directory, fsync, then rename onto the final name. A reader therefore sees
//! an artifact fully formed or not at all — a process killed mid-write leaves
//! only a stray temp file that the next run ignores.
//!
//! Corrupt or unreadable artifacts are treated as "redo this chunk", never as
//! a hard failure for the whole job.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;
use crate::fingerprint::JobFingerprint;
use crate::segment::ChunkResult;

const ARTIFACT_PREFIX: &str = "chunk-";
const ARTIFACT_SUFFIX: &str = ".json";

/// Filesystem-backed store of completed [`ChunkResult`]s, keyed by
/// (job fingerprint, chunk index).
#[derive(Debug, Clone)]
pub struct ResumeLedger {
    root: PathBuf,
}

impl ResumeLedger {
    /// Create a ledger rooted at `root`. The directory is created lazily on
    /// the first `record`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn job_dir(&self, fingerprint: &JobFingerprint) -> PathBuf {
        self.root.join(fingerprint.as_str())
    }

    fn artifact_path(&self, fingerprint: &JobFingerprint, chunk_index: usize) -> PathBuf {
        self.job_dir(fingerprint)
            .join(format!("{ARTIFACT_PREFIX}{chunk_index:05}{ARTIFACT_SUFFIX}"))
    }

    /// Fetch the stored result for a chunk, if one was published.
    ///
    /// Returns `None` both when the chunk was never recorded and when the
    /// stored artifact is unreadable or structurally wrong — either way the
    /// caller should recompute the chunk.
    pub fn lookup(
        &self,
        fingerprint: &JobFingerprint,
        chunk_index: usize,
    ) -> Option<ChunkResult> {
        let path = self.artifact_path(fingerprint, chunk_index);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ledger artifact unreadable; chunk will be redone");
                return None;
            }
        };

        match serde_json::from_slice::<ChunkResult>(&bytes) {
            Ok(result) if result.chunk_index == chunk_index => Some(result),
            Ok(result) => {
                warn!(
                    path = %path.display(),
                    stored_index = result.chunk_index,
                    expected_index = chunk_index,
                    "ledger artifact index mismatch; chunk will be redone"
                );
                None
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ledger artifact corrupt; chunk will be redone");
                None
            }
        }
    }

    /// Atomically publish a chunk result.
    ///
    /// A concurrent or later `lookup` for the same key observes the result
    /// fully formed or not at all.
    pub fn record(&self, fingerprint: &JobFingerprint, result: &ChunkResult) -> Result<()> {
        let dir = self.job_dir(fingerprint);
        fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(ARTIFACT_PREFIX)
            .suffix(".tmp")
            .tempfile_in(&dir)?;
        serde_json::to_writer(&mut tmp, result)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;

        let path = self.artifact_path(fingerprint, result.chunk_index);
        tmp.persist(&path).map_err(|err| err.error)?;
        Ok(())
    }

    /// Sorted indices of every chunk with a published artifact.
    pub fn completed_indices(&self, fingerprint: &JobFingerprint) -> Vec<usize> {
        let dir = self.job_dir(fingerprint);
        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut indices: Vec<usize> = entries
            .flatten()
            .filter_map(|entry| parse_artifact_index(&entry.file_name().to_string_lossy()))
            .collect();
        indices.sort_unstable();
        indices
    }

    /// Remove every persisted artifact for a job. Idempotent.
    pub fn clear(&self, fingerprint: &JobFingerprint) -> Result<()> {
        match fs::remove_dir_all(self.job_dir(fingerprint)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn parse_artifact_index(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix(ARTIFACT_PREFIX)?
        .strip_suffix(ARTIFACT_SUFFIX)?
        .parse()
        .ok()
}
