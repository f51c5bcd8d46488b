use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::output_type::OutputType;

/// Options that control how a transcription job runs.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (APIs, tests, batch jobs) can construct options programmatically
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Chunk length in minutes. Each chunk is one independent unit of
    /// recognition work, so this bounds peak memory and resume granularity.
    pub chunk_minutes: u32,

    /// The desired output format for the finished transcript.
    pub output_type: OutputType,

    /// Forced language code (e.g. `"en"`, `"es"`).
    ///
    /// When `None`, the engine auto-detects per chunk and the transcript takes
    /// chunk 0's detection as the overall label.
    pub language: Option<String>,

    /// Where to write the output artifact.
    ///
    /// When `None`, the path is derived from the input path with the format's
    /// conventional extension.
    pub output_path: Option<PathBuf>,

    /// Keep per-chunk ledger artifacts after a fully successful run instead of
    /// clearing them. Useful for debugging boundary behavior.
    pub keep_ledger: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            chunk_minutes: 15,
            output_type: OutputType::Text,
            language: None,
            output_path: None,
            keep_ledger: false,
        }
    }
}

impl JobConfig {
    /// Validate configuration before any work begins.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_minutes == 0 {
            return Err(Error::invalid_configuration(
                "chunk length must be at least one minute",
            ));
        }
        if let Some(lang) = &self.language {
            if lang.trim().is_empty() {
                return Err(Error::invalid_configuration(
                    "forced language must not be blank (omit it for auto-detect)",
                ));
            }
        }
        Ok(())
    }

    /// Configured chunk length in seconds.
    pub fn chunk_seconds(&self) -> f64 {
        f64::from(self.chunk_minutes) * 60.0
    }
}
