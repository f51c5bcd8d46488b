//! High-level API for running resumable transcription jobs.
//!
//! We expose a single, ergonomic entry point (`run`) that wires up the
//! lower-level planning, decoding, recognition, persistence, and stitching
//! logic:
//!
//! plan → for each chunk: ledger lookup → (miss) decode range → recognize →
//! record → stitch everything present → language consensus → [`Transcript`].
//!
//! Chunks are processed strictly in plan order, one at a time: only one
//! decoded PCM buffer and one in-flight recognition call are ever alive,
//! which bounds peak memory, and the recognizer is assumed to saturate the
//! available compute anyway.
//!
//! Failure model:
//! - a chunk that fails recognition is logged, collected into
//!   [`RunOutcome::failed_chunks`], and *not* recorded — a rerun retries
//!   exactly those chunks;
//! - if every attempted chunk fails and nothing was resumed, the job fails
//!   with `RecognitionFailure`;
//! - interruption at any point before a chunk's `record` completes is safe:
//!   the ledger publishes atomically, so a restarted run resumes at the
//!   first chunk lacking a recorded result and never recomputes the rest.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::JobConfig;
use crate::error::{Error, Result};
use crate::fingerprint::JobFingerprint;
use crate::language::resolve_language;
use crate::ledger::ResumeLedger;
use crate::planner::{PlannedChunk, plan_chunks};
use crate::recognizer::Recognizer;
use crate::segment::{ChunkResult, Transcript};
use crate::source::AudioSource;
use crate::stitcher::{StitchOptions, stitch};

/// One prepared transcription run: input identity, duration, immutable plan,
/// and configuration. Created at invocation, immutable for the run's lifetime.
#[derive(Debug, Clone)]
pub struct Job {
    input_path: PathBuf,
    fingerprint: JobFingerprint,
    total_seconds: f64,
    plan: Vec<PlannedChunk>,
    config: JobConfig,
}

impl Job {
    /// Validate configuration, fingerprint the input, probe its duration,
    /// and compute the chunk plan.
    ///
    /// All `InvalidConfiguration` and `SourceUnreadable` failures surface
    /// here, before any recognition work begins.
    pub fn prepare(
        input_path: impl Into<PathBuf>,
        config: JobConfig,
        source: &mut dyn AudioSource,
    ) -> Result<Self> {
        config.validate()?;

        let input_path = input_path.into();
        let fingerprint = JobFingerprint::for_file(&input_path)?;
        let total_seconds = source.duration_seconds()?;
        let plan = plan_chunks(total_seconds, config.chunk_seconds())?;

        info!(
            input = %input_path.display(),
            fingerprint = %fingerprint,
            total_seconds,
            chunks = plan.len(),
            "job prepared"
        );

        Ok(Self {
            input_path,
            fingerprint,
            total_seconds,
            plan,
            config,
        })
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn fingerprint(&self) -> &JobFingerprint {
        &self.fingerprint
    }

    pub fn total_seconds(&self) -> f64 {
        self.total_seconds
    }

    pub fn plan(&self) -> &[PlannedChunk] {
        &self.plan
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Where the output artifact goes: the configured path, or the input
    /// path with the format's extension.
    pub fn output_path(&self) -> PathBuf {
        match &self.config.output_path {
            Some(path) => path.clone(),
            None => self
                .input_path
                .with_extension(self.config.output_type.extension()),
        }
    }
}

/// What a finished run produced, including everything a caller needs to
/// report partial transcripts honestly.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The stitched transcript (gaps where chunks failed).
    pub transcript: Transcript,
    /// Chunk indices whose results were loaded from the ledger instead of
    /// recomputed.
    pub resumed_chunks: Vec<usize>,
    /// Chunk indices that failed recognition in this run.
    pub failed_chunks: Vec<usize>,
}

impl RunOutcome {
    /// True when the transcript has a time gap because one or more chunks
    /// have no result. Non-fatal, but must not be hidden from the caller.
    pub fn is_partial(&self) -> bool {
        !self.failed_chunks.is_empty()
    }
}

/// Run a prepared job to completion (or as far as recognition allows).
pub fn run(
    job: &Job,
    source: &mut dyn AudioSource,
    recognizer: &mut dyn Recognizer,
    ledger: &ResumeLedger,
) -> Result<RunOutcome> {
    let mut results: Vec<ChunkResult> = Vec::with_capacity(job.plan.len());
    let mut resumed_chunks = Vec::new();
    let mut failed_chunks = Vec::new();

    // The forced language, or chunk 0's detection once we have it, hints
    // every later chunk so the engine doesn't re-detect from scratch.
    let mut hint: Option<String> = job.config.language.clone();

    for chunk in &job.plan {
        if let Some(stored) = ledger.lookup(&job.fingerprint, chunk.index) {
            debug!(chunk = chunk.index, "resumed from ledger");
            if hint.is_none() {
                hint = Some(stored.language.clone());
            }
            resumed_chunks.push(chunk.index);
            results.push(stored);
            continue;
        }

        info!(
            chunk = chunk.index,
            of = job.plan.len(),
            start = chunk.start_seconds,
            end = chunk.end_seconds,
            "transcribing chunk"
        );

        let samples = source.read_range(chunk.start_seconds, chunk.end_seconds)?;
        let recognition = match recognizer.recognize(&samples, hint.as_deref()) {
            Ok(recognition) => recognition,
            Err(err) => {
                warn!(chunk = chunk.index, error = %err, "chunk recognition failed; will retry on rerun");
                failed_chunks.push(chunk.index);
                continue;
            }
        };

        if hint.is_none() {
            debug!(chunk = chunk.index, language = %recognition.language, "detected language");
            hint = Some(recognition.language.clone());
        }

        let result = ChunkResult {
            chunk_index: chunk.index,
            language: recognition.language,
            segments: recognition.segments,
        };
        ledger.record(&job.fingerprint, &result)?;
        results.push(result);
    }

    if results.is_empty() {
        return Err(Error::RecognitionFailure { failed_chunks });
    }

    let language = resolve_language(job.config.language.as_deref(), &results);
    let (segments, text) = stitch(&job.plan, &results, StitchOptions::default());
    let transcript = Transcript {
        language,
        segments,
        text,
    };

    let outcome = RunOutcome {
        transcript,
        resumed_chunks,
        failed_chunks,
    };

    if outcome.is_partial() {
        warn!(
            failed = ?outcome.failed_chunks,
            "transcript is partial; rerun to retry the failed chunks"
        );
    } else if !job.config.keep_ledger {
        // The job finished whole; its scratch state has served its purpose.
        ledger.clear(&job.fingerprint)?;
    }

    Ok(outcome)
}
