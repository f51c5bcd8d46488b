//! Core data model shared across the pipeline.
//!
//! Times are `f64` seconds. Segments come in two flavors that share one type:
//! - *local* segments, relative to the start of the chunk they were recognized in
//! - *global* segments, relative to the start of the whole recording (post-stitch)
//!
//! Which flavor a value holds is decided by where it sits in the pipeline:
//! everything before the stitcher is local, everything after is global.

use serde::{Deserialize, Serialize};

/// A timestamped span of recognized text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds.
    pub start_seconds: f64,
    /// End time in seconds.
    pub end_seconds: f64,
    /// Recognized text, trimmed by the recognizer.
    pub text: String,
}

impl Segment {
    pub fn new(start_seconds: f64, end_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text: text.into(),
        }
    }

    /// Segment duration in seconds. Never negative (degenerate input clamps to 0).
    pub fn duration_seconds(&self) -> f64 {
        (self.end_seconds - self.start_seconds).max(0.0)
    }
}

/// The recognition result for one chunk; the unit the resume ledger persists.
///
/// Segment times are chunk-local. One `ChunkResult` exists per completed
/// planned chunk and is never partially written: the ledger publishes it
/// atomically or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkResult {
    /// Index of the planned chunk this result belongs to.
    pub chunk_index: usize,
    /// Language the engine detected for this chunk (e.g. "en", or "und").
    pub language: String,
    /// Recognized segments in recognition order, chunk-local times.
    pub segments: Vec<Segment>,
}

/// The final artifact of a successful job: one language label, the full
/// globally-timestamped segment sequence, and the concatenated text.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    /// Overall transcript language (forced, or chunk-0 consensus).
    pub language: String,
    /// Global segments, ordered by start time.
    pub segments: Vec<Segment>,
    /// All segment texts joined by single spaces.
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_clamps_degenerate_spans_to_zero() {
        let seg = Segment::new(2.0, 1.5, "jittery");
        assert_eq!(seg.duration_seconds(), 0.0);

        let seg = Segment::new(1.0, 3.5, "fine");
        assert_eq!(seg.duration_seconds(), 2.5);
    }

    #[test]
    fn chunk_result_round_trips_through_json() -> anyhow::Result<()> {
        let result = ChunkResult {
            chunk_index: 3,
            language: "en".to_string(),
            segments: vec![Segment::new(0.0, 1.25, "hello"), Segment::new(1.25, 2.0, "there")],
        };

        let json = serde_json::to_string(&result)?;
        let back: ChunkResult = serde_json::from_str(&json)?;
        assert_eq!(back, result);
        Ok(())
    }
}
