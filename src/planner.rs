//! Chunk planning: split a recording's duration into bounded, contiguous slices.
//!
//! The plan is the backbone of everything downstream: chunk indices key the
//! resume ledger, and chunk start offsets drive the timeline rebase in the
//! stitcher. Once computed for a job the plan is immutable.

use crate::error::{Error, Result};

/// One planned slice of the input: a half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedChunk {
    /// 0-based, contiguous chunk index.
    pub index: usize,
    /// Global start time in seconds (inclusive).
    pub start_seconds: f64,
    /// Global end time in seconds (exclusive).
    pub end_seconds: f64,
}

impl PlannedChunk {
    /// Chunk length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

/// Compute an ordered plan covering `[0, total_seconds)` in slices of
/// `chunk_seconds`, the last slice taking whatever remains.
///
/// Guarantees, for valid inputs:
/// - `ceil(total / chunk)` entries, indices contiguous from 0
/// - `entry[i].end == entry[i+1].start`, first starts at 0, last ends at `total`
/// - no entry is empty and none extends past the end of the recording
pub fn plan_chunks(total_seconds: f64, chunk_seconds: f64) -> Result<Vec<PlannedChunk>> {
    if !total_seconds.is_finite() || total_seconds <= 0.0 {
        return Err(Error::invalid_configuration(format!(
            "total duration must be positive, got {total_seconds}s"
        )));
    }
    if !chunk_seconds.is_finite() || chunk_seconds <= 0.0 {
        return Err(Error::invalid_configuration(format!(
            "chunk length must be positive, got {chunk_seconds}s"
        )));
    }

    let count = (total_seconds / chunk_seconds).ceil() as usize;
    // total <= chunk yields exactly one chunk; ceil() already handles it, but
    // guard against count == 0 from pathological float inputs near zero.
    let count = count.max(1);

    let mut chunks = Vec::with_capacity(count);
    for index in 0..count {
        let start_seconds = index as f64 * chunk_seconds;
        let end_seconds = if index + 1 == count {
            total_seconds
        } else {
            start_seconds + chunk_seconds
        };
        chunks.push(PlannedChunk {
            index,
            start_seconds,
            end_seconds,
        });
    }

    Ok(chunks)
}
