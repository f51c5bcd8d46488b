//! Timeline stitching: per-chunk local segments → one global transcript timeline.
//!
//! Two jobs happen here:
//! 1. *Rebase*: every chunk-local timestamp gets the chunk's planned start
//!    offset added, putting all segments on the job-relative timeline.
//! 2. *Boundary dedup*: speech that straddles a chunk boundary is often
//!    recognized twice — once truncated at the end of chunk `i`, once again at
//!    the start of chunk `i+1`. When the two copies say the same thing and
//!    overlap in global time, we keep the earlier one.
//!
//! The dedup policy is a heuristic. It is deterministic given identical
//! inputs, and it is biased toward keeping content: segments that merely
//! overlap, or merely repeat text without overlapping, are never dropped.

use crate::planner::PlannedChunk;
use crate::segment::{ChunkResult, Segment};

/// Tunable thresholds for boundary-duplicate detection.
#[derive(Debug, Clone, Copy)]
pub struct StitchOptions {
    /// Fraction of the *shorter* segment's duration that the global overlap
    /// must exceed before two same-text boundary segments count as one.
    pub min_overlap_fraction: f64,

    /// Same-text segments whose ranges touch the seam within this many
    /// seconds (either side) also count as one. Chunk extraction cuts on
    /// exact sample boundaries, so the truncated copy frequently ends at
    /// precisely the instant the re-heard copy begins — zero strict overlap.
    pub max_seam_gap_seconds: f64,
}

impl Default for StitchOptions {
    fn default() -> Self {
        Self {
            min_overlap_fraction: 0.5,
            max_seam_gap_seconds: 0.5,
        }
    }
}

/// Rebase and merge chunk results into a global segment sequence plus the
/// concatenated transcript text.
///
/// `results` may be sparse (failed chunks simply have no entry); it must be
/// sorted by `chunk_index`, which the pipeline guarantees by construction.
pub fn stitch(
    plan: &[PlannedChunk],
    results: &[ChunkResult],
    opts: StitchOptions,
) -> (Vec<Segment>, String) {
    let mut global: Vec<Segment> = Vec::new();

    for result in results {
        let Some(chunk) = plan.get(result.chunk_index) else {
            continue;
        };

        let mut first_of_chunk = true;
        for local in &result.segments {
            let mut segment = rebase(local, chunk.start_seconds);

            // The engine occasionally jitters a boundary past its partner.
            // Clamp rather than reorder so `start <= end` always holds.
            if segment.end_seconds < segment.start_seconds {
                segment.end_seconds = segment.start_seconds;
            }

            // Only the first segment of a chunk can be the second copy of a
            // boundary-straddling utterance.
            if first_of_chunk {
                first_of_chunk = false;
                if let Some(previous) = global.last() {
                    if is_boundary_duplicate(previous, &segment, opts) {
                        continue;
                    }
                }
            }

            global.push(segment);
        }
    }

    let text = joined_text(&global);
    (global, text)
}

fn rebase(local: &Segment, offset_seconds: f64) -> Segment {
    Segment {
        start_seconds: local.start_seconds + offset_seconds,
        end_seconds: local.end_seconds + offset_seconds,
        text: local.text.clone(),
    }
}

/// Two segments are the same boundary-straddling utterance when their trimmed
/// texts match case-insensitively AND either their global ranges overlap by
/// more than `min_overlap_fraction` of the shorter one's duration, or the
/// later copy starts within `max_seam_gap_seconds` of the earlier one's end.
fn is_boundary_duplicate(earlier: &Segment, later: &Segment, opts: StitchOptions) -> bool {
    if !same_text(&earlier.text, &later.text) {
        return false;
    }

    let overlap = earlier.end_seconds.min(later.end_seconds)
        - earlier.start_seconds.max(later.start_seconds);

    if overlap > 0.0 {
        let shorter = earlier.duration_seconds().min(later.duration_seconds());
        if shorter <= 0.0 {
            // Both degenerate but overlapping and identical: treat as duplicate.
            return true;
        }
        if overlap > opts.min_overlap_fraction * shorter {
            return true;
        }
    }

    // The no-strict-overlap case: truncated copy ends exactly (or nearly)
    // where the re-heard copy begins.
    (later.start_seconds - earlier.end_seconds).abs() <= opts.max_seam_gap_seconds
}

fn same_text(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Join segment texts with single spaces, collapsing stray whitespace.
fn joined_text(segments: &[Segment]) -> String {
    let mut text = String::new();
    for segment in segments {
        for word in segment.text.split_whitespace() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(word);
        }
    }
    text
}
