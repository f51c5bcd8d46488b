//! Language consensus: one overall label for the whole transcript.
//!
//! Policy: a forced language always wins; otherwise the transcript takes the
//! language detected for chunk 0 (the earliest available chunk when 0 is
//! missing). Single-speaker, single-language recordings are the common case
//! for this pipeline, so chunk 0 is assumed representative. Recordings that
//! switch language mid-way get a technically wrong overall label — a known
//! limitation; the per-chunk detections remain visible in ledger artifacts.

use crate::segment::ChunkResult;
use crate::whisper::UNDETERMINED_LANGUAGE;

/// Pick the overall transcript language.
///
/// `results` need not be complete or start at chunk 0 (failed chunks leave
/// holes); the lowest-indexed available chunk decides.
pub fn resolve_language(forced: Option<&str>, results: &[ChunkResult]) -> String {
    if let Some(forced) = forced {
        return forced.to_owned();
    }

    results
        .iter()
        .min_by_key(|r| r.chunk_index)
        .map(|r| r.language.clone())
        .unwrap_or_else(|| UNDETERMINED_LANGUAGE.to_owned())
}
