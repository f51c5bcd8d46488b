use serde::{Deserialize, Serialize};

use crate::Result;
use crate::segment::{Segment, Transcript};

/// The self-describing JSON shape of the structured output format.
///
/// Field names are part of the output contract, so this wire type is kept
/// separate from [`Transcript`] rather than serializing it directly.
#[derive(Debug, Serialize, Deserialize)]
struct StructuredTranscript {
    language: String,
    text: String,
    segments: Vec<StructuredSegment>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StructuredSegment {
    start: f64,
    end: f64,
    text: String,
}

/// Render the transcript as a pretty-printed JSON record containing the
/// overall language, the full text, and the complete ordered segment list.
pub fn render(transcript: &Transcript) -> Result<String> {
    let wire = StructuredTranscript {
        language: transcript.language.clone(),
        text: transcript.text.clone(),
        segments: transcript
            .segments
            .iter()
            .map(|s| StructuredSegment {
                start: s.start_seconds,
                end: s.end_seconds,
                text: s.text.clone(),
            })
            .collect(),
    };

    let mut out = serde_json::to_string_pretty(&wire)?;
    out.push('\n');
    Ok(out)
}

/// Parse structured output back into a [`Transcript`].
///
/// Exists so downstream tooling (and our own tests) can round-trip the
/// structured format without scraping.
pub fn parse(json: &str) -> Result<Transcript> {
    let wire: StructuredTranscript = serde_json::from_str(json)?;
    Ok(Transcript {
        language: wire.language,
        text: wire.text,
        segments: wire
            .segments
            .into_iter()
            .map(|s| Segment::new(s.start, s.end, s.text))
            .collect(),
    })
}
