use crate::Result;
use crate::segment::Transcript;

/// Render the transcript as an SRT subtitle track.
///
/// Each segment becomes one cue:
/// - 1-based sequential cue number
/// - `HH:MM:SS,mmm --> HH:MM:SS,mmm` timing line (SRT uses a comma before
///   the milliseconds, unlike WebVTT's period)
/// - the segment text as the cue body
/// - a blank line between cues
pub fn render(transcript: &Transcript) -> Result<String> {
    let mut out = String::new();

    for (cue_number, segment) in transcript.segments.iter().enumerate() {
        if cue_number > 0 {
            out.push('\n');
        }

        let start = format_timestamp_srt(segment.start_seconds);
        let end = format_timestamp_srt(segment.end_seconds);
        out.push_str(&format!("{}\n", cue_number + 1));
        out.push_str(&format!("{start} --> {end}\n"));
        out.push_str(&segment.text);
        out.push('\n');
    }

    Ok(out)
}

/// Format seconds into an SRT timestamp (`HH:MM:SS,mmm`).
///
/// Rounding policy:
/// - We round to the nearest millisecond to reduce drift when converting from `f64`.
fn format_timestamp_srt(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;

    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}
