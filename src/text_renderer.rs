use crate::Result;
use crate::segment::Transcript;

/// Render the transcript as plain text: the full concatenated text only,
/// no timestamps, with a trailing newline so the file behaves in pipelines.
pub fn render(transcript: &Transcript) -> Result<String> {
    let mut out = String::with_capacity(transcript.text.len() + 1);
    out.push_str(&transcript.text);
    out.push('\n');
    Ok(out)
}
