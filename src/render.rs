//! Format dispatch and atomic publication of the output artifact.

use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::output_type::OutputType;
use crate::segment::Transcript;
use crate::{structured_renderer, subtitle_renderer, text_renderer};

/// Render the transcript in the requested format.
pub fn render_to_string(transcript: &Transcript, output_type: OutputType) -> Result<String> {
    match output_type {
        OutputType::Text => text_renderer::render(transcript),
        OutputType::Subtitle => subtitle_renderer::render(transcript),
        OutputType::Structured => structured_renderer::render(transcript),
    }
}

/// Write `contents` to `path` atomically: temp file in the destination
/// directory, fsync, then rename onto the final name. Readers see the full
/// artifact or none at all.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".longhand-out")
        .tempfile_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|err| Error::from(err.error))?;
    Ok(())
}
