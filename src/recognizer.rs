use crate::Result;
use crate::segment::Segment;

/// What a recognition engine reports for one chunk of audio.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    /// Detected (or hinted) language code for this chunk.
    pub language: String,
    /// Recognized segments in recognition order, chunk-local times.
    pub segments: Vec<Segment>,
}

/// Pluggable speech-recognition engine used by [`crate::pipeline`].
///
/// A recognizer turns one chunk's mono `f32` samples at
/// [`crate::pcm::TARGET_SAMPLE_RATE`] into chunk-local segments plus a
/// detected language.
///
/// Contract notes:
/// - Engines are not assumed deterministic: two runs over the same chunk may
///   yield slightly different boundary timings. The stitcher tolerates that,
///   so implementations don't have to.
/// - Any engine satisfying this trait is substitutable, which is also how the
///   integration tests drive the pipeline with scripted results.
pub trait Recognizer {
    /// Recognize one chunk. `language_hint` is passed to the engine when
    /// present; otherwise the engine detects the language itself.
    fn recognize(&mut self, samples: &[f32], language_hint: Option<&str>) -> Result<Recognition>;
}
