//! Built-in recognizer powered by `whisper-rs` / whisper.cpp.

use std::os::raw::{c_char, c_void};
use std::path::Path;
use std::sync::Once;

use anyhow::{Context, Result, ensure};
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperSegment,
};

use crate::recognizer::{Recognition, Recognizer};
use crate::segment::Segment;

/// Language code used when the engine cannot tell us anything better.
///
/// Prefers `"und"` ("undetermined") because it's a common convention in
/// language tagging systems and makes the meaning obvious.
pub const UNDETERMINED_LANGUAGE: &str = "und";

/// A [`Recognizer`] wrapping a loaded whisper.cpp model.
///
/// The model is loaded once at construction (expensive) and reused for every
/// chunk; `recognize` creates a fresh inference state per call.
pub struct WhisperRecognizer {
    ctx: WhisperContext,
}

impl WhisperRecognizer {
    /// Load a whisper.cpp model from disk.
    pub fn new(model_path: impl AsRef<str>) -> Result<Self> {
        // Keep whisper.cpp logs quiet so callers fully control stdout/stderr.
        init_whisper_logging();

        let model_path = model_path.as_ref();
        ensure!(!model_path.trim().is_empty(), "model path must be provided");
        ensure!(
            Path::new(model_path).is_file(),
            "model not found at '{}'",
            model_path
        );

        let ctx = WhisperContext::new_with_params(model_path, WhisperContextParameters::default())
            .with_context(|| format!("failed to load model from path: {model_path}"))?;

        Ok(Self { ctx })
    }

    /// Access the underlying Whisper context.
    ///
    /// This is primarily intended for advanced or experimental use-cases.
    pub fn context(&self) -> &WhisperContext {
        &self.ctx
    }
}

impl Recognizer for WhisperRecognizer {
    fn recognize(
        &mut self,
        samples: &[f32],
        language_hint: Option<&str>,
    ) -> crate::Result<Recognition> {
        if samples.is_empty() {
            return Ok(Recognition {
                language: language_hint.unwrap_or(UNDETERMINED_LANGUAGE).to_owned(),
                segments: Vec::new(),
            });
        }

        let inner = || -> Result<Recognition> {
            let params = build_full_params(language_hint);

            let mut state = self
                .ctx
                .create_state()
                .context("failed to create whisper state")?;
            state
                .full(params, samples)
                .context("failed to run whisper full()")?;

            let mut segments = Vec::new();
            for whisper_segment in state.as_iter() {
                if let Some(segment) = to_segment(whisper_segment)? {
                    segments.push(segment);
                }
            }

            let language = match language_hint {
                Some(hint) => hint.to_owned(),
                None => whisper_rs::get_lang_str(state.full_lang_id_from_state())
                    .unwrap_or(UNDETERMINED_LANGUAGE)
                    .to_owned(),
            };

            Ok(Recognition { language, segments })
        };

        inner().map_err(crate::Error::from)
    }
}

fn build_full_params(language_hint: Option<&str>) -> FullParams<'_, '_> {
    let mut params = FullParams::new(SamplingStrategy::BeamSearch {
        beam_size: 5,
        patience: 1.0,
    });

    params.set_n_threads(num_cpus::get() as i32);
    params.set_translate(false);
    params.set_language(language_hint);
    params.set_detect_language(language_hint.is_none());
    params.set_no_context(true);
    params.set_single_segment(false);

    params.set_print_progress(false);
    params.set_print_special(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    params
}

/// Convert a whisper segment, dropping segments that are empty after trimming.
fn to_segment(segment: WhisperSegment) -> Result<Option<Segment>> {
    let text = segment
        .to_str()
        .context("failed to get segment text")?
        .trim()
        .to_owned();
    if text.is_empty() {
        return Ok(None);
    }

    Ok(Some(Segment {
        start_seconds: centiseconds_to_seconds(segment.start_timestamp()),
        end_seconds: centiseconds_to_seconds(segment.end_timestamp()),
        text,
    }))
}

/// Whisper timestamps are centiseconds; -1 means unknown, clamped to 0.
fn centiseconds_to_seconds(value: i64) -> f64 {
    if value < 0 { 0.0 } else { value as f64 / 100.0 }
}

/// A no-op log callback used to silence logs emitted by whisper.cpp.
unsafe extern "C" fn whisper_log_callback(
    _level: u32,
    _c_msg: *const c_char,
    _user_data: *mut c_void,
) {
    // Intentionally left empty.
}

/// Ensure whisper logging is configured exactly once for the lifetime of the process.
pub fn init_whisper_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| unsafe {
        whisper_rs::set_log_callback(Some(whisper_log_callback), std::ptr::null_mut());
    });
}
