//! PCM normalization: decoded container audio → mono `f32` at 16 kHz.
//!
//! Responsibilities:
//! - Convert Symphonia-decoded PCM into interleaved `f32`
//! - Downmix to mono (equal-weight channel average)
//! - Resample to the recognizer's expected rate when the source differs
//! - Emit samples via a callback so the caller can count, skip, and slice
//!
//! `finalize()` must be called at end-of-stream to flush the resampler's
//! buffered tail (rubato only consumes whole input blocks).

use anyhow::{Context, Result, anyhow, bail};
use rubato::{Resampler, SincFixedIn, WindowFunction};
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};

/// The sample rate every recognizer input uses (whisper.cpp's expected rate).
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Source frames fed to rubato per `process()` call.
const RESAMPLE_BLOCK_FRAMES: usize = 2048;

/// Stateful converter from decoded Symphonia buffers into mono 16 kHz `f32`.
pub struct PcmPipeline {
    // Scratch buffer for copying decoded PCM out as interleaved `f32`.
    interleaved: Option<SampleBuffer<f32>>,

    // Lazily built; only present when the source rate differs from the target.
    resampler: Option<SincFixedIn<f32>>,

    // Mono source samples waiting for a full rubato input block.
    pending: Vec<f32>,
}

impl Default for PcmPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl PcmPipeline {
    pub fn new() -> Self {
        Self {
            interleaved: None,
            resampler: None,
            pending: Vec::new(),
        }
    }

    /// Push one decoded buffer through downmix + resample and hand the
    /// resulting mono 16 kHz samples to `emit`.
    pub fn push_decoded(
        &mut self,
        decoded: &AudioBufferRef<'_>,
        emit: &mut dyn FnMut(&[f32]) -> Result<()>,
    ) -> Result<()> {
        let spec = *decoded.spec();
        let channels = spec.channels.count();
        if channels == 0 {
            bail!("decoded audio had zero channels");
        }

        if self.interleaved.is_none() {
            self.interleaved = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
        }
        let buf = self
            .interleaved
            .as_mut()
            .ok_or_else(|| anyhow!("sample buffer not initialized"))?;
        buf.copy_interleaved_ref(decoded.clone());

        let mono = downmix_to_mono(buf.samples(), channels);

        if spec.rate == TARGET_SAMPLE_RATE {
            emit(&mono)?;
            return Ok(());
        }

        self.ensure_resampler(spec.rate)?;
        self.pending.extend_from_slice(&mono);
        self.drain_full_blocks(emit)
    }

    /// Flush any buffered source samples at end-of-stream.
    ///
    /// If resampling was never needed, this is a no-op.
    pub fn finalize(&mut self, emit: &mut dyn FnMut(&[f32]) -> Result<()>) -> Result<()> {
        if self.resampler.is_none() || self.pending.is_empty() {
            return Ok(());
        }

        // rubato expects exact block sizes; pad the remainder with silence.
        let rem = self.pending.len() % RESAMPLE_BLOCK_FRAMES;
        if rem != 0 {
            self.pending
                .resize(self.pending.len() + (RESAMPLE_BLOCK_FRAMES - rem), 0.0);
        }
        self.drain_full_blocks(emit)
    }

    fn ensure_resampler(&mut self, source_rate: u32) -> Result<()> {
        if self.resampler.is_some() {
            return Ok(());
        }

        let resampler = SincFixedIn::<f32>::new(
            f64::from(TARGET_SAMPLE_RATE) / f64::from(source_rate),
            2.0,
            rubato::SincInterpolationParameters {
                sinc_len: 256,
                f_cutoff: 0.95,
                interpolation: rubato::SincInterpolationType::Linear,
                oversampling_factor: 256,
                window: WindowFunction::BlackmanHarris2,
            },
            RESAMPLE_BLOCK_FRAMES,
            1, // mono
        )
        .map_err(|e| anyhow!(e))
        .context("failed to init resampler")?;

        self.resampler = Some(resampler);
        Ok(())
    }

    fn drain_full_blocks(&mut self, emit: &mut dyn FnMut(&[f32]) -> Result<()>) -> Result<()> {
        while self.pending.len() >= RESAMPLE_BLOCK_FRAMES {
            let block: Vec<f32> = self.pending.drain(..RESAMPLE_BLOCK_FRAMES).collect();

            let resampler = self
                .resampler
                .as_mut()
                .ok_or_else(|| anyhow!("resampler not initialized"))?;
            let output = resampler
                .process(&[block], None)
                .map_err(|e| anyhow!(e))
                .context("resampler process failed")?;

            match output.as_slice() {
                [mono] => emit(mono)?,
                _ => bail!("expected mono output from resampler"),
            }
        }
        Ok(())
    }
}

/// Downmix interleaved samples into mono by averaging channels.
///
/// Policy: equal-weight average across channels (simple, predictable).
fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }

    let frames = interleaved.len() / channels;
    let mut mono = Vec::with_capacity(frames);
    for frame in interleaved.chunks_exact(channels) {
        mono.push(frame.iter().sum::<f32>() / channels as f32);
    }
    debug_assert_eq!(mono.len(), frames);
    mono
}
