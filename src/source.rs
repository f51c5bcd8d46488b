//! Audio source adapter: duration probing and time-range extraction.
//!
//! The pipeline never touches containers or codecs directly; it asks an
//! [`AudioSource`] for the recording's total duration and for decoded mono
//! 16 kHz buffers covering planned chunk ranges. [`FileSource`] implements
//! this over Symphonia for anything it can probe (wav, mp3, m4a, ogg, flac,
//! mkv audio tracks, ...).
//!
//! Range extraction decodes from the head of the file and discards samples
//! before the range start. That is deliberate: chunks are requested in plan
//! order, decode throughput dwarfs recognition throughput, and it keeps the
//! source stateless. A seek-based variant is a possible later optimization.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, anyhow};
use symphonia::core::codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet, Track};
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{Error, Result};
use crate::pcm::{PcmPipeline, TARGET_SAMPLE_RATE};

/// Access to a recording's duration and decoded PCM slices.
///
/// Buffers are mono `f32` in `[-1.0, 1.0]` at [`TARGET_SAMPLE_RATE`].
pub trait AudioSource {
    /// Total duration of the recording in seconds.
    fn duration_seconds(&mut self) -> Result<f64>;

    /// Decode the half-open time range `[start_seconds, end_seconds)`.
    fn read_range(&mut self, start_seconds: f64, end_seconds: f64) -> Result<Vec<f32>>;
}

/// An [`AudioSource`] backed by a file on disk, decoded via Symphonia.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    // Cached after the first probe or decode scan.
    duration_seconds: Option<f64>,
}

impl FileSource {
    /// Open `path` for later decoding.
    ///
    /// We probe eagerly so an unreadable or undecodable input fails here,
    /// before any recognition work is planned.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        // Probe once to validate; the reader is rebuilt per decode pass.
        open_default_track(&path)?;
        Ok(Self {
            path,
            duration_seconds: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the whole stream, feeding normalized samples to `emit`.
    ///
    /// `emit` returns `false` to stop early (used by range extraction once
    /// the requested window is filled).
    fn decode_stream(&self, emit: &mut dyn FnMut(&[f32]) -> bool) -> Result<()> {
        let (mut format, track, mut decoder) = open_default_track(&self.path)?;
        let mut pipeline = PcmPipeline::new();
        let mut stop = false;

        loop {
            let Some(packet) = next_packet(format.as_mut())
                .map_err(|err| Error::source_unreadable(&self.path, format!("{err:#}")))?
            else {
                break;
            };
            if packet.track_id() != track.id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                // Recoverable: corrupted frame, keep decoding.
                Err(SymphoniaError::DecodeError(_)) => continue,
                // Treat IO errors as graceful end-of-stream.
                Err(SymphoniaError::IoError(_)) => break,
                Err(err) => {
                    return Err(Error::source_unreadable(
                        &self.path,
                        format!("decoder failure: {err}"),
                    ));
                }
            };

            pipeline
                .push_decoded(&decoded, &mut |samples| {
                    if !emit(samples) {
                        stop = true;
                    }
                    Ok(())
                })
                .map_err(|err| Error::source_unreadable(&self.path, format!("{err:#}")))?;

            if stop {
                return Ok(());
            }
        }

        pipeline
            .finalize(&mut |samples| {
                emit(samples);
                Ok(())
            })
            .map_err(|err| Error::source_unreadable(&self.path, format!("{err:#}")))?;
        Ok(())
    }
}

impl AudioSource for FileSource {
    fn duration_seconds(&mut self) -> Result<f64> {
        if let Some(duration) = self.duration_seconds {
            return Ok(duration);
        }

        let (_, track, _) = open_default_track(&self.path)?;
        let params = &track.codec_params;
        let declared = match (params.n_frames, params.sample_rate) {
            (Some(frames), Some(rate)) if rate > 0 => Some(frames as f64 / f64::from(rate)),
            _ => None,
        };

        let duration = match declared {
            Some(duration) if duration > 0.0 => duration,
            // Some containers (notably raw ADTS/MP3 without metadata) do not
            // declare a frame count. Fall back to a full decode scan.
            _ => {
                let mut emitted = 0usize;
                self.decode_stream(&mut |samples| {
                    emitted += samples.len();
                    true
                })?;
                emitted as f64 / f64::from(TARGET_SAMPLE_RATE)
            }
        };

        if duration <= 0.0 {
            return Err(Error::source_unreadable(&self.path, "no decodable audio"));
        }

        self.duration_seconds = Some(duration);
        Ok(duration)
    }

    fn read_range(&mut self, start_seconds: f64, end_seconds: f64) -> Result<Vec<f32>> {
        if !(start_seconds >= 0.0 && end_seconds > start_seconds) {
            return Err(Error::invalid_configuration(format!(
                "invalid audio range [{start_seconds}, {end_seconds})"
            )));
        }

        let start_sample = (start_seconds * f64::from(TARGET_SAMPLE_RATE)).round() as usize;
        let end_sample = (end_seconds * f64::from(TARGET_SAMPLE_RATE)).round() as usize;

        let mut buffer = Vec::with_capacity(end_sample - start_sample);
        let mut position = 0usize;

        self.decode_stream(&mut |samples| {
            for &sample in samples {
                if position >= start_sample && position < end_sample {
                    buffer.push(sample);
                }
                position += 1;
            }
            position < end_sample
        })?;

        // A range at the very end of the file may come up a little short when
        // the declared duration rounds past the last decodable frame.
        Ok(buffer)
    }
}

type OpenedTrack = (Box<dyn FormatReader>, Track, Box<dyn Decoder>);

/// Probe the container at `path` and pick a default audio track.
///
/// Track selection policy:
/// - choose the first track that looks decodable (codec != NULL)
/// - and has a known sample rate (required for resampling decisions downstream)
fn open_default_track(path: &Path) -> Result<OpenedTrack> {
    let inner = || -> anyhow::Result<OpenedTrack> {
        let file = File::open(path).context("failed to open input file")?;
        let mss = MediaSourceStream::new(
            Box::new(file),
            MediaSourceStreamOptions {
                // Symphonia expects a power-of-two buffer > 32KiB for good probing behavior.
                buffer_len: 256 * 1024,
            },
        );

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| anyhow!(e))
            .context("failed to probe media stream")?;
        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| {
                t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some()
            })
            .cloned()
            .ok_or_else(|| anyhow!("no audio track found"))?;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| anyhow!(e))
            .context("failed to create decoder for audio track")?;

        Ok((format, track, decoder))
    };

    inner().map_err(|err| Error::source_unreadable(path, format!("{err:#}")))
}

/// Read the next packet, treating IO errors as "end of stream".
fn next_packet(format: &mut dyn FormatReader) -> anyhow::Result<Option<Packet>> {
    match format.next_packet() {
        Ok(packet) => Ok(Some(packet)),
        Err(SymphoniaError::IoError(_)) => Ok(None),
        Err(err) => Err(anyhow!(err)).context("failed reading packet"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    /// Write a mono 16 kHz sine WAV so FileSource decodes without resampling.
    fn write_sine_wav(path: &Path, seconds: f64) -> anyhow::Result<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: TARGET_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        let total = (seconds * f64::from(TARGET_SAMPLE_RATE)) as usize;
        for n in 0..total {
            let t = n as f32 / TARGET_SAMPLE_RATE as f32;
            let sample = (TAU * 440.0 * t).sin() * 0.4;
            writer.write_sample((sample * f32::from(i16::MAX)) as i16)?;
        }
        writer.finalize()?;
        Ok(())
    }

    #[test]
    fn duration_matches_fixture_length() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tone.wav");
        write_sine_wav(&path, 2.0)?;

        let mut source = FileSource::open(&path)?;
        let duration = source.duration_seconds()?;
        assert!((duration - 2.0).abs() < 0.05, "duration was {duration}");
        Ok(())
    }

    #[test]
    fn read_range_returns_the_requested_window() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tone.wav");
        write_sine_wav(&path, 2.0)?;

        let mut source = FileSource::open(&path)?;
        let samples = source.read_range(0.5, 1.5)?;
        let expected = TARGET_SAMPLE_RATE as usize;
        assert!(
            samples.len().abs_diff(expected) <= 16,
            "got {} samples, expected ~{expected}",
            samples.len()
        );
        Ok(())
    }

    #[test]
    fn tail_range_may_come_up_short_but_not_empty() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tone.wav");
        write_sine_wav(&path, 1.0)?;

        let mut source = FileSource::open(&path)?;
        let samples = source.read_range(0.9, 1.2)?;
        assert!(!samples.is_empty());
        assert!(samples.len() <= (0.3 * f64::from(TARGET_SAMPLE_RATE)) as usize + 16);
        Ok(())
    }

    #[test]
    fn degenerate_range_is_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tone.wav");
        write_sine_wav(&path, 1.0)?;

        let mut source = FileSource::open(&path)?;
        let err = source.read_range(1.0, 1.0).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
        Ok(())
    }

    #[test]
    fn missing_file_fails_at_open() {
        let err = FileSource::open("/no/such/audio.ogg").unwrap_err();
        assert!(matches!(err, Error::SourceUnreadable { .. }));
    }
}
