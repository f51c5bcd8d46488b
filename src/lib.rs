//! `longhand` — resumable long-audio transcription built on top of Whisper.
//!
//! This crate provides:
//! - Chunk planning over recordings of arbitrary length
//! - A resume ledger so interrupted runs never redo completed chunks
//! - Timeline stitching of per-chunk segments, with boundary dedup
//! - Pluggable recognition (whisper.cpp built in, any engine via a trait)
//! - Output rendering to plain text, SRT subtitles, or structured JSON
//!
//! The library is designed to be used by both CLI tools and batch jobs,
//! with an emphasis on interruption safety and minimal surprises.

// High-level API (most consumers should start here).
pub mod config;
pub mod pipeline;

// Error handling.
pub mod error;

// Job identity and the chunk plan.
pub mod fingerprint;
pub mod planner;

// Core data structures.
pub mod segment;

// Audio decoding and normalization.
pub mod pcm;
pub mod source;

// Recognition engines.
pub mod recognizer;
pub mod whisper;

// Resume state.
pub mod ledger;

// Timeline assembly.
pub mod language;
pub mod stitcher;

// Output selection and renderers.
pub mod output_type;
pub mod render;
pub mod structured_renderer;
pub mod subtitle_renderer;
pub mod text_renderer;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub use error::{Error, Result};
