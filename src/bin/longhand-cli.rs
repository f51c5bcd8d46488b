use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use longhand::config::JobConfig;
use longhand::ledger::ResumeLedger;
use longhand::output_type::OutputType;
use longhand::pipeline::{self, Job};
use longhand::render;
use longhand::source::FileSource;
use longhand::whisper::{WhisperRecognizer, init_whisper_logging};

fn main() -> Result<()> {
    longhand::logging::init();
    init_whisper_logging();

    let params = Params::parse();

    let mut source = FileSource::open(&params.audio_path)?;
    let mut recognizer = WhisperRecognizer::new(&params.model_path)?;

    let config = JobConfig {
        chunk_minutes: params.chunk_minutes,
        output_type: params.format,
        language: params.language.clone(),
        output_path: params.output.clone(),
        keep_ledger: params.keep_ledger,
    };

    let job = Job::prepare(&params.audio_path, config, &mut source)?;

    let ledger = ResumeLedger::new(state_dir(&params));
    if params.start_over {
        ledger.clear(job.fingerprint())?;
    }

    let outcome = pipeline::run(&job, &mut source, &mut recognizer, &ledger)?;

    let output_path = job.output_path();
    let rendered = render::render_to_string(&outcome.transcript, job.config().output_type)?;
    render::write_atomic(&output_path, &rendered)?;

    println!("Transcription saved to: {}", output_path.display());
    println!("Language: {}", outcome.transcript.language);
    println!("Segments: {}", outcome.transcript.segments.len());
    if !outcome.resumed_chunks.is_empty() {
        println!("Resumed chunks: {}", outcome.resumed_chunks.len());
    }

    if outcome.is_partial() {
        eprintln!(
            "Warning: transcript is PARTIAL; failed chunks: {:?}. \
             Run the same command again to retry them.",
            outcome.failed_chunks
        );
    }

    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "longhand")]
#[command(about = "Resumable long-audio transcription CLI")]
struct Params {
    /// Audio file to transcribe.
    audio_path: PathBuf,

    /// Path to a whisper.cpp model file.
    #[arg(short = 'm', long = "model")]
    model_path: String,

    /// Minutes of audio per chunk.
    #[arg(long = "chunk-minutes", default_value_t = 15)]
    chunk_minutes: u32,

    /// Output format.
    #[arg(short = 'f', long = "format", value_enum, default_value = "text")]
    format: OutputType,

    /// Language code (auto-detect if not specified).
    #[arg(short = 'l', long = "language")]
    language: Option<String>,

    /// Output file path (default: input path with the format's extension).
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Directory for resume state (default: `.longhand` beside the input).
    #[arg(long = "state-dir")]
    state_dir: Option<PathBuf>,

    /// Discard any previous resume state for this input and start over.
    #[arg(long = "start-over", default_value_t = false)]
    start_over: bool,

    /// Keep per-chunk resume state after a successful run.
    #[arg(long = "keep-ledger", default_value_t = false)]
    keep_ledger: bool,
}

fn state_dir(params: &Params) -> PathBuf {
    match &params.state_dir {
        Some(dir) => dir.clone(),
        None => params
            .audio_path
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join(".longhand"),
    }
}
