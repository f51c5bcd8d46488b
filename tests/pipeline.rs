//! End-to-end pipeline tests driven by a scripted recognition engine.
//!
//! The recognizer trait is the substitution seam: these tests script exact
//! per-chunk results (including failures) and a synthetic audio source, so
//! resume and partial-transcript behavior can be exercised without a model.

use std::collections::HashMap;

use longhand::config::JobConfig;
use longhand::ledger::ResumeLedger;
use longhand::output_type::OutputType;
use longhand::pipeline::{self, Job};
use longhand::recognizer::{Recognition, Recognizer};
use longhand::segment::Segment;
use longhand::source::AudioSource;

const CHUNK_SECONDS: f64 = 900.0;

/// A fake source: fixed duration, and each returned buffer encodes the
/// requested range start in its first sample so the scripted recognizer can
/// tell chunks apart.
struct FakeSource {
    duration_seconds: f64,
}

impl AudioSource for FakeSource {
    fn duration_seconds(&mut self) -> longhand::Result<f64> {
        Ok(self.duration_seconds)
    }

    fn read_range(&mut self, start_seconds: f64, end_seconds: f64) -> longhand::Result<Vec<f32>> {
        assert!(end_seconds > start_seconds);
        let mut samples = vec![0.0f32; 16];
        samples[0] = start_seconds as f32;
        Ok(samples)
    }
}

enum ChunkScript {
    Succeed { language: &'static str, segments: Vec<Segment> },
    Fail,
}

/// Scripted engine: looks up the chunk by the start time the fake source
/// embedded, and counts invocations so tests can assert what was recomputed.
struct ScriptedRecognizer {
    script: HashMap<usize, ChunkScript>,
    calls_per_chunk: HashMap<usize, usize>,
    hints_seen: Vec<Option<String>>,
}

impl ScriptedRecognizer {
    fn new(script: HashMap<usize, ChunkScript>) -> Self {
        Self {
            script,
            calls_per_chunk: HashMap::new(),
            hints_seen: Vec::new(),
        }
    }

    fn calls(&self, chunk_index: usize) -> usize {
        self.calls_per_chunk.get(&chunk_index).copied().unwrap_or(0)
    }
}

impl Recognizer for ScriptedRecognizer {
    fn recognize(
        &mut self,
        samples: &[f32],
        language_hint: Option<&str>,
    ) -> longhand::Result<Recognition> {
        let chunk_index = (f64::from(samples[0]) / CHUNK_SECONDS).round() as usize;
        *self.calls_per_chunk.entry(chunk_index).or_insert(0) += 1;
        self.hints_seen.push(language_hint.map(str::to_owned));

        match self.script.get(&chunk_index) {
            Some(ChunkScript::Succeed { language, segments }) => Ok(Recognition {
                language: (*language).to_owned(),
                segments: segments.clone(),
            }),
            Some(ChunkScript::Fail) => Err(longhand::Error::Message(format!(
                "scripted failure for chunk {chunk_index}"
            ))),
            None => panic!("unscripted chunk {chunk_index}"),
        }
    }
}

struct Setup {
    _dir: tempfile::TempDir,
    input: std::path::PathBuf,
    ledger: ResumeLedger,
}

fn setup() -> Setup {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("lecture.mp3");
    std::fs::write(&input, b"not really audio, just a fingerprint anchor").expect("write input");
    let ledger = ResumeLedger::new(dir.path().join("state"));
    Setup {
        input,
        ledger,
        _dir: dir,
    }
}

fn forty_minute_script() -> HashMap<usize, ChunkScript> {
    HashMap::from([
        (
            0,
            ChunkScript::Succeed {
                language: "en",
                segments: vec![
                    Segment::new(0.0, 4.0, "welcome to the lecture"),
                    Segment::new(4.0, 8.5, "today we cover chunking"),
                ],
            },
        ),
        (
            1,
            ChunkScript::Succeed {
                language: "en",
                segments: vec![Segment::new(1.0, 6.0, "the middle part")],
            },
        ),
        (
            2,
            ChunkScript::Succeed {
                language: "en",
                segments: vec![Segment::new(0.5, 3.0, "and the conclusion")],
            },
        ),
    ])
}

fn prepare_job(setup: &Setup, source: &mut FakeSource, config: JobConfig) -> Job {
    Job::prepare(&setup.input, config, source).expect("job should prepare")
}

#[test]
fn forty_minute_file_plans_three_chunks_and_transcribes() {
    let setup = setup();
    let mut source = FakeSource {
        duration_seconds: 2400.0,
    };
    let mut recognizer = ScriptedRecognizer::new(forty_minute_script());

    let job = prepare_job(&setup, &mut source, JobConfig::default());
    assert_eq!(job.plan().len(), 3);
    assert_eq!(job.plan()[2].duration_seconds(), 600.0);

    let outcome =
        pipeline::run(&job, &mut source, &mut recognizer, &setup.ledger).expect("run should succeed");

    assert!(!outcome.is_partial());
    assert_eq!(outcome.transcript.language, "en");
    assert_eq!(outcome.transcript.segments.len(), 4);
    // Chunk 1's segment rebased by 900s, chunk 2's by 1800s.
    assert_eq!(outcome.transcript.segments[2].start_seconds, 901.0);
    assert_eq!(outcome.transcript.segments[3].start_seconds, 1800.5);
    assert_eq!(
        outcome.transcript.text,
        "welcome to the lecture today we cover chunking the middle part and the conclusion"
    );

    // Fully successful run clears its resume state.
    assert!(setup.ledger.completed_indices(job.fingerprint()).is_empty());
}

#[test]
fn detected_language_from_chunk_zero_hints_later_chunks() {
    let setup = setup();
    let mut source = FakeSource {
        duration_seconds: 2400.0,
    };
    let mut recognizer = ScriptedRecognizer::new(forty_minute_script());

    let job = prepare_job(&setup, &mut source, JobConfig::default());
    pipeline::run(&job, &mut source, &mut recognizer, &setup.ledger).expect("run should succeed");

    assert_eq!(
        recognizer.hints_seen,
        vec![None, Some("en".to_string()), Some("en".to_string())]
    );
}

#[test]
fn forced_language_wins_over_detection() {
    let setup = setup();
    let mut source = FakeSource {
        duration_seconds: 2400.0,
    };
    let mut recognizer = ScriptedRecognizer::new(forty_minute_script());

    let config = JobConfig {
        language: Some("de".to_string()),
        ..JobConfig::default()
    };
    let job = prepare_job(&setup, &mut source, config);
    let outcome =
        pipeline::run(&job, &mut source, &mut recognizer, &setup.ledger).expect("run should succeed");

    // Per-chunk detection still reported "en", but the forced label wins.
    assert_eq!(outcome.transcript.language, "de");
    assert!(recognizer.hints_seen.iter().all(|h| h.as_deref() == Some("de")));
}

#[test]
fn failed_chunk_yields_partial_outcome_and_rerun_retries_only_it() {
    let setup = setup();
    let mut source = FakeSource {
        duration_seconds: 2400.0,
    };

    // First run: chunk 1 fails.
    let mut script = forty_minute_script();
    script.insert(1, ChunkScript::Fail);
    let mut recognizer = ScriptedRecognizer::new(script);

    let job = prepare_job(&setup, &mut source, JobConfig::default());
    let outcome =
        pipeline::run(&job, &mut source, &mut recognizer, &setup.ledger).expect("partial is not fatal");

    assert!(outcome.is_partial());
    assert_eq!(outcome.failed_chunks, vec![1]);
    // The gap sits exactly at chunk 1's global range: nothing between 900 and 1800.
    assert!(
        outcome
            .transcript
            .segments
            .iter()
            .all(|s| s.end_seconds <= 900.0 || s.start_seconds >= 1800.0)
    );
    // Failed chunk was not recorded; the completed ones were kept for resume.
    assert_eq!(setup.ledger.completed_indices(job.fingerprint()), vec![0, 2]);

    // Second run: chunk 1 now succeeds. Chunks 0 and 2 must come from the
    // ledger, not recomputation.
    let mut recognizer = ScriptedRecognizer::new(forty_minute_script());
    let outcome =
        pipeline::run(&job, &mut source, &mut recognizer, &setup.ledger).expect("rerun should succeed");

    assert!(!outcome.is_partial());
    assert_eq!(outcome.resumed_chunks, vec![0, 2]);
    assert_eq!(recognizer.calls(0), 0);
    assert_eq!(recognizer.calls(1), 1);
    assert_eq!(recognizer.calls(2), 0);

    // And the stitched result is identical to an uninterrupted run.
    let mut fresh = ScriptedRecognizer::new(forty_minute_script());
    let fresh_ledger = ResumeLedger::new(setup.ledger.root().join("fresh"));
    let uninterrupted =
        pipeline::run(&job, &mut source, &mut fresh, &fresh_ledger).expect("fresh run");
    assert_eq!(outcome.transcript, uninterrupted.transcript);
}

#[test]
fn all_chunks_failing_fails_the_job() {
    let setup = setup();
    let mut source = FakeSource {
        duration_seconds: 2400.0,
    };
    let script = HashMap::from([
        (0, ChunkScript::Fail),
        (1, ChunkScript::Fail),
        (2, ChunkScript::Fail),
    ]);
    let mut recognizer = ScriptedRecognizer::new(script);

    let job = prepare_job(&setup, &mut source, JobConfig::default());
    let err = pipeline::run(&job, &mut source, &mut recognizer, &setup.ledger).unwrap_err();
    assert!(matches!(
        err,
        longhand::Error::RecognitionFailure { ref failed_chunks } if failed_chunks == &vec![0, 1, 2]
    ));
}

#[test]
fn structured_output_of_a_run_round_trips() {
    let setup = setup();
    let mut source = FakeSource {
        duration_seconds: 2400.0,
    };
    let mut recognizer = ScriptedRecognizer::new(forty_minute_script());

    let config = JobConfig {
        output_type: OutputType::Structured,
        ..JobConfig::default()
    };
    let job = prepare_job(&setup, &mut source, config);
    let outcome =
        pipeline::run(&job, &mut source, &mut recognizer, &setup.ledger).expect("run should succeed");

    let json = longhand::render::render_to_string(&outcome.transcript, OutputType::Structured)
        .expect("render");
    let back = longhand::structured_renderer::parse(&json).expect("parse");
    assert_eq!(back, outcome.transcript);
}

#[test]
fn derived_output_path_follows_the_format() {
    let setup = setup();
    let mut source = FakeSource {
        duration_seconds: 2400.0,
    };

    let config = JobConfig {
        output_type: OutputType::Subtitle,
        ..JobConfig::default()
    };
    let job = prepare_job(&setup, &mut source, config);
    assert_eq!(
        job.output_path(),
        setup.input.with_extension("srt")
    );
}

#[test]
fn invalid_configuration_is_rejected_before_any_work() {
    let setup = setup();
    let mut source = FakeSource {
        duration_seconds: 2400.0,
    };

    let config = JobConfig {
        chunk_minutes: 0,
        ..JobConfig::default()
    };
    let err = Job::prepare(&setup.input, config, &mut source).unwrap_err();
    assert!(matches!(err, longhand::Error::InvalidConfiguration(_)));
}

#[test]
fn missing_input_is_source_unreadable() {
    let mut source = FakeSource {
        duration_seconds: 2400.0,
    };
    let err = Job::prepare("/no/such/input.mp3", JobConfig::default(), &mut source).unwrap_err();
    assert!(matches!(err, longhand::Error::SourceUnreadable { .. }));
}

#[test]
fn keep_ledger_preserves_resume_state_after_success() {
    let setup = setup();
    let mut source = FakeSource {
        duration_seconds: 2400.0,
    };
    let mut recognizer = ScriptedRecognizer::new(forty_minute_script());

    let config = JobConfig {
        keep_ledger: true,
        ..JobConfig::default()
    };
    let job = prepare_job(&setup, &mut source, config);
    pipeline::run(&job, &mut source, &mut recognizer, &setup.ledger).expect("run should succeed");

    assert_eq!(
        setup.ledger.completed_indices(job.fingerprint()),
        vec![0, 1, 2]
    );
}
