//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which lays out a temporary input tree, builds an
//! [`AppContext`] around it and swaps ffmpeg for a scriptable
//! [`FakeTranscoder`].

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alacforge::config::Config;
use alacforge::server::AppContext;
use alacforge::state::{JobId, JobRecord, JobRegistry};
use alacforge_av::{Error, Result, TranscodeRequest, Transcoder};
use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;

/// Files created under the input directory by [`TestHarness::new`].
pub const FIXTURE_FILES: &[&str] = &[
    "Album/01 Intro.flac",
    "Album/02 Song (44kHz).flac",
    "Album/cover.jpg",
    "Album/Disc2/01 Outro.FLAC",
    "Covers/front.jpg",
    "Single.flac",
    "notes.txt",
];

/// How the fake reacts to a given source file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    Succeed,
    ExitNonZero,
    IoFault,
    Panic,
}

/// In-process stand-in for ffmpeg.
#[derive(Default)]
pub struct FakeTranscoder {
    failures: Mutex<Vec<(String, Behaviour)>>,
    delay: Mutex<Duration>,
    calls: Mutex<Vec<TranscodeRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeTranscoder {
    /// Make every source whose file name equals `name` behave as `behaviour`.
    pub fn on(&self, name: &str, behaviour: Behaviour) {
        self.failures.lock().push((name.to_string(), behaviour));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn calls(&self) -> Vec<TranscodeRequest> {
        self.calls.lock().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn behaviour_for(&self, source: &Path) -> Behaviour {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.failures
            .lock()
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, b)| *b)
            .unwrap_or(Behaviour::Succeed)
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, request: &TranscodeRequest) -> Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.lock();
        tokio::time::sleep(delay).await;

        self.calls.lock().push(request.clone());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.behaviour_for(&request.source) {
            Behaviour::Succeed => Ok(()),
            Behaviour::ExitNonZero => Err(Error::tool_exited("ffmpeg", Some(1))),
            Behaviour::IoFault => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only output",
            ))),
            Behaviour::Panic => panic!("fake transcoder exploded"),
        }
    }
}

/// Temporary input/output tree plus a fully built [`AppContext`].
pub struct TestHarness {
    pub ctx: AppContext,
    pub transcoder: Arc<FakeTranscoder>,
    pub input: PathBuf,
    pub output: PathBuf,
    _dir: TempDir,
}

impl TestHarness {
    /// Create a harness with [`FIXTURE_FILES`] and an always-succeeding fake.
    pub fn new() -> Self {
        Self::with_transcoder(FakeTranscoder::default())
    }

    pub fn with_transcoder(transcoder: FakeTranscoder) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let input = dir.path().join("input");
        let output = dir.path().join("output");

        for file in FIXTURE_FILES {
            let path = input.join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, b"fLaC").unwrap();
        }
        std::fs::create_dir_all(input.join("Empty")).unwrap();

        let mut config = Config::default();
        config.paths.input_dir = input.clone();
        config.paths.output_dir = output.clone();

        let transcoder = Arc::new(transcoder);
        let ctx = AppContext::with_transcoder(config, transcoder.clone())
            .expect("failed to build context");

        Self {
            ctx,
            transcoder,
            input,
            output,
            _dir: dir,
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.ctx.registry
    }

    /// Poll until the job is finished.
    pub async fn wait_finished(&self, id: JobId) -> JobRecord {
        wait_finished(&self.ctx.registry, id).await
    }
}

/// Poll the registry until `id` reaches `finished` (panics after ~5s).
pub async fn wait_finished(registry: &JobRegistry, id: JobId) -> JobRecord {
    for _ in 0..500 {
        if let Some(record) = registry.get(id) {
            if record.is_finished() {
                return record;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} did not finish in time");
}

pub fn paths(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
