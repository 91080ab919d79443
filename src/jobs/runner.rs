//! Background execution of conversion jobs.
//!
//! One job runs on one detached tokio task. Files within a job are converted
//! strictly one after another in sorted order, so a job never has more than
//! one ffmpeg process alive. Different jobs run concurrently and share only
//! the registry.

use crate::state::{JobHandle, JobId, JobRecord, JobRegistry, JobRequest};
use alacforge_av::{Error as AvError, TranscodeRequest, Transcoder};
use alacforge_common::{naming::output_relative_path, Sandbox};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::resolver::{resolve_paths, Resolution};

/// Result of converting a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Converted,
    Failed { message: String },
}

/// Runs jobs against a fixed input sandbox, output directory and transcoder.
#[derive(Clone)]
pub struct JobRunner {
    registry: Arc<JobRegistry>,
    sandbox: Sandbox,
    output_dir: PathBuf,
    transcoder: Arc<dyn Transcoder>,
}

impl JobRunner {
    pub fn new(
        registry: Arc<JobRegistry>,
        sandbox: Sandbox,
        output_dir: impl Into<PathBuf>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        Self {
            registry,
            sandbox,
            output_dir: output_dir.into(),
            transcoder,
        }
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Create a job and start it on its own background task.
    ///
    /// Returns as soon as the job is registered; the task is not tracked
    /// beyond the record's `status`.
    pub fn submit(&self, request: JobRequest) -> JobId {
        let id = self.registry.create(request.sample_rate);
        match self.registry.claim(id) {
            Some(job) => {
                let runner = self.clone();
                tokio::spawn(
                    async move { runner.execute(job, request).await }
                        .instrument(info_span!("job", id)),
                );
            }
            None => error!("Freshly created job {} was already claimed", id),
        }
        id
    }

    /// Create a job and drive it to completion on the current task.
    pub async fn run(&self, request: JobRequest) -> Option<JobRecord> {
        let id = self.registry.create(request.sample_rate);
        let job = self.registry.claim(id)?;
        self.execute(job, request)
            .instrument(info_span!("job", id))
            .await;
        self.registry.get(id)
    }

    async fn execute(&self, job: JobHandle, request: JobRequest) {
        job.start();
        info!(
            "Job {} started with {} selected paths",
            job.id(),
            request.paths.len()
        );

        let resolution = self.resolve(&request.paths).await;
        for notice in &resolution.skipped {
            job.log(notice.to_string());
        }

        job.begin(resolution.files.len());
        info!("Job {} resolved {} files", job.id(), resolution.files.len());

        for file in &resolution.files {
            match self.process_file(&job, file, request.sample_rate).await {
                FileOutcome::Converted => {
                    job.log("Done.");
                    job.record_success(file);
                }
                FileOutcome::Failed { message } => {
                    warn!("{}", message);
                    job.log(message);
                    job.record_failure(file);
                }
            }
        }

        job.finish();
        if let Some(record) = job.snapshot() {
            info!(
                "Job {} finished: {} converted, {} failed",
                record.id,
                record.succeeded(),
                record.errors.len()
            );
        }
    }

    async fn resolve(&self, paths: &[String]) -> Resolution {
        let sandbox = self.sandbox.clone();
        let paths = paths.to_vec();
        match tokio::task::spawn_blocking(move || resolve_paths(&sandbox, &paths)).await {
            Ok(resolution) => resolution,
            Err(e) => {
                error!("Path resolution task failed: {}", e);
                Resolution::default()
            }
        }
    }

    /// Convert one file. Every failure, including a panicking transcoder, is
    /// folded into [`FileOutcome::Failed`].
    async fn process_file(
        &self,
        job: &JobHandle,
        file: &str,
        sample_rate: Option<u32>,
    ) -> FileOutcome {
        let out_rel = output_relative_path(Path::new(file), sample_rate);
        job.log(format!("Converting {} → {}", file, out_rel.display()));

        let request = TranscodeRequest::new(
            self.sandbox.root().join(file),
            self.output_dir.join(&out_rel),
        )
        .with_sample_rate(sample_rate);
        debug!("Transcoding {:?} -> {:?}", request.source, request.destination);

        let result = AssertUnwindSafe(self.transcoder.transcode(&request))
            .catch_unwind()
            .await;

        match result {
            Ok(Ok(())) => FileOutcome::Converted,
            Ok(Err(e @ AvError::ToolExited { .. })) => FileOutcome::Failed {
                message: e.to_string(),
            },
            Ok(Err(e)) => FileOutcome::Failed {
                message: format!("Exception processing {file}: {e}"),
            },
            Err(_) => FileOutcome::Failed {
                message: format!("Exception processing {file}: transcoder panicked"),
            },
        }
    }
}
