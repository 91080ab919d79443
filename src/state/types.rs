use alacforge_common::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Job identifier, allocated by [`JobRegistry`](super::JobRegistry) from a
/// process-wide monotonically increasing counter.
pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Finished,
}

/// Accepted target sample rates, in Hz.
pub const SAMPLE_RATE_RANGE: RangeInclusive<u32> = 1_000..=768_000;

/// What a client asked to convert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRequest {
    /// Paths relative to the input directory (files or directories).
    pub paths: Vec<String>,
    /// Target sample rate in Hz, e.g. 44100 or 48000.
    #[serde(default)]
    pub sample_rate: Option<u32>,
}

impl JobRequest {
    /// Reject requests that cannot produce a useful job: nothing selected,
    /// or a sample rate outside [`SAMPLE_RATE_RANGE`].
    pub fn validate(&self) -> alacforge_common::Result<()> {
        if self.paths.is_empty() {
            return Err(Error::invalid_input("No paths selected"));
        }
        match self.sample_rate {
            Some(rate) if !SAMPLE_RATE_RANGE.contains(&rate) => Err(Error::invalid_input(format!(
                "Sample rate {} Hz is outside {}..={} Hz",
                rate,
                SAMPLE_RATE_RANGE.start(),
                SAMPLE_RATE_RANGE.end()
            ))),
            _ => Ok(()),
        }
    }
}

/// Tracked state of one conversion job, as returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub status: JobStatus,
    /// Append-only progress narrative.
    pub log: Vec<String>,
    /// Number of resolved input files; 0 until resolution completes.
    pub total: usize,
    /// Files attempted so far, successful or not.
    pub processed: usize,
    /// Input identifiers whose conversion failed.
    pub errors: Vec<String>,
    /// Set once when resolution completes and processing begins.
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub sample_rate: Option<u32>,
}

impl JobRecord {
    pub fn new(id: JobId, sample_rate: Option<u32>) -> Self {
        Self {
            id,
            status: JobStatus::Queued,
            log: Vec::new(),
            total: 0,
            processed: 0,
            errors: Vec::new(),
            start_time: None,
            end_time: None,
            sample_rate,
        }
    }

    /// `queued -> running`. Returns false (and changes nothing) from any
    /// other state.
    pub fn start(&mut self) -> bool {
        if self.status != JobStatus::Queued {
            return false;
        }
        self.status = JobStatus::Running;
        true
    }

    /// Record the outcome of resolution and start the clock.
    ///
    /// Only valid while running and before any file was attempted.
    pub fn begin(&mut self, total: usize) -> bool {
        if self.status != JobStatus::Running || self.start_time.is_some() {
            return false;
        }
        self.total = total;
        self.processed = 0;
        self.errors.clear();
        self.start_time = Some(Utc::now());
        true
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    /// Count a successfully converted file.
    pub fn record_success(&mut self) -> bool {
        self.advance()
    }

    /// Count a failed file and remember its identifier.
    pub fn record_failure(&mut self, file: &str) -> bool {
        if !self.advance() {
            return false;
        }
        if !self.errors.iter().any(|e| e == file) {
            self.errors.push(file.to_string());
        }
        true
    }

    fn advance(&mut self) -> bool {
        if self.status != JobStatus::Running
            || self.start_time.is_none()
            || self.processed >= self.total
        {
            return false;
        }
        self.processed += 1;
        true
    }

    /// `running -> finished`.
    pub fn finish(&mut self) -> bool {
        if self.status != JobStatus::Running {
            return false;
        }
        self.status = JobStatus::Finished;
        self.end_time = Some(Utc::now());
        true
    }

    pub fn is_finished(&self) -> bool {
        self.status == JobStatus::Finished
    }

    /// Files converted without error.
    pub fn succeeded(&self) -> usize {
        self.processed - self.errors.len()
    }

    pub fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id,
            status: self.status,
            total: self.total,
            processed: self.processed,
            failed: self.errors.len(),
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// Condensed view of a job for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    pub status: JobStatus,
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Job lifecycle event broadcast to subscribers (SSE clients).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum JobEvent {
    /// A job has been queued.
    JobCreated { id: JobId },
    /// A job's runner has picked it up.
    JobStarted { id: JobId },
    /// A file finished (successfully or not).
    JobProgress {
        id: JobId,
        processed: usize,
        total: usize,
        file: String,
        ok: bool,
    },
    /// A job reached its terminal state.
    JobFinished {
        #[serde(flatten)]
        job: JobSummary,
    },
}
