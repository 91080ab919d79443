//! In-memory job registry.
//!
//! The registry is the single source of truth for job state. It is built once
//! at startup and shared (`Arc`) between the HTTP handlers and every job
//! runner. Readers get cloned snapshots taken under the lock, so a status
//! poll can be stale but never sees a half-written field. Each record can be
//! claimed for mutation exactly once; the claimant (the job's runner) holds
//! the only [`JobHandle`] for it.

mod types;

pub use types::*;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 256;

struct Entry {
    record: JobRecord,
    claimed: bool,
}

pub struct JobRegistry {
    next_id: AtomicU64,
    jobs: RwLock<HashMap<JobId, Entry>>,
    event_tx: broadcast::Sender<JobEvent>,
}

impl JobRegistry {
    pub fn new() -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            next_id: AtomicU64::new(0),
            jobs: RwLock::new(HashMap::new()),
            event_tx,
        })
    }

    /// Allocate a new id and insert a fresh queued record for it.
    pub fn create(&self, sample_rate: Option<u32>) -> JobId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.jobs.write().insert(
            id,
            Entry {
                record: JobRecord::new(id, sample_rate),
                claimed: false,
            },
        );
        self.broadcast(JobEvent::JobCreated { id });
        id
    }

    /// Snapshot of a job, or `None` if the id was never allocated.
    pub fn get(&self, id: JobId) -> Option<JobRecord> {
        self.jobs.read().get(&id).map(|entry| entry.record.clone())
    }

    /// Summaries of all jobs, oldest first.
    pub fn list(&self) -> Vec<JobSummary> {
        let jobs = self.jobs.read();
        let mut summaries: Vec<_> = jobs.values().map(|e| e.record.summary()).collect();
        summaries.sort_by_key(|s| s.id);
        summaries
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    /// Take the mutation handle for a job. Succeeds at most once per id.
    pub(crate) fn claim(self: &Arc<Self>, id: JobId) -> Option<JobHandle> {
        let mut jobs = self.jobs.write();
        let entry = jobs.get_mut(&id)?;
        if entry.claimed {
            tracing::warn!("Job {} already has a runner", id);
            return None;
        }
        entry.claimed = true;
        Some(JobHandle {
            id,
            registry: Arc::clone(self),
        })
    }

    fn broadcast(&self, event: JobEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("No subscribers for job event");
        }
    }

    fn update<R>(&self, id: JobId, f: impl FnOnce(&mut JobRecord) -> R) -> Option<R> {
        let mut jobs = self.jobs.write();
        jobs.get_mut(&id).map(|entry| f(&mut entry.record))
    }
}

/// Exclusive write access to one job record.
///
/// Each method takes the registry lock for a single field group update.
pub struct JobHandle {
    id: JobId,
    registry: Arc<JobRegistry>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn snapshot(&self) -> Option<JobRecord> {
        self.registry.get(self.id)
    }

    pub fn start(&self) {
        if self.mutate(JobRecord::start) {
            self.registry.broadcast(JobEvent::JobStarted { id: self.id });
        } else {
            tracing::warn!("Job {} could not transition to running", self.id);
        }
    }

    pub fn begin(&self, total: usize) {
        if !self.mutate(|job| job.begin(total)) {
            tracing::warn!("Job {} could not begin processing", self.id);
        }
    }

    pub fn log(&self, line: impl Into<String>) {
        let line = line.into();
        self.registry.update(self.id, |job| job.push_log(line));
    }

    pub fn record_success(&self, file: &str) {
        self.record(file, true, JobRecord::record_success);
    }

    pub fn record_failure(&self, file: &str) {
        self.record(file, false, |job| job.record_failure(file));
    }

    pub fn finish(&self) {
        let summary = self
            .registry
            .update(self.id, |job| job.finish().then(|| job.summary()))
            .flatten();
        match summary {
            Some(job) => self.registry.broadcast(JobEvent::JobFinished { job }),
            None => tracing::warn!("Job {} could not transition to finished", self.id),
        }
    }

    fn record(&self, file: &str, ok: bool, f: impl FnOnce(&mut JobRecord) -> bool) {
        let progress = self
            .registry
            .update(self.id, |job| {
                if f(job) {
                    Some((job.processed, job.total))
                } else {
                    None
                }
            })
            .flatten();
        match progress {
            Some((processed, total)) => self.registry.broadcast(JobEvent::JobProgress {
                id: self.id,
                processed,
                total,
                file: file.to_string(),
                ok,
            }),
            None => tracing::warn!("Job {} rejected progress for {}", self.id, file),
        }
    }

    fn mutate(&self, f: impl FnOnce(&mut JobRecord) -> bool) -> bool {
        self.registry.update(self.id, f).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic_and_unique() {
        let registry = JobRegistry::new();
        let a = registry.create(None);
        let b = registry.create(Some(44100));
        let c = registry.create(None);
        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(b).unwrap().sample_rate, Some(44100));
    }

    #[test]
    fn test_get_unknown_is_none() {
        let registry = JobRegistry::new();
        assert!(registry.get(0).is_none());
        registry.create(None);
        assert!(registry.get(0).is_some());
        assert!(registry.get(1).is_none());
    }

    #[test]
    fn test_claim_is_exclusive() {
        let registry = JobRegistry::new();
        let id = registry.create(None);
        assert!(registry.claim(id).is_some());
        assert!(registry.claim(id).is_none());
        assert!(registry.claim(id + 1).is_none());
    }

    #[test]
    fn test_handle_lifecycle() {
        let registry = JobRegistry::new();
        let id = registry.create(None);
        let job = registry.claim(id).unwrap();

        job.start();
        assert_eq!(registry.get(id).unwrap().status, JobStatus::Running);

        job.begin(2);
        job.log("Converting a.flac → a.m4a");
        job.record_success("a.flac");
        job.record_failure("b.flac");
        job.finish();

        let record = registry.get(id).unwrap();
        assert_eq!(record.status, JobStatus::Finished);
        assert_eq!(record.total, 2);
        assert_eq!(record.processed, 2);
        assert_eq!(record.errors, vec!["b.flac".to_string()]);
        assert_eq!(record.log.len(), 1);
    }

    #[test]
    fn test_snapshots_are_detached() {
        let registry = JobRegistry::new();
        let id = registry.create(None);
        let before = registry.get(id).unwrap();
        let job = registry.claim(id).unwrap();
        job.start();
        assert_eq!(before.status, JobStatus::Queued);
        assert_eq!(job.snapshot().unwrap().status, JobStatus::Running);
    }

    #[test]
    fn test_list_sorted_by_id() {
        let registry = JobRegistry::new();
        for _ in 0..5 {
            registry.create(None);
        }
        let ids: Vec<_> = registry.list().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let registry = JobRegistry::new();
        let mut rx = registry.subscribe();

        let id = registry.create(None);
        let job = registry.claim(id).unwrap();
        job.start();
        job.begin(1);
        job.record_success("a.flac");
        job.finish();

        assert!(matches!(rx.recv().await.unwrap(), JobEvent::JobCreated { id: 0 }));
        assert!(matches!(rx.recv().await.unwrap(), JobEvent::JobStarted { id: 0 }));
        match rx.recv().await.unwrap() {
            JobEvent::JobProgress { processed, total, ok, .. } => {
                assert_eq!((processed, total, ok), (1, 1, true));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.recv().await.unwrap() {
            JobEvent::JobFinished { job } => assert_eq!(job.processed, 1),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_concurrent_creates_never_collide() {
        let registry = JobRegistry::new();
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    (0..100).map(|_| registry.create(None)).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<_> = threads
            .into_iter()
            .flat_map(|t| t.join().unwrap())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 800);
        assert_eq!(registry.len(), 800);
    }
}
