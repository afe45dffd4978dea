//! Job Store
//!
//! Process-wide keyed map from job id to job. Entries are never removed within
//! the process lifetime; eviction and persistence belong to whoever wraps this.
//!
//! ## Concurrency Design
//!
//! `InMemoryJobStore` uses `DashMap`, whose per-shard locks make `update` atomic
//! with respect to `get` on the same id: the mutator runs on a copy under the
//! entry's write guard and the copy replaces the stored job only if the mutator
//! succeeds, so readers see either the old job or the fully mutated one.

use dashmap::DashMap;
use std::sync::Arc;

use super::job::{Job, JobId, JobInput};
use crate::types::{Result, ScreenerError};

/// Narrow create/get/update interface over job storage
pub trait JobStore: Send + Sync {
    /// Store a new `Pending` job and return its id
    fn create(&self, input: JobInput) -> JobId;

    /// Snapshot of the job, if it exists
    fn get(&self, id: &JobId) -> Option<Job>;

    /// Apply `mutator` atomically and return the updated job.
    ///
    /// Fails with `JobNotFound` for unknown ids. If the mutator fails, the
    /// stored job is left untouched and its error is returned.
    fn update(&self, id: &JobId, mutator: &mut dyn FnMut(&mut Job) -> Result<()>) -> Result<Job>;
}

/// Shared job store handle for the service, orchestrator and server.
pub type SharedJobStore = Arc<dyn JobStore>;

/// Volatile job store backed by a concurrent map
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<JobId, Job>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedJobStore {
        Arc::new(Self::new())
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl JobStore for InMemoryJobStore {
    fn create(&self, input: JobInput) -> JobId {
        let id = JobId::generate();
        self.jobs.insert(id.clone(), Job::new(id.clone(), input));
        id
    }

    fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs.get(id).map(|entry| entry.value().clone())
    }

    fn update(&self, id: &JobId, mutator: &mut dyn FnMut(&mut Job) -> Result<()>) -> Result<Job> {
        let mut entry = self
            .jobs
            .get_mut(id)
            .ok_or_else(|| ScreenerError::JobNotFound(id.to_string()))?;

        let mut draft = entry.value().clone();
        mutator(&mut draft)?;
        *entry.value_mut() = draft.clone();
        Ok(draft)
    }
}
