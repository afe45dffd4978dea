//! Inbound boundary, independent of transport
//!
//! A report request validates the URL, creates a `Pending` job and hands the
//! orchestration to the runtime without waiting for it. Status and report
//! queries read the job store; the report is only handed out once the job
//! has completed.

use std::sync::Arc;
use tracing::{error, info};

use crate::ai::UsageSnapshot;
use crate::config::Config;
use crate::jobs::{InMemoryJobStore, Job, JobId, JobInput, JobStatus, SharedJobStore};
use crate::report::{Report, ReportOrchestrator};
use crate::types::{Result, ScreenerError};

pub struct ReportService {
    store: SharedJobStore,
    orchestrator: Arc<ReportOrchestrator>,
}

pub type SharedService = Arc<ReportService>;

impl ReportService {
    pub fn new(orchestrator: ReportOrchestrator) -> Self {
        Self {
            store: Arc::clone(orchestrator.store()),
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// Service over a fresh in-memory job store
    pub fn from_config(config: &Config) -> Result<Self> {
        let orchestrator = ReportOrchestrator::from_config(config, InMemoryJobStore::shared())?;
        Ok(Self::new(orchestrator))
    }

    /// Create a job for `url` and schedule it; returns without waiting.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn request_report(&self, url: &str) -> Result<JobId> {
        let input = JobInput::parse(url)?;
        let id = self.store.create(input);
        info!(job_id = %id, url, "Report requested");

        let orchestrator = Arc::clone(&self.orchestrator);
        let job_id = id.clone();
        tokio::spawn(async move {
            if let Err(e) = orchestrator.run(&job_id).await {
                error!(job_id = %job_id, error = %e, "Job could not be run");
            }
        });

        Ok(id)
    }

    /// Create a job for `url` and run it to a terminal state before returning
    pub async fn generate_now(&self, url: &str) -> Result<Job> {
        let input = JobInput::parse(url)?;
        let id = self.store.create(input);
        self.orchestrator.run(&id).await?;
        self.job(&id)
    }

    pub fn job(&self, id: &JobId) -> Result<Job> {
        self.store
            .get(id)
            .ok_or_else(|| ScreenerError::JobNotFound(id.to_string()))
    }

    pub fn job_status(&self, id: &JobId) -> Result<JobStatus> {
        self.job(id).map(|job| job.status())
    }

    /// The finished report; `ReportNotReady` until the job has completed
    pub fn report(&self, id: &JobId) -> Result<Report> {
        let job = self.job(id)?;
        match job.report() {
            Some(report) if job.status() == JobStatus::Completed => Ok(report.clone()),
            _ => Err(ScreenerError::ReportNotReady {
                status: job.status(),
            }),
        }
    }

    /// LLM usage accumulated by this service's generator
    pub fn usage(&self) -> UsageSnapshot {
        self.orchestrator.generator().usage()
    }
}
