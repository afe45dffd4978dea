//! Job record and lifecycle state machine
//!
//! ```text
//! Pending ──▶ Processing ──▶ Completed
//!                  │
//!                  └───────▶ Failed
//! ```
//!
//! `report` is present only in `Completed`, `error` only in `Failed`. The
//! transition methods are the only way to change either, so the invariant
//! holds for every `Job` value that exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::report::Report;
use crate::types::{Result, ScreenerError};

// =============================================================================
// Identity
// =============================================================================

/// Opaque job identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// =============================================================================
// Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// =============================================================================
// Input
// =============================================================================

/// Validated request input, fixed at job creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInput {
    /// Company URL as submitted (normalized by the URL parser)
    pub url: String,
    /// Host with any leading `www.` removed
    pub domain: String,
}

impl JobInput {
    /// Parse and validate a company URL. Only absolute http(s) URLs with a host are accepted.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| ScreenerError::InvalidUrl {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        let parsed = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host"))?;

        let domain = host.strip_prefix("www.").unwrap_or(host).to_string();

        Ok(Self {
            url: parsed.to_string(),
            domain,
        })
    }
}

// =============================================================================
// Job
// =============================================================================

/// One report-generation request and its lifecycle state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    status: JobStatus,
    input: JobInput,
    report: Option<Report>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: JobId, input: JobInput) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Pending,
            input,
            report: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn input(&self) -> &JobInput {
        &self.input
    }

    /// Present iff status is `Completed`
    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// Present iff status is `Failed`
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Pending → Processing
    pub fn begin_processing(&mut self) -> Result<()> {
        self.transition(JobStatus::Processing)
    }

    /// Processing → Completed, attaching the finished report
    pub fn complete(&mut self, report: Report) -> Result<()> {
        self.transition(JobStatus::Completed)?;
        self.report = Some(report);
        Ok(())
    }

    /// Processing → Failed, recording a human-readable cause
    pub fn fail(&mut self, cause: impl Into<String>) -> Result<()> {
        self.transition(JobStatus::Failed)?;
        self.error = Some(cause.into());
        Ok(())
    }

    fn transition(&mut self, next: JobStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(ScreenerError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}
