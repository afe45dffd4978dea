//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Taxonomy
//!
//! - **Config**: missing or invalid credential/setting, fatal at construction
//! - **Provider**: a data source HTTP call failed, isolated per source
//! - **RateLimited**: LLM backend throttling that outlived the retry budget
//! - **UnknownModel**: no price entry for the requested model
//! - **Orchestration**: anything escaping the report pipeline glue
//!
//! Boundary errors (`JobNotFound`, `ReportNotReady`, `InvalidUrl`) are what the
//! inbound API maps onto client-facing status codes.

use std::time::Duration;
use thiserror::Error;

use crate::jobs::JobStatus;

// =============================================================================
// Error Categories
// =============================================================================

/// Categories assigned to LLM backend failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited - the only category the text generator retries
    RateLimit,
    /// Authentication failed
    Auth,
    /// Invalid request
    BadRequest,
    /// Connectivity issues
    Network,
    /// Server-side failure (5xx)
    Unavailable,
    /// Response could not be parsed
    ParseError,
    /// Anything else
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// LLM backend error with category and retry hint
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category for retry decisions
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
    /// Server-suggested wait time, informational only
    pub retry_after: Option<Duration>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
            retry_after: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
            retry_after: None,
        }
    }

    pub fn retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn is_rate_limited(&self) -> bool {
        self.category == ErrorCategory::RateLimit
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps raw backend failures onto categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP status code from the LLM backend
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        match status {
            429 => LlmError::with_provider(ErrorCategory::RateLimit, message, provider),
            401 | 403 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            400 | 404 | 422 => LlmError::with_provider(ErrorCategory::BadRequest, message, provider),
            500..=599 => LlmError::with_provider(ErrorCategory::Unavailable, message, provider),
            _ => LlmError::with_provider(ErrorCategory::Unknown, message, provider),
        }
    }

    /// Classify a transport-level failure (no HTTP status available)
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> LlmError {
        let category = if err.is_timeout() || err.is_connect() || err.is_request() {
            ErrorCategory::Network
        } else if err.is_decode() {
            ErrorCategory::ParseError
        } else {
            ErrorCategory::Unknown
        };
        LlmError::with_provider(category, err.to_string(), provider)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ScreenerError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // -------------------------------------------------------------------------
    // Collaborator Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Provider '{source_name}' failed{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Provider {
        source_name: String,
        status: Option<u16>,
        message: String,
    },

    #[error("LLM error: {0}")]
    Llm(LlmError),

    #[error("Rate limited after {attempts} attempts: {message}")]
    RateLimited { attempts: u32, message: String },

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    // -------------------------------------------------------------------------
    // Pipeline Errors
    // -------------------------------------------------------------------------
    #[error("Orchestration failed: {0}")]
    Orchestration(String),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    #[error("Invalid job transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    // -------------------------------------------------------------------------
    // Boundary Errors
    // -------------------------------------------------------------------------
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Report not yet ready. Current status: {status}")]
    ReportNotReady { status: JobStatus },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl From<LlmError> for ScreenerError {
    fn from(err: LlmError) -> Self {
        ScreenerError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, ScreenerError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl ScreenerError {
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    pub fn provider(
        source_name: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            source_name: source_name.into(),
            status,
            message: message.into(),
        }
    }

    pub fn orchestration(message: impl Into<String>) -> Self {
        Self::Orchestration(message.into())
    }

    /// Whether this is the backend's throttling signal
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Llm(e) if e.is_rate_limited())
    }

    /// Errors the inbound boundary reports as client mistakes rather than server faults
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::JobNotFound(_) | Self::ReportNotReady { .. } | Self::InvalidUrl { .. }
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
