//! Company Screener - research reports for a company website
//!
//! A report request names a company URL. The orchestrator fetches every
//! configured data provider concurrently, merges the results into one bag,
//! then writes seven report sections concurrently through a shared LLM
//! generator. Each job moves `pending → processing → completed | failed`
//! and is polled through [`ReportService`] or its HTTP surface.
//!
//! ## Quick Start
//!
//! ```ignore
//! use company_screener::{ConfigLoader, ReportService};
//!
//! let config = ConfigLoader::load(None)?;
//! let service = ReportService::from_config(&config)?;
//! let job = service.generate_now("https://acme.co").await?;
//! println!("{}", job.report().unwrap().to_markdown("acme.co"));
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: LLM backend, retrying generator, pricing and usage
//! - [`sources`]: data provider adapters
//! - [`report`]: data bag, section writers, orchestrator
//! - [`jobs`]: job lifecycle and the in-memory store
//! - [`server`]: HTTP API
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod fanout;
pub mod jobs;
pub mod report;
pub mod server;
pub mod service;
pub mod sources;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};
pub use types::error::{ErrorCategory, Result, ScreenerError};

pub use jobs::{InMemoryJobStore, Job, JobId, JobInput, JobStatus, JobStore};
pub use report::{RawDataBag, Report, ReportOrchestrator, Section};
pub use service::ReportService;

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{LlmProvider, SharedGenerator, TextGenerator, UsageSnapshot};

// =============================================================================
// Source Re-exports
// =============================================================================

pub use sources::{DataSource, SourceData, SourceKind};
