//! Generate Command
//!
//! Runs one report job in-process and prints the result.
//!
//! Usage:
//!   company-screener generate <URL> [--format markdown|json] [--output FILE]

use clap::ValueEnum;
use serde_json::json;
use std::path::Path;

use crate::cli::ui::Output;
use crate::config::Config;
use crate::jobs::{Job, JobStatus};
use crate::service::ReportService;
use crate::types::{Result, ScreenerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

pub async fn run(
    config: &Config,
    url: &str,
    format: ReportFormat,
    output: Option<&Path>,
    out: &Output,
) -> Result<()> {
    let service = ReportService::from_config(config)?;

    out.info(&format!("Generating report for {url}"));
    let job = service.generate_now(url).await?;

    if job.status() != JobStatus::Completed {
        return Err(ScreenerError::orchestration(
            job.error().unwrap_or("job did not complete").to_string(),
        ));
    }

    let rendered = render(&job, format)?;
    match output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            out.success(&format!("Report written to {}", path.display()));
        }
        None => println!("{rendered}"),
    }

    if let Some(report) = job.report() {
        for section in report.unavailable_sections() {
            out.warning(&format!("{section}: data unavailable"));
        }
    }

    out.section("Usage");
    out.block(&service.usage().display());
    Ok(())
}

/// Render a finished job in the requested format
pub fn render(job: &Job, format: ReportFormat) -> Result<String> {
    let report = job.report().ok_or(ScreenerError::ReportNotReady {
        status: job.status(),
    })?;

    match format {
        ReportFormat::Markdown => Ok(report.to_markdown(&job.input().domain)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "job_id": job.id(),
            "url": job.input().url,
            "status": job.status(),
            "report": report,
        }))?),
    }
}
