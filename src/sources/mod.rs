//! Data Source Adapters
//!
//! Each external provider sits behind the uniform [`DataSource`] trait: given
//! a company name and URL it eventually returns a JSON payload or an error.
//! Internally an adapter may run several dependent requests (search → detail
//! → sub-entities), but to the orchestrator it is one async operation.
//!
//! Credentials are checked when an adapter is constructed, never per call.

mod coresignal;
mod http;
mod perplexity;
mod scraper;
mod serper;
mod tracxn;
mod website;

pub use coresignal::CoreSignalSource;
pub use perplexity::PerplexitySource;
pub use scraper::{ScraperSource, html_to_text};
pub use serper::SerperSource;
pub use tracxn::TracxnSource;
pub use website::WebsiteSource;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::ai::SharedGenerator;
use crate::config::SourcesConfig;
use crate::types::{Result, ScreenerError};

// =============================================================================
// Source Identity
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// LLM web research restricted to the company's own site
    Website,
    /// Google results via Serper
    Serper,
    /// Perplexity research queries
    Perplexity,
    /// Raw company pages via ScraperAPI
    Scraper,
    /// LinkedIn company and people data via CoreSignal
    Coresignal,
    /// Funding rounds and investors via Tracxn
    Tracxn,
}

impl SourceKind {
    pub const ALL: [SourceKind; 6] = [
        Self::Website,
        Self::Serper,
        Self::Perplexity,
        Self::Scraper,
        Self::Coresignal,
        Self::Tracxn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Serper => "serper",
            Self::Perplexity => "perplexity",
            Self::Scraper => "scraper",
            Self::Coresignal => "coresignal",
            Self::Tracxn => "tracxn",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Unknown data source '{}'. Supported: {}",
                    s,
                    Self::ALL.map(|k| k.as_str()).join(", ")
                )
            })
    }
}

// =============================================================================
// Data Source Trait
// =============================================================================

/// What one successful fetch produced
#[derive(Debug, Clone, PartialEq)]
pub struct SourceData {
    /// Provider-shaped payload, consumed by the section prompts
    pub payload: Value,
    /// Company name the provider resolved, if it resolves names at all
    pub company_name: Option<String>,
}

impl SourceData {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            company_name: None,
        }
    }

    pub fn with_company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Fetch enrichment data; HTTP failures surface as `ScreenerError::Provider`
    async fn fetch(&self, company_name: &str, url: &str) -> Result<SourceData>;
}

pub type SharedSource = Arc<dyn DataSource>;

// =============================================================================
// Factory
// =============================================================================

/// Build every enabled source in configured order.
///
/// Fails with `ScreenerError::Config` if an enabled source lacks its key.
pub fn build_sources(
    config: &SourcesConfig,
    generator: SharedGenerator,
) -> Result<Vec<SharedSource>> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let mut sources: Vec<SharedSource> = Vec::new();

    for kind in config.enabled_kinds()? {
        let source: SharedSource = match kind {
            SourceKind::Website => Arc::new(WebsiteSource::new(Arc::clone(&generator))),
            SourceKind::Serper => Arc::new(SerperSource::new(
                require_key(kind, &config.serper_api_key, "SERPER_API_KEY")?,
                timeout,
            )?),
            SourceKind::Perplexity => Arc::new(PerplexitySource::new(
                require_key(kind, &config.perplexity_api_key, "PERPLEXITY_API_KEY")?,
                timeout,
            )?),
            SourceKind::Scraper => Arc::new(ScraperSource::new(
                require_key(kind, &config.scraper_api_key, "SCRAPER_API_KEY")?,
                timeout,
            )?),
            SourceKind::Coresignal => Arc::new(CoreSignalSource::new(
                require_key(kind, &config.coresignal_api_key, "CORESIGNAL_API_KEY")?,
                timeout,
            )?),
            SourceKind::Tracxn => Arc::new(TracxnSource::new(
                require_key(kind, &config.tracxn_api_key, "TRACXN_API_KEY")?,
                timeout,
            )?),
        };
        debug!(source = %kind, "Data source configured");
        sources.push(source);
    }

    Ok(sources)
}

fn require_key(kind: SourceKind, key: &Option<String>, env_var: &str) -> Result<SecretString> {
    key.as_deref()
        .filter(|k| !k.trim().is_empty())
        .map(|k| SecretString::from(k.to_string()))
        .ok_or_else(|| {
            ScreenerError::Config(format!(
                "{} API key is required. Set {} env var or sources.{}_api_key in config",
                kind, env_var, kind
            ))
        })
}
