//! Configuration Types
//!
//! All configuration structures with sensible defaults.

use serde::{Deserialize, Serialize};

use crate::ai::pricing::{known_models, price_for};
use crate::constants::{llm, network, retry};
use crate::sources::SourceKind;
use crate::types::{Result, ScreenerError};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// LLM backend settings
    pub llm: LlmConfig,

    /// Data provider settings
    pub sources: SourcesConfig,

    /// Report pipeline settings
    pub report: ReportConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ScreenerError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ScreenerError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ScreenerError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !(1..=retry::MAX_ATTEMPTS_LIMIT).contains(&self.llm.max_attempts) {
            return Err(ScreenerError::Config(format!(
                "LLM max_attempts must be between 1 and {}, got {}",
                retry::MAX_ATTEMPTS_LIMIT,
                self.llm.max_attempts
            )));
        }

        if self.llm.retry_base_delay_ms > retry::MAX_BASE_DELAY_MS {
            return Err(ScreenerError::Config(format!(
                "LLM retry_base_delay_ms must be at most {}, got {}",
                retry::MAX_BASE_DELAY_MS,
                self.llm.retry_base_delay_ms
            )));
        }

        for (field, model) in [
            ("model", &self.llm.model),
            ("search_model", &self.llm.search_model),
        ] {
            price_for(model).map_err(|_| {
                ScreenerError::Config(format!(
                    "LLM {} '{}' has no price entry. Known models: {}",
                    field,
                    model,
                    known_models().collect::<Vec<_>>().join(", ")
                ))
            })?;
        }

        if self.sources.timeout_secs == 0 {
            return Err(ScreenerError::Config(
                "Source timeout_secs must be greater than 0".to_string(),
            ));
        }

        for name in &self.sources.enabled {
            name.parse::<SourceKind>().map_err(ScreenerError::Config)?;
        }

        if self.report.deadline_secs == Some(0) {
            return Err(ScreenerError::Config(
                "Report deadline_secs must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: network::DEFAULT_HOST.to_string(),
            port: network::DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

/// LLM backend configuration
///
/// The API key is never serialized and is redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend type: "openai"
    pub provider: String,
    /// Model used for section writing
    pub model: String,
    /// Model used for web-answer lookups
    pub search_model: String,
    /// API base URL (for compatible endpoints)
    pub api_base: Option<String>,
    /// API key, falls back to OPENAI_API_KEY
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature for the system-role convention
    pub temperature: f32,
    /// Completion token limit
    pub max_tokens: u32,
    /// Deterministic sampling seed
    pub seed: i64,
    /// Attempts per call under rate limiting
    pub max_attempts: u32,
    /// First backoff interval in milliseconds
    pub retry_base_delay_ms: u64,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("search_model", &self.search_model)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("seed", &self.seed)
            .field("max_attempts", &self.max_attempts)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: llm::DEFAULT_MODEL.to_string(),
            search_model: llm::DEFAULT_SEARCH_MODEL.to_string(),
            api_base: None,
            api_key: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: llm::DEFAULT_TEMPERATURE,
            max_tokens: llm::DEFAULT_MAX_TOKENS,
            seed: llm::DEFAULT_SEED,
            max_attempts: retry::MAX_ATTEMPTS,
            retry_base_delay_ms: retry::BASE_DELAY_MS,
        }
    }
}

// =============================================================================
// Data Source Configuration
// =============================================================================

/// Data provider configuration
///
/// Keys fall back to the conventional vendor environment variables.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Sources to query, in merge order
    pub enabled: Vec<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    #[serde(skip_serializing)]
    pub serper_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub perplexity_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub scraper_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub coresignal_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub tracxn_api_key: Option<String>,
}

impl std::fmt::Debug for SourcesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("SourcesConfig")
            .field("enabled", &self.enabled)
            .field("timeout_secs", &self.timeout_secs)
            .field("serper_api_key", &redact(&self.serper_api_key))
            .field("perplexity_api_key", &redact(&self.perplexity_api_key))
            .field("scraper_api_key", &redact(&self.scraper_api_key))
            .field("coresignal_api_key", &redact(&self.coresignal_api_key))
            .field("tracxn_api_key", &redact(&self.tracxn_api_key))
            .finish()
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            enabled: SourceKind::ALL.iter().map(|k| k.to_string()).collect(),
            timeout_secs: network::SOURCE_TIMEOUT_SECS,
            serper_api_key: None,
            perplexity_api_key: None,
            scraper_api_key: None,
            coresignal_api_key: None,
            tracxn_api_key: None,
        }
    }
}

impl SourcesConfig {
    /// Enabled sources in configured order (invalid names were rejected by `validate`)
    pub fn enabled_kinds(&self) -> Result<Vec<SourceKind>> {
        self.enabled
            .iter()
            .map(|name| name.parse::<SourceKind>().map_err(ScreenerError::Config))
            .collect()
    }
}

// =============================================================================
// Report Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Maximum operations in flight per fan-out stage (0 = unbounded)
    pub max_concurrency: usize,
    /// Overall pipeline deadline in seconds (unset = none)
    pub deadline_secs: Option<u64>,
}
