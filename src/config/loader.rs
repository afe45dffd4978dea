//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (<config dir>/company-screener/config.toml)
//! 3. Project config (./screener.toml)
//! 4. Explicit config file (--config)
//! 5. Environment variables (SCREENER_* prefix, `__` separates sections)
//!
//! Vendor key variables (OPENAI_API_KEY, SERPER_API_KEY, ...) fill in any key
//! the layers above left unset.

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Config;
use crate::types::{Result, ScreenerError};

const PROJECT_CONFIG_FILE: &str = "screener.toml";
const ENV_PREFIX: &str = "SCREENER_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → explicit file → env vars → vendor key fallbacks
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ScreenerError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            debug!("Loading config from: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        // e.g. SCREENER_LLM__MODEL -> llm.model
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config: Config = figment
            .extract()
            .map_err(|e| ScreenerError::Config(format!("Configuration error: {}", e)))?;

        Self::apply_vendor_env(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only (no env, no vendor fallbacks)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| ScreenerError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Fill unset API keys from the conventional vendor variables
    fn apply_vendor_env(config: &mut Config) {
        fill_from_env(&mut config.llm.api_key, "OPENAI_API_KEY");
        fill_from_env(&mut config.sources.serper_api_key, "SERPER_API_KEY");
        fill_from_env(&mut config.sources.perplexity_api_key, "PERPLEXITY_API_KEY");
        fill_from_env(&mut config.sources.scraper_api_key, "SCRAPER_API_KEY");
        fill_from_env(&mut config.sources.coresignal_api_key, "CORESIGNAL_API_KEY");
        fill_from_env(&mut config.sources.tracxn_api_key, "TRACXN_API_KEY");
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Global config directory (platform config dir / company-screener)
    pub fn global_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "company-screener").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_config_path() -> PathBuf {
        PathBuf::from(PROJECT_CONFIG_FILE)
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Render the effective configuration (secrets are never serialized)
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| ScreenerError::Config(e.to_string()))
        }
    }
}

fn fill_from_env(slot: &mut Option<String>, var: &str) {
    if slot.as_deref().is_none_or(str::is_empty)
        && let Ok(value) = env::var(var)
        && !value.is_empty()
    {
        *slot = Some(value);
    }
}
