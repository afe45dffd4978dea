//! Config Command
//!
//! Inspect the effective configuration.
//!
//! Usage:
//!   company-screener config show [-f toml|json]
//!   company-screener config path

use crate::config::{Config, ConfigLoader};
use crate::types::Result;

/// Print the merged configuration. API keys are never printed.
pub fn show(config: &Config, format: &str) -> Result<()> {
    let as_json = format == "json";
    println!("{}", ConfigLoader::render(config, as_json)?);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}
