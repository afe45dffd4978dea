//! Configuration Management
//!
//! Layered configuration with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config file
//! 3. Project config (./screener.toml)
//! 4. Explicit --config file
//! 5. Environment variables (SCREENER_*)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
