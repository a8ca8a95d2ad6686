//! CLI argument definitions for the Legal Buddy terminal client.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use buddy_core::{BuddyConfig, Language};
use clap::Parser;

/// Legal Buddy: ask questions about government schemes from the terminal.
#[derive(Parser, Debug, Default)]
#[command(name = "legal-buddy", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Base URL of the Legal Buddy API.
    #[arg(short = 'u', long = "base-url")]
    pub base_url: Option<String>,

    /// Answer language (english, hindi).
    #[arg(short = 'L', long = "language")]
    pub language: Option<Language>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > BUDDY_CONFIG env var > ~/.legal-buddy/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("BUDDY_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the API base URL.
    ///
    /// Priority: --base-url flag > BUDDY_BASE_URL env var > config file value.
    pub fn resolve_base_url(&self, config_url: &str) -> String {
        if let Some(ref url) = self.base_url {
            return url.clone();
        }
        if let Ok(url) = std::env::var("BUDDY_BASE_URL") {
            if !url.trim().is_empty() {
                return url;
            }
        }
        config_url.to_string()
    }

    /// Resolve the log level: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }

    /// Apply flag and env overrides onto a loaded configuration.
    pub fn apply(&self, config: &mut BuddyConfig) {
        config.endpoint.base_url = self.resolve_base_url(&config.endpoint.base_url);
        config.general.log_level = self.resolve_log_level(&config.general.log_level);
        if let Some(language) = self.language {
            config.session.default_language = language;
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".legal-buddy").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".legal-buddy").join("config.toml");
    }
    PathBuf::from("config.toml")
}
