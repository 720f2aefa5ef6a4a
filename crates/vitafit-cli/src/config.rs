//! Configuration file management for vitafit.
//!
//! Provides a TOML-based config file at `~/.config/vitafit/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use vitafit_core::config::BackendConfig;

/// Environment variable overriding the report output directory.
pub const REPORT_DIR_ENV: &str = "VITAFIT_REPORT_DIR";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub backend: BackendSection,
    #[serde(default)]
    pub report: ReportSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackendSection {
    pub url: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReportSection {
    /// Where downloaded reports are written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the vitafit config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/vitafit` or `~/.config/vitafit`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("vitafit");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("vitafit")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    Ok(path)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct VitafitConfig {
    pub backend: BackendConfig,
    pub report_dir: PathBuf,
}

impl VitafitConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Backend URL: `cli_backend_url` > `VITAFIT_BACKEND_URL` > `backend.url` > `BackendConfig::DEFAULT_URL`
    /// - Report dir: `cli_report_dir` > `VITAFIT_REPORT_DIR` > `report.output_dir` > current directory
    ///
    /// A missing config file is not an error; a malformed one is.
    pub fn resolve(cli_backend_url: Option<&str>, cli_report_dir: Option<&Path>) -> Result<Self> {
        let file_config = if config_path().exists() {
            Some(load_config()?)
        } else {
            None
        };

        let backend_url = if let Some(url) = cli_backend_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(BackendConfig::ENV_VAR) {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.backend.url.clone()
        } else {
            BackendConfig::DEFAULT_URL.to_string()
        };

        let report_dir = if let Some(dir) = cli_report_dir {
            dir.to_path_buf()
        } else if let Ok(dir) = std::env::var(REPORT_DIR_ENV) {
            PathBuf::from(dir)
        } else if let Some(dir) = file_config.and_then(|cfg| cfg.report.output_dir) {
            dir
        } else {
            PathBuf::from(".")
        };

        Ok(Self {
            backend: BackendConfig::new(backend_url),
            report_dir,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
