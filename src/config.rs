use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::coverage::ProjectDescriptor;
use crate::error::CovHubError;

/// Configuration file structure for covhub.
///
/// Holds the ordered project list plus fetch and output settings. The value is
/// loaded once and handed to the pipeline; nothing reads it from global state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Projects to collect, in display order
    #[serde(default)]
    pub projects: Vec<ProjectDescriptor>,

    /// Report retrieval settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Deadline for a single report fetch, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
    Csv,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("covhub/{}", env!("CARGO_PKG_VERSION"))
}

const CANDIDATES: [&str; 4] = ["covhub.toml", "covhub.json", "covhub.yaml", "covhub.yml"];

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./covhub.toml, ./covhub.json, ./covhub.yaml, ./covhub.yml
    /// 3. `<user config dir>/covhub/covhub.toml`
    ///
    /// Returns default configuration (no projects) if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        match Self::discover() {
            Some(path) => Self::load_from_path(&path),
            None => {
                log::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn discover() -> Option<PathBuf> {
        CANDIDATES
            .iter()
            .map(PathBuf::from)
            .chain(dirs::config_dir().map(|dir| dir.join("covhub").join("covhub.toml")))
            .find(|path| path.exists())
    }

    /// Load configuration from a specific file path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        let config: Self = match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .ok()
                    .or_else(|| serde_json::from_str(&contents).ok())
                    .or_else(|| serde_yaml::from_str(&contents).ok())
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
        };

        log::info!(
            "Loaded {} project(s) from {}",
            config.projects.len(),
            path.display()
        );
        Ok(config)
    }

    /// Checks every project descriptor and the fetch settings.
    ///
    /// # Errors
    ///
    /// Returns `CovHubError::Config` for the first invalid entry.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.fetch.timeout_secs == 0 {
            return Err(CovHubError::Config(
                "fetch.timeout-secs must be greater than zero".to_string(),
            ));
        }
        self.projects.iter().try_for_each(ProjectDescriptor::validate)
    }
}
