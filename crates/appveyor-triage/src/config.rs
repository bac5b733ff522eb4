use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::appveyor::DEFAULT_API_URL;

/// Output format of the published report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// `warning C4244 (i.e. "...")` / `  >> path:line` lines
    #[default]
    Text,
    /// Summary plus run statistics as pretty JSON
    Json,
}

impl ReportFormat {
    /// File extension used by the file sink.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "log",
            Self::Json => "json",
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A setting needed for the chosen log source is absent.
    #[error("Missing setting `{0}` (set it in the config file, the environment or on the command line)")]
    Missing(&'static str),
}

/// Settings for a triage run.
///
/// Precedence: defaults < TOML file < environment < command line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// AppVeyor REST API base URL
    pub api_url: String,
    /// Bearer token for the AppVeyor API
    pub token: Option<String>,
    /// AppVeyor account name
    pub account: Option<String>,
    /// AppVeyor project slug
    pub project: Option<String>,
    /// Directory the file sink writes reports into
    pub output_dir: PathBuf,
    /// Timeout for each HTTP request
    pub http_timeout_secs: u64,
    pub format: ReportFormat,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            account: None,
            project: None,
            output_dir: PathBuf::from("."),
            http_timeout_secs: 60,
            format: ReportFormat::Text,
        }
    }
}

impl TriageConfig {
    /// Defaults overlaid with the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Load a TOML config file, or defaults when `path` is `None`, then
    /// overlay the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay settings found through `var` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("APPVEYOR_API_URL") {
            self.api_url = url;
        }
        if let Some(token) = var("APPVEYOR_TOKEN").filter(|t| !t.is_empty()) {
            self.token = Some(token);
        }
        if let Some(account) = var("APPVEYOR_ACCOUNT") {
            self.account = Some(account);
        }
        if let Some(project) = var("APPVEYOR_PROJECT") {
            self.project = Some(project);
        }
        if let Some(dir) = var("TRIAGE_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(secs) = var("TRIAGE_HTTP_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(n) => self.http_timeout_secs = n,
                Err(_) => tracing::warn!(value = %secs, "ignoring invalid TRIAGE_HTTP_TIMEOUT_SECS"),
            }
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Account and project, both required for fetching from AppVeyor.
    pub fn project_slug(&self) -> Result<(&str, &str), ConfigError> {
        let account = self.account.as_deref().ok_or(ConfigError::Missing("account"))?;
        let project = self.project.as_deref().ok_or(ConfigError::Missing("project"))?;
        Ok((account, project))
    }
}
