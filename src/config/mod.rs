//! Configuration module
//!
//! Handles loading, validating and overriding the reporting configuration.

mod env;

pub use env::{print_env_help, EnvBuilder, EnvConfig, EnvGuard};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./story-report.yaml",
    "./story-report.yml",
    "./.story-report.yaml",
    "~/.config/story-report/config.yaml",
];

/// Where emitted reports go
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputTarget {
    /// Standard output; successive reports are appended
    #[default]
    Console,
    /// Seekable file, overwritten by each emission
    File(PathBuf),
}

impl OutputTarget {
    /// Parse `console`/`stdout`/`-` or treat the value as a file path
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "console" | "stdout" | "-" => OutputTarget::Console,
            _ => OutputTarget::File(PathBuf::from(s)),
        }
    }
}

/// What the coordinator does with the report once it has been emitted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Start the next batch of stories from an empty report
    #[default]
    Reset,
    /// Keep folding into the same report and re-emit all of it
    Accumulate,
}

impl GenerationMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "reset" => Some(GenerationMode::Reset),
            "accumulate" => Some(GenerationMode::Accumulate),
            _ => None,
        }
    }
}

/// Reporting configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Report destination: `console` or `{ file: path }`
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub output: OutputTarget,

    /// Behaviour after each emission
    pub generation_mode: GenerationMode,

    /// Pending submissions the coordinator queues before stories wait to send
    pub queue_capacity: usize,

    /// Stories replayed at once by the CLI
    pub max_concurrent: usize,

    /// Log level name (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: OutputTarget::Console,
            generation_mode: GenerationMode::Reset,
            queue_capacity: 64,
            max_concurrent: 4,
            log_level: "info".to_string(),
        }
    }
}

impl ReportConfig {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            anyhow::bail!("max_concurrent must be at least 1");
        }
        if let OutputTarget::File(path) = &self.output {
            if path.as_os_str().is_empty() {
                anyhow::bail!("output file path is empty");
            }
        }
        Ok(())
    }

    /// Channel capacity, never zero
    pub fn normalized_queue_capacity(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Example configuration written by `config init`
    pub fn example() -> Self {
        Self {
            output: OutputTarget::File(PathBuf::from("target/story-report.xml")),
            ..Self::default()
        }
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
