//! Environment variable configuration
//!
//! Provides environment variable overrides for the CLI configuration.

use std::env;

use super::{GenerationMode, OutputTarget, ReportConfig};

/// Environment variable prefix
const ENV_PREFIX: &str = "STORY_REPORT";

/// Configuration overrides read from the environment
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Output target from STORY_REPORT_OUTPUT
    pub output: Option<String>,
    /// Generation mode from STORY_REPORT_MODE
    pub mode: Option<String>,
    /// Replay concurrency from STORY_REPORT_CONCURRENT
    pub concurrent: Option<usize>,
    /// Log level from STORY_REPORT_LOG
    pub log_level: Option<String>,
    /// Config file from STORY_REPORT_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            output: get_env("OUTPUT"),
            mode: get_env("MODE"),
            concurrent: get_env_parse("CONCURRENT"),
            log_level: get_env("LOG"),
            config_file: get_env("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.output.is_some()
            || self.mode.is_some()
            || self.concurrent.is_some()
            || self.log_level.is_some()
            || self.config_file.is_some()
    }

    /// Overlay the set variables onto `config`
    pub fn apply(&self, config: &mut ReportConfig) {
        if let Some(output) = &self.output {
            config.output = OutputTarget::parse(output);
        }
        if let Some(mode) = self.mode.as_deref().and_then(GenerationMode::from_str) {
            config.generation_mode = mode;
        }
        if let Some(concurrent) = self.concurrent {
            config.max_concurrent = concurrent;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_OUTPUT:      {:?}", ENV_PREFIX, self.output);
        println!("  {}_MODE:        {:?}", ENV_PREFIX, self.mode);
        println!("  {}_CONCURRENT:  {:?}", ENV_PREFIX, self.concurrent);
        println!("  {}_LOG:         {:?}", ENV_PREFIX, self.log_level);
        println!("  {}_CONFIG:      {:?}", ENV_PREFIX, self.config_file);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Builder for setting environment variables (useful for testing)
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn output(mut self, output: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_OUTPUT"), output.into()));
        self
    }

    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_MODE"), mode.into()));
        self
    }

    pub fn concurrent(mut self, concurrent: usize) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_CONCURRENT"), concurrent.to_string()));
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_LOG"), level.into()));
        self
    }

    /// Apply environment variables
    pub fn apply(self) {
        for (key, value) in self.vars {
            env::set_var(key, value);
        }
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        self.apply();

        EnvGuard { previous }
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all STORY_REPORT environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_OUTPUT      Report destination (console or a file path)");
    println!("  {ENV_PREFIX}_MODE        Generation mode (reset, accumulate)");
    println!("  {ENV_PREFIX}_CONCURRENT  Stories replayed at once");
    println!("  {ENV_PREFIX}_LOG         Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_CONFIG      Path to configuration file");
}
