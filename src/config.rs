//! Typed configuration loaded from a TOML file.
//!
//! Every field has a documented default so the shell starts with no config
//! file at all. A file that exists but does not parse is an error rather
//! than a silent fallback.

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration for the shell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub shell: ShellConfig,
    pub safety: SafetyConfig,
    pub execution: ExecutionConfig,
    pub suggest: SuggestConfig,
    pub monitor: MonitorConfig,
}

/// Prompt and history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub name: String,
    pub prompt: String,
    /// History file name, resolved relative to the home directory.
    pub history_file: String,
    pub max_history: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            name: "wardshell".into(),
            prompt: "ward>".into(),
            history_file: ".wardshell_history".into(),
            max_history: 1000,
        }
    }
}

/// Risk classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Turning this off bypasses classification entirely.
    pub enabled: bool,
    /// Informational only: callers may choose to ignore block verdicts.
    /// The classifier itself still reports them.
    pub sandbox_mode: bool,
    /// Extra substrings that classify as critical/blocked.
    pub dangerous_commands: Vec<String>,
    /// Substrings that classify as medium risk when touched.
    pub sensitive_paths: Vec<String>,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sandbox_mode: false,
            dangerous_commands: Vec::new(),
            sensitive_paths: Vec::new(),
        }
    }
}

/// Which backend the engine routes to when a call has no explicit preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Platform shell, always available.
    Native,
    /// Secondary POSIX environment, subject to the availability probe.
    Posix,
    /// Posix when the probe says it works, native otherwise.
    #[default]
    Auto,
}

/// Execution engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Default per-command wait bound in seconds.
    pub timeout_secs: u64,
    pub backend: BackendChoice,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            backend: BackendChoice::Auto,
        }
    }
}

/// Natural-language suggestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    pub enabled: bool,
    /// Model passed to the OpenAI-compatible endpoint for the fallback path.
    pub model: String,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gpt-4o-mini".into(),
        }
    }
}

/// Resource pressure thresholds, in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub cpu_high: f32,
    pub memory_high: f32,
    pub disk_high: f32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            cpu_high: 80.0,
            memory_high: 85.0,
            disk_high: 90.0,
        }
    }
}

impl Config {
    /// Load configuration from `path`. A missing file yields the defaults;
    /// an unreadable or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!(config.safety.enabled);
        assert!(!config.safety.sandbox_mode);
        assert_eq!(config.execution.timeout_secs, 300);
        assert_eq!(config.execution.backend, BackendChoice::Auto);
        assert_eq!(config.shell.max_history, 1000);
        assert!(config.safety.dangerous_commands.is_empty());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = Config::load(Path::new("/does/not/exist.toml"));
        assert!(config.is_ok());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let raw = r#"
            [safety]
            enabled = false
            dangerous_commands = ["curl evil.com"]

            [execution]
            backend = "native"
        "#;
        let config: Config = toml::from_str(raw).unwrap_or_else(|e| panic!("parse: {e}"));
        assert!(!config.safety.enabled);
        assert_eq!(config.safety.dangerous_commands, vec!["curl evil.com"]);
        assert_eq!(config.execution.backend, BackendChoice::Native);
        // Untouched sections keep their defaults
        assert_eq!(config.execution.timeout_secs, 300);
        assert_eq!(config.shell.prompt, "ward>");
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let result: Result<Config, _> = toml::from_str("safety = 12");
        assert!(result.is_err());
    }

    #[test]
    fn backend_choice_round_trips() {
        for (text, choice) in [
            ("native", BackendChoice::Native),
            ("posix", BackendChoice::Posix),
            ("auto", BackendChoice::Auto),
        ] {
            let raw = format!("[execution]\nbackend = \"{text}\"");
            let config: Config = toml::from_str(&raw).unwrap_or_else(|e| panic!("parse: {e}"));
            assert_eq!(config.execution.backend, choice);
        }
    }
}
