//! Configuration loading and discovery
//!
//! Configuration is loaded with precedence: CLI flags > config file >
//! built-in defaults. The config file is discovered by searching upward from
//! the working directory for `.codeforge/config.toml`; `--config` bypasses
//! discovery.
//!
//! The API key is deliberately indirect: the file names an environment
//! variable (`api_key_env`), and [`Config::backend_config`] resolves it once
//! at start-up into the concrete [`BackendConfig`] handed to the backend
//! constructor. Nothing else in the process reads backend environment state.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use codeforge_llm::{BackendConfig, SamplingConfig};

/// Name of the config file searched for during discovery.
const CONFIG_FILE: &str = "config.toml";

/// Directory holding the config file.
const CONFIG_DIR: &str = ".codeforge";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found at {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file {path}: {reason}")]
    InvalidFile { path: PathBuf, reason: String },

    #[error(
        "API key not found in environment variable '{var}'; set it or change api_key_env in [llm]"
    )]
    MissingApiKey { var: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmSection,
    /// Artifact output settings.
    #[serde(default)]
    pub output: OutputSection,
}

/// `[llm]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmSection {
    /// Provider name; `openai-compatible` is the only built-in provider.
    pub provider: String,
    /// Full chat-completions endpoint URL.
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Model identifier sent to the provider.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "openai-compatible".to_string(),
            base_url: "https://api.siliconflow.cn/v1/chat/completions".to_string(),
            api_key_env: "SILICONFLOW_API_KEY".to_string(),
            model: "Qwen/Qwen2.5-7B-Instruct".to_string(),
            temperature: 0.7,
            timeout_seconds: 120,
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    /// Directory artifacts are written to.
    pub dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file path.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the file does not exist, `Io` when it cannot
    /// be read, and `InvalidFile` when it is not valid TOML for this schema.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&raw).map_err(|e| ConfigError::InvalidFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Discover configuration starting from `cwd`.
    ///
    /// An explicit path wins. Otherwise each ancestor of `cwd` is checked
    /// for `.codeforge/config.toml`; when none carries one, built-in
    /// defaults apply.
    ///
    /// # Errors
    ///
    /// Propagates [`Config::load`] failures for the file that was selected.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        for dir in cwd.ancestors() {
            let candidate = dir.join(CONFIG_DIR).join(CONFIG_FILE);
            if candidate.exists() {
                return Self::load(&candidate);
            }
        }

        Ok(Self::default())
    }

    /// Resolve the backend configuration, reading the API key from the
    /// environment variable named by `api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] when the variable is unset.
    pub fn backend_config(&self) -> Result<BackendConfig, ConfigError> {
        let api_key =
            std::env::var(&self.llm.api_key_env).map_err(|_| ConfigError::MissingApiKey {
                var: self.llm.api_key_env.clone(),
            })?;

        Ok(BackendConfig {
            provider: self.llm.provider.clone(),
            base_url: self.llm.base_url.clone(),
            api_key,
            timeout: Duration::from_secs(self.llm.timeout_seconds),
        })
    }

    /// The sampling configuration applied to every stage.
    #[must_use]
    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig::new(self.llm.model.clone(), self.llm.temperature)
    }
}
