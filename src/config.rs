//! Configuration loading and runtime paths.
//!
//! Loads configuration from `./config.toml` (or `$RAPPORT_CONFIG_PATH`).
//! Environment variables override file values; file values override
//! defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level configuration loaded from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RapportConfig {
    /// Endpoint and model settings.
    pub api: ApiConfig,
    /// Speech output settings.
    pub speech: SpeechConfig,
}

/// Completion and configuration endpoint settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Best-effort configuration endpoint that may hand out a credential.
    /// Empty disables the remote fetch step.
    pub config_url: String,
    /// Chat completions endpoint.
    pub completion_url: String,
    /// Model identifier sent with every request.
    pub model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            config_url: "https://rapport-backend.onrender.com".to_owned(),
            completion_url: crate::providers::openrouter::OPENROUTER_API_BASE.to_owned(),
            model: "openai/gpt-3.5-turbo".to_owned(),
        }
    }
}

/// Speech output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// External TTS command invoked with the text as its sole argument.
    pub command: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        let command = if cfg!(target_os = "macos") {
            "say"
        } else {
            "espeak"
        };
        Self {
            command: command.to_owned(),
        }
    }
}

impl RapportConfig {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// Config file path: `$RAPPORT_CONFIG_PATH` or `./config.toml`. A
    /// missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_from_file() -> Result<Self> {
        let path = Self::config_path(|key| std::env::var(key).ok());
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                let config: RapportConfig =
                    toml::from_str(&contents).context("failed to parse config TOML")?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no config file found, using defaults");
                Ok(RapportConfig::default())
            }
            Err(e) => Err(anyhow::anyhow!("failed to read config file: {e}")),
        }
    }

    /// Resolve config path using a custom env resolver (for testing).
    fn config_path(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        env("RAPPORT_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability.
    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("RAPPORT_CONFIG_URL") {
            self.api.config_url = v;
        }
        if let Some(v) = env("RAPPORT_API_URL") {
            self.api.completion_url = v;
        }
        if let Some(v) = env("RAPPORT_MODEL") {
            self.api.model = v;
        }
        if let Some(v) = env("RAPPORT_SPEECH_COMMAND") {
            self.speech.command = v;
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime paths
// ---------------------------------------------------------------------------

/// Filesystem locations for persistent state.
#[derive(Debug, Clone)]
pub struct RuntimePaths {
    /// Per-user data directory.
    pub data_dir: PathBuf,
    /// JSON key-value store file (credential + profile).
    pub store_file: PathBuf,
    /// Log directory for the chat-mode file logger.
    pub logs_dir: PathBuf,
}

/// Resolve per-user runtime paths via the platform data directory.
///
/// # Errors
///
/// Returns an error when no home directory can be determined.
pub fn runtime_paths() -> Result<RuntimePaths> {
    let dirs = directories::ProjectDirs::from("", "", "rapport")
        .context("could not determine a home directory for rapport data")?;
    let data_dir = dirs.data_dir().to_path_buf();
    Ok(RuntimePaths {
        store_file: data_dir.join("store.json"),
        logs_dir: data_dir.join("logs"),
        data_dir,
    })
}
