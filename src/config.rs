//! Application configuration.
//!
//! Read from `drugshield.toml` in the working directory, or from the path in
//! `DRUGSHIELD_CONFIG`. Every field has a default, so a missing file in the
//! working directory is not an error; a missing file named explicitly is.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::{GeminiClient, LlmClient, LlmError, OllamaClient};

pub const APP_NAME: &str = "DrugShield";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const CONFIG_PATH_VAR: &str = "DRUGSHIELD_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "drugshield.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot determine home directory")]
    NoHomeDir,

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "drugshield=info,drugshield_lib=info,tower_http=info".to_string()
}

/// `~/DrugShield/`, user-visible on every platform.
pub fn app_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(APP_NAME))
        .ok_or(ConfigError::NoHomeDir)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_bind() -> String { "127.0.0.1:8000".to_string() }
fn default_request_timeout() -> u64 { 30 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Defaults to `~/DrugShield/drugshield.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    pub fn resolved_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.path {
            Some(p) => Ok(p.clone()),
            None => Ok(app_data_dir()?.join("drugshield.db")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStrategy {
    #[default]
    RuleBased,
    AiAssisted,
}

impl ClassifierStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RuleBased => "rule_based",
            Self::AiAssisted => "ai_assisted",
        }
    }
}

/// What an AI-assisted classifier returns when AI output is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Fixed high/medium assessments.
    #[default]
    Conservative,
    /// The rule-based classifier's answer.
    RuleBased,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub strategy: ClassifierStrategy,
    #[serde(default)]
    pub fallback: FallbackPolicy,
    /// JSON file replacing the bundled knowledge tables.
    #[serde(default)]
    pub knowledge_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiProvider {
    Ollama,
    Gemini,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_provider")]
    pub provider: AiProvider,
    /// Provider default when unset.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Provider default when unset, see [`AiConfig::resolved_model`].
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,
}

fn default_provider() -> AiProvider { AiProvider::Ollama }
fn default_ai_timeout() -> u64 { 30 }

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3:8b";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: None,
            model: None,
            timeout_secs: default_ai_timeout(),
        }
    }
}

impl AiConfig {
    pub fn resolved_model(&self) -> &str {
        match (&self.model, self.provider) {
            (Some(model), _) => model,
            (None, AiProvider::Ollama) => DEFAULT_OLLAMA_MODEL,
            (None, AiProvider::Gemini) => DEFAULT_GEMINI_MODEL,
        }
    }

    /// Build the configured generation client.
    pub fn build_client(&self) -> Result<Arc<dyn LlmClient>, LlmError> {
        let client: Arc<dyn LlmClient> = match self.provider {
            AiProvider::Ollama => Arc::new(OllamaClient::new(
                self.base_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL),
                self.resolved_model(),
                self.timeout_secs,
            )?),
            AiProvider::Gemini => Arc::new(GeminiClient::from_env(
                self.base_url.as_deref(),
                self.resolved_model(),
                self.timeout_secs,
            )?),
        };
        Ok(client)
    }
}

impl AppConfig {
    /// Load configuration. Checks `DRUGSHIELD_CONFIG` first, then the
    /// working directory; `.env` is read beforehand so either may come
    /// from there.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    tracing::info!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "server.request_timeout_secs",
                reason: "must be greater than zero".into(),
            });
        }
        if self.ai.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "ai.timeout_secs",
                reason: "must be greater than zero".into(),
            });
        }
        if self.ai.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "ai.model",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}
