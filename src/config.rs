use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::CaseRagError;

/// Model used by the generated backend when none is configured
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Low-variance default sampling temperature for the generated backend
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_index_path")]
    pub path: PathBuf,
}

fn default_index_path() -> PathBuf {
    PathBuf::from("./index/artifacts.json")
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: default_index_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of cases retrieved when the caller does not pick one
    #[serde(default = "default_topk")]
    pub default_topk: usize,
    /// Upper bound on the `fact` field of a search hit, in characters
    #[serde(default = "default_fact_max_chars")]
    pub fact_max_chars: usize,
}

pub(crate) fn default_topk() -> usize {
    6
}

pub(crate) fn default_fact_max_chars() -> usize {
    180
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_topk: default_topk(),
            fact_max_chars: default_fact_max_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerConfig {
    /// `template` or `generated`
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Model identifier for the generated backend; empty means [`DEFAULT_MODEL`]
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Upper bound on a single generation call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

pub(crate) fn default_backend() -> String {
    "template".to_string()
}

pub(crate) fn default_timeout_secs() -> u64 {
    60
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            model: None,
            temperature: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AnswerConfig {
    pub fn model_or_default(&self) -> &str {
        match self.model.as_deref() {
            Some(model) if !model.trim().is_empty() => model,
            _ => DEFAULT_MODEL,
        }
    }

    pub fn temperature_or_default(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API (`/chat/completions` is appended)
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    /// Inline key; when empty the key is read from `api_key_env`
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            api_key: String::new(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl LlmConfig {
    /// Inline key first, then the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        if !self.api_key.trim().is_empty() {
            return Some(self.api_key.trim().to_string());
        }
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub backtrace: bool,
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            backtrace: false,
            dir: default_log_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub answer: AnswerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            eprintln!(
                "Warning: Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            eprintln!("Warning: No config file found, using built-in defaults.");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.search.default_topk == 0 {
            return Err(CaseRagError::ConfigError(
                "search.default_topk must be at least 1".to_string(),
            ));
        }
        if self.search.fact_max_chars == 0 {
            return Err(CaseRagError::ConfigError(
                "search.fact_max_chars must be at least 1".to_string(),
            ));
        }
        if let Some(temperature) = self.answer.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(CaseRagError::ConfigError(format!(
                    "answer.temperature must be within [0, 2], got {temperature}"
                )));
            }
        }
        if self.answer.timeout_secs == 0 {
            return Err(CaseRagError::ConfigError(
                "answer.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get index artifact path
    pub fn index_path(&self) -> &Path {
        &self.index.path
    }

    /// Get default number of retrieved cases
    pub fn default_topk(&self) -> usize {
        self.search.default_topk
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        &self.llm.endpoint
    }
}
