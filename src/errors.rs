use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaseRagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported index backend: {0} (only the term-frequency backend is supported)")]
    UnsupportedIndexBackend(String),

    #[error("Corrupt index artifact: {0}")]
    CorruptIndex(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Backend not implemented: {0}")]
    UnsupportedBackend(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Generation timed out after {timeout_ms}ms")]
    GenerationTimeout { timeout_ms: u64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaseRagError {
    /// Failures raised by the external generation service.
    ///
    /// These are propagated to the caller as-is; nothing in the crate retries them.
    pub const fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            Self::LlmError(_) | Self::HttpError(_) | Self::GenerationTimeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CaseRagError>;
