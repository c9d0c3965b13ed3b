//! Error types for the promptsh domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Command failures are deliberately absent: a rejected segment or a
//! failing command is data in the execution report, not an error.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all promptsh operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Awareness registry errors ---
    #[error("Awareness error: {0}")]
    Awareness(#[from] AwarenessError),

    // --- Configuration errors ---
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // --- I/O ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures talking to the completion service.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures loading `config.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Failures loading the tool-awareness registry.
#[derive(Debug, Error)]
pub enum AwarenessError {
    #[error("Failed to read awareness file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse awareness file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 404,
            message: "model 'llama9' not found".into(),
        });
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("llama9"));
    }

    #[test]
    fn awareness_error_names_the_file() {
        let err = Error::Awareness(AwarenessError::ParseError {
            path: PathBuf::from("/tmp/awareness.json"),
            reason: "expected value at line 1".into(),
        });
        assert!(err.to_string().contains("/tmp/awareness.json"));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn config_error_converts_and_keeps_context() {
        let err: Error = ConfigError::ValidationError("model must not be empty".into()).into();
        assert!(matches!(err, Error::Config(ConfigError::ValidationError(_))));
        assert_eq!(
            err.to_string(),
            "Configuration error: Configuration validation failed: model must not be empty"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
