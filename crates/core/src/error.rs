//! Error model shared across the toolkit.

use thiserror::Error;

/// JSON body codec failure.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value could not be serialized.
    #[error("failed to encode json body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The bytes were not valid JSON for the requested target type.
    #[error("failed to decode json body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The body stream itself could not be read.
    #[error("failed to read body: {0}")]
    Body(String),
}

impl CodecError {
    pub fn body(msg: impl Into<String>) -> Self {
        Self::Body(msg.into())
    }
}

/// Startup configuration failure.
///
/// Configuration is read once when the process starts; these errors are never
/// produced while serving requests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required key is absent or empty.
    #[error("missing required configuration value: {0}")]
    Missing(&'static str),

    /// A key is present but cannot be used.
    #[error("invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    pub fn missing(key: &'static str) -> Self {
        Self::Missing(key)
    }

    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}
