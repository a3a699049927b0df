use reqwest::StatusCode;
use thiserror::Error;

use httpkit_core::CodecError;

/// Client-side failure. Every variant carries the request URL.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("[{url}] invalid request url: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("[{url}] failed to encode request body: {source}")]
    Encode { url: String, source: CodecError },

    #[error("[{url}] failed to build request: {source}")]
    Build { url: String, source: reqwest::Error },

    #[error("[{url}] request failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    /// Any status other than `200 OK`. The body is not read.
    #[error("[{url}] request failed with status {status}")]
    Status { url: String, status: StatusCode },

    #[error("[{url}] failed to decode response: {source}")]
    Decode { url: String, source: CodecError },
}

impl ClientError {
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { url, .. }
            | Self::Encode { url, .. }
            | Self::Build { url, .. }
            | Self::Transport { url, .. }
            | Self::Status { url, .. }
            | Self::Decode { url, .. } => url,
        }
    }

    /// Upstream status, for [`ClientError::Status`] only.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
