//! Error types for the BasketLiga data layer

use thiserror::Error;


pub type Result<T> = std::result::Result<T, FeedError>;

/// Everything that can go wrong while refreshing a feed.
///
/// Callers of the feeds never see these directly: a failed refresh is logged
/// and degrades to stale or fallback data (see [`crate::core::cache::Fetched`]).
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected payload shape: {message}")]
    Schema { message: String },

    #[error("Upstream reported an error: {message}")]
    Upstream { message: String },

    #[error("Upstream returned no records")]
    EmptyPayload,

    #[error("No post with slug '{slug}'")]
    PostNotFound { slug: String },

    #[error("Credentials not configured: set {env_var}")]
    MissingCredentials { env_var: String },

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidConfig { key: String, value: String },
}

impl FeedError {
    pub fn schema(message: impl Into<String>) -> Self {
        FeedError::Schema {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        FeedError::Upstream {
            message: message.into(),
        }
    }
}
