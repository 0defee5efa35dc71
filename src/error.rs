//! Error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid checkout payload: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
