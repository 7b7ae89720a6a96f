//! Error types for the data-store client

use thiserror::Error;

use crate::credentials::CredentialsError;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Data-store client errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error("Request signing error: {0}")]
    Signing(String),

    #[error("Data store returned {status}: {body}")]
    DataStore { status: u16, body: String },

    #[error("Pagination exceeded {limit} pages without a terminal page")]
    TooManyPages { limit: usize },
}
