pub mod client;

pub use client::ApiClient;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server responded with {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Base URL cannot carry a path: {0}")]
    InvalidBaseUrl(String),
}

pub type ApiResult<T> = Result<T, ApiError>;
