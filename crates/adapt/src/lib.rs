pub mod cache;
pub mod collection;
pub mod entity;
pub mod envelope;
pub mod http;
pub mod media;
pub mod relation;
pub mod service;

use crate::http::FetchError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CMS configuration: {0}")]
    Config(String),
}
