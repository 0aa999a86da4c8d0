use adapt::http::FetchError;
use adapt::Error as AdaptError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("adapt error: {0}")]
    Adapt(#[from] AdaptError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
}
