use crate::core::config::ConfigError;
use teloxide::RequestError;
use thiserror::Error;
use url::ParseError;

#[derive(Error, Debug)]
pub enum MyError {
    #[error("Teloxide API Error: {0}")]
    Teloxide(#[from] RequestError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to parse URL: {0}")]
    UrlParse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JWT signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Could not resolve file '{0}'")]
    FileResolution(String),

    #[error("Transcription service error: {0}")]
    Transcription(String),

    #[error("Ledger error: {0}")]
    Ledger(String),
}
