use std::result::Result as StdResult;

use kakeibo_config::ConfigError;
use kakeibo_core::CoreError;
use thiserror::Error;

/// Unified error type for the application layer.
#[derive(Error, Debug)]
pub enum AppError {
    /// Message-level failures; their text is the reply.
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("unauthorized")]
    Unauthorized(String),
    #[error("Malformed event: {0}")]
    Event(String),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = StdResult<T, AppError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Event(err.to_string())
    }
}

impl From<kakeibo_domain::YearMonthError> for AppError {
    fn from(err: kakeibo_domain::YearMonthError) -> Self {
        AppError::Input(err.to_string())
    }
}
