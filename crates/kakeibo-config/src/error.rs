use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Config file {path} is malformed: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("Invalid setting `{field}`: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}
