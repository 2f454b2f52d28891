//! Error types for the Tally application

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the Tally application
#[derive(Error, Debug)]
pub enum TallyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error in {path}: {message}")]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, TallyError>;
