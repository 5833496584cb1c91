//! Errors that end a `formcheck` run.
//!
//! A record failing validation is not one of them: it is printed as a rejection
//! and only changes the exit code.
use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid settings: {0}")]
    Config(#[from] config::ConfigError),
    #[error("cannot read record from {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write result: {0}")]
    Output(#[from] io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Form(#[from] forms::FormError),
}

impl AppError {
    pub fn input(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Input {
            path: path.into(),
            source,
        }
    }
}
