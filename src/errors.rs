// src/errors.rs

//! Crate-wide error types and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevbinError {
    #[error("base directory not found: {0:?}")]
    BaseDirMissing(PathBuf),

    #[error("cannot resolve module {specifier:?}, searched {searched:?}")]
    ModuleNotFound {
        specifier: String,
        searched: Vec<PathBuf>,
    },

    #[error("{command} exit with code {}", .code.map_or_else(|| "null".to_string(), |c| c.to_string()))]
    ChildProcessFailure { command: String, code: Option<i32> },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DevbinError {
    /// Process exit code for this error: the child's own code for a
    /// child failure (1 when it died on a signal), a distinct code when
    /// the base directory is missing, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            DevbinError::ChildProcessFailure { code, .. } => code.unwrap_or(1),
            DevbinError::BaseDirMissing(_) => 2,
            _ => 1,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DevbinError>;
