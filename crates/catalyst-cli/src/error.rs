//! CLI error types

use std::path::PathBuf;

use catalyst_core::CompileError;
use thiserror::Error;

/// Errors reported by the `catalyst` binary
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid manifest '{path}': {source}")]
    Manifest { path: PathBuf, source: CompileError },

    #[error("Invalid JSON for --vars: {0}")]
    Variables(serde_json::Error),

    #[error("Validation found {0} error(s)")]
    ValidationFailed(usize),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
