//! Simulator error type

use std::path::PathBuf;

/// Errors raised while setting up or running the simulator.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse chip profile {path}: {source}")]
    Profile {
        path: PathBuf,
        source: ron::error::SpannedError,
    },

    #[error("console error: {0}")]
    Console(#[from] flashmon_core::Error),
}
