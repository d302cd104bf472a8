//! Error types

use std::io;
use thiserror::Error;

/// Rejected game configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max speed must be at least 1 frame per move")]
    ZeroMaxSpeed,

    #[error("start speed {start} is faster than max speed {max} (fewer frames per move)")]
    StartFasterThanMax { start: u8, max: u8 },

    #[error("max score must be at least 1")]
    ZeroMaxScore,
}

/// Terminal backend failure
#[derive(Error, Debug)]
pub enum TermError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("quit requested")]
    Quit,
}

impl TermError {
    pub fn is_quit(&self) -> bool {
        matches!(self, TermError::Quit)
    }
}
