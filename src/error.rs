// src/error.rs
use thiserror::Error;

/// Everything the pipeline can fail with.
///
/// Roster-level `Fetch`/`Parse` abort a race; entrant-level ones are caught by
/// the orchestrator and turned into a failed row.
#[derive(Debug, Error)]
pub enum Error {
    #[error("race number {0} out of range (1..=12)")]
    InvalidRaceNumber(u8),

    #[error("unknown track: {0}")]
    UnknownTrack(String),

    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn fetch(url: &str, reason: impl ToString) -> Self {
        Error::Fetch { url: url.to_string(), reason: reason.to_string() }
    }

    /// Transport/shape failures that the orchestrator isolates per entrant.
    pub fn is_entrant_recoverable(&self) -> bool {
        matches!(self, Error::Fetch { .. } | Error::Parse(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
