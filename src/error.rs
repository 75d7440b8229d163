//! Engine error types.
//!
//! Only initialization can fail. Everything that goes wrong while editing (a full buffer,
//! navigation on an empty list) is a local no-op and never reaches the caller.

use std::path::PathBuf;

use history_store::HistoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("resource unavailable while {what}: {source}")]
    ResourceUnavailable {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("failed to open log file {path}: {source}")]
    Logging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MenuError {
    #[must_use]
    pub fn resource(what: &'static str, source: std::io::Error) -> Self {
        Self::ResourceUnavailable { what, source }
    }
}
