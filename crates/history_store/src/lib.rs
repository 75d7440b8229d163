//! Line-oriented query history for the menu engine.
//!
//! The on-disk format is one entry per line, oldest first. The whole log is read at session
//! start, navigated in memory, and rewritten once when the session commits.

mod error;
mod paths;
mod store;

pub use error::HistoryError;
pub use paths::{expand_home, HISTORY_FILE_NAME};
pub use store::{Direction, HistoryOptions, HistoryStore};
