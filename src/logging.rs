//! File-backed tracing sink.
//!
//! The engine never writes diagnostics to the terminal. When `TAPE_MENU_WRITE_LOG` names a file,
//! events are appended there; `TAPE_MENU_DEBUG=1` lowers the level to DEBUG.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Level;

use crate::config::EnvConfig;
use crate::error::MenuError;

pub fn level_for(config: &EnvConfig) -> Level {
    if config.debug {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Installs the global subscriber. Returns whether one was installed by this call.
///
/// Nothing happens when no log path is configured or a global subscriber already exists.
pub fn init(config: &EnvConfig) -> Result<bool, MenuError> {
    let Some(path) = config.write_log.as_deref().map(PathBuf::from) else {
        return Ok(false);
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| MenuError::Logging {
            path: path.clone(),
            source,
        })?;

    let installed = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_max_level(level_for(config))
        .try_init()
        .is_ok();
    if installed {
        tracing::info!(path = %path.display(), "logging initialised");
    }
    Ok(installed)
}
