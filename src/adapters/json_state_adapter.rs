//! JSON file state store.
//!
//! Saves go through a sibling temporary file and a rename so a crash mid-write
//! never leaves a truncated snapshot behind. A sibling `.lock` file created
//! with `create_new` keeps overlapping runs from interleaving load and save.

use crate::domain::engine::StrategyState;
use crate::domain::error::CrosstraderError;
use crate::ports::state_port::StatePort;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct JsonStateAdapter {
    path: PathBuf,
}

impl JsonStateAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    /// Take the exclusive lock on this state file. Fails with
    /// `StateLocked` while another holder exists.
    pub fn lock(&self) -> Result<StateLock, CrosstraderError> {
        self.ensure_parent()?;
        let path = self.lock_path();
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(CrosstraderError::StateLocked {
                    path: path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let lock = StateLock { path };
        writeln!(file, "{}", std::process::id())?;
        debug!(path = %lock.path.display(), "state lock taken");
        Ok(lock)
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn ensure_parent(&self) -> Result<(), CrosstraderError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

/// Held for a whole load, decide, submit and save sequence. The lock file
/// is removed on drop.
#[derive(Debug)]
pub struct StateLock {
    path: PathBuf,
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to release state lock");
        }
    }
}

impl StatePort for JsonStateAdapter {
    fn load(&self) -> Result<Option<StrategyState>, CrosstraderError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved state");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        StrategyState::from_json(&content).map(Some)
    }

    fn save(&self, state: &StrategyState) -> Result<(), CrosstraderError> {
        self.ensure_parent()?;
        let tmp = self.temp_path();
        fs::write(&tmp, state.to_json_pretty()?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "state saved");
        Ok(())
    }
}
