//! # Configuration
//!
//! Draft settings are load-time constants: the host reads them once when it wires up the
//! subsystem, and nothing in this crate edits them afterwards. [`confique`] handles the layering:
//!
//! 1. **Environment variables**: `CARDDRAFT_AUTOSAVE_INTERVAL_MS`, `CARDDRAFT_MAX_AGE_SECONDS`.
//! 2. **Config file**: an optional `carddraft.toml` supplied by the host.
//! 3. **Compiled defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `autosave_interval_ms` | `5000` | Milliseconds between snapshots |
//! | `max_age_seconds` | `172800` | Oldest draft honored on restore (48h) |
//! | `file_name` | `add_cards_autosave.json` | Backing file name inside the profile dir |
//! | `skip_blank` | `false` | Skip ticks whose form is entirely empty |

use crate::error::{DraftError, Result};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const AUTOSAVE_INTERVAL_MS: u64 = 5000;
pub const MAX_AGE_SECONDS: u64 = 48 * 60 * 60;
pub const BACKING_FILE_NAME: &str = "add_cards_autosave.json";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DraftConfig {
    /// Milliseconds between periodic snapshots.
    #[config(env = "CARDDRAFT_AUTOSAVE_INTERVAL_MS", default = 5000)]
    pub autosave_interval_ms: u64,

    /// Drafts older than this are discarded instead of restored.
    #[config(env = "CARDDRAFT_MAX_AGE_SECONDS", default = 172800)]
    pub max_age_seconds: u64,

    /// Name of the backing file inside the profile directory.
    #[config(default = "add_cards_autosave.json")]
    pub file_name: String,

    /// When set, a tick on an untouched form writes nothing.
    #[config(default = false)]
    pub skip_blank: bool,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            autosave_interval_ms: AUTOSAVE_INTERVAL_MS,
            max_age_seconds: MAX_AGE_SECONDS,
            file_name: BACKING_FILE_NAME.to_string(),
            skip_blank: false,
        }
    }
}

impl DraftConfig {
    /// Load settings from the environment and an optional TOML file. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = path {
            builder = builder.file(path);
        }
        let config = builder
            .load()
            .map_err(|e| DraftError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.autosave_interval_ms == 0 {
            return Err(DraftError::Config(
                "autosave_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.file_name.trim().is_empty() {
            return Err(DraftError::Config("file_name must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms)
    }

    pub fn max_age(&self) -> f64 {
        self.max_age_seconds as f64
    }

    /// Path of the backing file inside the given profile directory.
    pub fn backing_path(&self, profile_dir: &Path) -> PathBuf {
        profile_dir.join(&self.file_name)
    }
}

/// OS-appropriate data directory for hosts that don't hand us a profile folder.
pub fn default_profile_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "carddraft").map(|dirs| dirs.data_dir().to_path_buf())
}
