//! Session configuration
//!
//! Hosts usually keep their trace files next to their installation, under a
//! `profiling/` directory. `SessionConfig` captures that layout so a session
//! can be opened from a config file instead of hand-built paths.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::{InstrumentError, Result};
use crate::session::DEFAULT_OUTPUT_FILE;

/// Directory under `install_root` that holds trace files by default
pub const DEFAULT_SUBDIR: &str = "profiling";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session name, for logs and the returned summary
    pub name: String,
    /// Appended to every record name as `"<name> (<process_label>)"`
    pub process_label: String,
    pub install_root: PathBuf,
    pub subdir: PathBuf,
    pub file_name: String,
    /// Create `install_root/subdir` when it does not exist yet
    pub create_missing_dirs: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "session".to_string(),
            process_label: "main".to_string(),
            install_root: PathBuf::from("."),
            subdir: PathBuf::from(DEFAULT_SUBDIR),
            file_name: DEFAULT_OUTPUT_FILE.to_string(),
            create_missing_dirs: false,
        }
    }
}

impl SessionConfig {
    pub fn new(name: impl Into<String>, process_label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            process_label: process_label.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_install_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.install_root = root.into();
        self
    }

    #[must_use]
    pub fn with_subdir(mut self, subdir: impl Into<PathBuf>) -> Self {
        self.subdir = subdir.into();
        self
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    #[must_use]
    pub fn with_create_missing_dirs(mut self, create: bool) -> Self {
        self.create_missing_dirs = create;
        self
    }

    /// `install_root/subdir/file_name`
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.install_root.join(&self.subdir).join(&self.file_name)
    }

    /// Parse a JSON config; missing fields take their defaults.
    ///
    /// # Errors
    /// `Json` if the text is not a valid config object.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// # Errors
    /// `Config` if the file cannot be read, `Json` if it does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| InstrumentError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }
}
