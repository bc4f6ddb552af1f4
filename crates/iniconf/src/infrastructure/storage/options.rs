//! TOML-based options for a [`Config`](crate::application::config::Config).
//!
//! The options say *where* the INI files live and *how* they are processed;
//! they are not the settings themselves.  Example:
//!
//! ```toml
//! [files]
//! dir = "/etc/myapp"
//! name = "myapp"
//! default_name = "myapp-default"
//! extension = "conf"
//!
//! [limits]
//! chunk_size = 4096
//! max_line_len = 200
//!
//! [autosave]
//! delay_ms = 1500
//! poll_interval_ms = 1000
//! ```
//!
//! # Serde default values (for beginners)
//!
//! Every field is annotated with `#[serde(default = "some_fn")]`, so a file
//! only has to mention what it changes.  An absent options file is the same
//! as an empty one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use iniconf_core::codec::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_LINE_LEN};
use iniconf_core::CodecLimits;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::autosave::{DEFAULT_AUTOSAVE_DELAY_MS, DEFAULT_POLL_INTERVAL_MS};

/// Error type for loading the options file.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing options at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse options TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Options schema types ──────────────────────────────────────────────────────

/// Top-level options.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigOptions {
    #[serde(default)]
    pub files: ConfigFiles,
    #[serde(default)]
    pub limits: LimitsOptions,
    #[serde(default)]
    pub autosave: AutosaveOptions,
}

/// Location and naming of the primary and default INI files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigFiles {
    /// Directory holding both files.  Empty means the working directory.
    #[serde(default)]
    pub dir: PathBuf,
    /// Base name of the primary file, which is read and written.
    #[serde(default = "default_name")]
    pub name: String,
    /// Base name of the defaults file, which is only read.
    #[serde(default = "default_default_name")]
    pub default_name: String,
    /// Extension without the dot.  Empty means no extension.
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// Buffer sizes of the INI codec.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LimitsOptions {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
}

/// Timing of the background autosave task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutosaveOptions {
    /// Quiet period after the last change before the store is written.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// How often the background task checks for due changes.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_name() -> String {
    "config".to_string()
}
fn default_default_name() -> String {
    "config-default".to_string()
}
fn default_extension() -> String {
    "ini".to_string()
}
fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
fn default_max_line_len() -> usize {
    DEFAULT_MAX_LINE_LEN
}
fn default_delay_ms() -> u64 {
    DEFAULT_AUTOSAVE_DELAY_MS
}
fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for ConfigFiles {
    fn default() -> Self {
        Self {
            dir: PathBuf::new(),
            name: default_name(),
            default_name: default_default_name(),
            extension: default_extension(),
        }
    }
}

impl Default for LimitsOptions {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_line_len: default_max_line_len(),
        }
    }
}

impl Default for AutosaveOptions {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

// ── Derived values ────────────────────────────────────────────────────────────

impl ConfigFiles {
    /// Path of the primary file, e.g. `dir/config.ini`.
    pub fn primary_path(&self) -> PathBuf {
        self.path_for(&self.name)
    }

    /// Path of the defaults file, e.g. `dir/config-default.ini`.
    pub fn default_path(&self) -> PathBuf {
        self.path_for(&self.default_name)
    }

    fn path_for(&self, base: &str) -> PathBuf {
        let file = if self.extension.is_empty() {
            base.to_string()
        } else {
            format!("{base}.{}", self.extension)
        };
        self.dir.join(file)
    }
}

impl From<LimitsOptions> for CodecLimits {
    fn from(limits: LimitsOptions) -> Self {
        CodecLimits {
            chunk_size: limits.chunk_size,
            max_line_len: limits.max_line_len,
        }
    }
}

impl AutosaveOptions {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads options from a TOML file, returning defaults if the file does not
/// exist.
///
/// # Errors
///
/// Returns [`OptionsError::Io`] for file-system errors other than "not found",
/// and [`OptionsError::Parse`] if the TOML is malformed.
pub fn load_options(path: &Path) -> Result<ConfigOptions, OptionsError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigOptions::default()),
        Err(source) => Err(OptionsError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
