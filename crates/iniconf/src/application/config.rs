//! Config: typed settings backed by a primary INI file and a defaults file.
//!
//! # Files
//!
//! A `Config` works with two files in the same directory:
//!
//! - the **defaults file** (`config-default.ini` unless renamed) is shipped
//!   with the application and only ever read;
//! - the **primary file** (`config.ini`) holds the user's settings and is
//!   the only file that is written.
//!
//! [`Config::read`] loads the defaults first and the primary file on top, so
//! a key present in both takes the primary value.  If there is no primary
//! file yet, it is created from the defaults.
//!
//! # Concurrency
//!
//! All state sits behind one mutex shared with the autosave task, so a
//! `Config` can be used from several threads.  The task only holds a weak
//! reference; dropping the `Config` stops it.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use iniconf_core::{
    entry_id, split_entry_id, ChunkIo, CodecError, CodecLimits, IniReader, IniWriter,
    OrderedStore, ParseReport, Scalar, ScalarValue,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::autosave::{AutosavePolicy, Clock, RecurringJob, ScheduleError, ScheduledTask, Scheduler};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::scheduler::thread::ThreadScheduler;
use crate::infrastructure::storage::fs::FsIo;
use crate::infrastructure::storage::options::{ConfigFiles, ConfigOptions};

/// Error type for [`Config`] operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The backing storage reported itself unavailable; nothing was done.
    #[error("file system is not available")]
    Unavailable,

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

// ── Shared state ──────────────────────────────────────────────────────────────

struct ConfigState {
    files: ConfigFiles,
    store: OrderedStore<ScalarValue>,
    reader: IniReader,
    writer: IniWriter,
    changed: bool,
    autosave: bool,
    policy: AutosavePolicy,
}

impl ConfigState {
    fn parse(&mut self, io: &dyn ChunkIo, path: &Path) -> Result<ParseReport, CodecError> {
        self.reader.parse_into(io, path, &mut self.store)
    }
}

/// Everything the autosave task needs.
struct Shared {
    state: Mutex<ConfigState>,
    io: Arc<dyn ChunkIo>,
    clock: Arc<dyn Clock>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ConfigState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_available(&self) -> Result<(), ConfigError> {
        if self.io.is_available() {
            Ok(())
        } else {
            warn!("file system is not available");
            Err(ConfigError::Unavailable)
        }
    }

    /// Writes the store if it has unsaved changes.  Returns whether a write
    /// happened.
    fn save_locked(&self, state: &mut ConfigState) -> Result<bool, ConfigError> {
        if !state.changed {
            return Ok(false);
        }
        self.ensure_available()?;

        let path = state.files.primary_path();
        info!("saving {}", path.display());
        match state.writer.write_store(&*self.io, &path, &state.store) {
            Ok(report) => {
                debug!(
                    "saved {} entries ({} bytes) to {}",
                    report.entries,
                    report.bytes_written,
                    path.display()
                );
                state.changed = false;
                state.policy.clear();
                Ok(true)
            }
            Err(e) => {
                error!("could not save {}: {e}", path.display());
                // Keep the changes and let autosave retry after another delay.
                state.policy.touch(self.clock.now_millis());
                Err(e.into())
            }
        }
    }

    /// One poll of the autosave task.
    fn autosave_tick(&self) {
        let mut state = self.lock();
        if !state.autosave {
            return;
        }
        let now = self.clock.now_millis();
        if !state.policy.is_due(state.changed, now) {
            return;
        }
        debug!("autosave due");
        if let Err(e) = self.save_locked(&mut state) {
            warn!("autosave failed: {e}");
        }
    }
}

fn has_line_break(text: &str) -> bool {
    text.contains(['\n', '\r'])
}

// ── Config ────────────────────────────────────────────────────────────────────

/// Typed access to INI settings with layered defaults and optional autosave.
pub struct Config {
    shared: Arc<Shared>,
    scheduler: Arc<dyn Scheduler>,
    poll_interval: Duration,
    task: Mutex<Option<Box<dyn ScheduledTask>>>,
}

impl Config {
    /// Creates an empty configuration.  Nothing is read until [`Config::read`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Codec`] if the codec limits in `options` are
    /// inconsistent.
    pub fn new(
        options: ConfigOptions,
        io: Arc<dyn ChunkIo>,
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let limits = CodecLimits::from(options.limits);
        let state = ConfigState {
            files: options.files,
            store: OrderedStore::new(),
            reader: IniReader::new(limits)?,
            writer: IniWriter::new(limits)?,
            changed: false,
            autosave: false,
            policy: AutosavePolicy::new(options.autosave.delay_ms),
        };

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                io,
                clock,
            }),
            scheduler,
            poll_interval: options.autosave.poll_interval(),
            task: Mutex::new(None),
        })
    }

    /// Creates a configuration backed by the local file system, the system
    /// clock and a thread-based autosave scheduler.
    ///
    /// # Errors
    ///
    /// See [`Config::new`].
    pub fn on_disk(options: ConfigOptions) -> Result<Self, ConfigError> {
        Self::new(
            options,
            Arc::new(FsIo::new()),
            Arc::new(ThreadScheduler::new()),
            Arc::new(SystemClock),
        )
    }

    // ── Values ────────────────────────────────────────────────────────────────

    /// Stores `value` under `section` / `key`.
    ///
    /// Setting a value the entry already holds is a no-op: the comparison
    /// uses the decoding of the new value's type, so setting `7` on a stored
    /// `007` changes nothing.  Any real change marks the configuration as
    /// changed and postpones autosave by the configured delay.
    ///
    /// A plain `f64` set on an existing entry keeps that entry's precision.
    /// Empty section or key names, and any text containing a line break, are
    /// ignored: such entries could not be read back.
    pub fn set_value(&self, section: &str, key: &str, value: impl Into<Scalar>) {
        if section.is_empty() || key.is_empty() {
            warn!("ignoring value with empty section or key: {section:?} / {key:?}");
            return;
        }
        let scalar = value.into();
        if let Scalar::Text(text) = &scalar {
            if has_line_break(text) {
                warn!("ignoring value of {section:?} / {key:?}: it contains a line break");
                return;
            }
        }
        if has_line_break(section) || has_line_break(key) {
            warn!("ignoring value: line break in section or key {section:?} / {key:?}");
            return;
        }
        let id = entry_id(section, key);

        let mut state = self.shared.lock();
        let stored_precision = match state.store.get(&id) {
            Some(stored) if scalar.matches(stored) => return,
            Some(stored) => Some(stored.precision()),
            None => None,
        };
        let scalar = match scalar {
            Scalar::Double {
                value,
                precision: None,
            } => Scalar::Double {
                value,
                precision: stored_precision,
            },
            other => other,
        };
        state.store.insert(id, ScalarValue::new(scalar));
        state.changed = true;
        let now = self.shared.clock.now_millis();
        state.policy.touch(now);
    }

    fn with_value<T>(&self, section: &str, key: &str, f: impl FnOnce(&ScalarValue) -> T) -> Option<T> {
        let state = self.shared.lock();
        state.store.get(&entry_id(section, key)).map(f)
    }

    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.with_value(section, key, ScalarValue::as_string)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn get_i32(&self, section: &str, key: &str, default: i32) -> i32 {
        self.with_value(section, key, ScalarValue::as_i32)
            .unwrap_or(default)
    }

    pub fn get_u32(&self, section: &str, key: &str, default: u32) -> u32 {
        self.with_value(section, key, ScalarValue::as_u32)
            .unwrap_or(default)
    }

    pub fn get_i64(&self, section: &str, key: &str, default: i64) -> i64 {
        self.with_value(section, key, ScalarValue::as_i64)
            .unwrap_or(default)
    }

    pub fn get_u64(&self, section: &str, key: &str, default: u64) -> u64 {
        self.with_value(section, key, ScalarValue::as_u64)
            .unwrap_or(default)
    }

    pub fn get_f64(&self, section: &str, key: &str, default: f64) -> f64 {
        self.with_value(section, key, ScalarValue::as_f64)
            .unwrap_or(default)
    }

    /// Only the exact text `true` reads as `true`.
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.with_value(section, key, ScalarValue::as_bool)
            .unwrap_or(default)
    }

    /// A copy of the stored value, if the entry exists.
    pub fn get_value(&self, section: &str, key: &str) -> Option<ScalarValue> {
        self.with_value(section, key, ScalarValue::clone)
    }

    pub fn exists(&self, section: &str, key: &str) -> bool {
        self.with_value(section, key, |_| ()).is_some()
    }

    /// Whether there are changes not yet written to the primary file.
    pub fn changed(&self) -> bool {
        self.shared.lock().changed
    }

    /// Every entry as `(section, key, value)`, in file order.
    pub fn entries(&self) -> Vec<(String, String, ScalarValue)> {
        let state = self.shared.lock();
        state
            .store
            .iter()
            .filter_map(|(id, value)| {
                split_entry_id(id)
                    .map(|(section, key)| (section.to_string(), key.to_string(), value.clone()))
            })
            .collect()
    }

    // ── Persistence ───────────────────────────────────────────────────────────

    /// Replaces the in-memory settings with the defaults file overlaid by the
    /// primary file.
    ///
    /// A missing defaults file is fine.  A missing or empty primary file is
    /// created from whatever the defaults provided.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Unavailable`] when the storage is unavailable,
    /// or the error of the save that creates the primary file.
    pub fn read(&self) -> Result<(), ConfigError> {
        let mut state = self.shared.lock();
        self.shared.ensure_available()?;

        let io = &*self.shared.io;
        let defaults = state.files.default_path();
        let primary = state.files.primary_path();
        info!("reading configuration from {}", primary.display());

        state.store.reset();
        match state.parse(io, &defaults) {
            Ok(report) => debug!("{} defaults from {}", report.entries, defaults.display()),
            Err(e) => debug!("no defaults loaded: {e}"),
        }

        match state.parse(io, &primary) {
            Ok(report) => {
                debug!("{} entries from {}", report.entries, primary.display());
                state.changed = false;
                state.policy.clear();
                Ok(())
            }
            Err(e) => {
                info!("{e}; creating {} from defaults", primary.display());
                state.changed = true;
                self.shared.save_locked(&mut state).map(|_| ())
            }
        }
    }

    /// Writes the primary file if there are unsaved changes.  Returns whether
    /// a write happened.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Unavailable`] or the codec error of a failed
    /// write.  After a failure the changes are kept and
    /// [`changed`](Config::changed) stays `true`.
    pub fn save(&self) -> Result<bool, ConfigError> {
        let mut state = self.shared.lock();
        self.shared.save_locked(&mut state)
    }

    /// Discards all settings: the primary file is emptied and then rewritten
    /// from the defaults file, if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Unavailable`] or the error of a failed write.
    pub fn reset(&self) -> Result<(), ConfigError> {
        let mut state = self.shared.lock();
        self.shared.ensure_available()?;
        info!("resetting configuration {}", state.files.primary_path().display());

        state.store.reset();
        state.changed = true;
        self.shared.save_locked(&mut state)?;

        let defaults = state.files.default_path();
        if state.parse(&*self.shared.io, &defaults).is_ok() {
            state.changed = true;
            self.shared.save_locked(&mut state)?;
        }
        Ok(())
    }

    // ── Autosave ──────────────────────────────────────────────────────────────

    /// Turns autosave on or off and returns the previous setting.
    ///
    /// Turning it on starts a background task that saves once the configured
    /// delay has passed since the last change.  Turning it off stops the task
    /// and saves pending changes immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Schedule`] if the task cannot be started
    /// (autosave stays off), or the error of the final save when turning
    /// autosave off.
    pub fn set_autosave(&self, enabled: bool) -> Result<bool, ConfigError> {
        let previous = {
            let mut state = self.shared.lock();
            let previous = state.autosave;
            if previous == enabled {
                return Ok(previous);
            }
            state.autosave = enabled;
            previous
        };

        if enabled {
            let weak = Arc::downgrade(&self.shared);
            let job: RecurringJob = Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.autosave_tick();
                }
            });
            match self.scheduler.schedule_recurring(self.poll_interval, job) {
                Ok(task) => {
                    *self.task_slot() = Some(task);
                    info!("autosave enabled");
                }
                Err(e) => {
                    self.shared.lock().autosave = false;
                    error!("could not enable autosave: {e}");
                    return Err(e.into());
                }
            }
        } else {
            self.stop_task();
            info!("autosave disabled");
            let mut state = self.shared.lock();
            self.shared.save_locked(&mut state)?;
        }
        Ok(previous)
    }

    pub fn autosave(&self) -> bool {
        self.shared.lock().autosave
    }

    fn task_slot(&self) -> MutexGuard<'_, Option<Box<dyn ScheduledTask>>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cancels the autosave task without holding any lock the task needs.
    fn stop_task(&self) {
        let task = self.task_slot().take();
        if let Some(task) = task {
            task.cancel();
        }
    }

    // ── File names ────────────────────────────────────────────────────────────

    pub fn file_name(&self) -> String {
        self.shared.lock().files.name.clone()
    }

    /// Renames the primary file.  An empty name is ignored.
    pub fn set_file_name(&self, name: &str) {
        if !name.is_empty() {
            self.shared.lock().files.name = name.to_string();
        }
    }

    pub fn default_file_name(&self) -> String {
        self.shared.lock().files.default_name.clone()
    }

    /// Renames the defaults file.  An empty name is ignored.
    pub fn set_default_file_name(&self, name: &str) {
        if !name.is_empty() {
            self.shared.lock().files.default_name = name.to_string();
        }
    }

    pub fn file_extension(&self) -> String {
        self.shared.lock().files.extension.clone()
    }

    /// Changes the extension of both files.  An empty extension is ignored.
    pub fn set_file_extension(&self, extension: &str) {
        if !extension.is_empty() {
            self.shared.lock().files.extension = extension.to_string();
        }
    }

    pub fn file_path(&self) -> PathBuf {
        self.shared.lock().files.dir.clone()
    }

    /// Moves both files to `dir`.  An empty path means the working directory.
    pub fn set_file_path(&self, dir: impl AsRef<Path>) {
        self.shared.lock().files.dir = dir.as_ref().to_path_buf();
    }

    /// Full path of the primary file.
    pub fn primary_path(&self) -> PathBuf {
        self.shared.lock().files.primary_path()
    }

    /// Full path of the defaults file.
    pub fn default_path(&self) -> PathBuf {
        self.shared.lock().files.default_path()
    }
}

impl Drop for Config {
    /// Stops autosave and, if it was on, writes pending changes.
    fn drop(&mut self) {
        self.stop_task();
        let mut state = self.shared.lock();
        if state.autosave {
            if let Err(e) = self.shared.save_locked(&mut state) {
                error!("could not save configuration on drop: {e}");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
