//! Autosave policy and the collaborators it needs.
//!
//! # How autosave works (for beginners)
//!
//! Writing the file on every `set_value` would be wasteful when a program
//! changes ten settings in a row.  Instead every change pushes a *deadline*
//! `delay` milliseconds into the future, and a background task wakes up about
//! once per interval to check it:
//!
//! ```text
//!  set   set        set                      poll  poll  poll
//!   │     │          │                         │     │     │
//!   ▼     ▼          ▼                         ▼     ▼     ▼
//! ──●─────●──────────●────────────────┬────────○─────○─────●── save
//!                    └── delay ───────┘ deadline
//! ```
//!
//! The task itself is provided by a [`Scheduler`]; time comes from a
//! [`Clock`].  Both are traits so tests can drive the policy by hand.

use std::time::Duration;

use thiserror::Error;

/// Quiet period after the last change before autosave writes the file.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 1500;

/// How often the autosave task checks whether a save is due.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Error type for starting a background task.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The OS refused to start the worker thread.
    #[error("failed to spawn autosave thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// No Tokio runtime is running on this thread.
    #[error("no Tokio runtime available: {0}")]
    NoRuntime(String),
}

/// A job run repeatedly by a [`Scheduler`].
pub type RecurringJob = Box<dyn FnMut() + Send + 'static>;

/// Source of wall-clock time in milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// Runs jobs periodically in the background.
///
/// Infrastructure implementations use a dedicated thread or a Tokio task;
/// the manual implementation runs jobs only when a test asks it to.
pub trait Scheduler: Send + Sync {
    /// Starts calling `job` every `interval` until the returned handle is
    /// cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError`] when the background task cannot be started.
    fn schedule_recurring(
        &self,
        interval: Duration,
        job: RecurringJob,
    ) -> Result<Box<dyn ScheduledTask>, ScheduleError>;
}

/// Handle to a running recurring job.
pub trait ScheduledTask: Send {
    /// Stops the job.  After this returns the job is never started again.
    fn cancel(self: Box<Self>);
}

/// Tracks when the next autosave is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosavePolicy {
    delay_ms: u64,
    deadline: Option<u64>,
}

impl AutosavePolicy {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// The pending deadline in clock milliseconds, if any.
    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// Records a change at `now`: the save is postponed to `now + delay`.
    pub fn touch(&mut self, now: u64) {
        self.deadline = Some(now.saturating_add(self.delay_ms));
    }

    /// Forgets the deadline after a successful write.
    pub fn clear(&mut self) {
        self.deadline = None;
    }

    /// A save is due once there are unsaved changes and `now` is past the
    /// deadline.
    pub fn is_due(&self, changed: bool, now: u64) -> bool {
        changed && self.deadline.is_some_and(|deadline| now > deadline)
    }
}

impl Default for AutosavePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY_MS)
    }
}
