//! Thread-backed [`Scheduler`].
//!
//! Every scheduled job gets a dedicated thread that sleeps on a channel with
//! a timeout.  A timeout means "run the job"; a message or a closed channel
//! means "stop".  Cancelling therefore wakes the thread immediately instead
//! of waiting out the rest of the interval.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::application::autosave::{RecurringJob, ScheduleError, ScheduledTask, Scheduler};

const THREAD_NAME: &str = "iniconf-autosave";

/// Runs recurring jobs on dedicated OS threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadScheduler;

impl ThreadScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule_recurring(
        &self,
        interval: Duration,
        mut job: RecurringJob,
    ) -> Result<Box<dyn ScheduledTask>, ScheduleError> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                debug!("autosave thread started, interval {interval:?}");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => job(),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("autosave thread stopped");
            })
            .map_err(ScheduleError::Spawn)?;

        Ok(Box::new(ThreadTask { stop_tx, handle }))
    }
}

struct ThreadTask {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl ScheduledTask for ThreadTask {
    /// Stops the thread and waits for a job that is currently running.
    fn cancel(self: Box<Self>) {
        let ThreadTask { stop_tx, handle } = *self;
        // The thread may already have exited; a failed send is fine.
        let _ = stop_tx.send(());
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            warn!("autosave thread panicked");
        }
    }
}
