//! Manual scheduler for unit testing.
//!
//! Allows tests to run scheduled jobs at exactly the moment they choose,
//! without real threads or timers.  Clones share the same job list.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::application::autosave::{RecurringJob, ScheduleError, ScheduledTask, Scheduler};

struct Slot {
    id: u64,
    interval: Duration,
    job: RecurringJob,
}

#[derive(Default)]
struct Jobs {
    next_id: u64,
    slots: Vec<Slot>,
}

/// A [`Scheduler`] whose jobs only run when [`ManualScheduler::run_all`] is
/// called.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    jobs: Arc<Mutex<Jobs>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every active job once, as if its interval had elapsed.
    pub fn run_all(&self) {
        let mut jobs = self.jobs();
        for slot in &mut jobs.slots {
            (slot.job)();
        }
    }

    /// Number of scheduled jobs that have not been cancelled.
    pub fn active(&self) -> usize {
        self.jobs().slots.len()
    }

    /// Intervals of the active jobs, in scheduling order.
    pub fn intervals(&self) -> Vec<Duration> {
        self.jobs().slots.iter().map(|s| s.interval).collect()
    }

    fn jobs(&self) -> MutexGuard<'_, Jobs> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_recurring(
        &self,
        interval: Duration,
        job: RecurringJob,
    ) -> Result<Box<dyn ScheduledTask>, ScheduleError> {
        let mut jobs = self.jobs();
        let id = jobs.next_id;
        jobs.next_id += 1;
        jobs.slots.push(Slot { id, interval, job });
        Ok(Box::new(ManualTask {
            id,
            jobs: Arc::clone(&self.jobs),
        }))
    }
}

struct ManualTask {
    id: u64,
    jobs: Arc<Mutex<Jobs>>,
}

impl ScheduledTask for ManualTask {
    fn cancel(self: Box<Self>) {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.slots.retain(|slot| slot.id != self.id);
    }
}
