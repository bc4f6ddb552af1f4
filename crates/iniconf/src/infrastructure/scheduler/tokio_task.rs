//! Tokio-backed [`Scheduler`].
//!
//! Each job is driven by a Tokio task with an `interval` timer.  The job
//! itself runs on the blocking pool via `spawn_blocking`, because an autosave
//! takes a mutex and writes files, neither of which belongs on an async
//! worker thread.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::application::autosave::{RecurringJob, ScheduleError, ScheduledTask, Scheduler};

/// Tokio's interval timer rejects a zero period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Runs recurring jobs on a Tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is running on.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NoRuntime`] outside a Tokio runtime.
    pub fn current() -> Result<Self, ScheduleError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| ScheduleError::NoRuntime(e.to_string()))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_recurring(
        &self,
        period: Duration,
        job: RecurringJob,
    ) -> Result<Box<dyn ScheduledTask>, ScheduleError> {
        let job = Arc::new(Mutex::new(job));
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        self.handle.spawn(async move {
            let mut ticker = interval(period.max(MIN_INTERVAL));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            debug!("autosave task started, interval {period:?}");

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let job = Arc::clone(&job);
                        let run = tokio::task::spawn_blocking(move || {
                            let mut job = job.lock().unwrap_or_else(PoisonError::into_inner);
                            (*job)();
                        });
                        if let Err(e) = run.await {
                            warn!("autosave job failed: {e}");
                        }
                    }
                }
            }
            debug!("autosave task stopped");
        });

        Ok(Box::new(TokioTask { stop_tx }))
    }
}

struct TokioTask {
    stop_tx: oneshot::Sender<()>,
}

impl ScheduledTask for TokioTask {
    /// Signals the task to stop.  A job that is already running on the
    /// blocking pool is allowed to finish; no new run starts.
    fn cancel(self: Box<Self>) {
        // The task may already have ended with its runtime.
        let _ = self.stop_tx.send(());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting_job() -> (Arc<AtomicUsize>, RecurringJob) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let job: RecurringJob = Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (runs, job)
    }

    #[tokio::test]
    async fn test_current_inside_runtime() {
        assert!(TokioScheduler::current().is_ok());
    }

    #[test]
    fn test_current_outside_runtime_fails() {
        assert!(matches!(
            TokioScheduler::current(),
            Err(ScheduleError::NoRuntime(_))
        ));
    }

    #[tokio::test]
    async fn test_job_runs_on_each_tick() {
        // Arrange
        let (runs, job) = counting_job();
        let scheduler = TokioScheduler::current().unwrap();

        // Act
        let task = scheduler
            .schedule_recurring(Duration::from_millis(5), job)
            .unwrap();
        for _ in 0..200 {
            if runs.load(Ordering::SeqCst) >= 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        task.cancel();

        // Assert
        assert!(runs.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_first_run_waits_one_interval() {
        let (runs, job) = counting_job();
        let scheduler = TokioScheduler::current().unwrap();

        let task = scheduler
            .schedule_recurring(Duration::from_secs(3600), job)
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        task.cancel();

        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_stops_further_runs() {
        // Arrange
        let (runs, job) = counting_job();
        let scheduler = TokioScheduler::current().unwrap();
        let task = scheduler
            .schedule_recurring(Duration::from_millis(2), job)
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Act
        task.cancel();
        // Let a run that was already on the blocking pool finish.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let after_cancel = runs.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;

        // Assert
        assert_eq!(runs.load(Ordering::SeqCst), after_cancel);
    }
}
