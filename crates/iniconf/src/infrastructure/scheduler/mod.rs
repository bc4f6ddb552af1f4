//! Background schedulers for the autosave task.
//!
//! - [`thread::ThreadScheduler`] runs each job on its own named OS thread.
//!   It needs no runtime and is what [`Config::on_disk`] uses.
//! - [`tokio_task::TokioScheduler`] runs jobs from a Tokio task, handing each run
//!   to the blocking pool because a save performs file I/O.
//! - [`manual::ManualScheduler`] runs jobs only when asked, for tests.
//!
//! [`Config::on_disk`]: crate::application::config::Config::on_disk

pub mod manual;
pub mod thread;
pub mod tokio_task;
