//! Infrastructure layer for iniconf.
//!
//! Contains the OS-facing adapters: chunked file I/O, background schedulers,
//! clocks and the TOML options loader.
//!
//! **Dependency rule**: the `application` layer only sees these through the
//! traits it defines (`ChunkIo`, `Scheduler`, `Clock`).  The one exception is
//! [`Config::on_disk`](crate::application::config::Config::on_disk), which wires
//! up the standard adapters.

pub mod clock;
pub mod scheduler;
pub mod storage;
