//! Application layer of iniconf.
//!
//! # What is the "application" layer? (for beginners)
//!
//! The *application* layer sits between the core model (`iniconf-core`:
//! values, store and codec) and the infrastructure (files, threads, clocks).
//! It orchestrates the core types to fulfil a user goal such as "read my
//! settings, falling back to the shipped defaults" and depends only on
//! traits for everything that touches the OS.
//!
//! # Sub-modules
//!
//! - **`config`**   – The [`Config`](config::Config) facade: typed getters
//!   and setters, read/save/reset and the autosave switch.
//!
//! - **`autosave`** – The deadline policy behind autosave, plus the
//!   `Scheduler` and `Clock` traits the background task is built on.

pub mod autosave;
pub mod config;
