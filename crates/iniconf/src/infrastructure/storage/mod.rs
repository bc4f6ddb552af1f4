//! Storage infrastructure: file access and options persistence.
//!
//! - `fs` implements [`ChunkIo`](iniconf_core::ChunkIo) on top of `std::fs`,
//!   reading and writing the INI files one chunk at a time.
//! - `options` loads the TOML options file that says where the INI files
//!   live and how they are processed.

pub mod fs;
pub mod options;
