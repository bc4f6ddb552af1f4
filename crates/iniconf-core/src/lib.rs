//! # iniconf-core
//!
//! Shared library for iniconf containing the typed scalar value, the
//! insertion-ordered entry store and the streaming INI codec.
//!
//! This crate is used by the `iniconf` application crate.  It has no
//! dependencies on the file system, timers or threads: file access goes
//! through the [`io::ChunkIo`] trait, which the application layer implements.
//!
//! # Architecture overview (for beginners)
//!
//! iniconf persists typed application settings to a human-editable INI file:
//!
//! ```ini
//! [network]
//! port=24800
//! verbose=true
//!
//! [display]
//! scale=1.25
//! ```
//!
//! This crate is the foundation.  It defines:
//!
//! - **`domain`** – The in-memory model.  A [`ScalarValue`] holds one setting
//!   in its textual form and converts it to and from native Rust scalars.  An
//!   [`OrderedStore`] maps `section#/#key` identifiers to values while keeping
//!   insertion order, so a saved file lists sections in the order they were
//!   first seen.
//!
//! - **`codec`** – How bytes become entries and back.  The [`IniReader`] pulls
//!   the file in fixed-size chunks and runs a small line state machine over
//!   them; the [`IniWriter`] renders the store into a bounded buffer that is
//!   flushed chunk by chunk.
//!
//! - **`io`** – The [`ChunkIo`] trait describing offset-based chunk reads and
//!   writes, plus [`MemoryIo`], an in-memory implementation.

pub mod codec;
pub mod domain;
pub mod io;

// Re-export the most-used types at the crate root so callers can write
// `iniconf_core::ScalarValue` instead of `iniconf_core::domain::value::ScalarValue`.
pub use codec::{CodecError, CodecLimits, IniReader, IniWriter, ParseReport, RenderReport};
pub use domain::entry_id::{entry_id, split_entry_id, ENTRY_SEPARATOR};
pub use domain::store::OrderedStore;
pub use domain::value::{Scalar, ScalarValue, ValueError};
pub use io::memory::MemoryIo;
pub use io::ChunkIo;
