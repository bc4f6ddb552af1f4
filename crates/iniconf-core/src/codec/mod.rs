//! Streaming INI codec.
//!
//! File format:
//! ```text
//! [section]
//! key=value
//!
//! [other]
//! key=value
//! ```
//!
//! The [`IniReader`] never holds the whole file in memory.  It reads through
//! [`ChunkIo`](crate::io::ChunkIo) into a working buffer of
//! [`CodecLimits::chunk_size`] bytes and splits each chunk into lines.  When a
//! chunk ends in the middle of a line, the next read starts again at the last
//! complete line, so a line is never lost or parsed twice no matter where the
//! chunk boundaries fall.
//!
//! The [`IniWriter`] is the inverse: it renders the store into a buffer of the
//! same size and flushes it at increasing file offsets.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

mod line;
pub mod reader;
pub mod writer;

pub use reader::{IniReader, ParseReport};
pub use writer::{IniWriter, RenderReport};

/// Default working buffer size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 1200;

/// Default maximum line length in bytes, excluding the line terminator.
pub const DEFAULT_MAX_LINE_LEN: usize = 100;

/// Characters of an oversized line included in its diagnostic.
pub(crate) const OVERSIZED_PREVIEW_CHARS: usize = 40;

/// Error type for codec operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The working buffer cannot hold a full line.
    #[error("chunk size {chunk_size} must exceed the maximum line length {max_line_len}")]
    InvalidLimits {
        chunk_size: usize,
        max_line_len: usize,
    },

    /// The first chunk of the file could not be read.
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exists but holds no bytes.
    #[error("{} is empty", path.display())]
    Empty { path: PathBuf },

    /// A chunk could not be written.
    #[error("could not write {} at offset {offset}: {source}", path.display())]
    Write {
        path: PathBuf,
        offset: u64,
        #[source]
        source: io::Error,
    },

    /// A chunk was only partially written.
    #[error("short write to {} at offset {offset}: {written} of {expected} bytes", path.display())]
    ShortWrite {
        path: PathBuf,
        offset: u64,
        written: usize,
        expected: usize,
    },
}

/// Buffer sizes shared by the reader and the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecLimits {
    /// Bytes requested per chunk read, and the size of the write buffer.
    pub chunk_size: usize,
    /// Longest accepted line in bytes.  Longer lines are cut at this length.
    pub max_line_len: usize,
}

impl CodecLimits {
    /// Checks that a chunk can always hold at least one full line.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidLimits`] when `chunk_size` is not larger
    /// than `max_line_len`, or `max_line_len` is zero.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.max_line_len == 0 || self.chunk_size <= self.max_line_len {
            return Err(CodecError::InvalidLimits {
                chunk_size: self.chunk_size,
                max_line_len: self.max_line_len,
            });
        }
        Ok(())
    }
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}
