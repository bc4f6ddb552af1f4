//! Chunked file access.
//!
//! The codec never opens files itself.  It reads and writes through
//! [`ChunkIo`], a small offset-based interface that the application layer
//! implements on top of the real file system.  Keeping the seam here means the
//! reader and writer can be tested against [`memory::MemoryIo`] or a mock.
//!
//! # Offsets
//!
//! A chunk read at `offset` must return bytes starting at that position in the
//! file.  A chunk write at offset `0` starts a new file (truncating any old
//! content); writes at larger offsets continue the same file, so a sequence of
//! flushes at increasing offsets produces one continuous file.

use std::io;
use std::path::Path;

pub mod memory;

/// Offset-based chunk reads and writes of whole files.
#[cfg_attr(test, mockall::automock)]
pub trait ChunkIo: Send + Sync {
    /// Reads up to `buf.len()` bytes of `path` starting at `offset`.
    ///
    /// Returns the number of bytes read.  Fewer bytes than requested, or zero,
    /// means the end of the file was reached.
    fn read_chunk(&self, path: &Path, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes `bytes` to `path` starting at `offset`.
    ///
    /// Returns the number of bytes written.
    fn write_chunk(&self, path: &Path, offset: u64, bytes: &[u8]) -> io::Result<usize>;

    /// Whether the backing storage can be used at all.
    ///
    /// Platforms where the file system has to be mounted first override this.
    fn is_available(&self) -> bool {
        true
    }
}
