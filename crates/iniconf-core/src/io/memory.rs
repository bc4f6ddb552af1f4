//! In-memory [`ChunkIo`] implementation.
//!
//! Holds files as byte vectors keyed by path.  Useful for tests and for hosts
//! that keep their configuration somewhere other than a file system.  Clones
//! share the same files, so a test can hand one clone to the code under test
//! and inspect the results through another.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::ChunkIo;

#[derive(Debug, Clone, Default)]
pub struct MemoryIo {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    write_calls: Arc<AtomicUsize>,
    read_only: Arc<AtomicBool>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or replaces a file.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files().insert(path.into(), contents.into());
    }

    pub fn remove(&self, path: &Path) -> Option<Vec<u8>> {
        self.files().remove(path)
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files().get(path).cloned()
    }

    /// File contents decoded as UTF-8, lossily.
    pub fn contents_string(&self, path: &Path) -> Option<String> {
        self.contents(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.files().contains_key(path)
    }

    /// Number of `write_chunk` calls made so far, failed ones included.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Makes every subsequent write fail with `PermissionDenied`.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Controls the answer of [`ChunkIo::is_available`].
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn files(&self) -> MutexGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ChunkIo for MemoryIo {
    fn read_chunk(&self, path: &Path, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let files = self.files();
        let file = files.get(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
        })?;
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(file.len());
        let n = buf.len().min(file.len() - start);
        buf[..n].copy_from_slice(&file[start..start + n]);
        Ok(n)
    }

    fn write_chunk(&self, path: &Path, offset: u64, bytes: &[u8]) -> io::Result<usize> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.read_only.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is read-only", path.display()),
            ));
        }
        let offset = usize::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset out of range"))?;

        let mut files = self.files();
        let file = files.entry(path.to_path_buf()).or_default();
        if offset == 0 {
            file.clear();
        }
        let end = offset + bytes.len();
        if file.len() < end {
            file.resize(end, 0);
        }
        file[offset..end].copy_from_slice(bytes);
        Ok(bytes.len())
    }

    fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_file_is_not_found() {
        let io = MemoryIo::new();
        let mut buf = [0u8; 8];
        let err = io.read_chunk(Path::new("nope.ini"), 0, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_read_chunk_at_offset() {
        // Arrange
        let io = MemoryIo::new();
        io.insert("a.ini", "0123456789");
        let mut buf = [0u8; 4];

        // Act
        let n = io.read_chunk(Path::new("a.ini"), 8, &mut buf).unwrap();

        // Assert – short read signals end of file
        assert_eq!(n, 2);
        assert_eq!(&buf[..n], b"89");
    }

    #[test]
    fn test_read_past_end_returns_zero() {
        let io = MemoryIo::new();
        io.insert("a.ini", "abc");
        let mut buf = [0u8; 4];
        assert_eq!(io.read_chunk(Path::new("a.ini"), 10, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_write_at_zero_truncates_and_later_offsets_append() {
        // Arrange
        let io = MemoryIo::new();
        io.insert("a.ini", "stale content that is long");
        let path = Path::new("a.ini");

        // Act
        io.write_chunk(path, 0, b"[s]\n").unwrap();
        io.write_chunk(path, 4, b"k=v\n").unwrap();

        // Assert
        assert_eq!(io.contents_string(path).unwrap(), "[s]\nk=v\n");
        assert_eq!(io.write_calls(), 2);
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let io = MemoryIo::new();
        io.set_read_only(true);
        let err = io.write_chunk(Path::new("a.ini"), 0, b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(!io.exists(Path::new("a.ini")));
    }

    #[test]
    fn test_clones_share_files() {
        let io = MemoryIo::new();
        let view = io.clone();
        io.insert("a.ini", "x");
        assert!(view.exists(Path::new("a.ini")));
        assert!(view.is_available());
        io.set_available(false);
        assert!(!view.is_available());
    }
}
