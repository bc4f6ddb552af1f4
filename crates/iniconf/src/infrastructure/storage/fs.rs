//! [`ChunkIo`] on top of `std::fs`.
//!
//! Each call opens the file, seeks to the requested offset and closes it
//! again, so no handle is kept between the chunks of a parse or a save.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use iniconf_core::ChunkIo;
use tracing::debug;

/// Chunked access to files on the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsIo;

impl FsIo {
    pub fn new() -> Self {
        Self
    }
}

impl ChunkIo for FsIo {
    /// Fills `buf` as far as the file allows.  Fewer bytes than `buf.len()`
    /// means the end of the file was reached.
    fn read_chunk(&self, path: &Path, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut file = File::open(path)?;
        if offset > 0 {
            file.seek(SeekFrom::Start(offset))?;
        }

        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    /// A write at offset 0 creates or truncates the file and any missing
    /// parent directories.  Later offsets extend the existing file.
    fn write_chunk(&self, path: &Path, offset: u64, bytes: &[u8]) -> io::Result<usize> {
        let mut file = if offset == 0 {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            debug!("truncating {}", path.display());
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?
        } else {
            let mut file = OpenOptions::new().write(true).open(path)?;
            file.seek(SeekFrom::Start(offset))?;
            file
        };

        file.write_all(bytes)?;
        file.flush()?;
        Ok(bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("iniconf_fs_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let dir = temp_dir();
        let mut buf = [0u8; 8];

        let err = FsIo.read_chunk(&dir.join("absent.ini"), 0, &mut buf).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_chunk_at_offset_and_short_read_at_end() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("a.ini");
        fs::write(&path, "0123456789").unwrap();
        let mut buf = [0u8; 4];

        // Act
        let first = FsIo.read_chunk(&path, 0, &mut buf).unwrap();
        let last = FsIo.read_chunk(&path, 8, &mut buf).unwrap();

        // Assert
        assert_eq!(first, 4);
        assert_eq!(last, 2);
        assert_eq!(&buf[..last], b"89");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_at_zero_truncates_then_appends_at_offset() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("a.ini");
        fs::write(&path, "stale content that is much longer").unwrap();

        // Act
        FsIo.write_chunk(&path, 0, b"[s]\n").unwrap();
        FsIo.write_chunk(&path, 4, b"k=v\n").unwrap();

        // Assert
        assert_eq!(fs::read_to_string(&path).unwrap(), "[s]\nk=v\n");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_creates_missing_directories() {
        let dir = temp_dir();
        let path = dir.join("nested").join("deeper").join("a.ini");

        let written = FsIo.write_chunk(&path, 0, b"[s]\n").unwrap();

        assert_eq!(written, 4);
        assert!(path.exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_fs_is_available() {
        assert!(FsIo::new().is_available());
    }
}
