//! Chunked INI writer.
//!
//! Renders an [`OrderedStore`] in insertion order:
//!
//! ```text
//! [net]          <- header whenever the section changes
//! port=24800
//! host=a.b
//!                <- blank line before every header but the first
//! [ui]
//! theme=dark
//! ```
//!
//! Output accumulates in a buffer of `chunk_size` bytes.  When the next piece
//! would not fit, the buffer is written at the running file offset and reused.
//! The first write always lands at offset 0, which replaces the old file.

use std::path::Path;

use tracing::{debug, error};

use super::{CodecError, CodecLimits};
use crate::domain::entry_id::split_entry_id;
use crate::domain::store::OrderedStore;
use crate::domain::value::ScalarValue;
use crate::io::ChunkIo;

/// Statistics of one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub bytes_written: u64,
    /// Entries written as `key=value` lines.
    pub entries: usize,
    /// Entries skipped because of a bad identifier, a line break or an
    /// over-long line.
    pub skipped: usize,
    /// Number of `write_chunk` calls.
    pub flushes: usize,
}

/// Serializes an [`OrderedStore`] into INI text.
#[derive(Debug)]
pub struct IniWriter {
    limits: CodecLimits,
    buf: Vec<u8>,
}

impl IniWriter {
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidLimits`] if the limits are inconsistent.
    pub fn new(limits: CodecLimits) -> Result<Self, CodecError> {
        limits.validate()?;
        Ok(Self {
            limits,
            buf: Vec::with_capacity(limits.chunk_size),
        })
    }

    pub fn limits(&self) -> CodecLimits {
        self.limits
    }

    /// Writes every entry of `store` to `path`, replacing its contents.
    ///
    /// An empty store still produces one write at offset 0, leaving an empty
    /// file behind.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Write`] or [`CodecError::ShortWrite`] for the first
    /// flush that fails.  The walk stops there; the file may be incomplete.
    pub fn write_store(
        &mut self,
        io: &dyn ChunkIo,
        path: &Path,
        store: &OrderedStore<ScalarValue>,
    ) -> Result<RenderReport, CodecError> {
        debug!("rendering {} entries to {}", store.len(), path.display());
        self.buf.clear();

        let mut state = RenderState {
            io,
            path,
            limits: self.limits,
            buf: &mut self.buf,
            offset: 0,
            last_section: None,
            report: RenderReport::default(),
            failure: None,
        };

        store.for_each(|id, value| state.visit(id, value));
        if let Some(err) = state.failure.take() {
            return Err(err);
        }

        // Final flush.  Offset 0 means nothing was written yet, so the write
        // happens even for an empty buffer to truncate the file.
        if state.offset == 0 || !state.buf.is_empty() {
            state.flush()?;
        }

        let report = state.report;
        debug!(
            "wrote {} bytes to {} in {} flushes",
            report.bytes_written,
            path.display(),
            report.flushes
        );
        Ok(report)
    }
}

struct RenderState<'a> {
    io: &'a dyn ChunkIo,
    path: &'a Path,
    limits: CodecLimits,
    buf: &'a mut Vec<u8>,
    offset: u64,
    last_section: Option<String>,
    report: RenderReport,
    failure: Option<CodecError>,
}

impl RenderState<'_> {
    /// Renders one entry.  Returns `false` to stop the walk after a failed
    /// flush.
    fn visit(&mut self, id: &str, value: &ScalarValue) -> bool {
        let Some((section, key)) = split_entry_id(id) else {
            error!("skipping entry with bad identifier {id:?}");
            self.report.skipped += 1;
            return true;
        };
        if [section, key, value.raw_text()]
            .iter()
            .any(|part| part.contains(['\n', '\r']))
        {
            error!("skipping entry {id:?}: line breaks cannot be written");
            self.report.skipped += 1;
            return true;
        }

        let pair = format!("{key}={}", value.raw_text());
        if pair.len() > self.limits.max_line_len {
            error!(
                "skipping entry {id:?}: {} bytes exceed maximum line length of {}",
                pair.len(),
                self.limits.max_line_len
            );
            self.report.skipped += 1;
            return true;
        }

        if self.last_section.as_deref() != Some(section) {
            let header = format!("[{section}]");
            if header.len() > self.limits.max_line_len {
                error!(
                    "skipping entry {id:?}: section header exceeds maximum line length of {}",
                    self.limits.max_line_len
                );
                self.report.skipped += 1;
                return true;
            }
            if self.last_section.is_some() && !self.push(b"\n") {
                return false;
            }
            if !self.push_line(&header) {
                return false;
            }
            self.last_section = Some(section.to_owned());
        }

        if !self.push_line(&pair) {
            return false;
        }
        self.report.entries += 1;
        true
    }

    fn push_line(&mut self, line: &str) -> bool {
        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
        self.push(&bytes)
    }

    /// Appends `piece` to the buffer, flushing first if it would overflow.
    fn push(&mut self, piece: &[u8]) -> bool {
        if self.buf.len() + piece.len() > self.limits.chunk_size {
            if let Err(err) = self.flush() {
                error!("{err}");
                self.failure = Some(err);
                return false;
            }
        }
        self.buf.extend_from_slice(piece);
        true
    }

    fn flush(&mut self) -> Result<(), CodecError> {
        let expected = self.buf.len();
        self.report.flushes += 1;
        let written = self
            .io
            .write_chunk(self.path, self.offset, &self.buf[..])
            .map_err(|source| CodecError::Write {
                path: self.path.to_path_buf(),
                offset: self.offset,
                source,
            })?;
        if written != expected {
            return Err(CodecError::ShortWrite {
                path: self.path.to_path_buf(),
                offset: self.offset,
                written,
                expected,
            });
        }
        self.offset += written as u64;
        self.report.bytes_written += written as u64;
        self.buf.clear();
        Ok(())
    }
}
