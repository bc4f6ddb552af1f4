//! Chunked INI reader.
//!
//! # How the reader walks a file (for beginners)
//!
//! ```text
//!  file:   [net]\nport=1\nhost=exa|mple.org\n[ui]\n ...
//!  chunk 1 ───────────────────────┘
//!                     chunk 2 starts here ─┘ (re-reads "host=exa")
//! ```
//!
//! 1. Read up to `chunk_size` bytes at the current offset.
//! 2. Cut the chunk into lines at `\n`.  A line longer than `max_line_len` is
//!    cut at that length and the rest of it is treated as a new line.
//! 3. A fragment at the end of a full chunk is not parsed; the next read
//!    starts at the end of the last complete line instead.
//! 4. A read shorter than `chunk_size` is the last one.  Its final line is
//!    parsed even without a trailing `\n`.
//!
//! Malformed lines never abort the parse.  They are dropped and logged at
//! `debug` level; oversized lines are logged at `error` level.

use std::path::Path;

use tracing::{debug, error};

use super::line::{classify, strip_comment, trim, IniLine};
use super::{CodecError, CodecLimits, OVERSIZED_PREVIEW_CHARS};
use crate::domain::entry_id::entry_id;
use crate::domain::store::OrderedStore;
use crate::domain::value::ScalarValue;
use crate::io::ChunkIo;

/// Statistics of one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Bytes of the file consumed as complete lines.
    pub bytes_read: u64,
    /// Lines seen, including blank and dropped ones.
    pub lines: usize,
    /// Key/value pairs written into the store.
    pub entries: usize,
    /// Malformed lines, and pairs outside a valid section.
    pub dropped: usize,
    /// Lines cut at the maximum line length.
    pub oversized: usize,
}

/// Parses INI files into an [`OrderedStore`].
///
/// The working buffer is allocated once and reused across parses.
#[derive(Debug)]
pub struct IniReader {
    limits: CodecLimits,
    buf: Vec<u8>,
}

impl IniReader {
    /// Creates a reader with a working buffer of `limits.chunk_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidLimits`] if the limits are inconsistent.
    pub fn new(limits: CodecLimits) -> Result<Self, CodecError> {
        limits.validate()?;
        Ok(Self {
            limits,
            buf: vec![0; limits.chunk_size],
        })
    }

    pub fn limits(&self) -> CodecLimits {
        self.limits
    }

    /// Parses `path` and inserts every well-formed pair into `store`,
    /// overwriting entries that already exist.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Read`] if the first chunk cannot be read (for
    /// example because the file does not exist) and [`CodecError::Empty`] if
    /// the file holds no bytes.  In both cases `store` is untouched.  A read
    /// failure later in the file stops the parse but keeps what was parsed.
    pub fn parse_into(
        &mut self,
        io: &dyn ChunkIo,
        path: &Path,
        store: &mut OrderedStore<ScalarValue>,
    ) -> Result<ParseReport, CodecError> {
        debug!("parsing {}", path.display());

        let mut sink = LineSink {
            path,
            max_line_len: self.limits.max_line_len,
            section: String::new(),
            store,
            report: ParseReport::default(),
        };
        let mut offset: u64 = 0;

        loop {
            let received = match io.read_chunk(path, offset, &mut self.buf) {
                Ok(n) => n,
                Err(source) if offset == 0 => {
                    return Err(CodecError::Read {
                        path: path.to_path_buf(),
                        source,
                    })
                }
                Err(e) => {
                    error!("read of {} failed at offset {offset}: {e}", path.display());
                    break;
                }
            };
            if received == 0 {
                if offset == 0 {
                    return Err(CodecError::Empty {
                        path: path.to_path_buf(),
                    });
                }
                break;
            }

            let at_eof = received < self.buf.len();
            let consumed = split_lines(
                &self.buf[..received],
                at_eof,
                self.limits.max_line_len,
                |raw, oversized| sink.accept(raw, oversized),
            );
            sink.report.bytes_read += consumed as u64;

            if at_eof {
                break;
            }
            // `chunk_size > max_line_len`, so a full chunk always holds either
            // a line break or a run that gets cut: `consumed` is never zero.
            debug_assert!(consumed > 0);
            offset += consumed as u64;
        }

        let report = sink.report;
        debug!(
            "parsed {}: {} entries, {} dropped, {} oversized",
            path.display(),
            report.entries,
            report.dropped,
            report.oversized
        );
        Ok(report)
    }
}

/// Splits `chunk` into lines and returns the number of bytes consumed.
///
/// `on_line` receives each line without its terminator, plus whether the line
/// was cut at `max_line_len`.  An unterminated fragment at the end of the chunk
/// is left unconsumed unless `at_eof` is set.
fn split_lines<F>(chunk: &[u8], at_eof: bool, max_line_len: usize, mut on_line: F) -> usize
where
    F: FnMut(&[u8], bool),
{
    let mut pos = 0;
    while pos < chunk.len() {
        let rest = &chunk[pos..];
        let newline = rest.iter().position(|&b| b == b'\n');
        let line_len = newline.unwrap_or(rest.len());

        if line_len > max_line_len {
            // Synthetic line break: the remainder starts a new line.
            on_line(&rest[..max_line_len], true);
            pos += max_line_len;
        } else if let Some(nl) = newline {
            on_line(&rest[..nl], false);
            pos += nl + 1;
        } else if at_eof {
            on_line(rest, false);
            pos = chunk.len();
        } else {
            break;
        }
    }
    pos
}

/// Per-parse state: the current section and the target store.
struct LineSink<'a> {
    path: &'a Path,
    max_line_len: usize,
    section: String,
    store: &'a mut OrderedStore<ScalarValue>,
    report: ParseReport,
}

impl LineSink<'_> {
    fn accept(&mut self, raw: &[u8], oversized: bool) {
        self.report.lines += 1;
        let text = String::from_utf8_lossy(raw);

        if oversized {
            self.report.oversized += 1;
            let preview: String = text.chars().take(OVERSIZED_PREVIEW_CHARS).collect();
            error!(
                "line in {} exceeds maximum length of {}: {preview:?}",
                self.path.display(),
                self.max_line_len
            );
        }

        match classify(trim(strip_comment(&text))) {
            IniLine::Blank => {}
            IniLine::Section(name) => {
                if name.is_empty() {
                    debug!("blank section name in {}", self.path.display());
                }
                self.section.clear();
                self.section.push_str(name);
            }
            IniLine::InvalidSection => {
                // Pairs are dropped until the next valid header.
                debug!("invalid section header {text:?} in {}", self.path.display());
                self.section.clear();
                self.report.dropped += 1;
            }
            IniLine::Pair { .. } | IniLine::MissingKey if self.section.is_empty() => {
                debug!("dropping {text:?} outside a section in {}", self.path.display());
                self.report.dropped += 1;
            }
            IniLine::Pair { key, value } => {
                self.store
                    .insert(entry_id(&self.section, key), ScalarValue::new(value));
                self.report.entries += 1;
            }
            IniLine::MissingKey => {
                debug!("dropping {text:?} without a key in {}", self.path.display());
                self.report.dropped += 1;
            }
        }
    }
}
