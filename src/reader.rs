//! Stream Reader
//!
//! [`LogTail`] resumes a native log file at a saved byte offset and yields the complete, non-blank
//! lines appended since. Its offset only ever moves past a line that ended in `\n`: a final line
//! still being written is left for the next run. Opening never fails loudly; a file that cannot be
//! opened, or is now shorter than the saved offset, yields nothing and keeps the offset.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

pub struct LogTail {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    start: u64,
    offset: u64,
    buf: Vec<u8>,
}

impl LogTail {
    pub fn open(path: &Path, start: u64) -> Self {
        let reader = match Self::open_at(path, start) {
            Ok(reader) => reader,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "Cannot read log file, skipping");
                None
            }
        };
        Self {
            path: path.to_path_buf(),
            reader,
            start,
            offset: start,
            buf: Vec::new(),
        }
    }

    fn open_at(path: &Path, start: u64) -> io::Result<Option<BufReader<File>>> {
        let mut file = File::open(path)?;
        let len = file.metadata()?.len();
        if len < start {
            warn!(
                file = %path.display(),
                saved_offset = start,
                file_len = len,
                "Log file is shorter than the saved offset, leaving it alone"
            );
            return Ok(None);
        }
        file.seek(SeekFrom::Start(start))?;
        Ok(Some(BufReader::new(file)))
    }

    /// Byte position right after the last complete line consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn bytes_read(&self) -> u64 {
        self.offset - self.start
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain the tail, returning its lines and the offset to commit.
    pub fn read_to_end(mut self) -> (Vec<String>, u64) {
        let lines = self.by_ref().collect();
        (lines, self.offset)
    }
}

impl Iterator for LogTail {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let reader = self.reader.as_mut()?;
            self.buf.clear();
            match reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.reader = None;
                    return None;
                }
                Ok(_) if self.buf.last() != Some(&b'\n') => {
                    debug!(
                        file = %self.path.display(),
                        offset = self.offset,
                        partial_bytes = self.buf.len(),
                        "Stopping before partial trailing line"
                    );
                    self.reader = None;
                    return None;
                }
                Ok(bytes) => {
                    self.offset += bytes as u64;
                    let Ok(text) = std::str::from_utf8(&self.buf) else {
                        trace!(file = %self.path.display(), offset = self.offset, "Skipping non UTF-8 line");
                        continue;
                    };
                    let line = text.trim();
                    if line.is_empty() {
                        continue;
                    }
                    return Some(line.to_string());
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!(
                        file = %self.path.display(),
                        offset = self.offset,
                        error = %err,
                        "Read failed, keeping offset at last complete line"
                    );
                    self.reader = None;
                    return None;
                }
            }
        }
    }
}

impl FusedIterator for LogTail {}
