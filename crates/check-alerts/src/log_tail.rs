//! Bounded reads of the run log.
//!
//! The gate only ever looks at the most recent record of the log, so there
//! is no point reading the whole file: [`read_tail`] reads the final
//! [`TAIL_WINDOW_BYTES`] and [`LogTail::last_line`] picks the last non-empty
//! line out of that window.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

/// Size of the window read from the end of the log.
pub const TAIL_WINDOW_BYTES: u64 = 1024;

/// The final window of the log, decoded as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogTail {
    text: String,
}

impl LogTail {
    /// An empty tail, as for a missing or unreadable log.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a tail from a window of raw bytes.
    ///
    /// When `truncated` is set the window starts somewhere inside a record.
    /// That leading fragment is dropped only if a complete line follows it;
    /// a final record longer than the window is kept as its own tail.
    /// Invalid UTF-8 (a multi-byte character cut by the window) is replaced,
    /// not rejected.
    #[must_use]
    pub fn from_window(bytes: &[u8], truncated: bool) -> Self {
        let mut text = String::from_utf8_lossy(bytes).into_owned();
        if truncated {
            let fragment_end = text
                .find('\n')
                .filter(|&pos| !text[pos + 1..].trim().is_empty());
            if let Some(pos) = fragment_end {
                text.drain(..=pos);
            }
        }
        Self { text }
    }

    /// Builds a tail from complete log text.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the raw text of the window.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true if the window holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the most recent non-empty line.
    #[must_use]
    pub fn last_line(&self) -> Option<&str> {
        last_line(&self.text)
    }
}

/// Returns the last non-empty line of `text`.
///
/// Lines are separated by `\n`; a trailing `\r` is not part of the line.
#[must_use]
pub fn last_line(text: &str) -> Option<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .rev()
        .find(|line| !line.trim().is_empty())
}

/// Reads the final `window` bytes of the file at `path`.
///
/// # Errors
///
/// Returns the I/O error if the file cannot be opened or read.
pub fn read_tail(path: &Path, window: u64) -> io::Result<LogTail> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    let start = len.saturating_sub(window);
    file.seek(SeekFrom::Start(start))?;

    let mut buf = Vec::with_capacity(usize::try_from(len - start).unwrap_or(0));
    file.read_to_end(&mut buf)?;
    Ok(LogTail::from_window(&buf, start > 0))
}

/// The append-only run log.
///
/// Opening the store snapshots the tail first, so the tail reflects the
/// previous runs only, then opens the file for appending.
#[derive(Debug, Clone)]
pub struct LogStore {
    path: PathBuf,
    file: Arc<File>,
    tail: LogTail,
}

impl LogStore {
    /// Snapshots the tail of `path` and opens it for appending.
    ///
    /// A log that does not exist yet, or cannot be read, yields an empty
    /// tail.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be created or opened for
    /// appending.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let tail = match read_tail(&path, TAIL_WINDOW_BYTES) {
            Ok(tail) => tail,
            Err(e) if e.kind() == io::ErrorKind::NotFound => LogTail::empty(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read log tail");
                LogTail::empty()
            }
        };
        debug!(path = %path.display(), bytes = tail.as_str().len(), "log tail loaded");

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Arc::new(file),
            tail,
        })
    }

    /// Returns the log path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the tail captured when the store was opened.
    #[must_use]
    pub const fn tail(&self) -> &LogTail {
        &self.tail
    }

    /// Returns a shared handle for appending records.
    #[must_use]
    pub fn writer(&self) -> Arc<File> {
        Arc::clone(&self.file)
    }
}
