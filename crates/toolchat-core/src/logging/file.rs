//! Append-only file logger with size-based rotation

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::traits::{LogLevel, Logger};

/// Default rotation threshold (10 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

struct FileState {
    file: File,
    written: u64,
}

/// Logger writing timestamped lines to a file.
///
/// When the file grows past `max_bytes` it is renamed to `<name>.1`
/// (replacing any previous rotation) and a fresh file is started.
pub struct FileLogger {
    path: PathBuf,
    min_level: LogLevel,
    max_bytes: u64,
    state: Mutex<FileState>,
}

impl FileLogger {
    /// Open (or create) the log file, creating parent directories as needed
    pub fn open(path: impl Into<PathBuf>, min_level: LogLevel) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = open_append(&path)?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            path,
            min_level,
            max_bytes: DEFAULT_MAX_BYTES,
            state: Mutex::new(FileState { file, written }),
        })
    }

    /// Override the rotation threshold
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rotated_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".1");
        self.path.with_file_name(name)
    }

    fn rotate(&self, state: &mut FileState) -> io::Result<()> {
        state.file.flush()?;
        fs::rename(&self.path, self.rotated_path())?;
        state.file = open_append(&self.path)?;
        state.written = 0;
        Ok(())
    }

    fn write(&self, level: LogLevel, message: &str) {
        if level < self.min_level {
            return;
        }
        let line = format!("[{}] [{}] {}\n", timestamp(), level, message);

        let mut state = self.state.lock();
        if state.written + line.len() as u64 > self.max_bytes && state.written > 0 {
            // A failed rotation keeps appending to the current file
            let _ = self.rotate(&mut state);
        }
        if state.file.write_all(line.as_bytes()).is_ok() {
            state.written += line.len() as u64;
            let _ = state.file.flush();
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// UTC date and time, RFC 3339 with milliseconds
fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

impl Logger for FileLogger {
    fn debug(&self, message: &str) {
        self.write(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.write(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.write(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.write(LogLevel::Error, message);
    }
}

impl std::fmt::Debug for FileLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLogger")
            .field("path", &self.path)
            .field("min_level", &self.min_level)
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}
