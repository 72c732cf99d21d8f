/*!
   Named per-test log files.
*/

use core::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/**
   A named log for one test case.

   Messages are appended to `<dir>/<name>.log` with the time elapsed since
   the log was opened, and forwarded to [`tracing`] so they also appear on
   the console. The directory doubles as the parent of the work
   directories of the nodes and clients started by the test.

   Cloning yields another handle to the same file.
*/
#[derive(Clone)]
pub struct TestLog {
    inner: Arc<LogInner>,
}

struct LogInner {
    name: String,
    dir: PathBuf,
    path: PathBuf,
    started: Instant,
    file: Mutex<File>,
}

impl TestLog {
    pub fn create(dir: impl AsRef<Path>, name: &str) -> Result<Self, Error> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{name}.log"));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        debug!("writing test log {} to {}", name, path.display());

        Ok(Self {
            inner: Arc::new(LogInner {
                name: name.to_string(),
                dir,
                path,
                started: Instant::now(),
                file: Mutex::new(file),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn debug(&self, message: impl Display) {
        self.write(LogLevel::Debug, message)
    }

    pub fn info(&self, message: impl Display) {
        self.write(LogLevel::Info, message)
    }

    pub fn warn(&self, message: impl Display) {
        self.write(LogLevel::Warn, message)
    }

    pub fn error(&self, message: impl Display) {
        self.write(LogLevel::Error, message)
    }

    pub fn write(&self, level: LogLevel, message: impl Display) {
        let name = self.name();

        match level {
            LogLevel::Debug => debug!(log = name, "{}", message),
            LogLevel::Info => info!(log = name, "{}", message),
            LogLevel::Warn => warn!(log = name, "{}", message),
            LogLevel::Error => error!(log = name, "{}", message),
        }

        let elapsed = self.inner.started.elapsed().as_secs_f64();
        let mut file = self
            .inner
            .file
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Err(e) = writeln!(file, "[{:>10.4}s] {:<5} {}", elapsed, level.as_str(), message) {
            warn!("failed to write to test log {}: {}", name, e);
        }
    }
}
