/*!
   Append-only capture buffer for the output of a running process.
*/

use core::time::Duration;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;
use std::time::Instant;
use tracing::{trace, warn};

use crate::error::Error;

/**
   A thread-safe, append-only sequence of log lines.

   Each attached stream is drained by its own background thread, which
   appends every line as soon as it is read. The buffer is unbounded, so
   a slow reader never causes lines to be dropped or the producing process
   to block on a full pipe.

   Readers take snapshots: the internal lock is only held while the line
   pointers are copied out, never while a caller scans them.

   Cloning a `LogSink` yields another handle to the same buffer.
*/
#[derive(Clone, Default)]
pub struct LogSink {
    inner: Arc<SinkState>,
}

#[derive(Default)]
struct SinkState {
    lines: RwLock<Vec<Arc<str>>>,
    open_streams: AtomicUsize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /**
       Start capturing `source` line by line on a background thread.

       If `mirror` is given, every captured line is also appended to that
       file, which keeps a full copy of the output on disk after the test.
    */
    pub fn attach(
        &self,
        source: impl io::Read + Send + 'static,
        label: &str,
        mirror: Option<File>,
    ) -> Result<(), Error> {
        self.inner.open_streams.fetch_add(1, Ordering::SeqCst);

        let state = self.inner.clone();
        let label = label.to_string();

        let spawned = thread::Builder::new()
            .name(format!("log-sink-{label}"))
            .spawn(move || {
                capture_lines(&state, source, &label, mirror);
                state.open_streams.fetch_sub(1, Ordering::SeqCst);
            });

        if let Err(e) = spawned {
            self.inner.open_streams.fetch_sub(1, Ordering::SeqCst);
            return Err(e.into());
        }

        Ok(())
    }

    /**
       All lines captured so far, in arrival order.
    */
    pub fn lines_snapshot(&self) -> Vec<Arc<str>> {
        self.inner.read_lines().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read_lines().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /**
       Returns `true` when every attached stream has reached end-of-file,
       i.e. no more lines can arrive. A sink with no attached stream is
       closed.
    */
    pub fn is_closed(&self) -> bool {
        self.inner.open_streams.load(Ordering::SeqCst) == 0
    }

    /**
       Wait up to `timeout` for the sink to become closed. Returns whether
       it did.
    */
    pub fn wait_closed(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        while !self.is_closed() {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }

        true
    }
}

impl SinkState {
    fn push(&self, line: Arc<str>) {
        self.lines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }

    fn read_lines(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<str>>> {
        self.lines.read().unwrap_or_else(PoisonError::into_inner)
    }
}

fn capture_lines(
    state: &SinkState,
    source: impl io::Read,
    label: &str,
    mut mirror: Option<File>,
) {
    let mut reader = BufReader::new(source);
    let mut buf = Vec::new();

    loop {
        buf.clear();

        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if let Some(file) = mirror.as_mut() {
                    if let Err(e) = file.write_all(&buf) {
                        warn!("[{}] stop mirroring output to file: {}", label, e);
                        mirror = None;
                    }
                }

                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);

                trace!("[{}] {}", label, line);

                state.push(Arc::from(line));
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("[{}] error reading process output: {}", label, e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn captures_all_lines_in_order() {
        let sink = LogSink::new();
        sink.attach(Cursor::new("first\nsecond\r\nthird"), "test", None)
            .unwrap();

        assert!(sink.wait_closed(Duration::from_secs(5)));

        let lines = sink.lines_snapshot();
        let lines: Vec<&str> = lines.iter().map(|l| l.as_ref()).collect();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn sink_without_streams_is_closed() {
        let sink = LogSink::new();
        assert!(sink.is_closed());
        assert!(sink.is_empty());
    }

    #[test]
    fn lines_are_mirrored_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.log");
        let file = File::create(&path).unwrap();

        let sink = LogSink::new();
        sink.attach(Cursor::new("one\ntwo\n"), "mirror", Some(file))
            .unwrap();
        assert!(sink.wait_closed(Duration::from_secs(5)));

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "one\ntwo\n");
    }
}
