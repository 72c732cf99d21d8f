/*!
   Wrapper around a spawned external process.
*/

use core::time::Duration;
use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::sleep;
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::{handle_exec_error, Error};

/**
   How often [`ProcessHandle::wait_or_kill`] polls for the child to exit.
*/
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/**
   How a waited-on process came to an end.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
    /// The process exited on its own.
    Exited(ExitStatus),

    /// The process outlived its deadline and was killed by the harness.
    Killed,
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        match self {
            ProcessExit::Exited(status) => status.success(),
            ProcessExit::Killed => false,
        }
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ProcessExit::Exited(status) => status.code(),
            ProcessExit::Killed => None,
        }
    }
}

/**
   Owns one spawned child process together with its piped standard output
   and standard error.

   The process is killed and reaped when the handle is dropped, so an
   early return through `?` never leaks a running process.
*/
#[derive(Debug)]
pub struct ProcessHandle {
    command: String,
    child: Child,
    status: Option<ExitStatus>,
}

impl ProcessHandle {
    /**
       Spawn `command_path` with the given arguments inside `working_dir`.

       Standard output and standard error are piped and can be taken with
       [`take_stdout`](Self::take_stdout) and [`take_stderr`](Self::take_stderr).
       Standard input is closed.
    */
    pub fn spawn<S: AsRef<OsStr>>(
        command_path: &str,
        args: &[S],
        working_dir: &Path,
    ) -> Result<Self, Error> {
        let program = resolve_command_path(command_path);

        debug!(
            "spawning {} in {} with arguments {:?}",
            program.display(),
            working_dir.display(),
            args.iter().map(|a| a.as_ref()).collect::<Vec<_>>(),
        );

        let child = Command::new(&program)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(handle_exec_error(command_path))?;

        Ok(Self {
            command: command_path.to_string(),
            child,
            status: None,
        })
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// OS process id of the child.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /**
       Returns the exit status if the process has already exited, without
       blocking. The status is cached once observed.
    */
    pub fn try_status(&mut self) -> Result<Option<ExitStatus>, Error> {
        if self.status.is_none() {
            self.status = self.child.try_wait()?;
        }

        Ok(self.status)
    }

    pub fn is_running(&mut self) -> Result<bool, Error> {
        Ok(self.try_status()?.is_none())
    }

    /**
       Block until the process exits or `timeout` elapses. On timeout the
       process is killed and [`ProcessExit::Killed`] is returned.
    */
    pub fn wait_or_kill(&mut self, timeout: Duration) -> Result<ProcessExit, Error> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(status) = self.try_status()? {
                return Ok(ProcessExit::Exited(status));
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }

            sleep(WAIT_POLL_INTERVAL.min(deadline - now));
        }

        warn!(
            "process {} (pid {}) did not exit within {:?}, killing it",
            self.command,
            self.id(),
            timeout
        );

        self.terminate()?;

        Ok(ProcessExit::Killed)
    }

    /**
       Kill the process and reap it. Calling this on a process that has
       already exited or was already terminated is a no-op.
    */
    pub fn terminate(&mut self) -> Result<(), Error> {
        if self.try_status()?.is_some() {
            return Ok(());
        }

        match self.child.kill() {
            Ok(()) => {}
            // the child exited between `try_wait` and `kill`
            Err(e) if e.kind() == IoErrorKind::InvalidInput => {}
            Err(e) => return Err(e.into()),
        }

        let status = self.child.wait()?;
        self.status = Some(status);

        debug!(
            "terminated process {} (pid {}) with status {:?}",
            self.command,
            self.id(),
            status
        );

        Ok(())
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if let Err(e) = self.terminate() {
            warn!("failed to terminate process {}: {}", self.command, e);
        }
    }
}

/**
   Relative paths such as `./build/node` are resolved against the current
   directory of the harness, not the working directory of the child.
*/
fn resolve_command_path(command_path: &str) -> PathBuf {
    let path = Path::new(command_path);

    if path.components().count() > 1 && path.is_relative() {
        if let Ok(absolute) = fs::canonicalize(path) {
            return absolute;
        }
    }

    path.to_path_buf()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn sh(script: &str) -> ProcessHandle {
        ProcessHandle::spawn("sh", &["-c", script], &temp_dir()).unwrap()
    }

    #[test]
    fn missing_executable_is_a_launch_error() {
        let err = ProcessHandle::spawn::<&str>("./does/not/exist", &[], &temp_dir()).unwrap_err();
        assert!(err.is_launch_failure());
    }

    #[test]
    fn natural_exit_is_reported() {
        let mut process = sh("exit 3");
        let exit = process.wait_or_kill(Duration::from_secs(5)).unwrap();

        assert_eq!(exit.code(), Some(3));
        assert!(!exit.success());
    }

    #[test]
    fn slow_process_is_killed_after_timeout() {
        let mut process = sh("sleep 30");
        let exit = process.wait_or_kill(Duration::from_millis(100)).unwrap();

        assert_eq!(exit, ProcessExit::Killed);
        assert!(!process.is_running().unwrap());
    }

    #[test]
    fn terminate_is_idempotent() {
        let mut process = sh("sleep 30");

        process.terminate().unwrap();
        process.terminate().unwrap();
        assert!(!process.is_running().unwrap());

        let mut exited = sh("true");
        exited.wait_or_kill(Duration::from_secs(5)).unwrap();
        exited.terminate().unwrap();
    }
}
