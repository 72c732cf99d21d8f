/*!
   Driver for the RPC client executable.

   Every operation spawns a fresh client process, waits for it to finish
   and turns its exit status into a boolean. A client that fails, or that
   has to be killed after its timeout, yields `Ok(false)` so that test
   cases can assert on expected failures. Only a client that cannot be
   launched at all is an `Err`.
*/

pub mod command;
pub mod output;

use core::time::Duration;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::types::address::Address;
use crate::types::config::TestConfig;
use crate::types::log::TestLog;
use crate::types::log_sink::LogSink;
use crate::types::node_id::NodeId;
use crate::types::process::{ProcessExit, ProcessHandle};
use crate::util::file::{fresh_dir, open_append};

pub use command::ClientCommand;
pub use output::{parse_balance, ClientOutput};

const LOG_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

pub struct Client {
    command_path: String,
    role: String,
    work_dir: PathBuf,
    timeout: Duration,
    log: TestLog,
}

impl Client {
    /**
       Create a client driver. The client runs inside `<log dir>/<role>`,
       where its output accumulates in `stdout.log` and `stderr.log`.
    */
    pub fn new(command_path: &str, role: &str, log: &TestLog) -> Result<Self, Error> {
        let work_dir = fresh_dir(log.dir(), role)?;

        Ok(Self {
            command_path: command_path.to_string(),
            role: role.to_string(),
            work_dir,
            timeout: TestConfig::default().client_timeout,
            log: log.clone(),
        })
    }

    /**
       Upper bound for operations without their own wait window.
    */
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command_path(&self) -> &str {
        &self.command_path
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /**
       Run the liveness operation against `host`.
    */
    pub fn run_check_test(&self, host: &NodeId) -> Result<bool, Error> {
        let output = self.run(&ClientCommand::Test { host: *host })?;

        Ok(output.success())
    }

    /**
       Query the balance of `address` and compare it with `target_balance`.

       This is an exact comparison: a balance above the target is as much a
       mismatch as one below it. Output without a recognizable balance
       counts as a mismatch.
    */
    pub fn run_check_balance(
        &self,
        address: &Address,
        host: &NodeId,
        target_balance: u64,
    ) -> Result<bool, Error> {
        let output = self.run(&ClientCommand::GetBalance {
            host: *host,
            address: address.clone(),
        })?;

        if !output.success() {
            return Ok(false);
        }

        match output.balance() {
            Some(balance) => {
                self.log.info(format_args!(
                    "balance of {address}: {balance}, expected {target_balance}"
                ));

                Ok(balance == target_balance)
            }
            None => {
                self.log.warn(format_args!(
                    "no balance found in the output of {} for {}",
                    self.role, address
                ));

                Ok(false)
            }
        }
    }

    /**
       Submit a transfer of `amount` from `from` to `to` and wait at most
       `wait` for the client to confirm it. The window is also passed to the
       client, see [`ClientCommand::Transfer`].
    */
    pub fn run_check_transfer(
        &self,
        from: &Address,
        to: &Address,
        host: &NodeId,
        amount: u64,
        wait: Duration,
    ) -> Result<bool, Error> {
        let command = ClientCommand::Transfer {
            host: *host,
            from: from.clone(),
            to: to.clone(),
            amount,
            wait,
        };

        let output = self.run_with_timeout(&command, wait)?;

        Ok(output.success())
    }

    pub fn run(&self, command: &ClientCommand) -> Result<ClientOutput, Error> {
        self.run_with_timeout(command, self.timeout)
    }

    /**
       Run `command` to completion, killing the client once `timeout`
       elapses.
    */
    pub fn run_with_timeout(
        &self,
        command: &ClientCommand,
        timeout: Duration,
    ) -> Result<ClientOutput, Error> {
        self.log
            .debug(format_args!("{} {} {}", self.role, self.command_path, command));

        let args = command.to_args();

        let mut process = ProcessHandle::spawn(&self.command_path, args.as_slice(), &self.work_dir)
            .map_err(|e| {
                self.log.error(format_args!(
                    "failed to launch {} from {}: {}",
                    self.role, self.command_path, e
                ));
                e
            })?;

        let stdout_sink = LogSink::new();
        let stderr_sink = LogSink::new();

        if let Some(stdout) = process.take_stdout() {
            let mirror = open_append(self.work_dir.join("stdout.log"))?;
            stdout_sink.attach(stdout, &format!("{}-stdout", self.role), Some(mirror))?;
        }

        if let Some(stderr) = process.take_stderr() {
            let mirror = open_append(self.work_dir.join("stderr.log"))?;
            stderr_sink.attach(stderr, &format!("{}-stderr", self.role), Some(mirror))?;
        }

        let exit = process.wait_or_kill(timeout)?;

        stdout_sink.wait_closed(LOG_DRAIN_TIMEOUT);
        stderr_sink.wait_closed(LOG_DRAIN_TIMEOUT);

        let output = ClientOutput {
            exit,
            lines: stdout_sink.lines_snapshot(),
            stderr: stderr_sink.lines_snapshot(),
        };

        match exit {
            ProcessExit::Exited(status) if status.success() => {
                self.log
                    .info(format_args!("{} {} succeeded", self.role, command.name()));
            }
            ProcessExit::Exited(status) => {
                self.log.warn(format_args!(
                    "{} {} failed with status code {:?}: {}",
                    self.role,
                    command.name(),
                    status.code(),
                    itertools::join(&output.stderr, " | ")
                ));
            }
            ProcessExit::Killed => {
                self.log.warn(format_args!(
                    "{} {} did not finish within {:?} and was killed",
                    self.role,
                    command.name(),
                    timeout
                ));
            }
        }

        Ok(output)
    }
}
