/*!
   Scoped lifecycle management of the node-under-test.
*/

use core::time::Duration;
use std::fs;
use std::net::{SocketAddr, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::Error;
use crate::node::config::{generate_config, ConfigBlob, ConfigOverrides};
use crate::types::config::{CheckPolicy, TestConfig};
use crate::types::env::{write_env, EnvWriter, ExportEnv};
use crate::types::log::TestLog;
use crate::types::log_sink::LogSink;
use crate::types::node_id::NodeId;
use crate::types::process::ProcessHandle;
use crate::util::file::{fresh_dir, open_append};
use crate::util::retry::{poll_until, PollOutcome, Probe};

/// File name of the generated config inside the node's work directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

const READINESS_POLL_INTERVAL: Duration = Duration::from_millis(100);

const READINESS_CONNECT_TIMEOUT: Duration = Duration::from_millis(200);

/// Upper bound for draining the output pipes after the node is stopped.
const LOG_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Grace period for the last output of a node that exited during a check.
const EXIT_DRAIN_TIMEOUT: Duration = Duration::from_millis(250);

/**
   Timing parameters of a [`NodeRunner`].
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRunnerOptions {
    pub check_policy: CheckPolicy,

    /**
       How long [`NodeRunner::start_with_options`] waits for the RPC port to
       accept connections. A zero duration skips the wait.
    */
    pub startup_timeout: Duration,
}

impl Default for NodeRunnerOptions {
    fn default() -> Self {
        let config = TestConfig::default();
        Self::from(&config)
    }
}

impl From<&TestConfig> for NodeRunnerOptions {
    fn from(config: &TestConfig) -> Self {
        Self {
            check_policy: config.check_policy(),
            startup_timeout: config.node_startup_timeout,
        }
    }
}

/**
   Owns one running node process for the duration of a scope.

   Constructing a `NodeRunner` spawns the node immediately and starts
   capturing its output. Dropping it kills the node and reaps it, which
   happens on every exit path of the enclosing test case, including a
   failed [`test_check!`](crate::test_check) and a panic. A node started
   by one test case can therefore never hold on to ports needed by the
   next one.

   The node is invoked as `<command_path> --config <work_dir>/config.json`
   with `<work_dir>` as its current directory. The work directory is
   `<log dir>/<role>`; it is wiped before the node starts and keeps the
   node's `stdout.log` and `stderr.log` after the test.
*/
pub struct NodeRunner {
    role: String,
    command_path: String,
    node_id: NodeId,
    work_dir: PathBuf,
    config_path: PathBuf,
    process: Mutex<ProcessHandle>,
    log_sink: LogSink,
    log: TestLog,
    check_policy: CheckPolicy,
}

impl NodeRunner {
    /**
       Generate the configuration for `current_node_id`. Pure and
       deterministic, see [`generate_config`].
    */
    pub fn generate_config(
        current_node_id: &NodeId,
        overrides: &ConfigOverrides,
    ) -> Result<ConfigBlob, Error> {
        generate_config(current_node_id, overrides)
    }

    /**
       Start a node with the default [`NodeRunnerOptions`].
    */
    pub fn start(
        command_path: &str,
        config: &ConfigBlob,
        role: &str,
        log: &TestLog,
    ) -> Result<Self, Error> {
        Self::start_with_options(command_path, config, role, log, NodeRunnerOptions::default())
    }

    pub fn start_with_options(
        command_path: &str,
        config: &ConfigBlob,
        role: &str,
        log: &TestLog,
        options: NodeRunnerOptions,
    ) -> Result<Self, Error> {
        let work_dir = fresh_dir(log.dir(), role)?;

        let config_path = work_dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, config.content())?;

        let config_arg = config_path.display().to_string();

        let mut process =
            ProcessHandle::spawn(command_path, &["--config", config_arg.as_str()], &work_dir)
                .map_err(|e| {
                    log.error(format_args!(
                        "failed to launch {role} from {command_path}: {e}"
                    ));
                    e
                })?;

        let log_sink = LogSink::new();

        if let Some(stdout) = process.take_stdout() {
            let mirror = open_append(work_dir.join("stdout.log"))?;
            log_sink.attach(stdout, &format!("{role}-stdout"), Some(mirror))?;
        }

        if let Some(stderr) = process.take_stderr() {
            let mirror = open_append(work_dir.join("stderr.log"))?;
            log_sink.attach(stderr, &format!("{role}-stderr"), Some(mirror))?;
        }

        log.info(format_args!(
            "started {} ({}) with pid {} in {}",
            role,
            config.node_id(),
            process.id(),
            work_dir.display()
        ));

        let runner = Self {
            role: role.to_string(),
            command_path: command_path.to_string(),
            node_id: *config.node_id(),
            work_dir,
            config_path,
            process: Mutex::new(process),
            log_sink,
            log: log.clone(),
            check_policy: options.check_policy,
        };

        write_env(log.dir().join(format!("{role}.env")), &runner)?;

        if !options.startup_timeout.is_zero() {
            runner.wait_until_ready(options.startup_timeout)?;
        }

        Ok(runner)
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn pid(&self) -> u32 {
        self.process().id()
    }

    /**
       The captured output of the node. Both standard output and standard
       error are appended to the same sink.
    */
    pub fn log_sink(&self) -> &LogSink {
        &self.log_sink
    }

    pub fn is_running(&self) -> Result<bool, Error> {
        self.process().is_running()
    }

    /**
       Poll the node log until `predicate` accepts a captured line.

       Every poll scans the whole log captured so far, so a line emitted
       before the call counts. Returns `false` once the timeout of the
       [`CheckPolicy`] elapses, or as soon as the node has exited and the
       output it left behind has been scanned without a match. Output that
       stays open after the exit, for example held by a forked child of the
       node, is drained for a short grace period only.

       A panicking predicate unwinds through this call, which the
       registry reports as a crash rather than a failed check.
    */
    pub fn check(&self, predicate: impl Fn(&str) -> bool) -> bool {
        self.check_with(self.check_policy, predicate)
    }

    pub fn check_with(&self, policy: CheckPolicy, predicate: impl Fn(&str) -> bool) -> bool {
        matches!(
            self.try_check_with(policy, |line| Ok(predicate(line))),
            Ok(true)
        )
    }

    /**
       Like [`check`](Self::check), for predicates that can fail. An error
       from the predicate stops the polling and is returned as is, distinct
       from `Ok(false)`.
    */
    pub fn try_check(
        &self,
        predicate: impl Fn(&str) -> Result<bool, Error>,
    ) -> Result<bool, Error> {
        self.try_check_with(self.check_policy, predicate)
    }

    pub fn try_check_with(
        &self,
        policy: CheckPolicy,
        predicate: impl Fn(&str) -> Result<bool, Error>,
    ) -> Result<bool, Error> {
        let outcome = poll_until(policy.timeout, policy.interval, || {
            // read the flags before the snapshot so that lines arriving
            // right before the streams close are still scanned
            let exited = !self.is_running()?;
            if exited {
                self.log_sink.wait_closed(EXIT_DRAIN_TIMEOUT);
            }

            let closed = exited || self.log_sink.is_closed();

            for line in self.log_sink.lines_snapshot() {
                if predicate(&line)? {
                    return Ok(Probe::Ready);
                }
            }

            if closed {
                Ok(Probe::GiveUp)
            } else {
                Ok(Probe::Pending)
            }
        })?;

        match outcome {
            PollOutcome::Satisfied => Ok(true),
            PollOutcome::TimedOut => {
                self.log.warn(format_args!(
                    "no line of {} matched within {:?} ({} lines captured)",
                    self.role,
                    policy.timeout,
                    self.log_sink.len()
                ));
                Ok(false)
            }
            PollOutcome::Exhausted => {
                self.log.warn(format_args!(
                    "{} stopped producing output before a matching line appeared ({} lines captured)",
                    self.role,
                    self.log_sink.len()
                ));
                Ok(false)
            }
        }
    }

    /**
       Stop the node before the end of the scope. Dropping the runner
       afterwards is a no-op for the process.
    */
    pub fn stop(&mut self) -> Result<(), Error> {
        self.process().terminate()?;

        if !self.log_sink.wait_closed(LOG_DRAIN_TIMEOUT) {
            self.log.warn(format_args!(
                "output of {} still open after the process was stopped",
                self.role
            ));
        }

        Ok(())
    }

    fn process(&self) -> MutexGuard<'_, ProcessHandle> {
        self.process.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_until_ready(&self, timeout: Duration) -> Result<(), Error> {
        let rpc_address = SocketAddr::from(([127, 0, 0, 1], self.node_id.rpc_port));
        let role = self.role.clone();

        let outcome = poll_until(timeout, READINESS_POLL_INTERVAL, || {
            if let Some(status) = self.process().try_status()? {
                return Err(Error::unexpected_exit(role.clone(), status.code()));
            }

            match TcpStream::connect_timeout(&rpc_address, READINESS_CONNECT_TIMEOUT) {
                Ok(_) => Ok(Probe::Ready),
                Err(_) => Ok(Probe::Pending),
            }
        });

        match outcome {
            Ok(PollOutcome::Satisfied) => {
                self.log
                    .debug(format_args!("{} accepts RPC connections on {}", role, rpc_address));
                Ok(())
            }
            Ok(_) => {
                self.log.warn(format_args!(
                    "{} did not accept RPC connections on {} within {:?}, continuing anyway",
                    role, rpc_address, timeout
                ));
                Ok(())
            }
            Err(e) => {
                self.log.error(format_args!("{role} failed to start: {e}"));
                Err(e)
            }
        }
    }
}

impl ExportEnv for NodeRunner {
    fn export_env(&self, writer: &mut impl EnvWriter) {
        writer.write_env("NODE_CMD", &self.command_path);
        writer.write_env("NODE_HOME", &self.work_dir.display().to_string());
        writer.write_env("NODE_CONFIG", &self.config_path.display().to_string());
        writer.write_env("NODE_SYNC_ADDR", &self.node_id.connect_sync_address());
        writer.write_env("NODE_RPC_ADDR", &self.node_id.connect_rpc_address());
    }
}

impl Drop for NodeRunner {
    fn drop(&mut self) {
        match self.stop() {
            Ok(()) => self.log.info(format_args!(
                "stopped {} ({} lines captured)",
                self.role,
                self.log_sink.len()
            )),
            Err(e) => self
                .log
                .error(format_args!("failed to stop {}: {}", self.role, e)),
        }
    }
}
