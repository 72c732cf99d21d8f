/*!
   Functions for initializing each test run: the global logger and error
   handlers, and the layered [`TestConfig`].
*/

use core::time::Duration;
use std::env;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{info, warn};
use tracing_subscriber::{
    self as ts,
    filter::{EnvFilter, LevelFilter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::Error;
use crate::types::config::TestConfig;
use crate::util::random::random_u32;

static INIT: Once = Once::new();

/**
   Initialize the test run with the config from the default sources, see
   [`load_config`].
*/
pub fn init_test() -> Result<TestConfig, Error> {
    init_test_with(load_config(None)?)
}

/**
   Install the global logger and error handlers, validate `config` and
   point its store directory to a fresh `<store_dir>/test-<random>`
   directory for this run.
*/
pub fn init_test_with(config: TestConfig) -> Result<TestConfig, Error> {
    init_logging();

    config.validate()?;

    let store_dir = config.store_dir.join(format!("test-{}", random_u32()));
    fs::create_dir_all(&store_dir)?;
    let store_dir = fs::canonicalize(store_dir)?;

    info!("storing test data in {}", store_dir.display());

    Ok(TestConfig {
        store_dir,
        ..config
    })
}

/**
   Install the logger and `color-eyre` once per process.

   Color is disabled when `NO_COLOR_LOG=1` is set or standard error is not
   a terminal.
*/
pub fn init_logging() {
    let no_color_log = env::var("NO_COLOR_LOG")
        .ok()
        .map(|val| val == "1")
        .unwrap_or(false);

    let with_color = !no_color_log && std::io::stderr().is_terminal();

    INIT.call_once(|| {
        install_logger(with_color);

        if with_color {
            if let Err(e) = color_eyre::install() {
                warn!("failed to install color-eyre: {}", e);
            }
        }
    });
}

/**
   Build the [`TestConfig`] from, in increasing priority: the defaults,
   the TOML file at `config_file` or else at `$TEST_CONFIG`, and the
   environment variables listed in [`apply_env_overrides`].
*/
pub fn load_config(config_file: Option<&Path>) -> Result<TestConfig, Error> {
    let config_file = config_file
        .map(Path::to_path_buf)
        .or_else(|| env::var_os("TEST_CONFIG").map(PathBuf::from));

    let config = match config_file {
        Some(path) => TestConfig::load_file(path)?,
        None => TestConfig::default(),
    };

    apply_env_overrides(config, |key| env::var(key).ok())
}

/**
   Override `config` with the variables found by `lookup`:

   - `NODE_COMMAND_PATH`
   - `CLIENT_COMMAND_PATH`
   - `TEST_STORE_DIR`
   - `CHECK_TIMEOUT` and `CHECK_INTERVAL`, in [`humantime`] format such
     as `10s` or `250ms`
*/
pub fn apply_env_overrides(
    mut config: TestConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<TestConfig, Error> {
    if let Some(path) = lookup("NODE_COMMAND_PATH") {
        config.node_command_path = path;
    }

    if let Some(path) = lookup("CLIENT_COMMAND_PATH") {
        config.client_command_path = path;
    }

    if let Some(dir) = lookup("TEST_STORE_DIR") {
        config.store_dir = PathBuf::from(dir);
    }

    if let Some(timeout) = lookup("CHECK_TIMEOUT") {
        config.check_timeout = parse_duration_var("CHECK_TIMEOUT", &timeout)?;
    }

    if let Some(interval) = lookup("CHECK_INTERVAL") {
        config.check_interval = parse_duration_var("CHECK_INTERVAL", &interval)?;
    }

    Ok(config)
}

fn parse_duration_var(key: &str, value: &str) -> Result<Duration, Error> {
    humantime::parse_duration(value)
        .map_err(|e| Error::config(format!("invalid duration in {key}={value:?}: {e}")))
}

/**
   Install the [`tracing_subscriber`] logger handlers so that logs will
   be displayed during test.
*/
pub fn install_logger(with_color: bool) {
    // Use log level INFO by default if RUST_LOG is not set.
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let layer = ts::fmt::layer().with_ansi(with_color);

    // a subscriber installed by the embedding program takes precedence
    let _ = ts::registry().with(env_filter).with(layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        move |key| vars.get(key).cloned()
    }

    #[test]
    fn env_overrides_take_precedence() {
        let config = apply_env_overrides(
            TestConfig::default(),
            lookup(&[
                ("NODE_COMMAND_PATH", "./build/node"),
                ("CHECK_TIMEOUT", "2s"),
                ("CHECK_INTERVAL", "50ms"),
            ]),
        )
        .unwrap();

        assert_eq!(config.node_command_path, "./build/node");
        assert_eq!(config.client_command_path, TestConfig::default().client_command_path);
        assert_eq!(config.check_timeout, Duration::from_secs(2));
        assert_eq!(config.check_interval, Duration::from_millis(50));
    }

    #[test]
    fn malformed_duration_is_a_config_error() {
        let err = apply_env_overrides(TestConfig::default(), lookup(&[("CHECK_TIMEOUT", "soon")]))
            .unwrap_err();

        assert!(err.to_string().contains("CHECK_TIMEOUT"));
    }

    #[test]
    fn run_directory_is_created_under_store_dir() {
        let dir = tempfile::tempdir().unwrap();

        let config = init_test_with(TestConfig {
            store_dir: dir.path().to_path_buf(),
            ..TestConfig::default()
        })
        .unwrap();

        assert!(config.store_dir.is_dir());
        assert!(config.store_dir.is_absolute());
        assert!(config
            .store_dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("test-"));
    }
}
