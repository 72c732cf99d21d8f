/*!
   Definition for the test configuration.
*/

use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{handle_generic_error, Error};

pub mod default {
    use super::*;

    pub fn node_command_path() -> String {
        "node".to_string()
    }

    pub fn client_command_path() -> String {
        "client".to_string()
    }

    pub fn store_dir() -> PathBuf {
        PathBuf::from("data")
    }

    pub fn check_timeout() -> Duration {
        Duration::from_secs(10)
    }

    pub fn check_interval() -> Duration {
        Duration::from_millis(100)
    }

    pub fn node_startup_timeout() -> Duration {
        Duration::from_secs(10)
    }

    pub fn client_timeout() -> Duration {
        Duration::from_secs(30)
    }
}

/**
   The test config to be passed to each test case.

   Values are layered: [`Default`], then an optional TOML file, then
   environment variables, then command line arguments. See
   [`init_test`](crate::bootstrap::init::init_test).
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestConfig {
    /**
       The filesystem path to the node executable under test.
    */
    pub node_command_path: String,

    /**
       The filesystem path to the RPC client executable.
    */
    pub client_command_path: String,

    /**
       The directory where the test data, logs and generated node configs
       are stored.

       [`init_test`](crate::bootstrap::init::init_test) creates a fresh
       `test-<random>` sub-directory for every run, and the registry creates
       one more level per test case.
    */
    pub store_dir: PathBuf,

    /**
       How long [`NodeRunner::check`](crate::node::runner::NodeRunner::check)
       keeps polling the node log before giving up.
    */
    #[serde(with = "humantime_serde")]
    pub check_timeout: Duration,

    /**
       Delay between two scans of the node log.
    */
    #[serde(with = "humantime_serde")]
    pub check_interval: Duration,

    /**
       How long to wait for a freshly spawned node to accept RPC connections.
    */
    #[serde(with = "humantime_serde")]
    pub node_startup_timeout: Duration,

    /**
       Upper bound for client invocations that have no explicit wait.
    */
    #[serde(with = "humantime_serde")]
    pub client_timeout: Duration,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            node_command_path: default::node_command_path(),
            client_command_path: default::client_command_path(),
            store_dir: default::store_dir(),
            check_timeout: default::check_timeout(),
            check_interval: default::check_interval(),
            node_startup_timeout: default::node_startup_timeout(),
            client_timeout: default::client_timeout(),
        }
    }
}

/**
   Bounded retry policy for polling the node log.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for CheckPolicy {
    fn default() -> Self {
        Self {
            timeout: default::check_timeout(),
            interval: default::check_interval(),
        }
    }
}

impl TestConfig {
    /**
       Parse a [`TestConfig`] from a TOML file. Missing fields keep their
       default values.
    */
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(handle_generic_error)
    }

    pub fn check_policy(&self) -> CheckPolicy {
        CheckPolicy {
            timeout: self.check_timeout,
            interval: self.check_interval,
        }
    }

    /**
       Derive the config for a single test case, with the store directory
       pointing to a freshly created sub-directory named after the case.
    */
    pub fn for_case(&self, case_name: &str) -> Result<Self, Error> {
        let store_dir = self.store_dir.join(case_name);
        fs::create_dir_all(&store_dir)?;

        Ok(Self {
            store_dir,
            ..self.clone()
        })
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.check_interval.is_zero() {
            return Err(Error::config("check_interval must be non-zero".to_string()));
        }

        if self.check_interval > self.check_timeout {
            return Err(Error::config(format!(
                "check_interval ({:?}) must not exceed check_timeout ({:?})",
                self.check_interval, self.check_timeout
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_fields_override_defaults() {
        let config = TestConfig::from_toml_str(
            r#"
            node_command_path = "./build/node"
            check_timeout = "30s"
            check_interval = "250ms"
            "#,
        )
        .unwrap();

        assert_eq!(config.node_command_path, "./build/node");
        assert_eq!(config.client_command_path, "client");
        assert_eq!(config.check_timeout, Duration::from_secs(30));
        assert_eq!(config.check_interval, Duration::from_millis(250));
        assert_eq!(config.client_timeout, default::client_timeout());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(TestConfig::from_toml_str("node_path = \"x\"").is_err());
    }

    #[test]
    fn interval_longer_than_timeout_is_invalid() {
        let config = TestConfig {
            check_timeout: Duration::from_millis(100),
            check_interval: Duration::from_secs(1),
            ..TestConfig::default()
        };

        assert!(config.validate().is_err());
        assert!(TestConfig::default().validate().is_ok());
    }
}
