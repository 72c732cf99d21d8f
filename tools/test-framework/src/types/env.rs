/*!
   Types for exporting test setup information into environment variables.
*/

use itertools::Itertools;
use std::collections::BTreeMap;
use std::fs::write;
use std::path::Path;

use crate::error::Error;

/**
    This trait is implemented by data types that can export the contained
    information as environment variables.

    The harness writes them as `.env` files next to the node data, which
    users can `source` in a terminal to poke at a node that a test left
    behind in its logs.
*/
pub trait ExportEnv {
    /**
       Export the environment variables using the given [`EnvWriter`].
    */
    fn export_env(&self, writer: &mut impl EnvWriter);
}

/**
   The exported environment variables are stored in a data type that
   implements this trait.
*/
pub trait EnvWriter {
    /**
       Write an environment variable with the given key and value.

       Note that overlapping keys will be overridden with the new value.
    */
    fn write_env(&mut self, key: &str, value: &str);
}

impl EnvWriter for BTreeMap<String, String> {
    fn write_env(&mut self, key: &str, value: &str) {
        self.insert(key.to_string(), value.to_string());
    }
}

/**
   Retrieve the environment variables exported by a type implementing
   `ExportEnv` as `KEY=VALUE` lines, sorted by key.
*/
pub fn format_env(exporter: &impl ExportEnv) -> String {
    let mut envs = BTreeMap::new();
    exporter.export_env(&mut envs);

    envs.iter()
        .map(|(key, value)| format!("{key}={value}"))
        .join("\n")
}

/**
   Save the environment variables exported by `exporter` as a `.env` file.
*/
pub fn write_env(path: impl AsRef<Path>, exporter: &impl ExportEnv) -> Result<(), Error> {
    write(path, format_env(exporter))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ports;

    impl ExportEnv for Ports {
        fn export_env(&self, writer: &mut impl EnvWriter) {
            writer.write_env("SYNC_ADDR", "127.0.0.1:20206");
            writer.write_env("RPC_ADDR", "127.0.0.1:50056");
            writer.write_env("RPC_ADDR", "127.0.0.1:50057");
        }
    }

    #[test]
    fn env_lines_are_sorted_and_deduplicated() {
        assert_eq!(
            format_env(&Ports),
            "RPC_ADDR=127.0.0.1:50057\nSYNC_ADDR=127.0.0.1:20206"
        );
    }
}
