//! Entry point of the ledger integration test runner.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

use ledger_integration_test::tests::register_all;
use ledger_test_framework::bootstrap::init::init_logging;
use ledger_test_framework::prelude::*;

/// Exit code used when the run could not be set up at all.
const SETUP_FAILURE: i32 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "ledger-integration-test",
    about = "Run the end-to-end test cases against a node and RPC client executable"
)]
pub struct RunnerArgs {
    /// TOML file with the test configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only run the test cases whose name contains this string
    #[arg(long, value_name = "SUBSTRING")]
    filter: Option<String>,

    /// Print the names of the registered test cases and exit
    #[arg(long)]
    list: bool,

    /// Path to the node executable
    #[arg(value_name = "NODE_EXEC")]
    node_exec: Option<String>,

    /// Path to the RPC client executable
    #[arg(value_name = "CLIENT_EXEC")]
    client_exec: Option<String>,
}

fn main() {
    let args = RunnerArgs::parse();

    init_logging();

    match run(args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("failed to run the test cases: {}", e);
            process::exit(SETUP_FAILURE)
        }
    }
}

fn run(args: RunnerArgs) -> Result<i32, Error> {
    let mut registry = TestRegistry::new();
    register_all(&mut registry)?;

    if args.list {
        for name in registry.names() {
            println!("{name}");
        }

        return Ok(0);
    }

    let mut config = load_config(args.config.as_deref())?;

    if let Some(node_exec) = args.node_exec {
        config.node_command_path = node_exec;
    }

    if let Some(client_exec) = args.client_exec {
        config.client_command_path = client_exec;
    }

    let config = init_test_with(config)?;

    info!("starting test run with test config: {:?}", config);

    let report = registry.run(&config, args.filter.as_deref());

    println!("{}", report.summary());

    Ok(report.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        RunnerArgs::command().debug_assert();
    }

    #[test]
    fn positional_executables_and_flags() {
        let args = RunnerArgs::try_parse_from([
            "ledger-integration-test",
            "--filter",
            "failed",
            "./build/node",
            "./build/client",
        ])
        .unwrap();

        assert_eq!(args.filter.as_deref(), Some("failed"));
        assert_eq!(args.node_exec.as_deref(), Some("./build/node"));
        assert_eq!(args.client_exec.as_deref(), Some("./build/client"));
        assert!(!args.list);
        assert!(args.config.is_none());
    }

    #[test]
    fn executables_are_optional() {
        let args = RunnerArgs::try_parse_from(["ledger-integration-test", "--list"]).unwrap();

        assert!(args.list);
        assert!(args.node_exec.is_none());
    }
}
