#![doc = include_str!("../README.md")]

//!
//! ## Overview
//!
//! This framework drives a ledger node executable and its RPC client
//! executable from Rust test cases. A test case starts a node inside a
//! scope, talks to it through one-shot client invocations, and inspects
//! the node's log output with predicates. The node is torn down when the
//! scope ends, whatever the outcome of the case.
//!
//! ## Example Test
//!
//! ```rust,no_run
//! use ledger_test_framework::prelude::*;
//!
//! fn test_ping(config: &TestConfig) -> Result<(), Error> {
//!     let log = TestLog::create(&config.store_dir, "test_ping_log")?;
//!     let node_id = NodeId::new(20206, 50056);
//!
//!     let node = bootstrap_single_node(
//!         config,
//!         &log,
//!         "node",
//!         node_id,
//!         &ConfigOverrides::default(),
//!     )?;
//!
//!     let client = Client::new(&config.client_command_path, "client", &log)?;
//!
//!     test_check!(client.run_check_test(&node_id)?);
//!     test_check!(node.check(|line| line.contains("Node received in {test}")));
//!
//!     Ok(())
//! }
//!
//! fn main() -> Result<(), Error> {
//!     let config = init_test()?;
//!
//!     let mut registry = TestRegistry::new();
//!     registry.register("test_ping", test_ping)?;
//!
//!     let report = registry.run(&config, None);
//!     println!("{}", report.summary());
//!
//!     std::process::exit(report.exit_code())
//! }
//! ```
//!
//! `test_check!` returns from the test case on a false condition. The
//! error unwinds through `?`-style early return, so `node` is dropped and
//! the node process is killed before the registry records the failure.
//!
//! ## Running Tests
//!
//! The paths of the executables are taken from the environment:
//!
//! ```bash
//! NODE_COMMAND_PATH=./build/node CLIENT_COMMAND_PATH=./build/client \
//!     RUST_LOG=info cargo run -p ledger-integration-test
//! ```
//!
//! Take a look at [`TestConfig`](crate::types::config::TestConfig) and
//! [`load_config`](crate::bootstrap::init::load_config) for the other
//! settings. All data of a run is kept under `data/test-<random>`, with
//! one sub-directory per case holding the case log, the node's config,
//! its captured output and an `.env` file describing the node.

pub mod bootstrap;
pub mod client;
pub mod error;
pub mod framework;
pub mod node;
pub mod prelude;
pub mod types;
pub mod util;
