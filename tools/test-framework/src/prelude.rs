/*!
   Re-export of common constructs that are used by test cases.
*/

pub use core::time::Duration;
pub use eyre::eyre;
pub use tracing::{debug, error, info, warn};

pub use crate::bootstrap::init::{init_test, init_test_with, load_config};
pub use crate::bootstrap::single::bootstrap_single_node;
pub use crate::client::{Client, ClientCommand, ClientOutput};
pub use crate::error::{handle_generic_error, Error};
pub use crate::framework::{RunReport, TestCase, TestRegistry, TestResult};
pub use crate::node::config::{generate_config, ConfigBlob, ConfigOverrides};
pub use crate::node::runner::{NodeRunner, NodeRunnerOptions};
pub use crate::test_check;
pub use crate::types::address::Address;
pub use crate::types::config::{CheckPolicy, TestConfig};
pub use crate::types::log::TestLog;
pub use crate::types::log_sink::LogSink;
pub use crate::types::node_id::NodeId;
pub use crate::types::process::{ProcessExit, ProcessHandle};
