/*!
   Helper functions for bootstrapping a single node.
*/

use crate::error::Error;
use crate::node::config::ConfigOverrides;
use crate::node::runner::{NodeRunner, NodeRunnerOptions};
use crate::types::config::TestConfig;
use crate::types::log::TestLog;
use crate::types::node_id::NodeId;

/**
   Generate the config for `node_id` and start the node executable from
   `config`, with the timing parameters of `config`.

   The returned runner owns the node: keep it bound to a variable for as
   long as the node is needed.
*/
pub fn bootstrap_single_node(
    config: &TestConfig,
    log: &TestLog,
    role: &str,
    node_id: NodeId,
    overrides: &ConfigOverrides,
) -> Result<NodeRunner, Error> {
    let blob = NodeRunner::generate_config(&node_id, overrides)?;

    log.debug(format_args!("generated config for {role}:\n{blob}"));

    NodeRunner::start_with_options(
        &config.node_command_path,
        &blob,
        role,
        log,
        NodeRunnerOptions::from(config),
    )
}
