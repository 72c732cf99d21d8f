/*!
   Argument lists for the operations of the RPC client executable.
*/

use core::fmt::{self, Display};
use core::time::Duration;

use crate::types::address::Address;
use crate::types::node_id::NodeId;

/**
   One operation of the client executable against one node.

   The client is invoked as

   ```text
   <client> <operation> --host <rpc address> --sync-host <sync address> [flags]
   ```

   where both addresses are connect addresses of the node, e.g.
   `127.0.0.1:50056`. A transfer passes its wait window as `--wait` in
   [`humantime`] format, so the client can stop waiting for the
   confirmation on its own before the harness kills it.

   Balances are compared by the harness, so no target balance is passed.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Liveness check.
    Test { host: NodeId },

    GetBalance { host: NodeId, address: Address },

    Transfer {
        host: NodeId,
        from: Address,
        to: Address,
        amount: u64,
        wait: Duration,
    },
}

impl ClientCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ClientCommand::Test { .. } => "test",
            ClientCommand::GetBalance { .. } => "get_balance",
            ClientCommand::Transfer { .. } => "transfer",
        }
    }

    pub fn host(&self) -> &NodeId {
        match self {
            ClientCommand::Test { host }
            | ClientCommand::GetBalance { host, .. }
            | ClientCommand::Transfer { host, .. } => host,
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            self.name().to_string(),
            "--host".to_string(),
            self.host().connect_rpc_address(),
            "--sync-host".to_string(),
            self.host().connect_sync_address(),
        ];

        match self {
            ClientCommand::Test { .. } => {}
            ClientCommand::GetBalance { address, .. } => {
                args.extend(["--address".to_string(), address.to_string()]);
            }
            ClientCommand::Transfer {
                from,
                to,
                amount,
                wait,
                ..
            } => {
                args.extend([
                    "--from".to_string(),
                    from.to_string(),
                    "--to".to_string(),
                    to.to_string(),
                    "--amount".to_string(),
                    amount.to_string(),
                    "--wait".to_string(),
                    humantime::format_duration(*wait).to_string(),
                ]);
            }
        }

        args
    }
}

impl Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", itertools::join(self.to_args(), " "))
    }
}
