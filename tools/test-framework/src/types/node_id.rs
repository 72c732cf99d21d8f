/*!
   The port pair identifying one node instance.
*/

use core::fmt::{self, Display};
use serde::{Deserialize, Serialize};

use crate::util::random::random_unused_tcp_port;

/**
   Identifies a node-under-test by its synchronization (peer-to-peer) port
   and its RPC port.

   A `NodeId` is constructed once per test case and never mutated.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    pub sync_port: u16,
    pub rpc_port: u16,
}

impl NodeId {
    pub const fn new(sync_port: u16, rpc_port: u16) -> Self {
        Self {
            sync_port,
            rpc_port,
        }
    }

    /**
       Create a [`NodeId`] with two currently unused local ports.
    */
    pub fn random() -> Self {
        let sync_port = random_unused_tcp_port();

        let rpc_port = loop {
            let port = random_unused_tcp_port();
            if port != sync_port {
                break port;
            }
        };

        Self::new(sync_port, rpc_port)
    }

    /// Address the node binds for peer-to-peer sync.
    pub fn listen_sync_address(&self) -> String {
        format!("0.0.0.0:{}", self.sync_port)
    }

    /// Address the node binds for RPC.
    pub fn listen_rpc_address(&self) -> String {
        format!("0.0.0.0:{}", self.rpc_port)
    }

    /// Address other local nodes use to reach this node's sync port.
    pub fn connect_sync_address(&self) -> String {
        format!("127.0.0.1:{}", self.sync_port)
    }

    /// Address the client uses to reach this node's RPC port.
    pub fn connect_rpc_address(&self) -> String {
        format!("127.0.0.1:{}", self.rpc_port)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node(sync={}, rpc={})", self.sync_port, self.rpc_port)
    }
}
