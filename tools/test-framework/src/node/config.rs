/*!
   Generation of the node configuration.

   The node executable reads a JSON document describing its listening
   ports, its peers and its database. The harness builds it from a
   [`NodeId`] plus per-test [`ConfigOverrides`] as a pure function: no
   filesystem or network access happens here, and identical inputs always
   give byte-identical output.
*/

use core::fmt::{self, Display};
use serde::{Deserialize, Serialize};

use crate::error::{handle_generic_error, Error};
use crate::types::node_id::NodeId;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 100;

pub const DEFAULT_MINER_THREADS: u32 = 2;

pub const DEFAULT_DATABASE_PATH: &str = "database";

/**
   Test-specific adjustments applied on top of the generated config.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Other nodes this node should connect to on startup.
    pub peers: Vec<NodeId>,

    /// Database location, relative to the node's work directory.
    pub database_path: String,

    /// Whether the node wipes its database on startup.
    pub clean_up_database: bool,

    pub miner_threads: u32,

    pub max_connections: u32,
}

impl Default for ConfigOverrides {
    fn default() -> Self {
        Self {
            peers: Vec::new(),
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            clean_up_database: true,
            miner_threads: DEFAULT_MINER_THREADS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl ConfigOverrides {
    pub fn with_peers(mut self, peers: impl IntoIterator<Item = NodeId>) -> Self {
        self.peers = peers.into_iter().collect();
        self
    }

    pub fn with_database(mut self, path: impl Into<String>, clean_up: bool) -> Self {
        self.database_path = path.into();
        self.clean_up_database = clean_up;
        self
    }

    pub fn with_miner_threads(mut self, threads: u32) -> Self {
        self.miner_threads = threads;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetConfig {
    pub listen_addr: String,
    pub public_port: u16,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcConfig {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerConfig {
    pub threads: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub clean: bool,
}

/**
   Structured form of the node configuration file.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub net: NetConfig,
    pub rpc: RpcConfig,
    pub miner: MinerConfig,
    pub nodes: Vec<String>,
    pub database: DatabaseConfig,
    pub keys_dir: String,
}

impl NodeConfig {
    pub fn generate(node_id: &NodeId, overrides: &ConfigOverrides) -> Self {
        Self {
            net: NetConfig {
                listen_addr: node_id.listen_sync_address(),
                public_port: node_id.sync_port,
                max_connections: overrides.max_connections,
            },
            rpc: RpcConfig {
                address: node_id.listen_rpc_address(),
            },
            miner: MinerConfig {
                threads: overrides.miner_threads,
            },
            nodes: overrides
                .peers
                .iter()
                .map(NodeId::connect_sync_address)
                .collect(),
            database: DatabaseConfig {
                path: overrides.database_path.clone(),
                clean: overrides.clean_up_database,
            },
            keys_dir: ".".to_string(),
        }
    }

    pub fn render(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(handle_generic_error)
    }
}

/**
   The rendered configuration handed to a node at spawn time, together
   with the [`NodeId`] it was generated for.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBlob {
    node_id: NodeId,
    content: String,
}

impl ConfigBlob {
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Display for ConfigBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

/**
   Generate the configuration blob for `current_node_id`.
*/
pub fn generate_config(
    current_node_id: &NodeId,
    overrides: &ConfigOverrides,
) -> Result<ConfigBlob, Error> {
    let content = NodeConfig::generate(current_node_id, overrides).render()?;

    Ok(ConfigBlob {
        node_id: *current_node_id,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        let node_id = NodeId::new(20206, 50056);
        let overrides = ConfigOverrides::default().with_peers([NodeId::new(20207, 50057)]);

        let first = generate_config(&node_id, &overrides).unwrap();
        let second = generate_config(&node_id, &overrides).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.content(), second.content());
    }

    #[test]
    fn ports_and_peers_are_embedded() {
        let node_id = NodeId::new(20206, 50056);
        let overrides = ConfigOverrides::default()
            .with_peers([NodeId::new(20207, 50057), NodeId::new(20208, 50058)])
            .with_database("db", false)
            .with_miner_threads(1);

        let blob = generate_config(&node_id, &overrides).unwrap();
        assert_eq!(blob.node_id(), &node_id);

        let parsed: NodeConfig = serde_json::from_str(blob.content()).unwrap();

        assert_eq!(parsed.net.listen_addr, "0.0.0.0:20206");
        assert_eq!(parsed.net.public_port, 20206);
        assert_eq!(parsed.rpc.address, "0.0.0.0:50056");
        assert_eq!(parsed.nodes, vec!["127.0.0.1:20207", "127.0.0.1:20208"]);
        assert_eq!(parsed.database.path, "db");
        assert!(!parsed.database.clean);
        assert_eq!(parsed.miner.threads, 1);
    }

    #[test]
    fn different_nodes_get_different_configs() {
        let overrides = ConfigOverrides::default();

        let a = generate_config(&NodeId::new(20206, 50056), &overrides).unwrap();
        let b = generate_config(&NodeId::new(20207, 50057), &overrides).unwrap();

        assert_ne!(a.content(), b.content());
    }
}
