// Path: crates/vladiator-types/src/config.rs
//! Per-network configuration and environment variable handling (spec §6).

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A single entry in the network label → config map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Chain id, as a decimal string.
    pub id: String,
    /// Driver family tag, e.g. `EVMMV3`, `Reef`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable network name.
    pub name: String,
    /// Primary RPC URL.
    pub rpc: String,
    /// Address of the on-chain message contract this driver watches and signs
    /// against (spec §4.1's `connect`: "validates the chain has a known
    /// message-contract address").
    pub message_contract: String,
    /// Alternate RPC URL used for writes, if different from `rpc`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rpc_exec: Option<String>,
    /// Default confirmations required before a receipt is considered final.
    pub finality: u32,
    /// Log-query chunk size for drivers that paginate `eth_getLogs`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chunk_size: Option<u64>,
    /// How many blocks behind head to scan from, for late-joining drivers.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lookback: Option<u64>,
    /// Delay between lookback scan iterations, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lookback_delay: Option<u64>,
    /// Whether this network offers fee-free relaying.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub free_gas: Option<bool>,
    /// Additive gas-price offset applied to outbound transactions.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub gas_offset: Option<u64>,
    /// Force legacy (non-EIP-1559) gas pricing.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub force_legacy_gas: Option<bool>,
    /// Force a fixed gas fee amount regardless of estimation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub force_gas_fee_amount: Option<u64>,
}

/// The top-level node configuration file: a map of network label → config.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NodeConfig {
    /// Network label (e.g. `"ethereum"`, `"bnb"`) → its configuration.
    #[serde(flatten)]
    pub networks: HashMap<String, NetworkConfig>,
}

impl NodeConfig {
    /// Loads and parses a node configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let raw = std::fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_ref.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path_ref.display().to_string(),
            source,
        })
    }
}

/// The environment variables recognized by a Vladiator node (spec §6).
///
/// Most are read directly with `std::env::var` at startup rather than parsed
/// through `clap(env = ...)`, since several (`BOOTSTRAP_PEERS`) need custom
/// splitting and several more are optional with non-trivial defaults.
#[derive(Debug, Clone)]
pub struct NodeEnv {
    /// Hex-encoded node signing key (`NODE_PRIVATE_KEY`).
    pub node_private_key: String,
    /// Node identity (`NODE_PUBLIC_KEY`).
    pub node_public_key: String,
    /// Base64 protobuf-encoded libp2p identity (`P2P_PRIVATE_KEY`), if pinned.
    pub p2p_private_key: Option<String>,
    /// Whether to listen on the announced port rather than an ephemeral one.
    pub bootnode: bool,
    /// Bootstrap peer multi-addresses.
    pub bootstrap_peers: Vec<String>,
    /// Multi-address to advertise to peers.
    pub announce_address: Option<String>,
    /// Port for the downstream data-stream broadcaster, if enabled.
    pub data_stream_port: Option<u16>,
    /// Whether verbose/debug logging is enabled.
    pub debug: bool,
}

impl NodeEnv {
    /// Reads the recognized environment variables, following spec §6's table.
    pub fn from_env() -> Result<Self, ConfigError> {
        let node_private_key = required_env("NODE_PRIVATE_KEY")?;
        let node_public_key = required_env("NODE_PUBLIC_KEY")?;
        let p2p_private_key = std::env::var("P2P_PRIVATE_KEY").ok();
        let bootnode = bool_env("BOOTNODE");
        let bootstrap_peers = std::env::var("BOOTSTRAP_PEERS")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        let announce_address = std::env::var("ANNOUNCE_ADDRESS").ok();
        let data_stream_port = match std::env::var("DATA_STREAM_PORT") {
            Ok(v) => Some(v.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "DATA_STREAM_PORT",
                reason: format!("{v:?} is not a valid port"),
            })?),
            Err(_) => None,
        };
        let debug = bool_env("DEBUG");

        Ok(NodeEnv {
            node_private_key,
            node_public_key,
            p2p_private_key,
            bootnode,
            bootstrap_peers,
            announce_address,
            data_stream_port,
            debug,
        })
    }
}

fn required_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnv(name))
}

fn bool_env(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_config_parses_network_map() {
        let toml_str = r#"
            [ethereum]
            id = "1"
            type = "EVMMV3"
            name = "Ethereum"
            rpc = "https://eth.example/rpc"
            messageContract = "0x0000000000000000000000000000000000000001"
            finality = 12

            [bnb]
            id = "56"
            type = "EVMMV3"
            name = "BNB Chain"
            rpc = "https://bnb.example/rpc"
            messageContract = "0x0000000000000000000000000000000000000002"
            finality = 15
            chunkSize = 2000
        "#;
        let cfg: NodeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.networks.len(), 2);
        assert_eq!(cfg.networks["ethereum"].finality, 12);
        assert_eq!(cfg.networks["bnb"].chunk_size, Some(2000));
    }
}
