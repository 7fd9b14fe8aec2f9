//! Network configuration types for per-chain RPC endpoints.
//!
//! Chains are keyed by their configuration name in TOML (TOML tables only
//! support string keys) and converted to [`Chain`] on load.

use crate::Chain;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Configuration for a single blockchain network.
///
/// # Fields
///
/// * `rpc_url` - JSON-RPC endpoint for EVM chains, LCD/REST base URL for
///   Cosmos-SDK chains, or the family's API root otherwise
/// * `min_priority_fee_wei` - EVM default priority fee used as a tip floor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkConfig {
	pub rpc_url: String,
	#[serde(default)]
	pub min_priority_fee_wei: u64,
}

/// Networks configuration mapping chains to their configurations.
pub type NetworksConfig = HashMap<Chain, NetworkConfig>;

/// Helper function to deserialize network configurations from TOML.
///
/// # Errors
///
/// Returns a deserialization error if a key is not a known chain name.
pub fn deserialize_networks<'de, D>(deserializer: D) -> Result<NetworksConfig, D::Error>
where
	D: Deserializer<'de>,
{
	let string_map: HashMap<String, NetworkConfig> = HashMap::deserialize(deserializer)?;
	let mut result = HashMap::new();

	for (key, value) in string_map {
		let chain = key
			.parse::<Chain>()
			.map_err(|e| serde::de::Error::custom(e.to_string()))?;
		result.insert(chain, value);
	}

	Ok(result)
}
