//! Configuration types for the stub.

use bcos_types::constants::{DEFAULT_CHAIN_ID, DEFAULT_GROUP_ID};
use bcos_types::CryptoKind;
use serde::{Deserialize, Serialize};

/// Complete stub configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StubConfig {
	/// Chain identity and crypto profile
	pub chain: ChainConfig,
	/// Proxy contract, when calls are routed through it
	#[serde(default)]
	pub proxy: Option<ProxyConfig>,
	/// Contracts known up front
	#[serde(default)]
	pub resources: Vec<ResourceConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
	/// Chain name for logging
	pub name: String,
	#[serde(default = "default_group_id")]
	pub group_id: String,
	#[serde(default = "default_chain_id")]
	pub chain_id: String,
	#[serde(default)]
	pub crypto: CryptoKind,
	/// Version reported by the node, e.g. "3.2.0"
	#[serde(default)]
	pub node_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
	pub address: String,
	/// Contract ABI as a JSON string
	pub abi: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourceConfig {
	pub name: String,
	#[serde(default)]
	pub address: Option<String>,
	/// Contract ABI as a JSON string
	pub abi: String,
}

fn default_group_id() -> String {
	DEFAULT_GROUP_ID.to_string()
}

fn default_chain_id() -> String {
	DEFAULT_CHAIN_ID.to_string()
}
