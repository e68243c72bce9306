//! Per-driver cache of parsed contract ABIs.

use crate::CodecError;
use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// A contract ABI registered under a resource name.
#[derive(Debug, Clone)]
pub struct ContractAbi {
	pub name: String,
	pub address: Option<Address>,
	pub abi: JsonAbi,
	/// The JSON the ABI was parsed from, as the router supplied it.
	pub raw: String,
}

pub fn parse_abi(json: &str) -> Result<JsonAbi, CodecError> {
	serde_json::from_str(json).map_err(|e| CodecError::InvalidParameter(format!("Invalid ABI: {}", e)))
}

/// ABIs keyed by resource name.
#[derive(Debug, Default)]
pub struct AbiCache {
	entries: DashMap<String, Arc<ContractAbi>>,
}

impl AbiCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses and stores `abi_json` under `name`, replacing any previous entry.
	pub fn register(
		&self,
		name: &str,
		address: Option<Address>,
		abi_json: &str,
	) -> Result<Arc<ContractAbi>, CodecError> {
		let entry = Arc::new(ContractAbi {
			name: name.to_string(),
			address,
			abi: parse_abi(abi_json)?,
			raw: abi_json.to_string(),
		});
		debug!(name = %name, address = ?address, "Registered contract ABI");
		self.entries.insert(name.to_string(), entry.clone());
		Ok(entry)
	}

	pub fn get(&self, name: &str) -> Option<Arc<ContractAbi>> {
		self.entries.get(name).map(|entry| entry.value().clone())
	}

	pub fn find_by_address(&self, address: &Address) -> Option<Arc<ContractAbi>> {
		self.entries
			.iter()
			.find(|entry| entry.value().address.as_ref() == Some(address))
			.map(|entry| entry.value().clone())
	}

	pub fn remove(&self, name: &str) -> Option<Arc<ContractAbi>> {
		self.entries.remove(name).map(|(_, entry)| entry)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
