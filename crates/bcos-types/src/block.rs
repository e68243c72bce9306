//! Block and block header types.

use crate::serde_helpers::quantity;
use serde::{Deserialize, Serialize};

/// Header fields the stub needs to authenticate proofs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
	pub number: u64,
	pub hash: String,
	pub prev_hash: String,
	pub state_root: String,
	pub transaction_root: String,
	pub receipt_root: String,
}

/// Block as handed to the router.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
	pub block_header: BlockHeader,
	pub transactions_hashes: Vec<String>,
	#[serde(default)]
	pub raw_bytes: Vec<u8>,
}

/// Block JSON as returned by the node. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LedgerBlock {
	#[serde(with = "quantity")]
	pub number: u64,
	pub hash: String,
	pub parent_hash: String,
	pub state_root: String,
	#[serde(alias = "txsRoot")]
	pub transactions_root: String,
	#[serde(alias = "receiptRoot")]
	pub receipts_root: String,
	/// Either bare hashes or full transaction objects.
	pub transactions: Vec<serde_json::Value>,
}

impl LedgerBlock {
	pub fn header(&self) -> BlockHeader {
		BlockHeader {
			number: self.number,
			hash: self.hash.clone(),
			prev_hash: self.parent_hash.clone(),
			state_root: self.state_root.clone(),
			transaction_root: self.transactions_root.clone(),
			receipt_root: self.receipts_root.clone(),
		}
	}

	pub fn transaction_hashes(&self) -> Vec<String> {
		self.transactions
			.iter()
			.filter_map(|tx| match tx {
				serde_json::Value::String(hash) => Some(hash.clone()),
				serde_json::Value::Object(fields) => fields
					.get("hash")
					.and_then(|h| h.as_str())
					.map(str::to_string),
				_ => None,
			})
			.collect()
	}
}

impl Block {
	/// Builds a router block from node JSON, keeping the JSON as raw bytes.
	pub fn from_ledger_json(raw: &[u8]) -> Result<Self, serde_json::Error> {
		let ledger: LedgerBlock = serde_json::from_slice(raw)?;
		Ok(Self {
			block_header: ledger.header(),
			transactions_hashes: ledger.transaction_hashes(),
			raw_bytes: raw.to_vec(),
		})
	}

	pub fn number(&self) -> u64 {
		self.block_header.number
	}
}
