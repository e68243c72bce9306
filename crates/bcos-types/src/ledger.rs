//! JSON models of what the ledger client returns.
//!
//! Field names follow the node's JSON-RPC output. Hex strings are kept as
//! strings because several of them are hashed back in their exact form
//! during proof verification.

use crate::serde_helpers::{quantity, quantity_opt};
use serde::{Deserialize, Serialize};

/// One level of a Merkle proof. Siblings are hex strings without `0x`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProofUnit {
	#[serde(default)]
	pub left: Vec<String>,
	#[serde(default)]
	pub right: Vec<String>,
}

/// Proof levels ordered from leaf to root.
pub type MerkleProof = Vec<MerkleProofUnit>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
	pub address: String,
	#[serde(default)]
	pub topics: Vec<String>,
	#[serde(default)]
	pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionReceipt {
	pub transaction_hash: String,
	#[serde(with = "quantity_opt", skip_serializing_if = "Option::is_none")]
	pub transaction_index: Option<u64>,
	#[serde(with = "quantity")]
	pub block_number: u64,
	pub block_hash: String,
	pub from: String,
	pub to: String,
	pub gas_used: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub remain_gas: Option<String>,
	pub contract_address: String,
	pub logs_bloom: String,
	#[serde(with = "quantity")]
	pub status: u64,
	pub root: String,
	pub input: String,
	pub output: String,
	pub logs: Vec<Log>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tx_proof: Option<MerkleProof>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub receipt_proof: Option<MerkleProof>,
}

impl TransactionReceipt {
	pub fn is_status_ok(&self) -> bool {
		self.status == 0
	}

	/// A receipt without a transaction hash is what the client hands back
	/// when the node never produced one.
	pub fn is_empty(&self) -> bool {
		self.transaction_hash.is_empty()
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonTransaction {
	pub hash: String,
	#[serde(with = "quantity_opt", skip_serializing_if = "Option::is_none")]
	pub transaction_index: Option<u64>,
	#[serde(with = "quantity")]
	pub block_number: u64,
	pub block_hash: String,
	pub from: String,
	pub to: String,
	pub input: String,
	pub nonce: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub group_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub chain_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionWithProof {
	pub transaction: JsonTransaction,
	#[serde(default)]
	pub tx_proof: MerkleProof,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptWithProof {
	pub transaction_receipt: TransactionReceipt,
	#[serde(default)]
	pub receipt_proof: MerkleProof,
}

/// Response data of a GET_TRANSACTION_PROOF request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionProof {
	pub trans_with_proof: TransactionWithProof,
	pub receipt_with_proof: ReceiptWithProof,
}

/// Result of a read-only call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallOutput {
	#[serde(with = "quantity")]
	pub current_block_number: u64,
	#[serde(with = "quantity")]
	pub status: u64,
	pub output: String,
}
