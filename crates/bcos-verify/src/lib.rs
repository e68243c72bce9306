//! Merkle proof verification for transactions and receipts.
//!
//! Roots are recomputed locally from the leaf and its proof and compared with
//! the roots of a block header obtained from a trusted block manager. Nothing
//! returned by the ledger client is taken on faith.

use thiserror::Error;

pub mod merkle;
pub mod receipt;

pub use merkle::MerkleVerifier;
pub use receipt::ReceiptEncoding;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
	#[error("Proof has no levels")]
	EmptyProof,
	#[error("Missing {0} proof")]
	MissingProof(&'static str),
	#[error("Invalid sibling '{sibling}': {reason}")]
	InvalidSibling { sibling: String, reason: String },
	#[error("Invalid {field}: {reason}")]
	InvalidField { field: &'static str, reason: String },
}

pub(crate) fn decode_hex_field(field: &'static str, value: &str) -> Result<Vec<u8>, VerifyError> {
	let value = value.trim();
	let digits = value.strip_prefix("0x").unwrap_or(value);
	hex::decode(digits).map_err(|e| VerifyError::InvalidField {
		field,
		reason: format!("'{}': {}", value, e),
	})
}
