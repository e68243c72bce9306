//! Root recomputation from a leaf and its sibling proof.

use crate::receipt::ReceiptEncoding;
use crate::{decode_hex_field, VerifyError};
use alloy_primitives::B256;
use alloy_rlp::Encodable;
use bcos_account::CryptoProfile;
use bcos_types::{MerkleProofUnit, ReceiptWithProof, TransactionReceipt, TransactionWithProof};
use std::sync::Arc;
use tracing::debug;

/// Recomputes Merkle roots with the hash of the active crypto profile.
///
/// Each proof level lists the sibling hashes to the left and to the right of
/// the running value. A level hashes `left siblings ‖ running ‖ right
/// siblings`, and the running value starts as the raw leaf input.
#[derive(Debug, Clone)]
pub struct MerkleVerifier {
	profile: Arc<dyn CryptoProfile>,
}

impl MerkleVerifier {
	pub fn new(profile: Arc<dyn CryptoProfile>) -> Self {
		Self { profile }
	}

	pub fn compute_root(&self, leaf: &[u8], proof: &[MerkleProofUnit]) -> Result<B256, VerifyError> {
		if proof.is_empty() {
			return Err(VerifyError::EmptyProof);
		}

		let mut running = leaf.to_vec();
		for unit in proof {
			let mut level = Vec::with_capacity(running.len() + 32 * (unit.left.len() + unit.right.len()));
			for sibling in &unit.left {
				level.extend(decode_sibling(sibling)?);
			}
			level.extend_from_slice(&running);
			for sibling in &unit.right {
				level.extend(decode_sibling(sibling)?);
			}
			running = self.profile.hash(&level).to_vec();
		}

		Ok(B256::from_slice(&running))
	}

	pub fn verify(candidate: &B256, trusted_root: &B256) -> bool {
		candidate == trusted_root
	}

	/// `rlp(index) ‖ tx hash bytes`. A missing index encodes like zero.
	pub fn transaction_leaf(index: Option<u64>, tx_hash: &str) -> Result<Vec<u8>, VerifyError> {
		let mut leaf = Vec::new();
		index.unwrap_or_default().encode(&mut leaf);
		leaf.extend(decode_hex_field("transaction hash", tx_hash)?);
		Ok(leaf)
	}

	/// `rlp(index) ‖ hash(rlp(receipt))`.
	pub fn receipt_leaf(
		&self,
		receipt: &TransactionReceipt,
		encoding: ReceiptEncoding,
	) -> Result<Vec<u8>, VerifyError> {
		let mut leaf = Vec::new();
		receipt.transaction_index.unwrap_or_default().encode(&mut leaf);
		leaf.extend_from_slice(self.profile.hash(&encoding.encode(receipt)?).as_slice());
		Ok(leaf)
	}

	pub fn verify_transaction(
		&self,
		transactions_root: &str,
		tx_hash: &str,
		index: Option<u64>,
		proof: &[MerkleProofUnit],
	) -> Result<bool, VerifyError> {
		let trusted = parse_root("transactions root", transactions_root)?;
		let computed = self.compute_root(&Self::transaction_leaf(index, tx_hash)?, proof)?;
		debug!(tx_hash, computed = %computed, trusted = %trusted, "Checked transaction proof");
		Ok(Self::verify(&computed, &trusted))
	}

	pub fn verify_transaction_with_proof(
		&self,
		transactions_root: &str,
		with_proof: &TransactionWithProof,
	) -> Result<bool, VerifyError> {
		let tx = &with_proof.transaction;
		self.verify_transaction(transactions_root, &tx.hash, tx.transaction_index, &with_proof.tx_proof)
	}

	pub fn verify_receipt(
		&self,
		receipts_root: &str,
		receipt: &TransactionReceipt,
		proof: &[MerkleProofUnit],
		encoding: ReceiptEncoding,
	) -> Result<bool, VerifyError> {
		let trusted = parse_root("receipts root", receipts_root)?;
		let computed = self.compute_root(&self.receipt_leaf(receipt, encoding)?, proof)?;
		debug!(
			tx_hash = %receipt.transaction_hash,
			computed = %computed,
			trusted = %trusted,
			"Checked receipt proof"
		);
		Ok(Self::verify(&computed, &trusted))
	}

	pub fn verify_receipt_with_proof(
		&self,
		receipts_root: &str,
		with_proof: &ReceiptWithProof,
		encoding: ReceiptEncoding,
	) -> Result<bool, VerifyError> {
		self.verify_receipt(
			receipts_root,
			&with_proof.transaction_receipt,
			&with_proof.receipt_proof,
			encoding,
		)
	}
}

fn decode_sibling(sibling: &str) -> Result<Vec<u8>, VerifyError> {
	let digits = sibling.trim().trim_start_matches("0x");
	hex::decode(digits).map_err(|e| VerifyError::InvalidSibling {
		sibling: sibling.to_string(),
		reason: e.to_string(),
	})
}

fn parse_root(field: &'static str, root: &str) -> Result<B256, VerifyError> {
	let bytes = decode_hex_field(field, root)?;
	if bytes.len() != 32 {
		return Err(VerifyError::InvalidField {
			field,
			reason: format!("expected 32 bytes, got {}", bytes.len()),
		});
	}
	Ok(B256::from_slice(&bytes))
}

#[cfg(test)]
mod tests {
	use super::*;
	use bcos_account::implementations::ecdsa::EcdsaProfile;
	use bcos_types::{LedgerBlock, MerkleProof};

	const BLOCK_9: &str = include_str!("../testdata/block_9.json");
	const TX_PROOF_9: &str = include_str!("../testdata/transaction_proof_9.json");
	const RECEIPT_PROOF_9: &str = include_str!("../testdata/receipt_proof_9.json");
	const RECEIPT_9: &str = include_str!("../testdata/receipt_9.json");
	const BLOCK_35: &str = include_str!("../testdata/block_35.json");
	const TX_PROOF_35: &str = include_str!("../testdata/transaction_proof_35.json");
	const RECEIPT_PROOF_35: &str = include_str!("../testdata/receipt_proof_35.json");
	const RECEIPT_35: &str = include_str!("../testdata/receipt_35.json");

	fn verifier() -> MerkleVerifier {
		MerkleVerifier::new(Arc::new(EcdsaProfile))
	}

	fn block(json: &str) -> LedgerBlock {
		serde_json::from_str(json).unwrap()
	}

	#[test]
	fn test_transaction_proofs() {
		let verifier = verifier();
		for (block_json, proof_json) in [(BLOCK_9, TX_PROOF_9), (BLOCK_35, TX_PROOF_35)] {
			let block = block(block_json);
			let proof: TransactionWithProof = serde_json::from_str(proof_json).unwrap();
			assert!(verifier
				.verify_transaction_with_proof(&block.transactions_root, &proof)
				.unwrap());
		}
	}

	#[test]
	fn test_receipt_proofs() {
		let verifier = verifier();
		let encoding = ReceiptEncoding::for_version(None);
		for (block_json, proof_json) in [(BLOCK_9, RECEIPT_PROOF_9), (BLOCK_35, RECEIPT_PROOF_35)] {
			let block = block(block_json);
			let proof: ReceiptWithProof = serde_json::from_str(proof_json).unwrap();
			assert!(verifier
				.verify_receipt_with_proof(&block.receipts_root, &proof, encoding)
				.unwrap());
		}
	}

	#[test]
	fn test_receipt_with_inline_proofs() {
		let verifier = verifier();
		for (block_json, receipt_json) in [(BLOCK_9, RECEIPT_9), (BLOCK_35, RECEIPT_35)] {
			let block = block(block_json);
			let receipt: TransactionReceipt = serde_json::from_str(receipt_json).unwrap();
			let receipt_proof = receipt.receipt_proof.clone().unwrap();
			let tx_proof = receipt.tx_proof.clone().unwrap();
			assert!(verifier
				.verify_receipt(&block.receipts_root, &receipt, &receipt_proof, ReceiptEncoding::default())
				.unwrap());
			assert!(verifier
				.verify_transaction(
					&block.transactions_root,
					&receipt.transaction_hash,
					receipt.transaction_index,
					&tx_proof,
				)
				.unwrap());
		}
	}

	#[test]
	fn test_decimal_gas_used_verifies() {
		let block = block(BLOCK_9);
		let mut proof: ReceiptWithProof = serde_json::from_str(RECEIPT_PROOF_9).unwrap();
		proof.transaction_receipt.gas_used = "32812".to_string();
		assert!(verifier()
			.verify_receipt_with_proof(&block.receipts_root, &proof, ReceiptEncoding::default())
			.unwrap());
	}

	#[test]
	fn test_tampered_transaction_fails() {
		let block = block(BLOCK_9);
		let mut proof: TransactionWithProof = serde_json::from_str(TX_PROOF_9).unwrap();
		let flipped = if proof.transaction.hash.as_bytes()[2] == b'0' { "1" } else { "0" };
		proof.transaction.hash.replace_range(2..3, flipped);
		assert!(!verifier()
			.verify_transaction_with_proof(&block.transactions_root, &proof)
			.unwrap());
	}

	#[test]
	fn test_tampered_sibling_fails() {
		let block = block(BLOCK_35);
		let mut proof: TransactionWithProof = serde_json::from_str(TX_PROOF_35).unwrap();
		let unit = proof
			.tx_proof
			.iter_mut()
			.find(|unit| !unit.left.is_empty() || !unit.right.is_empty())
			.unwrap();
		let sibling = unit.left.first_mut().or(unit.right.first_mut()).unwrap();
		let last = sibling.len() - 1;
		let flipped = if sibling.as_bytes()[last] == b'0' { "1" } else { "0" };
		sibling.replace_range(last.., flipped);
		assert!(!verifier()
			.verify_transaction_with_proof(&block.transactions_root, &proof)
			.unwrap());
	}

	#[test]
	fn test_tampered_receipt_fails() {
		let block = block(BLOCK_35);
		let mut proof: ReceiptWithProof = serde_json::from_str(RECEIPT_PROOF_35).unwrap();
		proof.transaction_receipt.status = 1;
		assert!(!verifier()
			.verify_receipt_with_proof(&block.receipts_root, &proof, ReceiptEncoding::default())
			.unwrap());

		// a version with remainGas encodes a different receipt
		let proof: ReceiptWithProof = serde_json::from_str(RECEIPT_PROOF_35).unwrap();
		assert!(!verifier()
			.verify_receipt_with_proof(&block.receipts_root, &proof, ReceiptEncoding { remain_gas: true })
			.unwrap());
	}

	#[test]
	fn test_compute_root_is_deterministic() {
		let verifier = verifier();
		let proof: MerkleProof = vec![MerkleProofUnit {
			left: vec![format!("0x{}", "11".repeat(32))],
			right: vec!["22".repeat(32)],
		}];
		let leaf = MerkleVerifier::transaction_leaf(Some(3), &format!("0x{}", "ab".repeat(32))).unwrap();
		assert_eq!(
			verifier.compute_root(&leaf, &proof).unwrap(),
			verifier.compute_root(&leaf, &proof).unwrap()
		);
	}

	#[test]
	fn test_empty_proof_is_rejected() {
		let leaf = MerkleVerifier::transaction_leaf(None, "0x01").unwrap();
		assert_eq!(verifier().compute_root(&leaf, &[]), Err(VerifyError::EmptyProof));
	}

	#[test]
	fn test_transaction_leaf_layout() {
		let hash = format!("0x{}", "ab".repeat(32));
		let leaf = MerkleVerifier::transaction_leaf(None, &hash).unwrap();
		assert_eq!(leaf[0], 0x80);
		assert_eq!(leaf, MerkleVerifier::transaction_leaf(Some(0), &hash).unwrap());
		assert_eq!(MerkleVerifier::transaction_leaf(Some(2), &hash).unwrap()[0], 0x02);
		assert_eq!(leaf.len(), 33);
	}

	#[test]
	fn test_bad_root_and_sibling() {
		let verifier = verifier();
		let proof = vec![MerkleProofUnit {
			left: vec!["0xnothex".to_string()],
			right: vec![],
		}];
		assert!(matches!(
			verifier.verify_transaction(&format!("0x{}", "00".repeat(32)), "0x01", None, &proof),
			Err(VerifyError::InvalidSibling { .. })
		));
		assert!(matches!(
			verifier.verify_transaction("0x1234", "0x01", None, &proof),
			Err(VerifyError::InvalidField { .. })
		));
	}
}
