//! Transaction assembly, signing and decoding.
//!
//! Transactions use the BCOS extended RLP layout:
//!
//! ```text
//! [nonce, gasPrice, gasLimit, blockLimit, to, value, data, chainId, groupId, extraData]
//! ```
//!
//! The signing hash is the profile hash of that list. The signed form appends
//! `[v, r, s]` for ECDSA or `[publicKey, r, s]` for SM2, and the transaction
//! hash is the profile hash of the signed form.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_rlp::{Decodable, Encodable, Header, EMPTY_STRING_CODE};
use bcos_account::{AccountError, CryptoProfile, KeyPair, SignatureData};
use bcos_types::constants::{DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TransactionError {
	#[error("Invalid block limit {0}: must be greater than zero")]
	InvalidBlockLimit(u64),
	#[error("Signing failed: {0}")]
	Signing(#[from] AccountError),
	#[error("Decode failed: {0}")]
	Decode(String),
}

impl From<alloy_rlp::Error> for TransactionError {
	fn from(err: alloy_rlp::Error) -> Self {
		TransactionError::Decode(err.to_string())
	}
}

/// An unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
	pub nonce: U256,
	pub gas_price: U256,
	pub gas_limit: U256,
	pub block_limit: u64,
	/// `None` deploys `data` as a new contract.
	pub to: Option<Address>,
	pub value: U256,
	pub data: Bytes,
	pub chain_id: String,
	pub group_id: String,
	pub extra_data: Bytes,
}

impl RawTransaction {
	fn encode_fields(&self, out: &mut Vec<u8>) {
		self.nonce.encode(out);
		self.gas_price.encode(out);
		self.gas_limit.encode(out);
		self.block_limit.encode(out);
		match &self.to {
			Some(to) => to.encode(out),
			None => out.push(EMPTY_STRING_CODE),
		}
		self.value.encode(out);
		self.data.encode(out);
		self.chain_id.as_bytes().encode(out);
		self.group_id.as_bytes().encode(out);
		self.extra_data.encode(out);
	}

	/// RLP of the unsigned field list.
	pub fn encode_unsigned(&self) -> Vec<u8> {
		let mut fields = Vec::new();
		self.encode_fields(&mut fields);
		wrap_list(fields)
	}

	/// RLP of the field list followed by the signature fields.
	pub fn encode_signed(&self, signature: &SignatureData) -> Vec<u8> {
		let mut fields = Vec::new();
		self.encode_fields(&mut fields);
		match signature {
			SignatureData::Ecdsa { v, r, s } => {
				v.encode(&mut fields);
				r.encode(&mut fields);
				s.encode(&mut fields);
			}
			SignatureData::Sm2 { public_key, r, s } => {
				public_key[..].encode(&mut fields);
				r.encode(&mut fields);
				s.encode(&mut fields);
			}
		}
		wrap_list(fields)
	}
}

fn wrap_list(payload: Vec<u8>) -> Vec<u8> {
	let header = Header {
		list: true,
		payload_length: payload.len(),
	};
	let mut out = Vec::with_capacity(header.length() + payload.len());
	header.encode(&mut out);
	out.extend_from_slice(&payload);
	out
}

/// A signed, serialized transaction ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
	raw: Bytes,
	hash: B256,
}

impl SignedTransaction {
	pub fn raw(&self) -> &Bytes {
		&self.raw
	}

	pub fn hash(&self) -> B256 {
		self.hash
	}

	pub fn into_raw(self) -> Bytes {
		self.raw
	}
}

/// A signed transaction read back from its serialized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
	pub transaction: RawTransaction,
	pub signature: SignatureData,
	pub hash: B256,
}

/// Builds and signs transactions for one crypto profile.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
	profile: Arc<dyn CryptoProfile>,
}

impl TransactionBuilder {
	pub fn new(profile: Arc<dyn CryptoProfile>) -> Self {
		Self { profile }
	}

	pub fn profile(&self) -> &Arc<dyn CryptoProfile> {
		&self.profile
	}

	/// Assembles an unsigned transaction with a random nonce.
	///
	/// The caller picks `block_limit` above the chain height it observed;
	/// only zero is rejected here.
	pub fn build(
		&self,
		to: Option<Address>,
		group_id: &str,
		chain_id: &str,
		block_limit: u64,
		payload: Bytes,
	) -> Result<RawTransaction, TransactionError> {
		if block_limit == 0 {
			return Err(TransactionError::InvalidBlockLimit(block_limit));
		}

		Ok(RawTransaction {
			nonce: U256::from_be_bytes(rand::random::<[u8; 32]>()),
			gas_price: U256::from(DEFAULT_GAS_PRICE),
			gas_limit: U256::from(DEFAULT_GAS_LIMIT),
			block_limit,
			to,
			value: U256::ZERO,
			data: payload,
			chain_id: chain_id.to_string(),
			group_id: group_id.to_string(),
			extra_data: Bytes::new(),
		})
	}

	/// Assembles a deployment: `init_code` immediately followed by the
	/// encoded constructor arguments.
	pub fn build_deploy(
		&self,
		init_code: &[u8],
		constructor_args: &[u8],
		group_id: &str,
		chain_id: &str,
		block_limit: u64,
	) -> Result<RawTransaction, TransactionError> {
		let mut payload = Vec::with_capacity(init_code.len() + constructor_args.len());
		payload.extend_from_slice(init_code);
		payload.extend_from_slice(constructor_args);
		self.build(None, group_id, chain_id, block_limit, Bytes::from(payload))
	}

	pub fn signing_hash(&self, tx: &RawTransaction) -> B256 {
		self.profile.hash(&tx.encode_unsigned())
	}

	pub fn sign(
		&self,
		tx: &RawTransaction,
		key_pair: &dyn KeyPair,
	) -> Result<SignedTransaction, TransactionError> {
		if key_pair.kind() != self.profile.kind() {
			return Err(AccountError::ProfileMismatch {
				expected: self.profile.kind(),
				actual: key_pair.kind(),
			}
			.into());
		}

		let signature = key_pair.sign_hash(&self.signing_hash(tx))?;
		let raw = tx.encode_signed(&signature);
		let hash = self.profile.hash(&raw);
		debug!(tx_hash = %hash, block_limit = tx.block_limit, "Signed transaction");

		Ok(SignedTransaction {
			raw: Bytes::from(raw),
			hash,
		})
	}

	/// Parses a signed transaction.
	pub fn decode(&self, raw: &[u8]) -> Result<DecodedTransaction, TransactionError> {
		let mut buf = raw;
		let header = Header::decode(&mut buf)?;
		if !header.list {
			return Err(TransactionError::Decode(
				"Transaction is not an RLP list".to_string(),
			));
		}
		if buf.len() != header.payload_length {
			return Err(TransactionError::Decode(format!(
				"Expected {} payload bytes, found {}",
				header.payload_length,
				buf.len()
			)));
		}

		let mut body = buf;
		let nonce = U256::decode(&mut body)?;
		let gas_price = U256::decode(&mut body)?;
		let gas_limit = U256::decode(&mut body)?;
		let block_limit = u64::decode(&mut body)?;
		let to = match Header::decode_bytes(&mut body, false)? {
			[] => None,
			bytes if bytes.len() == 20 => Some(Address::from_slice(bytes)),
			bytes => {
				return Err(TransactionError::Decode(format!(
					"Invalid destination of {} bytes",
					bytes.len()
				)))
			}
		};
		let value = U256::decode(&mut body)?;
		let data = Bytes::decode(&mut body)?;
		let chain_id = utf8(Header::decode_bytes(&mut body, false)?)?;
		let group_id = utf8(Header::decode_bytes(&mut body, false)?)?;
		let extra_data = Bytes::decode(&mut body)?;

		let first = Header::decode_bytes(&mut body, false)?;
		let signature = if first.len() == 64 {
			let mut public_key = [0u8; 64];
			public_key.copy_from_slice(first);
			SignatureData::Sm2 {
				public_key,
				r: U256::decode(&mut body)?,
				s: U256::decode(&mut body)?,
			}
		} else {
			let v = match first {
				[v] => *v,
				_ => {
					return Err(TransactionError::Decode(format!(
						"Invalid recovery id of {} bytes",
						first.len()
					)))
				}
			};
			SignatureData::Ecdsa {
				v,
				r: U256::decode(&mut body)?,
				s: U256::decode(&mut body)?,
			}
		};

		if !body.is_empty() {
			return Err(TransactionError::Decode(format!(
				"{} trailing bytes after signature",
				body.len()
			)));
		}

		Ok(DecodedTransaction {
			transaction: RawTransaction {
				nonce,
				gas_price,
				gas_limit,
				block_limit,
				to,
				value,
				data,
				chain_id,
				group_id,
				extra_data,
			},
			signature,
			hash: self.profile.hash(raw),
		})
	}

	/// Decodes `raw` and checks its signature, returning the sender.
	pub fn recover_sender(&self, raw: &[u8]) -> Result<Address, TransactionError> {
		let decoded = self.decode(raw)?;
		let hash = self.signing_hash(&decoded.transaction);
		Ok(self.profile.recover_signer(&hash, &decoded.signature)?)
	}
}

fn utf8(bytes: &[u8]) -> Result<String, TransactionError> {
	String::from_utf8(bytes.to_vec())
		.map_err(|e| TransactionError::Decode(format!("Invalid UTF-8 identifier: {}", e)))
}
