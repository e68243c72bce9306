//! Crypto profiles and signing accounts.
//!
//! A chain runs either the standard ECDSA/Keccak profile or the national GM
//! profile (SM2/SM3). The profile is picked once from [`CryptoKind`] and then
//! passed around as an `Arc<dyn CryptoProfile>`, so nothing above this crate
//! branches on the crypto family.

use bcos_types::{Address, CryptoKind, B256, U256};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub mod implementations {
	pub mod ecdsa;
	pub mod sm;
}

pub use implementations::ecdsa::{EcdsaKeyPair, EcdsaProfile};
pub use implementations::sm::{SmKeyPair, SmProfile};

#[derive(Debug, Error)]
pub enum AccountError {
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	#[error("Invalid signature: {0}")]
	InvalidSignature(String),
	#[error("Signature of kind {actual} cannot be checked by the {expected} profile")]
	ProfileMismatch {
		expected: CryptoKind,
		actual: CryptoKind,
	},
}

/// Signature in the form the transaction encoding needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureData {
	/// `v` is 27 or 28.
	Ecdsa { v: u8, r: U256, s: U256 },
	/// SM2 signatures travel with the uncompressed public key (x ‖ y).
	Sm2 {
		public_key: [u8; 64],
		r: U256,
		s: U256,
	},
}

impl SignatureData {
	pub fn kind(&self) -> CryptoKind {
		match self {
			SignatureData::Ecdsa { .. } => CryptoKind::Ecdsa,
			SignatureData::Sm2 { .. } => CryptoKind::Gm,
		}
	}
}

/// A private key bound to one profile.
pub trait KeyPair: Send + Sync + fmt::Debug {
	fn kind(&self) -> CryptoKind;

	fn address(&self) -> Address;

	/// Raw 32-byte secret scalar.
	fn secret_bytes(&self) -> Vec<u8>;

	/// Signs an already hashed message.
	fn sign_hash(&self, hash: &B256) -> Result<SignatureData, AccountError>;
}

/// Hashing and signing primitives of one crypto family.
pub trait CryptoProfile: Send + Sync + fmt::Debug {
	fn kind(&self) -> CryptoKind;

	fn hash(&self, data: &[u8]) -> B256;

	fn generate_key_pair(&self) -> Arc<dyn KeyPair>;

	fn load_key_pair(&self, secret: &[u8]) -> Result<Arc<dyn KeyPair>, AccountError>;

	/// Checks `signature` over `hash` and returns the signer's address.
	fn recover_signer(
		&self,
		hash: &B256,
		signature: &SignatureData,
	) -> Result<Address, AccountError>;

	/// Four-byte function selector of a canonical signature like `set(string)`.
	fn selector(&self, signature: &str) -> [u8; 4] {
		let hash = self.hash(signature.as_bytes());
		let mut selector = [0u8; 4];
		selector.copy_from_slice(&hash[..4]);
		selector
	}

	/// Loads a key from a hex secret, with or without `0x`.
	fn load_key_pair_hex(&self, secret: &str) -> Result<Arc<dyn KeyPair>, AccountError> {
		let trimmed = secret.trim();
		let bytes = hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
			.map_err(|e| AccountError::InvalidKey(format!("Invalid hex secret: {}", e)))?;
		self.load_key_pair(&bytes)
	}
}

/// Returns the profile for a crypto family.
pub fn profile_for(kind: CryptoKind) -> Arc<dyn CryptoProfile> {
	match kind {
		CryptoKind::Ecdsa => Arc::new(EcdsaProfile),
		CryptoKind::Gm => Arc::new(SmProfile),
	}
}

/// Named signing identity used to send transactions.
#[derive(Debug, Clone)]
pub struct Account {
	name: String,
	key_pair: Arc<dyn KeyPair>,
}

impl Account {
	pub fn new(name: impl Into<String>, key_pair: Arc<dyn KeyPair>) -> Self {
		Self {
			name: name.into(),
			key_pair,
		}
	}

	/// Creates an account with a fresh key.
	pub fn generate(name: impl Into<String>, profile: &dyn CryptoProfile) -> Self {
		Self::new(name, profile.generate_key_pair())
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn kind(&self) -> CryptoKind {
		self.key_pair.kind()
	}

	pub fn address(&self) -> Address {
		self.key_pair.address()
	}

	/// Lowercase `0x` address, the form the ledger reports in `from`.
	pub fn identity(&self) -> String {
		format!("{:#x}", self.key_pair.address())
	}

	pub fn key_pair(&self) -> &dyn KeyPair {
		self.key_pair.as_ref()
	}
}
