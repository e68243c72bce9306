//! Standard profile: secp256k1 signatures over Keccak-256 hashes.

use crate::{AccountError, CryptoProfile, KeyPair, SignatureData};
use alloy_primitives::{keccak256, Signature};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use bcos_types::{Address, CryptoKind, B256};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Default, Clone, Copy)]
pub struct EcdsaProfile;

impl CryptoProfile for EcdsaProfile {
	fn kind(&self) -> CryptoKind {
		CryptoKind::Ecdsa
	}

	fn hash(&self, data: &[u8]) -> B256 {
		keccak256(data)
	}

	fn generate_key_pair(&self) -> Arc<dyn KeyPair> {
		Arc::new(EcdsaKeyPair {
			signer: PrivateKeySigner::random(),
		})
	}

	fn load_key_pair(&self, secret: &[u8]) -> Result<Arc<dyn KeyPair>, AccountError> {
		Ok(Arc::new(EcdsaKeyPair::from_slice(secret)?))
	}

	fn recover_signer(
		&self,
		hash: &B256,
		signature: &SignatureData,
	) -> Result<Address, AccountError> {
		let SignatureData::Ecdsa { v, r, s } = signature else {
			return Err(AccountError::ProfileMismatch {
				expected: CryptoKind::Ecdsa,
				actual: signature.kind(),
			});
		};

		let parity = match v {
			0 | 27 => false,
			1 | 28 => true,
			other => {
				return Err(AccountError::InvalidSignature(format!(
					"Invalid recovery id {}",
					other
				)))
			}
		};

		Signature::new(*r, *s, parity)
			.recover_address_from_prehash(hash)
			.map_err(|e| AccountError::InvalidSignature(e.to_string()))
	}
}

/// secp256k1 key held in memory.
pub struct EcdsaKeyPair {
	signer: PrivateKeySigner,
}

impl EcdsaKeyPair {
	pub fn from_slice(secret: &[u8]) -> Result<Self, AccountError> {
		let signer = PrivateKeySigner::from_slice(secret)
			.map_err(|e| AccountError::InvalidKey(format!("Invalid secp256k1 key: {}", e)))?;
		Ok(Self { signer })
	}
}

impl fmt::Debug for EcdsaKeyPair {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EcdsaKeyPair")
			.field("address", &self.signer.address())
			.finish_non_exhaustive()
	}
}

impl KeyPair for EcdsaKeyPair {
	fn kind(&self) -> CryptoKind {
		CryptoKind::Ecdsa
	}

	fn address(&self) -> Address {
		self.signer.address()
	}

	fn secret_bytes(&self) -> Vec<u8> {
		self.signer.to_bytes().to_vec()
	}

	fn sign_hash(&self, hash: &B256) -> Result<SignatureData, AccountError> {
		let signature = self
			.signer
			.sign_hash_sync(hash)
			.map_err(|e| AccountError::SigningFailed(format!("Failed to sign hash: {}", e)))?;

		Ok(SignatureData::Ecdsa {
			v: if signature.v() { 28 } else { 27 },
			r: signature.r(),
			s: signature.s(),
		})
	}
}
