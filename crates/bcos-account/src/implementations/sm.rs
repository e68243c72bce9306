//! GM profile: SM2 signatures over SM3 hashes.
//!
//! Addresses are the last 20 bytes of the SM3 hash of the uncompressed public
//! key (without the `0x04` tag), mirroring the Keccak rule of the standard
//! profile.

use crate::{AccountError, CryptoProfile, KeyPair, SignatureData};
use bcos_types::{Address, CryptoKind, B256, U256};
use rand::rngs::OsRng;
use signature::{Signer, Verifier};
use sm2::dsa::{Signature as Sm2Signature, SigningKey, VerifyingKey};
use sm2::elliptic_curve::sec1::ToEncodedPoint;
use sm2::SecretKey;
use sm3::{Digest, Sm3};
use std::fmt;
use std::sync::Arc;

/// Distinguishing identifier mixed into every SM2 signature.
pub const DEFAULT_DIST_ID: &str = "1234567812345678";

fn sm3(data: &[u8]) -> B256 {
	B256::from_slice(&Sm3::digest(data))
}

fn address_of(public_key: &[u8; 64]) -> Address {
	Address::from_slice(&sm3(public_key)[12..])
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SmProfile;

impl CryptoProfile for SmProfile {
	fn kind(&self) -> CryptoKind {
		CryptoKind::Gm
	}

	fn hash(&self, data: &[u8]) -> B256 {
		sm3(data)
	}

	fn generate_key_pair(&self) -> Arc<dyn KeyPair> {
		loop {
			// Key derivation only fails for degenerate scalars; draw again.
			if let Ok(key_pair) = SmKeyPair::from_secret(SecretKey::random(&mut OsRng)) {
				return Arc::new(key_pair);
			}
		}
	}

	fn load_key_pair(&self, secret: &[u8]) -> Result<Arc<dyn KeyPair>, AccountError> {
		let secret = SecretKey::from_slice(secret)
			.map_err(|e| AccountError::InvalidKey(format!("Invalid SM2 key: {}", e)))?;
		Ok(Arc::new(SmKeyPair::from_secret(secret)?))
	}

	fn recover_signer(
		&self,
		hash: &B256,
		signature: &SignatureData,
	) -> Result<Address, AccountError> {
		let SignatureData::Sm2 { public_key, r, s } = signature else {
			return Err(AccountError::ProfileMismatch {
				expected: CryptoKind::Gm,
				actual: signature.kind(),
			});
		};

		let mut sec1 = [0u8; 65];
		sec1[0] = 0x04;
		sec1[1..].copy_from_slice(public_key);
		let verifying_key = VerifyingKey::from_sec1_bytes(DEFAULT_DIST_ID, &sec1)
			.map_err(|e| AccountError::InvalidSignature(format!("Invalid public key: {}", e)))?;

		let mut rs = [0u8; 64];
		rs[..32].copy_from_slice(&r.to_be_bytes::<32>());
		rs[32..].copy_from_slice(&s.to_be_bytes::<32>());
		let signature = Sm2Signature::from_slice(&rs)
			.map_err(|e| AccountError::InvalidSignature(e.to_string()))?;

		verifying_key
			.verify(hash.as_slice(), &signature)
			.map_err(|e| AccountError::InvalidSignature(e.to_string()))?;

		Ok(address_of(public_key))
	}
}

/// SM2 key held in memory.
pub struct SmKeyPair {
	secret: SecretKey,
	signing_key: SigningKey,
	public_key: [u8; 64],
	address: Address,
}

impl SmKeyPair {
	fn from_secret(secret: SecretKey) -> Result<Self, AccountError> {
		let signing_key = SigningKey::new(DEFAULT_DIST_ID, &secret)
			.map_err(|e| AccountError::InvalidKey(format!("Invalid SM2 key: {}", e)))?;

		let point = secret.public_key().to_encoded_point(false);
		let encoded = point.as_bytes();
		if encoded.len() != 65 {
			return Err(AccountError::InvalidKey(
				"Unexpected SM2 public key length".to_string(),
			));
		}
		let mut public_key = [0u8; 64];
		public_key.copy_from_slice(&encoded[1..]);

		Ok(Self {
			address: address_of(&public_key),
			secret,
			signing_key,
			public_key,
		})
	}

	pub fn public_key(&self) -> &[u8; 64] {
		&self.public_key
	}
}

impl fmt::Debug for SmKeyPair {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SmKeyPair")
			.field("address", &self.address)
			.finish_non_exhaustive()
	}
}

impl KeyPair for SmKeyPair {
	fn kind(&self) -> CryptoKind {
		CryptoKind::Gm
	}

	fn address(&self) -> Address {
		self.address
	}

	fn secret_bytes(&self) -> Vec<u8> {
		self.secret.to_bytes().to_vec()
	}

	fn sign_hash(&self, hash: &B256) -> Result<SignatureData, AccountError> {
		let signature: Sm2Signature = self
			.signing_key
			.try_sign(hash.as_slice())
			.map_err(|e| AccountError::SigningFailed(format!("SM2 signing failed: {}", e)))?;

		let bytes = signature.to_bytes();
		Ok(SignatureData::Sm2 {
			public_key: self.public_key,
			r: U256::from_be_slice(&bytes[..32]),
			s: U256::from_be_slice(&bytes[32..]),
		})
	}
}
