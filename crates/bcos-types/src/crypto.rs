use serde::{Deserialize, Serialize};
use std::fmt;

/// Cryptographic family used by a chain.
///
/// `Ecdsa` is secp256k1 signing with Keccak-256 hashing. `Gm` is the
/// national profile with SM2 signing and SM3 hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CryptoKind {
	#[default]
	#[serde(rename = "ECDSA", alias = "ecdsa", alias = "secp256k1")]
	Ecdsa,
	#[serde(rename = "GM", alias = "gm", alias = "sm2p256v1")]
	Gm,
}

impl CryptoKind {
	/// Curve name used in key files and chain metadata.
	pub fn curve_name(&self) -> &'static str {
		match self {
			CryptoKind::Ecdsa => "secp256k1",
			CryptoKind::Gm => "sm2p256v1",
		}
	}
}

impl fmt::Display for CryptoKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CryptoKind::Ecdsa => write!(f, "ECDSA"),
			CryptoKind::Gm => write!(f, "GM"),
		}
	}
}
