//! Call data encoding for BCOS contracts.
//!
//! [`FunctionCodec`] turns a method name and string arguments into ABI call
//! data, either with the contract's ABI or with the default `string[]`
//! shape. [`ProxyCodec`] wraps such call data into a call to the proxy
//! contract. [`AbiCache`] keeps parsed ABIs per resource.

use thiserror::Error;

pub mod cache;
pub mod function;
pub mod proxy;
pub mod values;

pub use cache::{AbiCache, ContractAbi};
pub use function::FunctionCodec;
pub use proxy::{ProxyCodec, ProxyInvocation, UnwrappedCall};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
	#[error("Method not exist: {0}")]
	MethodNotExist(String),
	#[error("Invalid parameter: {0}")]
	InvalidParameter(String),
	#[error("ABI not exist: {0}")]
	AbiNotExist(String),
	#[error("Encode failed: {0}")]
	Encode(String),
	#[error("Decode failed: {0}")]
	Decode(String),
}

/// Decodes a hex string as the ledger writes it. `""` and `"0x"` are empty.
pub fn decode_hex(value: &str) -> Result<Vec<u8>, CodecError> {
	let value = value.trim();
	let digits = value
		.strip_prefix("0x")
		.or_else(|| value.strip_prefix("0X"))
		.unwrap_or(value);
	hex::decode(digits).map_err(|e| CodecError::Decode(format!("Invalid hex '{}': {}", value, e)))
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_decode_hex() {
		assert_eq!(decode_hex("0x").unwrap(), Vec::<u8>::new());
		assert_eq!(decode_hex("").unwrap(), Vec::<u8>::new());
		assert_eq!(decode_hex("0x0aFF").unwrap(), vec![0x0a, 0xff]);
		assert_eq!(decode_hex("0aff").unwrap(), vec![0x0a, 0xff]);
		assert!(matches!(decode_hex("0x0g"), Err(CodecError::Decode(_))));
	}
}
