//! Receipt encoding for the receipt Merkle tree.
//!
//! The field list depends on the node version:
//!
//! | field            | encoding | present              |
//! |------------------|----------|----------------------|
//! | root             | bytes    | always               |
//! | gasUsed          | integer  | always               |
//! | contractAddress  | bytes    | always               |
//! | logsBloom        | bytes    | always               |
//! | status           | integer  | always               |
//! | output           | bytes    | always               |
//! | remainGas        | integer  | minor version >= 9   |
//! | logs             | list     | always               |
//!
//! Each log is `[address, [topics...], data]`.

use crate::{decode_hex_field, VerifyError};
use alloy_primitives::U256;
use alloy_rlp::{Encodable, Header};
use bcos_types::{Log, NodeVersion, TransactionReceipt};

/// Which optional receipt fields a node version includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiptEncoding {
	pub remain_gas: bool,
}

impl ReceiptEncoding {
	pub fn for_version(version: Option<&NodeVersion>) -> Self {
		Self {
			remain_gas: version.is_some_and(|v| v.has_remain_gas()),
		}
	}

	/// RLP of the receipt after [`normalize`].
	pub fn encode(&self, receipt: &TransactionReceipt) -> Result<Vec<u8>, VerifyError> {
		let receipt = normalize(receipt)?;

		let mut fields = Vec::new();
		decode_hex_field("root", &receipt.root)?[..].encode(&mut fields);
		quantity("gasUsed", &receipt.gas_used)?.encode(&mut fields);
		decode_hex_field("contractAddress", &receipt.contract_address)?[..].encode(&mut fields);
		decode_hex_field("logsBloom", &receipt.logs_bloom)?[..].encode(&mut fields);
		receipt.status.encode(&mut fields);
		decode_hex_field("output", &receipt.output)?[..].encode(&mut fields);
		if self.remain_gas {
			let remain = receipt.remain_gas.as_deref().unwrap_or("0x0");
			quantity("remainGas", remain)?.encode(&mut fields);
		}

		let mut logs = Vec::new();
		for log in &receipt.logs {
			logs.extend(encode_log(log)?);
		}
		list(&logs, &mut fields);

		let mut out = Vec::new();
		list(&fields, &mut out);
		Ok(out)
	}
}

/// Returns a copy with `gasUsed` and `remainGas` in `0x` hex form.
///
/// A `gasUsed` without prefix is decimal and is converted; a `remainGas`
/// without prefix is already hex and only gains the prefix. Applying this
/// twice gives the same result as applying it once.
pub fn normalize(receipt: &TransactionReceipt) -> Result<TransactionReceipt, VerifyError> {
	let mut normalized = receipt.clone();

	let gas_used = receipt.gas_used.trim();
	if !gas_used.starts_with("0x") {
		let value = if gas_used.is_empty() {
			U256::ZERO
		} else {
			U256::from_str_radix(gas_used, 10).map_err(|e| VerifyError::InvalidField {
				field: "gasUsed",
				reason: format!("'{}': {}", gas_used, e),
			})?
		};
		normalized.gas_used = format!("0x{:x}", value);
	}

	if let Some(remain) = receipt.remain_gas.as_deref() {
		if !remain.starts_with("0x") {
			normalized.remain_gas = Some(format!("0x{}", remain));
		}
	}

	Ok(normalized)
}

fn quantity(field: &'static str, value: &str) -> Result<U256, VerifyError> {
	let digits = value.trim().trim_start_matches("0x");
	if digits.is_empty() {
		return Ok(U256::ZERO);
	}
	U256::from_str_radix(digits, 16).map_err(|e| VerifyError::InvalidField {
		field,
		reason: format!("'{}': {}", value, e),
	})
}

fn encode_log(log: &Log) -> Result<Vec<u8>, VerifyError> {
	let mut topics = Vec::new();
	for topic in &log.topics {
		decode_hex_field("log topic", topic)?[..].encode(&mut topics);
	}

	let mut fields = Vec::new();
	decode_hex_field("log address", &log.address)?[..].encode(&mut fields);
	list(&topics, &mut fields);
	decode_hex_field("log data", &log.data)?[..].encode(&mut fields);

	let mut out = Vec::new();
	list(&fields, &mut out);
	Ok(out)
}

fn list(payload: &[u8], out: &mut Vec<u8>) {
	Header {
		list: true,
		payload_length: payload.len(),
	}
	.encode(out);
	out.extend_from_slice(payload);
}

#[cfg(test)]
mod tests {
	use super::*;

	fn receipt(gas_used: &str, remain_gas: Option<&str>) -> TransactionReceipt {
		TransactionReceipt {
			gas_used: gas_used.to_string(),
			remain_gas: remain_gas.map(str::to_string),
			..Default::default()
		}
	}

	#[test]
	fn test_normalize_gas_used() {
		assert_eq!(normalize(&receipt("32812", None)).unwrap().gas_used, "0x802c");
		assert_eq!(normalize(&receipt("0x802c", None)).unwrap().gas_used, "0x802c");
		assert_eq!(normalize(&receipt("", None)).unwrap().gas_used, "0x0");
		assert!(normalize(&receipt("12ab", None)).is_err());
	}

	#[test]
	fn test_normalize_is_idempotent() {
		let original = receipt("32812", Some("ff"));
		let once = normalize(&original).unwrap();
		let twice = normalize(&once).unwrap();
		assert_eq!(once, twice);
		assert_eq!(once.remain_gas.as_deref(), Some("0xff"));
		// the input is left untouched
		assert_eq!(original.gas_used, "32812");
	}

	#[test]
	fn test_version_table() {
		assert!(!ReceiptEncoding::for_version(None).remain_gas);
		assert!(!ReceiptEncoding::for_version(Some(&NodeVersion::new(3, 2, 0))).remain_gas);
		assert!(ReceiptEncoding::for_version(Some(&NodeVersion::new(2, 9, 0))).remain_gas);
	}

	#[test]
	fn test_remain_gas_changes_encoding() {
		let receipt = receipt("0x1", Some("0x2"));
		let without = ReceiptEncoding { remain_gas: false }.encode(&receipt).unwrap();
		let with = ReceiptEncoding { remain_gas: true }.encode(&receipt).unwrap();
		assert_eq!(with.len(), without.len() + 1);
	}

	#[test]
	fn test_log_encoding() {
		let mut receipt = receipt("0x1", None);
		receipt.logs.push(Log {
			address: "0x7ba8711a62d7e1377988efff0cb9de45c6353169".to_string(),
			topics: vec!["0x01".to_string()],
			data: "0x".to_string(),
		});
		let encoded = ReceiptEncoding::default().encode(&receipt).unwrap();
		// [address(0x94 + 20 bytes), [0x01], 0x80]
		let log = [
			&[0xd8, 0x94][..],
			&hex::decode("7ba8711a62d7e1377988efff0cb9de45c6353169").unwrap(),
			&[0xc1, 0x01, 0x80],
		]
		.concat();
		assert!(encoded.windows(log.len()).any(|w| w == log.as_slice()));

		receipt.logs[0].data = "0xzz".to_string();
		assert!(ReceiptEncoding::default().encode(&receipt).is_err());
	}
}
