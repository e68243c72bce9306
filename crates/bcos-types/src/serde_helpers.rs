//! Serde helpers for ledger quantities.
//!
//! The ledger client reports block numbers, indexes and statuses either as
//! JSON numbers, `0x`-prefixed hex strings or plain decimal strings depending
//! on the node version. These helpers accept all three and always write hex.

use serde::{de, Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
	Number(u64),
	Text(String),
}

/// Parses a quantity string. `0x`-prefixed input is hex, anything else is
/// decimal. `""` and `"0x"` are zero.
pub fn parse_quantity(value: &str) -> Result<u64, String> {
	let value = value.trim();
	if let Some(digits) = value
		.strip_prefix("0x")
		.or_else(|| value.strip_prefix("0X"))
	{
		if digits.is_empty() {
			return Ok(0);
		}
		return u64::from_str_radix(digits, 16)
			.map_err(|e| format!("Invalid hex quantity '{}': {}", value, e));
	}
	if value.is_empty() {
		return Ok(0);
	}
	value
		.parse::<u64>()
		.map_err(|e| format!("Invalid decimal quantity '{}': {}", value, e))
}

/// `0x`-prefixed lowercase hex without leading zeros.
pub fn format_quantity(value: u64) -> String {
	format!("0x{:x}", value)
}

pub mod quantity {
	use super::*;

	pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&format_quantity(*value))
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
	where
		D: Deserializer<'de>,
	{
		match RawQuantity::deserialize(deserializer)? {
			RawQuantity::Number(n) => Ok(n),
			RawQuantity::Text(s) => parse_quantity(&s).map_err(de::Error::custom),
		}
	}
}

pub mod quantity_opt {
	use super::*;

	pub fn serialize<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match value {
			Some(v) => serializer.serialize_str(&format_quantity(*v)),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
	where
		D: Deserializer<'de>,
	{
		match Option::<RawQuantity>::deserialize(deserializer)? {
			None => Ok(None),
			Some(RawQuantity::Number(n)) => Ok(Some(n)),
			Some(RawQuantity::Text(s)) if s.trim().is_empty() => Ok(None),
			Some(RawQuantity::Text(s)) => parse_quantity(&s).map(Some).map_err(de::Error::custom),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde::Serialize;

	#[derive(Debug, Serialize, Deserialize, PartialEq)]
	struct Sample {
		#[serde(with = "quantity")]
		number: u64,
		#[serde(default, with = "quantity_opt")]
		index: Option<u64>,
	}

	#[test]
	fn test_parse_quantity_forms() {
		assert_eq!(parse_quantity("0x23").unwrap(), 35);
		assert_eq!(parse_quantity("35").unwrap(), 35);
		assert_eq!(parse_quantity("0x").unwrap(), 0);
		assert_eq!(parse_quantity("").unwrap(), 0);
		assert!(parse_quantity("0xzz").is_err());
		assert!(parse_quantity("abc").is_err());
	}

	#[test]
	fn test_quantity_accepts_numbers_and_strings() {
		let a: Sample = serde_json::from_str(r#"{"number": 9, "index": "0x2"}"#).unwrap();
		let b: Sample = serde_json::from_str(r#"{"number": "0x9", "index": 2}"#).unwrap();
		assert_eq!(a, b);

		let c: Sample = serde_json::from_str(r#"{"number": "9"}"#).unwrap();
		assert_eq!(c.index, None);
	}

	#[test]
	fn test_quantity_serializes_as_hex() {
		let sample = Sample {
			number: 255,
			index: None,
		};
		let json = serde_json::to_value(&sample).unwrap();
		assert_eq!(json["number"], "0xff");
		assert!(json["index"].is_null());
	}
}
