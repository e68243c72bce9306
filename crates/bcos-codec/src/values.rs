//! Conversion between router strings and ABI values.

use crate::CodecError;
use alloy_dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy_json_abi::Param;

/// Resolves the ABI types of a parameter list.
pub fn resolve_types(params: &[Param]) -> Result<Vec<DynSolType>, CodecError> {
	params
		.iter()
		.map(|param| {
			param
				.resolve()
				.map_err(|e| CodecError::Encode(format!("Unsupported type '{}': {}", param.ty, e)))
		})
		.collect()
}

/// Parses each argument as the type of its parameter.
pub fn coerce_args(params: &[Param], args: &[String]) -> Result<Vec<DynSolValue>, CodecError> {
	if params.len() != args.len() {
		return Err(CodecError::InvalidParameter(format!(
			"Expected {} arguments, got {}",
			params.len(),
			args.len()
		)));
	}

	resolve_types(params)?
		.iter()
		.zip(args)
		.map(|(ty, arg)| coerce(ty, arg))
		.collect()
}

fn coerce(ty: &DynSolType, arg: &str) -> Result<DynSolValue, CodecError> {
	match ty {
		// Plain strings are taken verbatim so commas and brackets survive.
		DynSolType::String => Ok(DynSolValue::String(arg.to_string())),
		_ => ty
			.coerce_str(arg)
			.map_err(|e| CodecError::Encode(format!("Cannot parse '{}' as {}: {}", arg, ty, e))),
	}
}

/// Renders a decoded value the way the router expects to read it back.
///
/// Integers are decimal, byte strings and addresses are `0x` hex and
/// compound values become JSON arrays of their rendered members.
pub fn format_value(value: &DynSolValue) -> String {
	match value {
		DynSolValue::String(s) => s.clone(),
		DynSolValue::Bool(b) => b.to_string(),
		DynSolValue::Uint(v, _) => v.to_string(),
		DynSolValue::Int(v, _) => v.to_string(),
		DynSolValue::Address(a) => format!("{:#x}", a),
		DynSolValue::Bytes(b) => format!("0x{}", hex::encode(b)),
		DynSolValue::FixedBytes(word, size) => format!("0x{}", hex::encode(&word[..*size])),
		DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
			serde_json::Value::Array(
				items
					.iter()
					.map(|item| serde_json::Value::String(format_value(item)))
					.collect(),
			)
			.to_string()
		}
		other => format!("{:?}", other),
	}
}

/// Flattens a decoded parameter tuple into one string per parameter.
pub fn format_params(decoded: DynSolValue) -> Vec<String> {
	match decoded {
		DynSolValue::Tuple(items) => items.iter().map(format_value).collect(),
		other => vec![format_value(&other)],
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Address, U256};

	fn param(ty: &str) -> Param {
		serde_json::from_value(serde_json::json!({"name": "", "type": ty})).unwrap()
	}

	#[test]
	fn test_coerce_args_by_type() {
		let params = vec![param("string"), param("uint256"), param("bool"), param("string[]")];
		let args = vec![
			"a, [b]".to_string(),
			"42".to_string(),
			"true".to_string(),
			r#"["x", "y"]"#.to_string(),
		];

		let values = coerce_args(&params, &args).unwrap();
		assert_eq!(values[0], DynSolValue::String("a, [b]".to_string()));
		assert_eq!(values[1], DynSolValue::Uint(U256::from(42), 256));
		assert_eq!(values[2], DynSolValue::Bool(true));
		assert_eq!(
			values[3],
			DynSolValue::Array(vec![
				DynSolValue::String("x".to_string()),
				DynSolValue::String("y".to_string())
			])
		);
	}

	#[test]
	fn test_coerce_args_count_mismatch() {
		let err = coerce_args(&[param("string")], &[]).unwrap_err();
		assert!(matches!(err, CodecError::InvalidParameter(_)));
	}

	#[test]
	fn test_coerce_rejects_bad_number() {
		let err = coerce_args(&[param("uint8")], &["lots".to_string()]).unwrap_err();
		assert!(matches!(err, CodecError::Encode(_)));
	}

	#[test]
	fn test_format_values() {
		assert_eq!(format_value(&DynSolValue::Uint(U256::from(7), 256)), "7");
		assert_eq!(format_value(&DynSolValue::Bytes(vec![0xab])), "0xab");
		assert_eq!(
			format_value(&DynSolValue::Address(Address::repeat_byte(0x11))),
			"0x1111111111111111111111111111111111111111"
		);
		assert_eq!(
			format_value(&DynSolValue::Array(vec![
				DynSolValue::Uint(U256::from(1), 8),
				DynSolValue::Bool(false)
			])),
			r#"["1","false"]"#
		);
	}
}
