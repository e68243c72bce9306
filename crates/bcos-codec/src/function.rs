//! Method call encoding.
//!
//! Without a contract ABI every argument and every return value is a
//! `string[]`. A request with `args: None` targets `method()` and carries
//! only the selector; `args: Some(..)` targets `method(string[])`, even when
//! the array is empty. The two encodings are kept apart on decode.

use crate::values::{coerce_args, format_params, resolve_types};
use crate::CodecError;
use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_json_abi::{Function, JsonAbi, Param};
use alloy_primitives::Bytes;
use bcos_account::CryptoProfile;
use std::sync::Arc;

const SELECTOR_LEN: usize = 4;

/// Signature of the standard revert payload.
pub const REVERT_SIGNATURE: &str = "Error(string)";

fn string_array_type() -> DynSolType {
	DynSolType::Tuple(vec![DynSolType::Array(Box::new(DynSolType::String))])
}

fn encode_string_array(args: &[String]) -> Vec<u8> {
	DynSolValue::Tuple(vec![DynSolValue::Array(
		args.iter().cloned().map(DynSolValue::String).collect(),
	)])
	.abi_encode_params()
}

fn decode_string_array(data: &[u8]) -> Result<Vec<String>, CodecError> {
	let decoded = string_array_type()
		.abi_decode_params(data)
		.map_err(|e| CodecError::Decode(format!("Invalid string[] payload: {}", e)))?;

	match decoded {
		DynSolValue::Tuple(mut items) if items.len() == 1 => match items.remove(0) {
			DynSolValue::Array(values) => values
				.into_iter()
				.map(|v| match v {
					DynSolValue::String(s) => Ok(s),
					other => Err(CodecError::Decode(format!("Expected string, got {:?}", other))),
				})
				.collect(),
			other => Err(CodecError::Decode(format!("Expected string[], got {:?}", other))),
		},
		other => Err(CodecError::Decode(format!("Unexpected payload {:?}", other))),
	}
}

/// Encodes and decodes call data with selectors from one crypto profile.
#[derive(Debug, Clone)]
pub struct FunctionCodec {
	profile: Arc<dyn CryptoProfile>,
}

impl FunctionCodec {
	pub fn new(profile: Arc<dyn CryptoProfile>) -> Self {
		Self { profile }
	}

	pub fn profile(&self) -> &Arc<dyn CryptoProfile> {
		&self.profile
	}

	pub fn selector(&self, signature: &str) -> [u8; 4] {
		self.profile.selector(signature)
	}

	/// Signature used when no ABI is known.
	pub fn default_signature(method: &str, args: Option<&[String]>) -> String {
		match args {
			None => format!("{}()", method),
			Some(_) => format!("{}(string[])", method),
		}
	}

	pub fn encode_default(&self, method: &str, args: Option<&[String]>) -> Bytes {
		let mut out = self
			.selector(&Self::default_signature(method, args))
			.to_vec();
		if let Some(args) = args {
			out.extend(encode_string_array(args));
		}
		Bytes::from(out)
	}

	/// Decodes call data built by [`encode_default`](Self::encode_default).
	///
	/// Returns `None` for an empty payload or a `method()` call.
	pub fn decode_default_input(
		&self,
		method: &str,
		payload: &[u8],
	) -> Result<Option<Vec<String>>, CodecError> {
		if payload.is_empty() {
			return Ok(None);
		}
		if payload.len() < SELECTOR_LEN {
			return Err(CodecError::Decode(format!(
				"Payload of {} bytes has no selector",
				payload.len()
			)));
		}

		let (selector, body) = payload.split_at(SELECTOR_LEN);
		if selector == self.selector(&Self::default_signature(method, None)) {
			return Ok(None);
		}
		if selector == self.selector(&format!("{}(string[])", method)) {
			return decode_string_array(body).map(Some);
		}

		Err(CodecError::MethodNotExist(format!(
			"Selector 0x{} matches no signature of '{}'",
			hex::encode(selector),
			method
		)))
	}

	/// Decodes a `string[]` return value. Empty output yields `None`.
	pub fn decode_default_output(&self, output: &[u8]) -> Result<Option<Vec<String>>, CodecError> {
		if output.is_empty() {
			return Ok(None);
		}
		decode_string_array(output).map(Some)
	}

	/// Encodes `args` as the parameters of `params`, without selector.
	pub fn encode_params(&self, params: &[Param], args: &[String]) -> Result<Vec<u8>, CodecError> {
		Ok(DynSolValue::Tuple(coerce_args(params, args)?).abi_encode_params())
	}

	pub fn decode_params(&self, params: &[Param], data: &[u8]) -> Result<Vec<String>, CodecError> {
		let decoded = DynSolType::Tuple(resolve_types(params)?)
			.abi_decode_params(data)
			.map_err(|e| CodecError::Decode(e.to_string()))?;
		Ok(format_params(decoded))
	}

	/// Selector followed by the encoded arguments.
	pub fn encode_with_abi(&self, function: &Function, args: &[String]) -> Result<Bytes, CodecError> {
		let mut out = self.selector(&function.signature()).to_vec();
		out.extend(self.encode_params(&function.inputs, args)?);
		Ok(Bytes::from(out))
	}

	/// Decodes call data for `function`. Functions without inputs yield `None`.
	pub fn decode_with_abi_input(
		&self,
		function: &Function,
		payload: &[u8],
	) -> Result<Option<Vec<String>>, CodecError> {
		if payload.len() < SELECTOR_LEN
			|| payload[..SELECTOR_LEN] != self.selector(&function.signature())
		{
			return Err(CodecError::MethodNotExist(format!(
				"Payload is not a call of {}",
				function.signature()
			)));
		}
		if function.inputs.is_empty() {
			return Ok(None);
		}
		self.decode_params(&function.inputs, &payload[SELECTOR_LEN..])
			.map(Some)
	}

	pub fn decode_with_abi_output(
		&self,
		function: &Function,
		output: &[u8],
	) -> Result<Vec<String>, CodecError> {
		if function.outputs.is_empty() || output.is_empty() {
			return Ok(Vec::new());
		}
		self.decode_params(&function.outputs, output)
	}

	/// Finds the function of `abi` whose selector starts `payload`.
	pub fn function_by_selector<'a>(
		&self,
		abi: &'a JsonAbi,
		payload: &[u8],
	) -> Result<&'a Function, CodecError> {
		if payload.len() < SELECTOR_LEN {
			return Err(CodecError::Decode("Payload has no selector".to_string()));
		}
		let selector = &payload[..SELECTOR_LEN];
		abi.functions()
			.find(|f| self.selector(&f.signature()) == selector)
			.ok_or_else(|| {
				CodecError::MethodNotExist(format!(
					"No function with selector 0x{}",
					hex::encode(selector)
				))
			})
	}

	/// Finds `method` in `abi`, preferring the overload that takes
	/// `arg_count` arguments.
	pub fn function_by_name<'a>(
		&self,
		abi: &'a JsonAbi,
		method: &str,
		arg_count: usize,
	) -> Result<&'a Function, CodecError> {
		let overloads = abi
			.function(method)
			.filter(|overloads| !overloads.is_empty())
			.ok_or_else(|| CodecError::MethodNotExist(method.to_string()))?;

		Ok(overloads
			.iter()
			.find(|f| f.inputs.len() == arg_count)
			.unwrap_or(&overloads[0]))
	}

	/// Extracts the reason from an `Error(string)` revert payload.
	pub fn decode_revert_message(&self, output: &[u8]) -> Option<String> {
		if output.len() < SELECTOR_LEN || output[..SELECTOR_LEN] != self.selector(REVERT_SIGNATURE) {
			return None;
		}
		match DynSolType::Tuple(vec![DynSolType::String])
			.abi_decode_params(&output[SELECTOR_LEN..])
			.ok()?
		{
			DynSolValue::Tuple(items) => match items.first() {
				Some(DynSolValue::String(reason)) => Some(reason.clone()),
				_ => None,
			},
			_ => None,
		}
	}

	/// Builds an `Error(string)` revert payload.
	pub fn encode_revert_message(&self, reason: &str) -> Bytes {
		let mut out = self.selector(REVERT_SIGNATURE).to_vec();
		out.extend(DynSolValue::Tuple(vec![DynSolValue::String(reason.to_string())]).abi_encode_params());
		Bytes::from(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::HELLO_ABI;
	use bcos_account::profile_for;
	use bcos_types::CryptoKind;

	fn codec(kind: CryptoKind) -> FunctionCodec {
		FunctionCodec::new(profile_for(kind))
	}

	fn args(values: &[&str]) -> Vec<String> {
		values.iter().map(|v| v.to_string()).collect()
	}

	#[test]
	fn test_default_round_trip_keeps_null_and_empty_apart() {
		for kind in [CryptoKind::Ecdsa, CryptoKind::Gm] {
			let codec = codec(kind);
			let cases = [None, Some(vec![]), Some(args(&["aa", "bbb", "cccc"]))];
			for case in cases {
				let payload = codec.encode_default("funcName", case.as_deref());
				let decoded = codec.decode_default_input("funcName", &payload).unwrap();
				assert_eq!(decoded, case);
			}
		}
	}

	#[test]
	fn test_default_encodings_differ() {
		let codec = codec(CryptoKind::Ecdsa);
		let none = codec.encode_default("funcName", None);
		let empty = codec.encode_default("funcName", Some(&[][..]));
		let some = codec.encode_default("funcName", Some(args(&["a"]).as_slice()));

		assert_eq!(none.len(), 4);
		assert_eq!(none[..], codec.selector("funcName()"));
		assert_eq!(empty[..4], codec.selector("funcName(string[])"));
		// offset word plus zero length word
		assert_eq!(empty.len(), 4 + 64);
		assert_ne!(empty, some);
	}

	#[test]
	fn test_unknown_selector_is_method_not_exist() {
		let codec = codec(CryptoKind::Ecdsa);
		let payload = codec.encode_default("other", Some(args(&["a"]).as_slice()));
		let err = codec.decode_default_input("funcName", &payload).unwrap_err();
		assert!(matches!(err, CodecError::MethodNotExist(_)));

		let err = codec.decode_default_input("funcName", &[0xde, 0xad, 0xbe, 0xef, 0]).unwrap_err();
		assert!(matches!(err, CodecError::MethodNotExist(_)));
	}

	#[test]
	fn test_short_payloads() {
		let codec = codec(CryptoKind::Ecdsa);
		assert_eq!(codec.decode_default_input("f", &[]).unwrap(), None);
		assert!(matches!(
			codec.decode_default_input("f", &[1, 2]),
			Err(CodecError::Decode(_))
		));
	}

	#[test]
	fn test_default_output() {
		let codec = codec(CryptoKind::Ecdsa);
		assert_eq!(codec.decode_default_output(&[]).unwrap(), None);

		let encoded = encode_string_array(&args(&["x", "y"]));
		assert_eq!(
			codec.decode_default_output(&encoded).unwrap(),
			Some(args(&["x", "y"]))
		);

		let encoded = encode_string_array(&[]);
		assert_eq!(codec.decode_default_output(&encoded).unwrap(), Some(vec![]));
	}

	#[test]
	fn test_encode_with_abi_matches_ledger_input() {
		let codec = codec(CryptoKind::Ecdsa);
		let abi: JsonAbi = serde_json::from_str(HELLO_ABI).unwrap();
		let set = codec.function_by_name(&abi, "set", 1).unwrap();

		let payload = codec.encode_with_abi(set, &args(&["a"])).unwrap();
		// input of the set("a") transaction in block 9
		assert_eq!(
			hex::encode(&payload),
			"4ed3885e\
			 0000000000000000000000000000000000000000000000000000000000000020\
			 0000000000000000000000000000000000000000000000000000000000000001\
			 6100000000000000000000000000000000000000000000000000000000000000"
		);

		assert_eq!(
			codec.decode_with_abi_input(set, &payload).unwrap(),
			Some(args(&["a"]))
		);
		assert_eq!(codec.function_by_selector(&abi, &payload).unwrap().name, "set");
	}

	#[test]
	fn test_abi_lookup_failures() {
		let codec = codec(CryptoKind::Ecdsa);
		let abi: JsonAbi = serde_json::from_str(HELLO_ABI).unwrap();
		assert!(matches!(
			codec.function_by_name(&abi, "missing", 0),
			Err(CodecError::MethodNotExist(_))
		));
		assert!(matches!(
			codec.function_by_selector(&abi, &[0, 0, 0, 0]),
			Err(CodecError::MethodNotExist(_))
		));

		let get = codec.function_by_name(&abi, "get", 0).unwrap();
		let set_payload = codec.encode_default("set", Some(args(&["a"]).as_slice()));
		assert!(matches!(
			codec.decode_with_abi_input(get, &set_payload),
			Err(CodecError::MethodNotExist(_))
		));
	}

	#[test]
	fn test_abi_output_decoding() {
		let codec = codec(CryptoKind::Gm);
		let abi: JsonAbi = serde_json::from_str(HELLO_ABI).unwrap();
		let add = codec.function_by_name(&abi, "add", 2).unwrap();

		let output = codec.encode_params(&add.outputs, &args(&["3"])).unwrap();
		assert_eq!(codec.decode_with_abi_output(add, &output).unwrap(), args(&["3"]));

		let set = codec.function_by_name(&abi, "set", 1).unwrap();
		assert!(codec.decode_with_abi_output(set, &[]).unwrap().is_empty());
	}

	#[test]
	fn test_revert_message() {
		let codec = codec(CryptoKind::Ecdsa);
		let output = codec.encode_revert_message("not enough balance");
		assert_eq!(output[..4], [0x08, 0xc3, 0x79, 0xa0]);
		assert_eq!(
			codec.decode_revert_message(&output).as_deref(),
			Some("not enough balance")
		);
		assert_eq!(codec.decode_revert_message(&[1, 2, 3, 4]), None);
	}
}
