//! Proxy contract call wrapping.
//!
//! Calls routed through the proxy contract carry the target resource, the
//! target method signature and the target's encoded arguments as parameters
//! of one of four proxy methods. Distributed transactions use the XA
//! variants; everything else uses the `WithoutXa` variants, which forward
//! the target call data untouched.

use crate::function::FunctionCodec;
use crate::CodecError;
use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Bytes, U256};
use tracing::debug;

pub const SEND_TRANSACTION: &str = "sendTransaction(string,string,uint256,string,string,bytes)";
pub const CONSTANT_CALL: &str = "constantCall(string,string,string,bytes)";
pub const SEND_TRANSACTION_WITHOUT_XA: &str = "sendTransactionWithoutXa(string,string,bytes)";
pub const CONSTANT_CALL_WITHOUT_XA: &str = "constantCallWithoutXa(string,bytes)";

/// A decoded proxy call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyInvocation {
	SendTransaction {
		uid: String,
		xa_transaction_id: String,
		xa_transaction_seq: u64,
		path: String,
		method_signature: String,
		args: Bytes,
	},
	ConstantCall {
		xa_transaction_id: String,
		path: String,
		method_signature: String,
		args: Bytes,
	},
	SendTransactionWithoutXa {
		uid: String,
		name: String,
		payload: Bytes,
	},
	ConstantCallWithoutXa {
		name: String,
		payload: Bytes,
	},
}

impl ProxyInvocation {
	/// Path or name of the contract the proxy forwards to.
	pub fn target(&self) -> &str {
		match self {
			ProxyInvocation::SendTransaction { path, .. }
			| ProxyInvocation::ConstantCall { path, .. } => path,
			ProxyInvocation::SendTransactionWithoutXa { name, .. }
			| ProxyInvocation::ConstantCallWithoutXa { name, .. } => name,
		}
	}

	pub fn xa_transaction_id(&self) -> Option<&str> {
		match self {
			ProxyInvocation::SendTransaction {
				xa_transaction_id, ..
			}
			| ProxyInvocation::ConstantCall {
				xa_transaction_id, ..
			} => Some(xa_transaction_id),
			_ => None,
		}
	}
}

/// Target method and arguments recovered from a proxy call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwrappedCall {
	pub target: String,
	pub method: String,
	pub args: Option<Vec<String>>,
}

fn text(value: &str) -> DynSolValue {
	DynSolValue::String(value.to_string())
}

#[derive(Debug, Clone)]
pub struct ProxyCodec {
	functions: FunctionCodec,
}

impl ProxyCodec {
	pub fn new(functions: FunctionCodec) -> Self {
		Self { functions }
	}

	pub fn functions(&self) -> &FunctionCodec {
		&self.functions
	}

	fn call(&self, signature: &str, params: Vec<DynSolValue>) -> Bytes {
		let mut out = self.functions.selector(signature).to_vec();
		out.extend(DynSolValue::Tuple(params).abi_encode_params());
		Bytes::from(out)
	}

	/// Wraps `args` (encoded without selector) into a proxy `sendTransaction`
	/// under a fresh uid.
	pub fn wrap_send(
		&self,
		target: &str,
		xa_transaction_id: &str,
		xa_transaction_seq: u64,
		method_signature: &str,
		args: &[u8],
	) -> Bytes {
		let uid = uuid::Uuid::new_v4().simple().to_string();
		self.wrap_send_with_uid(
			&uid,
			target,
			xa_transaction_id,
			xa_transaction_seq,
			method_signature,
			args,
		)
	}

	pub fn wrap_send_with_uid(
		&self,
		uid: &str,
		target: &str,
		xa_transaction_id: &str,
		xa_transaction_seq: u64,
		method_signature: &str,
		args: &[u8],
	) -> Bytes {
		self.call(
			SEND_TRANSACTION,
			vec![
				text(uid),
				text(xa_transaction_id),
				DynSolValue::Uint(U256::from(xa_transaction_seq), 256),
				text(target),
				text(method_signature),
				DynSolValue::Bytes(args.to_vec()),
			],
		)
	}

	/// Read-only analogue of [`wrap_send`](Self::wrap_send).
	pub fn wrap_call(
		&self,
		target: &str,
		xa_transaction_id: &str,
		method_signature: &str,
		args: &[u8],
	) -> Bytes {
		self.call(
			CONSTANT_CALL,
			vec![
				text(xa_transaction_id),
				text(target),
				text(method_signature),
				DynSolValue::Bytes(args.to_vec()),
			],
		)
	}

	/// Forwards full call data (selector included) to the contract `name`.
	pub fn wrap_send_without_xa(&self, name: &str, payload: &[u8]) -> Bytes {
		let uid = uuid::Uuid::new_v4().simple().to_string();
		self.call(
			SEND_TRANSACTION_WITHOUT_XA,
			vec![text(&uid), text(name), DynSolValue::Bytes(payload.to_vec())],
		)
	}

	pub fn wrap_call_without_xa(&self, name: &str, payload: &[u8]) -> Bytes {
		self.call(
			CONSTANT_CALL_WITHOUT_XA,
			vec![text(name), DynSolValue::Bytes(payload.to_vec())],
		)
	}

	/// Decodes a proxy call by its selector.
	pub fn decode(&self, payload: &[u8]) -> Result<ProxyInvocation, CodecError> {
		if payload.len() < 4 {
			return Err(CodecError::Decode("Proxy payload has no selector".to_string()));
		}
		let (selector, body) = payload.split_at(4);

		let signatures = [
			SEND_TRANSACTION,
			CONSTANT_CALL,
			SEND_TRANSACTION_WITHOUT_XA,
			CONSTANT_CALL_WITHOUT_XA,
		];
		let signature = signatures
			.into_iter()
			.find(|sig| self.functions.selector(sig) == selector)
			.ok_or_else(|| {
				CodecError::MethodNotExist(format!(
					"Selector 0x{} is not a proxy method",
					hex::encode(selector)
				))
			})?;

		let params = signature.find('(').map_or("()", |start| &signature[start..]);
		let mut fields = Fields::decode(params, body)?;
		let invocation = match signature {
			SEND_TRANSACTION => ProxyInvocation::SendTransaction {
				uid: fields.string()?,
				xa_transaction_id: fields.string()?,
				xa_transaction_seq: fields.uint()?,
				path: fields.string()?,
				method_signature: fields.string()?,
				args: fields.bytes()?,
			},
			CONSTANT_CALL => ProxyInvocation::ConstantCall {
				xa_transaction_id: fields.string()?,
				path: fields.string()?,
				method_signature: fields.string()?,
				args: fields.bytes()?,
			},
			SEND_TRANSACTION_WITHOUT_XA => ProxyInvocation::SendTransactionWithoutXa {
				uid: fields.string()?,
				name: fields.string()?,
				payload: fields.bytes()?,
			},
			_ => ProxyInvocation::ConstantCallWithoutXa {
				name: fields.string()?,
				payload: fields.bytes()?,
			},
		};
		Ok(invocation)
	}

	/// Recovers the target method and arguments of a proxy call.
	///
	/// `abi` is the ABI of the target contract; without it the inner
	/// arguments cannot be interpreted.
	pub fn unwrap(&self, payload: &[u8], abi: Option<&JsonAbi>) -> Result<UnwrappedCall, CodecError> {
		let abi = abi.ok_or_else(|| {
			CodecError::InvalidParameter("ABI is required to decode a proxy call".to_string())
		})?;

		let invocation = self.decode(payload)?;
		let target = invocation.target().to_string();
		debug!(target = %target, "Unwrapping proxy call");

		let (function, args) = match &invocation {
			ProxyInvocation::SendTransaction {
				method_signature,
				args,
				..
			}
			| ProxyInvocation::ConstantCall {
				method_signature,
				args,
				..
			} => {
				let function = abi
					.functions()
					.find(|f| f.signature() == *method_signature)
					.ok_or_else(|| CodecError::MethodNotExist(method_signature.clone()))?;
				let decoded = if function.inputs.is_empty() {
					None
				} else {
					Some(self.functions.decode_params(&function.inputs, args)?)
				};
				(function, decoded)
			}
			ProxyInvocation::SendTransactionWithoutXa { payload, .. }
			| ProxyInvocation::ConstantCallWithoutXa { payload, .. } => {
				let function = self.functions.function_by_selector(abi, payload)?;
				(function, self.functions.decode_with_abi_input(function, payload)?)
			}
		};

		Ok(UnwrappedCall {
			target,
			method: function.name.clone(),
			args,
		})
	}

	/// Encodes the `bytes` value every proxy method returns.
	pub fn encode_output(&self, inner: &[u8]) -> Bytes {
		Bytes::from(DynSolValue::Tuple(vec![DynSolValue::Bytes(inner.to_vec())]).abi_encode_params())
	}

	/// Extracts the target's return data from a proxy return value.
	pub fn decode_output(&self, output: &[u8]) -> Result<Bytes, CodecError> {
		if output.is_empty() {
			return Ok(Bytes::new());
		}
		let mut fields = Fields::decode("(bytes)", output)?;
		fields.bytes()
	}
}

/// Positional reader over decoded proxy parameters.
struct Fields(std::vec::IntoIter<DynSolValue>);

impl Fields {
	fn decode(types: &str, body: &[u8]) -> Result<Self, CodecError> {
		let ty = DynSolType::parse(types)
			.map_err(|e| CodecError::Decode(format!("Invalid proxy signature: {}", e)))?;
		match ty.abi_decode_params(body) {
			Ok(DynSolValue::Tuple(items)) => Ok(Fields(items.into_iter())),
			Ok(other) => Ok(Fields(vec![other].into_iter())),
			Err(e) => Err(CodecError::Decode(format!("Invalid proxy payload: {}", e))),
		}
	}

	fn next(&mut self) -> Result<DynSolValue, CodecError> {
		self.0
			.next()
			.ok_or_else(|| CodecError::Decode("Proxy payload is missing a field".to_string()))
	}

	fn string(&mut self) -> Result<String, CodecError> {
		match self.next()? {
			DynSolValue::String(s) => Ok(s),
			other => Err(CodecError::Decode(format!("Expected string, got {:?}", other))),
		}
	}

	fn uint(&mut self) -> Result<u64, CodecError> {
		match self.next()? {
			DynSolValue::Uint(v, _) => u64::try_from(v)
				.map_err(|_| CodecError::Decode(format!("Sequence {} does not fit in u64", v))),
			other => Err(CodecError::Decode(format!("Expected uint, got {:?}", other))),
		}
	}

	fn bytes(&mut self) -> Result<Bytes, CodecError> {
		match self.next()? {
			DynSolValue::Bytes(b) => Ok(Bytes::from(b)),
			other => Err(CodecError::Decode(format!("Expected bytes, got {:?}", other))),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::HELLO_ABI;
	use bcos_account::profile_for;
	use bcos_types::CryptoKind;

	fn codec(kind: CryptoKind) -> ProxyCodec {
		ProxyCodec::new(FunctionCodec::new(profile_for(kind)))
	}

	fn hello_abi() -> JsonAbi {
		serde_json::from_str(HELLO_ABI).unwrap()
	}

	fn args(values: &[&str]) -> Vec<String> {
		values.iter().map(|v| v.to_string()).collect()
	}

	#[test]
	fn test_send_round_trip() {
		for kind in [CryptoKind::Ecdsa, CryptoKind::Gm] {
			let proxy = codec(kind);
			let abi = hello_abi();
			let functions = proxy.functions();

			let cases: Vec<(&str, Vec<String>)> = vec![
				("set", args(&["hello"])),
				("set", args(&[""])),
				("add", args(&["1", "340282366920938463463374607431768211456"])),
			];
			for (method, call_args) in cases {
				let function = functions.function_by_name(&abi, method, call_args.len()).unwrap();
				let inner = functions.encode_params(&function.inputs, &call_args).unwrap();
				let payload =
					proxy.wrap_send("a.b.Hello", "xa-01", 7, &function.signature(), &inner);

				let call = proxy.unwrap(&payload, Some(&abi)).unwrap();
				assert_eq!(call.target, "a.b.Hello");
				assert_eq!(call.method, method);
				assert_eq!(call.args, Some(call_args));
			}
		}
	}

	#[test]
	fn test_call_round_trip_without_arguments() {
		let proxy = codec(CryptoKind::Ecdsa);
		let abi = hello_abi();
		let payload = proxy.wrap_call("a.b.Hello", "1", "get()", &[]);

		let call = proxy.unwrap(&payload, Some(&abi)).unwrap();
		assert_eq!(call.method, "get");
		assert_eq!(call.args, None);
	}

	#[test]
	fn test_without_xa_round_trip() {
		let proxy = codec(CryptoKind::Gm);
		let abi = hello_abi();
		let set = proxy.functions().function_by_name(&abi, "set", 1).unwrap();
		let inner = proxy.functions().encode_with_abi(set, &args(&["hi"])).unwrap();

		for payload in [
			proxy.wrap_send_without_xa("Hello", &inner),
			proxy.wrap_call_without_xa("Hello", &inner),
		] {
			let call = proxy.unwrap(&payload, Some(&abi)).unwrap();
			assert_eq!(call.target, "Hello");
			assert_eq!(call.method, "set");
			assert_eq!(call.args, Some(args(&["hi"])));
		}
	}

	#[test]
	fn test_decode_keeps_routing_fields() {
		let proxy = codec(CryptoKind::Ecdsa);
		let payload = proxy.wrap_send_with_uid("uid-1", "a.b.Hello", "xa", 3, "set(string)", &[1, 2]);

		match proxy.decode(&payload).unwrap() {
			ProxyInvocation::SendTransaction {
				uid,
				xa_transaction_id,
				xa_transaction_seq,
				path,
				method_signature,
				args,
			} => {
				assert_eq!(uid, "uid-1");
				assert_eq!(xa_transaction_id, "xa");
				assert_eq!(xa_transaction_seq, 3);
				assert_eq!(path, "a.b.Hello");
				assert_eq!(method_signature, "set(string)");
				assert_eq!(args, Bytes::from(vec![1, 2]));
			}
			other => panic!("unexpected invocation {:?}", other),
		}
	}

	#[test]
	fn test_unwrap_requires_abi() {
		let proxy = codec(CryptoKind::Ecdsa);
		let payload = proxy.wrap_call("a.b.Hello", "1", "get()", &[]);
		assert!(matches!(
			proxy.unwrap(&payload, None),
			Err(CodecError::InvalidParameter(_))
		));
	}

	#[test]
	fn test_unknown_proxy_selector() {
		let proxy = codec(CryptoKind::Ecdsa);
		let plain = proxy.functions().encode_default("set", None);
		assert!(matches!(
			proxy.unwrap(&plain, Some(&hello_abi())),
			Err(CodecError::MethodNotExist(_))
		));

		let payload = proxy.wrap_call("a.b.Hello", "1", "missing(string)", &[]);
		assert!(matches!(
			proxy.unwrap(&payload, Some(&hello_abi())),
			Err(CodecError::MethodNotExist(_))
		));
	}

	#[test]
	fn test_output_round_trip() {
		let proxy = codec(CryptoKind::Ecdsa);
		let inner = vec![0xaa; 40];
		let output = proxy.encode_output(&inner);
		assert_eq!(proxy.decode_output(&output).unwrap(), Bytes::from(inner));
		assert!(proxy.decode_output(&[]).unwrap().is_empty());
	}

	#[test]
	fn test_gm_selectors_differ() {
		let standard = codec(CryptoKind::Ecdsa).wrap_call_without_xa("Hello", &[]);
		let gm = codec(CryptoKind::Gm).wrap_call_without_xa("Hello", &[]);
		assert_ne!(standard[..4], gm[..4]);
		assert_eq!(standard[4..], gm[4..]);
	}
}
