//! Router-level transaction request and response types.

use crate::status::StatusCode;
use serde::{Deserialize, Serialize};

/// Distributed transaction options carried alongside a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOptions {
	#[serde(
		rename = "XA_TRANSACTION_ID",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	pub xa_transaction_id: Option<String>,
	#[serde(
		rename = "XA_TRANSACTION_SEQ",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	pub xa_transaction_seq: Option<u64>,
}

impl TransactionOptions {
	/// Returns the XA id and sequence when the request belongs to a
	/// distributed transaction. An id of `"0"` means no transaction.
	pub fn xa(&self) -> Option<(&str, u64)> {
		match self.xa_transaction_id.as_deref() {
			Some(id) if !id.is_empty() && id != "0" => {
				Some((id, self.xa_transaction_seq.unwrap_or_default()))
			}
			_ => None,
		}
	}
}

/// A method invocation as the router expresses it.
///
/// `args: None` and `args: Some(vec![])` are different requests and encode
/// differently on chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
	pub method: String,
	#[serde(default)]
	pub args: Option<Vec<String>>,
	#[serde(default)]
	pub options: TransactionOptions,
}

impl TransactionRequest {
	pub fn new(method: impl Into<String>, args: Option<Vec<String>>) -> Self {
		Self {
			method: method.into(),
			args,
			options: TransactionOptions::default(),
		}
	}

	pub fn with_xa(mut self, id: impl Into<String>, seq: u64) -> Self {
		self.options.xa_transaction_id = Some(id.into());
		self.options.xa_transaction_seq = Some(seq);
		self
	}
}

/// Outcome of a call or transaction.
///
/// `error_code` is [`StatusCode::Success`] only when `result` and `hash`
/// are meaningful. A reverted call carries the chain's execution status here
/// while the transport envelope still reports success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
	pub error_code: i32,
	pub message: String,
	#[serde(default)]
	pub result: Vec<String>,
	#[serde(default)]
	pub hash: String,
	#[serde(default)]
	pub block_number: u64,
}

impl TransactionResponse {
	pub fn success(result: Vec<String>) -> Self {
		Self {
			error_code: StatusCode::Success.code(),
			message: "Success".to_string(),
			result,
			..Default::default()
		}
	}

	pub fn reverted(status: i32, message: impl Into<String>) -> Self {
		Self {
			error_code: status,
			message: message.into(),
			..Default::default()
		}
	}

	pub fn is_success(&self) -> bool {
		self.error_code == StatusCode::Success.code()
	}
}

/// A transaction whose inclusion has been proven against a block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedTransaction {
	pub block_number: u64,
	pub transaction_hash: String,
	pub account_identity: String,
	pub resource: String,
	pub is_by_proxy: bool,
	pub transaction_request: TransactionRequest,
	pub transaction_response: TransactionResponse,
	pub receipt_bytes: Vec<u8>,
	pub tx_bytes: Vec<u8>,
}
