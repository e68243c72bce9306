//! Request and response envelopes exchanged with the router.

use crate::status::StatusCode;
use serde::{Deserialize, Serialize};

/// Kinds of request the connection understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum RequestType {
	Call = 1000,
	SendTransaction = 1001,
	GetBlockNumber = 1002,
	GetBlockByNumber = 1003,
	GetTransactionProof = 1004,
}

impl RequestType {
	pub fn code(self) -> i32 {
		self as i32
	}

	pub fn from_code(code: i32) -> Option<Self> {
		match code {
			1000 => Some(RequestType::Call),
			1001 => Some(RequestType::SendTransaction),
			1002 => Some(RequestType::GetBlockNumber),
			1003 => Some(RequestType::GetBlockByNumber),
			1004 => Some(RequestType::GetTransactionProof),
			_ => None,
		}
	}
}

/// Inbound envelope. `request_type` stays a raw integer so unknown values
/// can be reported instead of rejected at deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
	#[serde(rename = "type")]
	pub request_type: i32,
	#[serde(default)]
	pub data: Vec<u8>,
}

impl Request {
	pub fn new(request_type: RequestType, data: Vec<u8>) -> Self {
		Self {
			request_type: request_type.code(),
			data,
		}
	}

	pub fn kind(&self) -> Option<RequestType> {
		RequestType::from_code(self.request_type)
	}
}

/// Outbound envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
	pub error_code: i32,
	pub message: String,
	#[serde(default)]
	pub data: Vec<u8>,
}

impl Response {
	pub fn success(data: Vec<u8>) -> Self {
		Self {
			error_code: StatusCode::Success.code(),
			message: "Success".to_string(),
			data,
		}
	}

	pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
		Self {
			error_code: status.code(),
			message: message.into(),
			data: Vec::new(),
		}
	}

	pub fn is_success(&self) -> bool {
		self.error_code == StatusCode::Success.code()
	}

	pub fn status(&self) -> Option<StatusCode> {
		StatusCode::from_code(self.error_code)
	}
}

/// Block numbers travel as big-endian bytes.
pub fn encode_block_number(number: u64) -> Vec<u8> {
	number.to_be_bytes().to_vec()
}

/// Inverse of [`encode_block_number`]. Shorter inputs are left padded,
/// empty or oversized inputs are rejected.
pub fn decode_block_number(data: &[u8]) -> Option<u64> {
	if data.is_empty() || data.len() > 8 {
		return None;
	}
	let mut buf = [0u8; 8];
	buf[8 - data.len()..].copy_from_slice(data);
	Some(u64::from_be_bytes(buf))
}
