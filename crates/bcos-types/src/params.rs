//! Payload envelope for CALL and SEND_TRANSACTION requests.

use crate::transaction::TransactionRequest;
use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};

/// How the payload inside a [`TransactionParams`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubType {
	Call,
	SendTx,
	CallByProxy,
	SendTxByProxy,
}

impl SubType {
	pub fn is_by_proxy(self) -> bool {
		matches!(self, SubType::CallByProxy | SubType::SendTxByProxy)
	}

	pub fn is_send(self) -> bool {
		matches!(self, SubType::SendTx | SubType::SendTxByProxy)
	}
}

/// Routing metadata embedded in a proxy call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyRoute {
	pub resource: String,
	pub xa_transaction_id: Option<String>,
	pub xa_transaction_seq: u64,
}

/// Binary payload of a call or transaction, tagged by how it was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallPayload {
	/// ABI encoded call data addressed to the contract itself.
	Call { data: Bytes },
	/// Signed raw transaction addressed to the contract itself.
	SendTx { signed: Bytes },
	/// Call data addressed to the proxy contract.
	CallByProxy {
		data: Bytes,
		abi: Option<String>,
		route: ProxyRoute,
	},
	/// Signed raw transaction addressed to the proxy contract.
	SendTxByProxy {
		signed: Bytes,
		abi: Option<String>,
		route: ProxyRoute,
	},
}

impl CallPayload {
	pub fn sub_type(&self) -> SubType {
		match self {
			CallPayload::Call { .. } => SubType::Call,
			CallPayload::SendTx { .. } => SubType::SendTx,
			CallPayload::CallByProxy { .. } => SubType::CallByProxy,
			CallPayload::SendTxByProxy { .. } => SubType::SendTxByProxy,
		}
	}

	pub fn bytes(&self) -> &Bytes {
		match self {
			CallPayload::Call { data } | CallPayload::CallByProxy { data, .. } => data,
			CallPayload::SendTx { signed } | CallPayload::SendTxByProxy { signed, .. } => signed,
		}
	}

	pub fn abi(&self) -> Option<&str> {
		match self {
			CallPayload::CallByProxy { abi, .. } | CallPayload::SendTxByProxy { abi, .. } => {
				abi.as_deref()
			}
			_ => None,
		}
	}

	pub fn route(&self) -> Option<&ProxyRoute> {
		match self {
			CallPayload::CallByProxy { route, .. } | CallPayload::SendTxByProxy { route, .. } => {
				Some(route)
			}
			_ => None,
		}
	}
}

/// Wire form of a CALL or SEND_TRANSACTION request's data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionParams {
	pub transaction_request: TransactionRequest,
	pub data: Bytes,
	pub sub_type: SubType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub abi: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub from: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub to: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub resource: Option<String>,
	#[serde(
		rename = "xaTransactionID",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	pub xa_transaction_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub xa_transaction_seq: Option<u64>,
}

impl TransactionParams {
	pub fn new(transaction_request: TransactionRequest, payload: CallPayload) -> Self {
		let sub_type = payload.sub_type();
		let (data, abi, route) = match payload {
			CallPayload::Call { data } => (data, None, None),
			CallPayload::SendTx { signed } => (signed, None, None),
			CallPayload::CallByProxy { data, abi, route } => (data, abi, Some(route)),
			CallPayload::SendTxByProxy { signed, abi, route } => (signed, abi, Some(route)),
		};
		let (resource, xa_transaction_id, xa_transaction_seq) = match route {
			Some(route) => (
				Some(route.resource),
				route.xa_transaction_id,
				Some(route.xa_transaction_seq),
			),
			None => (None, None, None),
		};

		Self {
			transaction_request,
			data,
			sub_type,
			abi,
			from: None,
			to: None,
			resource,
			xa_transaction_id,
			xa_transaction_seq,
		}
	}

	pub fn with_from(mut self, from: impl Into<String>) -> Self {
		self.from = Some(from.into());
		self
	}

	pub fn with_to(mut self, to: impl Into<String>) -> Self {
		self.to = Some(to.into());
		self
	}

	/// Rebuilds the tagged payload from the flat wire form.
	pub fn payload(&self) -> CallPayload {
		let route = || ProxyRoute {
			resource: self.resource.clone().unwrap_or_default(),
			xa_transaction_id: self.xa_transaction_id.clone(),
			xa_transaction_seq: self.xa_transaction_seq.unwrap_or_default(),
		};
		match self.sub_type {
			SubType::Call => CallPayload::Call {
				data: self.data.clone(),
			},
			SubType::SendTx => CallPayload::SendTx {
				signed: self.data.clone(),
			},
			SubType::CallByProxy => CallPayload::CallByProxy {
				data: self.data.clone(),
				abi: self.abi.clone(),
				route: route(),
			},
			SubType::SendTxByProxy => CallPayload::SendTxByProxy {
				signed: self.data.clone(),
				abi: self.abi.clone(),
				route: route(),
			},
		}
	}

	pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
		serde_json::to_vec(self)
	}

	pub fn from_bytes(data: &[u8]) -> Result<Self, serde_json::Error> {
		serde_json::from_slice(data)
	}
}
