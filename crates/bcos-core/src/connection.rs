//! Request dispatcher between the router and the ledger client.
//!
//! A request moves through `Received → Decoded → (Executing | Failed) →
//! Completed`. Decoding happens before the client is touched, so a request
//! of unknown type or with a malformed envelope never reaches the node.
//! Each accepted request invokes the client exactly once.

use crate::client::{ClientError, LedgerClient};
use crate::error::StubError;
use bcos_types::constants::DEFAULT_ADDRESS;
use bcos_types::{
	decode_block_number, encode_block_number, Request, RequestType, Response, StatusCode,
	TransactionParams, TransactionProof,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Decoded form of an inbound request.
#[derive(Debug)]
enum Dispatch {
	GetBlockNumber,
	GetBlockByNumber(u64),
	Call(TransactionParams),
	SendTransaction(TransactionParams),
	GetTransactionProof(String),
}

impl Dispatch {
	fn decode(request: &Request) -> Result<Self, String> {
		let kind = request
			.kind()
			.ok_or_else(|| format!("Unrecognized request type {}", request.request_type))?;

		match kind {
			RequestType::GetBlockNumber => Ok(Dispatch::GetBlockNumber),
			RequestType::GetBlockByNumber => decode_block_number(&request.data)
				.map(Dispatch::GetBlockByNumber)
				.ok_or_else(|| format!("Malformed block number of {} bytes", request.data.len())),
			RequestType::Call => {
				let params = decode_params(&request.data)?;
				if params.to.is_none() {
					return Err("Call has no destination".to_string());
				}
				Ok(Dispatch::Call(params))
			}
			RequestType::SendTransaction => decode_params(&request.data).map(Dispatch::SendTransaction),
			RequestType::GetTransactionProof => {
				let hash = std::str::from_utf8(&request.data)
					.map_err(|e| format!("Malformed transaction hash: {}", e))?
					.trim();
				if hash.is_empty() {
					return Err("Empty transaction hash".to_string());
				}
				Ok(Dispatch::GetTransactionProof(hash.to_string()))
			}
		}
	}

	fn kind(&self) -> RequestType {
		match self {
			Dispatch::GetBlockNumber => RequestType::GetBlockNumber,
			Dispatch::GetBlockByNumber(_) => RequestType::GetBlockByNumber,
			Dispatch::Call(_) => RequestType::Call,
			Dispatch::SendTransaction(_) => RequestType::SendTransaction,
			Dispatch::GetTransactionProof(_) => RequestType::GetTransactionProof,
		}
	}
}

fn decode_params(data: &[u8]) -> Result<TransactionParams, String> {
	TransactionParams::from_bytes(data).map_err(|e| format!("Malformed transaction params: {}", e))
}

/// Status reported when the client fails a request of `kind`.
fn failure_code(kind: RequestType) -> StatusCode {
	match kind {
		RequestType::GetBlockNumber => StatusCode::HandleGetBlockNumberFailed,
		RequestType::GetBlockByNumber => StatusCode::HandleGetBlockFailed,
		RequestType::Call => StatusCode::HandleCallRequestFailed,
		RequestType::SendTransaction => StatusCode::HandleSendTransactionFailed,
		RequestType::GetTransactionProof => StatusCode::UnclassifiedError,
	}
}

/// Stateless dispatcher over a shared [`LedgerClient`].
#[derive(Clone)]
pub struct Connection {
	client: Arc<dyn LedgerClient>,
}

impl Connection {
	pub fn new(client: Arc<dyn LedgerClient>) -> Self {
		Self { client }
	}

	pub fn client(&self) -> &Arc<dyn LedgerClient> {
		&self.client
	}

	/// Handles one request to completion.
	pub async fn handle(&self, request: Request) -> Response {
		debug!(request_type = request.request_type, "Received request");

		let dispatch = match Dispatch::decode(&request) {
			Ok(dispatch) => dispatch,
			Err(message) => {
				warn!(request_type = request.request_type, reason = %message, "Rejected request");
				return Response::failure(StatusCode::UnrecognizedRequestType, message);
			}
		};

		let kind = dispatch.kind();
		debug!(?kind, "Decoded request");

		let response = match self.execute(dispatch).await {
			Ok(data) => Response::success(data),
			Err(err) => {
				debug!(?kind, code = %err.code, "Request failed");
				Response::failure(err.code, err.message)
			}
		};

		debug!(?kind, error_code = response.error_code, "Completed request");
		response
	}

	/// Handles `request` on a spawned task and passes the response to `callback`.
	pub fn async_send<F>(&self, request: Request, callback: F) -> JoinHandle<()>
	where
		F: FnOnce(Response) + Send + 'static,
	{
		let connection = self.clone();
		tokio::spawn(async move {
			let response = connection.handle(request).await;
			callback(response);
		})
	}

	async fn execute(&self, dispatch: Dispatch) -> Result<Vec<u8>, StubError> {
		let kind = dispatch.kind();
		let client_failed = |err: ClientError| {
			error!(?kind, error = %err, "Ledger client failed");
			StubError::new(failure_code(kind), err.to_string())
		};

		match dispatch {
			Dispatch::GetBlockNumber => {
				let number = self.client.get_block_number().await.map_err(client_failed)?;
				Ok(encode_block_number(number))
			}
			Dispatch::GetBlockByNumber(number) => self
				.client
				.get_block_by_number(number, false)
				.await
				.map_err(client_failed)?
				.ok_or_else(|| {
					StubError::new(StatusCode::BlockNotExist, format!("Block {} not found", number))
				}),
			Dispatch::Call(params) => {
				let from = params.from.as_deref().unwrap_or(DEFAULT_ADDRESS);
				let to = params.to.as_deref().unwrap_or_default();
				let output = self
					.client
					.call(from, to, &params.data)
					.await
					.map_err(client_failed)?;
				// A reverted call is still a completed call.
				Ok(serde_json::to_vec(&output)?)
			}
			Dispatch::SendTransaction(params) => {
				let receipt = self
					.client
					.send_transaction(&params.data)
					.await
					.map_err(client_failed)?
					.filter(|receipt| !receipt.is_empty())
					.ok_or_else(|| {
						StubError::new(
							StatusCode::TransactionReceiptNotExist,
							"Transaction receipt not found",
						)
					})?;
				Ok(serde_json::to_vec(&receipt)?)
			}
			Dispatch::GetTransactionProof(hash) => {
				let trans_with_proof = self
					.client
					.get_transaction_with_proof(&hash)
					.await
					.map_err(client_failed)?
					.ok_or_else(|| {
						StubError::new(
							StatusCode::TransactionNotExist,
							format!("Transaction {} not found", hash),
						)
					})?;
				let receipt_with_proof = self
					.client
					.get_transaction_receipt_with_proof(&hash)
					.await
					.map_err(client_failed)?
					.filter(|receipt| !receipt.transaction_receipt.is_empty())
					.ok_or_else(|| {
						StubError::new(
							StatusCode::TransactionReceiptNotExist,
							format!("Receipt of {} not found", hash),
						)
					})?;
				Ok(serde_json::to_vec(&TransactionProof {
					trans_with_proof,
					receipt_with_proof,
				})?)
			}
		}
	}
}
