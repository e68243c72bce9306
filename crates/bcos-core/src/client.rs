//! Seams to the ledger: the node client and the trusted header source.

use crate::connection::Connection;
use async_trait::async_trait;
use bcos_types::{
	encode_block_number, Block, Bytes, CallOutput, ReceiptWithProof, Request, RequestType,
	TransactionReceipt, TransactionWithProof,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Transport error: {0}")]
	Transport(String),
	#[error("Node rejected request: {0}")]
	Rejected(String),
	#[error("Invalid node response: {0}")]
	InvalidResponse(String),
}

/// Asynchronous client of a BCOS node.
///
/// Implementations do their own networking, retries and timeouts. The stub
/// invokes each method at most once per request.
#[async_trait]
pub trait LedgerClient: Send + Sync {
	async fn get_block_number(&self) -> Result<u64, ClientError>;

	/// Block JSON as the node returns it, `None` when the block is unknown.
	async fn get_block_by_number(
		&self,
		number: u64,
		only_header: bool,
	) -> Result<Option<Vec<u8>>, ClientError>;

	async fn call(&self, from: &str, to: &str, data: &Bytes) -> Result<CallOutput, ClientError>;

	/// Submits a signed transaction and waits for its receipt.
	async fn send_transaction(
		&self,
		signed: &Bytes,
	) -> Result<Option<TransactionReceipt>, ClientError>;

	async fn get_transaction_with_proof(
		&self,
		hash: &str,
	) -> Result<Option<TransactionWithProof>, ClientError>;

	async fn get_transaction_receipt_with_proof(
		&self,
		hash: &str,
	) -> Result<Option<ReceiptWithProof>, ClientError>;
}

/// Source of block headers the stub trusts for proof verification.
#[async_trait]
pub trait BlockManager: Send + Sync {
	async fn get_block(&self, number: u64) -> Result<Block, ClientError>;
}

/// Block manager that reads blocks through a [`Connection`].
pub struct ConnectionBlockManager {
	connection: Connection,
}

impl ConnectionBlockManager {
	pub fn new(connection: Connection) -> Self {
		Self { connection }
	}
}

#[async_trait]
impl BlockManager for ConnectionBlockManager {
	async fn get_block(&self, number: u64) -> Result<Block, ClientError> {
		debug!(block_number = number, "Fetching block header");
		let response = self
			.connection
			.handle(Request::new(
				RequestType::GetBlockByNumber,
				encode_block_number(number),
			))
			.await;

		if !response.is_success() {
			return Err(ClientError::Rejected(format!(
				"error code {}: {}",
				response.error_code, response.message
			)));
		}

		Block::from_ledger_json(&response.data)
			.map_err(|e| ClientError::InvalidResponse(e.to_string()))
	}
}
