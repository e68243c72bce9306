//! Mock ledger and fixtures shared by the unit tests.

use crate::client::{BlockManager, ClientError, LedgerClient};
use async_trait::async_trait;
use bcos_types::{
	Block, Bytes, CallOutput, ReceiptWithProof, TransactionReceipt, TransactionWithProof,
};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const BLOCK_9: &str = include_str!("../../bcos-verify/testdata/block_9.json");
pub const TX_PROOF_9: &str = include_str!("../../bcos-verify/testdata/transaction_proof_9.json");
pub const RECEIPT_PROOF_9: &str = include_str!("../../bcos-verify/testdata/receipt_proof_9.json");
pub const RECEIPT_9: &str = include_str!("../../bcos-verify/testdata/receipt_9.json");

/// Address the block 9 transaction was sent to.
pub const TARGET_9: &str = "0x7ba8711a62d7e1377988efff0cb9de45c6353169";

pub const HELLO_ABI: &str = r#"[
	{"type":"constructor","inputs":[{"name":"greeting","type":"string"}],"stateMutability":"nonpayable"},
	{"type":"function","name":"set","inputs":[{"name":"n","type":"string"}],"outputs":[],"stateMutability":"nonpayable"},
	{"type":"function","name":"get","inputs":[],"outputs":[{"name":"","type":"string"}],"stateMutability":"view"}
]"#;

pub fn fixture<T: DeserializeOwned>(json: &str) -> T {
	serde_json::from_str(json).unwrap()
}

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
}

/// Canned ledger client that counts every invocation.
#[derive(Default)]
pub struct MockLedgerClient {
	pub fail: bool,
	pub block_number: u64,
	pub block: Option<Vec<u8>>,
	pub call_output: CallOutput,
	pub receipt: Option<TransactionReceipt>,
	pub transaction: Option<TransactionWithProof>,
	pub receipt_with_proof: Option<ReceiptWithProof>,
	pub invocations: AtomicUsize,
	pub last_call: Mutex<Option<(String, String, Bytes)>>,
	pub last_sent: Mutex<Option<Bytes>>,
}

impl MockLedgerClient {
	/// Serves block 9 with its transaction, receipt and proofs.
	pub fn with_proofs() -> Self {
		Self {
			block_number: 9,
			block: Some(BLOCK_9.as_bytes().to_vec()),
			receipt: Some(fixture(RECEIPT_9)),
			transaction: Some(fixture(TX_PROOF_9)),
			receipt_with_proof: Some(fixture(RECEIPT_PROOF_9)),
			..Default::default()
		}
	}

	fn enter(&self) -> Result<(), ClientError> {
		self.invocations.fetch_add(1, Ordering::SeqCst);
		if self.fail {
			return Err(ClientError::Transport("mock failure".to_string()));
		}
		Ok(())
	}
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
	async fn get_block_number(&self) -> Result<u64, ClientError> {
		self.enter()?;
		Ok(self.block_number)
	}

	async fn get_block_by_number(
		&self,
		_number: u64,
		_only_header: bool,
	) -> Result<Option<Vec<u8>>, ClientError> {
		self.enter()?;
		Ok(self.block.clone())
	}

	async fn call(&self, from: &str, to: &str, data: &Bytes) -> Result<CallOutput, ClientError> {
		self.enter()?;
		*self.last_call.lock().unwrap() = Some((from.to_string(), to.to_string(), data.clone()));
		Ok(self.call_output.clone())
	}

	async fn send_transaction(
		&self,
		signed: &Bytes,
	) -> Result<Option<TransactionReceipt>, ClientError> {
		self.enter()?;
		*self.last_sent.lock().unwrap() = Some(signed.clone());
		Ok(self.receipt.clone())
	}

	async fn get_transaction_with_proof(
		&self,
		_hash: &str,
	) -> Result<Option<TransactionWithProof>, ClientError> {
		self.enter()?;
		Ok(self.transaction.clone())
	}

	async fn get_transaction_receipt_with_proof(
		&self,
		_hash: &str,
	) -> Result<Option<ReceiptWithProof>, ClientError> {
		self.enter()?;
		Ok(self.receipt_with_proof.clone())
	}
}

/// Block manager serving one fixed block.
#[derive(Default)]
pub struct MockBlockManager {
	pub block: Option<Block>,
	pub invocations: AtomicUsize,
}

impl MockBlockManager {
	pub fn block_9() -> Self {
		Self {
			block: Some(Block::from_ledger_json(BLOCK_9.as_bytes()).unwrap()),
			..Default::default()
		}
	}
}

#[async_trait]
impl BlockManager for MockBlockManager {
	async fn get_block(&self, number: u64) -> Result<Block, ClientError> {
		self.invocations.fetch_add(1, Ordering::SeqCst);
		self.block
			.clone()
			.filter(|block| block.number() == number)
			.ok_or_else(|| ClientError::Rejected(format!("block {} unavailable", number)))
	}
}
