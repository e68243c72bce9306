//! Router-facing driver.
//!
//! The driver encodes transaction requests (directly or through the proxy
//! contract), signs them, hands them to a [`Connection`] and checks every
//! returned receipt against a block header from a trusted [`BlockManager`].

use crate::client::BlockManager;
use crate::connection::Connection;
use crate::error::StubError;
use alloy_json_abi::Function;
use bcos_account::{profile_for, Account, CryptoProfile};
use bcos_codec::cache::parse_abi;
use bcos_codec::{decode_hex, AbiCache, ContractAbi, FunctionCodec, ProxyCodec, ProxyInvocation};
use bcos_config::StubConfig;
use bcos_transaction::TransactionBuilder;
use bcos_types::constants::{BLOCK_LIMIT_STEP, CUSTOM_COMMAND_DEPLOY, PROXY_NAME};
use bcos_types::{
	decode_block_number, supports_transaction_proof, Address, Block, Bytes, CallOutput,
	CallPayload, MerkleProofUnit, NodeVersion, Path, ProxyRoute, Request, RequestType,
	StatusCode, TransactionParams, TransactionProof, TransactionReceipt, TransactionRequest,
	TransactionResponse, VerifiedTransaction,
};
use bcos_verify::{MerkleVerifier, ReceiptEncoding};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Chain-level settings a driver works with.
#[derive(Debug, Clone, Default)]
pub struct DriverProperties {
	pub group_id: String,
	pub chain_id: String,
	pub proxy_address: Option<Address>,
	pub node_version: Option<String>,
}

/// The resource a request targets and the identity it acts for.
#[derive(Clone)]
pub struct TransactionContext {
	pub account: Option<Account>,
	pub path: Path,
	pub block_manager: Option<Arc<dyn BlockManager>>,
}

impl TransactionContext {
	pub fn new(account: Account, path: Path, block_manager: Arc<dyn BlockManager>) -> Self {
		Self {
			account: Some(account),
			path,
			block_manager: Some(block_manager),
		}
	}
}

/// Encoded call data plus what is needed to route and decode it.
struct Invocation {
	data: Bytes,
	to: Address,
	/// Known only when the ABI was used, i.e. on the proxy path.
	function: Option<Function>,
	proxy: Option<(String, ProxyRoute)>,
}

impl Invocation {
	fn payload(&self, body: Bytes, send: bool) -> CallPayload {
		match (&self.proxy, send) {
			(None, false) => CallPayload::Call { data: body },
			(None, true) => CallPayload::SendTx { signed: body },
			(Some((abi, route)), false) => CallPayload::CallByProxy {
				data: body,
				abi: Some(abi.clone()),
				route: route.clone(),
			},
			(Some((abi, route)), true) => CallPayload::SendTxByProxy {
				signed: body,
				abi: Some(abi.clone()),
				route: route.clone(),
			},
		}
	}
}

pub struct Driver {
	profile: Arc<dyn CryptoProfile>,
	functions: FunctionCodec,
	proxy: ProxyCodec,
	builder: TransactionBuilder,
	verifier: MerkleVerifier,
	abis: AbiCache,
	properties: DriverProperties,
}

impl Driver {
	pub fn new(profile: Arc<dyn CryptoProfile>, properties: DriverProperties) -> Self {
		let functions = FunctionCodec::new(profile.clone());
		Self {
			proxy: ProxyCodec::new(functions.clone()),
			functions,
			builder: TransactionBuilder::new(profile.clone()),
			verifier: MerkleVerifier::new(profile.clone()),
			abis: AbiCache::new(),
			profile,
			properties,
		}
	}

	/// Builds a driver for the configured chain and seeds its ABI cache with
	/// the proxy and the configured resources.
	pub fn from_config(config: &StubConfig) -> Result<Self, StubError> {
		let proxy_address = config
			.proxy
			.as_ref()
			.map(|proxy| parse_address(&proxy.address))
			.transpose()?;

		let driver = Self::new(
			profile_for(config.chain.crypto),
			DriverProperties {
				group_id: config.chain.group_id.clone(),
				chain_id: config.chain.chain_id.clone(),
				proxy_address,
				node_version: config.chain.node_version.clone(),
			},
		);

		if let Some(proxy) = &config.proxy {
			driver.abis.register(PROXY_NAME, proxy_address, &proxy.abi)?;
		}
		for resource in &config.resources {
			let address = resource.address.as_deref().map(parse_address).transpose()?;
			driver.abis.register(&resource.name, address, &resource.abi)?;
		}

		info!(
			chain = %config.chain.name,
			crypto = %config.chain.crypto,
			resources = driver.abis.len(),
			"Driver configured"
		);
		Ok(driver)
	}

	pub fn profile(&self) -> &Arc<dyn CryptoProfile> {
		&self.profile
	}

	pub fn functions(&self) -> &FunctionCodec {
		&self.functions
	}

	pub fn proxy(&self) -> &ProxyCodec {
		&self.proxy
	}

	pub fn builder(&self) -> &TransactionBuilder {
		&self.builder
	}

	pub fn abis(&self) -> &AbiCache {
		&self.abis
	}

	pub fn properties(&self) -> &DriverProperties {
		&self.properties
	}

	/// Ensures a request carries everything a call or transaction needs.
	pub fn check_transaction_request<'a>(
		&self,
		context: &'a TransactionContext,
		request: &TransactionRequest,
	) -> Result<(&'a Account, &'a dyn BlockManager), StubError> {
		let account = context
			.account
			.as_ref()
			.ok_or_else(|| StubError::invalid_parameter("Account is missing"))?;
		let block_manager = context
			.block_manager
			.as_deref()
			.ok_or_else(|| StubError::invalid_parameter("Block manager is missing"))?;
		if request.method.trim().is_empty() {
			return Err(StubError::invalid_parameter("Method is empty"));
		}
		Ok((account, block_manager))
	}

	/// Recovers the transaction request carried by a CALL or
	/// SEND_TRANSACTION request. Other request types yield `None`.
	pub fn decode_transaction_request(
		&self,
		request: &Request,
	) -> Result<Option<TransactionRequest>, StubError> {
		if !matches!(
			request.kind(),
			Some(RequestType::Call | RequestType::SendTransaction)
		) {
			return Ok(None);
		}

		let params = TransactionParams::from_bytes(&request.data).map_err(|e| {
			StubError::invalid_parameter(format!("Malformed transaction params: {}", e))
		})?;
		let payload = params.payload();
		let sub_type = payload.sub_type();

		let data = if sub_type.is_send() {
			self.builder.decode(payload.bytes())?.transaction.data
		} else {
			payload.bytes().clone()
		};

		let embedded = &params.transaction_request;
		let (method, args) = if sub_type.is_by_proxy() {
			let abi_json = payload
				.abi()
				.ok_or_else(|| StubError::invalid_parameter("Proxy request carries no ABI"))?;
			let abi = parse_abi(abi_json)?;
			let unwrapped = self.proxy.unwrap(&data, Some(&abi))?;
			(unwrapped.method, unwrapped.args)
		} else {
			let args = self.functions.decode_default_input(&embedded.method, &data)?;
			(embedded.method.clone(), args)
		};

		Ok(Some(TransactionRequest {
			method,
			args,
			options: embedded.options.clone(),
		}))
	}

	/// Read-only invocation. A revert is reported in the response, not as
	/// an error.
	pub async fn call(
		&self,
		context: &TransactionContext,
		request: &TransactionRequest,
		by_proxy: bool,
		connection: &Connection,
	) -> Result<TransactionResponse, StubError> {
		let (account, _) = self.check_transaction_request(context, request)?;
		let invocation = self.encode_invocation(&context.path, request, by_proxy, false)?;

		let params = TransactionParams::new(
			request.clone(),
			invocation.payload(invocation.data.clone(), false),
		)
		.with_from(account.identity())
		.with_to(format!("{:#x}", invocation.to));

		let response = connection
			.handle(Request::new(RequestType::Call, params.to_bytes()?))
			.await;
		if !response.is_success() {
			return Err(StubError::from_response(
				&response,
				StatusCode::CallNotSuccessStatus,
			));
		}

		let output: CallOutput = serde_json::from_slice(&response.data)?;
		let raw_output = decode_hex(&output.output)?;
		if output.status != 0 {
			debug!(status = output.status, resource = %context.path, "Call reverted");
			return Ok(TransactionResponse {
				block_number: output.current_block_number,
				..self.reverted(output.status, &raw_output, None)
			});
		}

		let result = self.decode_output(invocation.function.as_ref(), true, &raw_output)?;
		Ok(TransactionResponse {
			block_number: output.current_block_number,
			..TransactionResponse::success(result)
		})
	}

	/// Signs and submits a transaction, then proves its receipt against the
	/// header of the block that includes it.
	pub async fn send_transaction(
		&self,
		context: &TransactionContext,
		request: &TransactionRequest,
		by_proxy: bool,
		connection: &Connection,
	) -> Result<TransactionResponse, StubError> {
		let (account, block_manager) = self.check_transaction_request(context, request)?;
		let invocation = self.encode_invocation(&context.path, request, by_proxy, true)?;

		let block_number = self.get_block_number(connection).await?;
		let raw = self.builder.build(
			Some(invocation.to),
			&self.properties.group_id,
			&self.properties.chain_id,
			block_limit(block_number)?,
			invocation.data.clone(),
		)?;
		let signed = self.builder.sign(&raw, account.key_pair())?;
		info!(
			tx_hash = %signed.hash(),
			resource = %context.path,
			by_proxy,
			"Sending transaction"
		);

		let params = TransactionParams::new(
			request.clone(),
			invocation.payload(signed.into_raw(), true),
		)
		.with_from(account.identity())
		.with_to(format!("{:#x}", invocation.to));
		let receipt = self.submit(params, connection).await?;

		if !receipt.is_status_ok() {
			let output = decode_hex(&receipt.output)?;
			return Ok(TransactionResponse {
				hash: receipt.transaction_hash.clone(),
				block_number: receipt.block_number,
				..self.reverted(receipt.status, &output, receipt.message.as_deref())
			});
		}

		self.verify_sent(&receipt, block_manager).await?;

		let output = decode_hex(&receipt.output)?;
		let result = self.decode_output(invocation.function.as_ref(), true, &output)?;
		Ok(TransactionResponse {
			hash: receipt.transaction_hash.clone(),
			block_number: receipt.block_number,
			..TransactionResponse::success(result)
		})
	}

	/// Fetches a transaction with its proofs and verifies both against the
	/// header of `block_number`.
	pub async fn get_transaction(
		&self,
		transaction_hash: &str,
		block_number: u64,
		block_manager: &dyn BlockManager,
		connection: &Connection,
	) -> Result<VerifiedTransaction, StubError> {
		let response = connection
			.handle(Request::new(
				RequestType::GetTransactionProof,
				transaction_hash.as_bytes().to_vec(),
			))
			.await;
		if !response.is_success() {
			return Err(StubError::from_response(
				&response,
				StatusCode::HandleGetTransactionProofFailed,
			));
		}

		let proof: TransactionProof = serde_json::from_slice(&response.data)?;
		let transaction = &proof.trans_with_proof.transaction;
		let receipt = &proof.receipt_with_proof.transaction_receipt;

		if self.proofs_supported() {
			let block = self.fetch_header(block_manager, block_number).await?;
			self.check_receipt(&block, receipt, &proof.receipt_with_proof.receipt_proof)?;
			self.check_transaction(
				&block,
				&transaction.hash,
				transaction.transaction_index,
				&proof.trans_with_proof.tx_proof,
			)?;
		} else {
			warn!(
				tx_hash = %transaction_hash,
				node_version = ?self.properties.node_version,
				"Node does not serve proofs, skipping verification"
			);
		}

		let to = transaction.to.parse::<Address>().ok();
		let is_by_proxy = matches!(
			(self.properties.proxy_address, to),
			(Some(proxy), Some(to)) if proxy == to
		);

		let input = decode_hex(&transaction.input)?;
		let (resource, transaction_request, function) =
			match self.decode_invocation(&input, to, is_by_proxy) {
				Ok(decoded) => decoded,
				// Both proofs have passed at this point. Input of a contract
				// without a registered ABI, or a direct call to the proxy
				// address, is reported with an empty request instead of
				// failing the lookup of a transaction that is on chain.
				Err(err) => {
					warn!(tx_hash = %transaction_hash, error = %err, "Cannot decode transaction input");
					(String::new(), TransactionRequest::default(), None)
				}
			};

		let output = decode_hex(&receipt.output)?;
		let base = if receipt.is_status_ok() {
			let result = match &function {
				Some(function) => self
					.decode_output(Some(function), is_by_proxy, &output)
					.unwrap_or_else(|err| {
						warn!(tx_hash = %transaction_hash, error = %err, "Cannot decode transaction output");
						Vec::new()
					}),
				None => Vec::new(),
			};
			TransactionResponse::success(result)
		} else {
			self.reverted(receipt.status, &output, receipt.message.as_deref())
		};

		Ok(VerifiedTransaction {
			block_number,
			transaction_hash: transaction_hash.to_string(),
			account_identity: transaction.from.clone(),
			resource,
			is_by_proxy,
			transaction_request,
			transaction_response: TransactionResponse {
				hash: transaction_hash.to_string(),
				block_number,
				..base
			},
			receipt_bytes: serde_json::to_vec(receipt)?,
			tx_bytes: serde_json::to_vec(transaction)?,
		})
	}

	pub async fn get_block_number(&self, connection: &Connection) -> Result<u64, StubError> {
		let response = connection
			.handle(Request::new(RequestType::GetBlockNumber, Vec::new()))
			.await;
		if !response.is_success() {
			return Err(StubError::from_response(
				&response,
				StatusCode::HandleGetBlockNumberFailed,
			));
		}
		decode_block_number(&response.data).ok_or_else(|| {
			StubError::new(
				StatusCode::UnclassifiedError,
				format!("Malformed block number of {} bytes", response.data.len()),
			)
		})
	}

	pub async fn get_block(
		&self,
		number: u64,
		only_header: bool,
		connection: &Connection,
	) -> Result<Block, StubError> {
		let response = connection
			.handle(Request::new(
				RequestType::GetBlockByNumber,
				bcos_types::encode_block_number(number),
			))
			.await;
		if !response.is_success() {
			return Err(StubError::from_response(
				&response,
				StatusCode::HandleGetBlockFailed,
			));
		}

		let mut block = Block::from_ledger_json(&response.data)?;
		if only_header {
			block.transactions_hashes.clear();
		}
		Ok(block)
	}

	/// Deploys a contract and registers its ABI under `name` once the
	/// receipt reports the new address.
	pub async fn deploy_contract(
		&self,
		context: &TransactionContext,
		name: &str,
		abi_json: &str,
		bin: &str,
		constructor_args: &[String],
		connection: &Connection,
	) -> Result<Address, StubError> {
		let account = context
			.account
			.as_ref()
			.ok_or_else(|| StubError::invalid_parameter("Account is missing"))?;
		if name.trim().is_empty() {
			return Err(StubError::invalid_parameter("Contract name is empty"));
		}

		let abi = parse_abi(abi_json)?;
		let init_code = decode_hex(bin)?;
		if init_code.is_empty() {
			return Err(StubError::invalid_parameter("Contract binary is empty"));
		}
		let constructor_inputs = abi
			.constructor
			.as_ref()
			.map(|constructor| constructor.inputs.as_slice())
			.unwrap_or_default();
		let encoded_args = self.functions.encode_params(constructor_inputs, constructor_args)?;

		let block_number = self.get_block_number(connection).await?;
		let raw = self.builder.build_deploy(
			&init_code,
			&encoded_args,
			&self.properties.group_id,
			&self.properties.chain_id,
			block_limit(block_number)?,
		)?;
		let signed = self.builder.sign(&raw, account.key_pair())?;
		info!(tx_hash = %signed.hash(), contract = %name, "Deploying contract");

		let request = TransactionRequest::new(CUSTOM_COMMAND_DEPLOY, Some(constructor_args.to_vec()));
		let params = TransactionParams::new(
			request,
			CallPayload::SendTx {
				signed: signed.into_raw(),
			},
		)
		.with_from(account.identity());
		let receipt = self.submit(params, connection).await?;

		if !receipt.is_status_ok() {
			let output = decode_hex(&receipt.output)?;
			let reverted = self.reverted(receipt.status, &output, receipt.message.as_deref());
			return Err(StubError::new(
				StatusCode::SendTransactionNotSuccessStatus,
				reverted.message,
			));
		}

		let address = parse_address(&receipt.contract_address)?;
		if address == Address::ZERO {
			return Err(StubError::new(
				StatusCode::UnclassifiedError,
				format!("Deployment {} reported no contract address", receipt.transaction_hash),
			));
		}

		self.abis.register(name, Some(address), abi_json)?;
		info!(contract = %name, address = %address, "Contract deployed");
		Ok(address)
	}

	fn contract(&self, name: &str) -> Result<Arc<ContractAbi>, StubError> {
		self.abis.get(name).ok_or_else(|| {
			StubError::new(
				StatusCode::AbiNotExist,
				format!("No ABI registered for {}", name),
			)
		})
	}

	fn encode_invocation(
		&self,
		path: &Path,
		request: &TransactionRequest,
		by_proxy: bool,
		send: bool,
	) -> Result<Invocation, StubError> {
		let resource = path.resource();

		if !by_proxy {
			let to = self
				.abis
				.get(resource)
				.and_then(|contract| contract.address)
				.ok_or_else(|| {
					StubError::invalid_parameter(format!("Address of {} is unknown", resource))
				})?;
			return Ok(Invocation {
				data: self
					.functions
					.encode_default(&request.method, request.args.as_deref()),
				to,
				function: None,
				proxy: None,
			});
		}

		let to = self
			.properties
			.proxy_address
			.ok_or_else(|| StubError::invalid_parameter("Proxy contract is not configured"))?;
		let contract = self.contract(resource)?;
		let args = request.args.clone().unwrap_or_default();
		let function = self
			.functions
			.function_by_name(&contract.abi, &request.method, args.len())?
			.clone();

		let target = path.to_string();
		let xa = request.options.xa();
		let data = match xa {
			Some((xa_id, xa_seq)) => {
				let encoded = self.functions.encode_params(&function.inputs, &args)?;
				let signature = function.signature();
				if send {
					self.proxy
						.wrap_send(&target, xa_id, xa_seq, &signature, &encoded)
				} else {
					self.proxy.wrap_call(&target, xa_id, &signature, &encoded)
				}
			}
			None => {
				let inner = self.functions.encode_with_abi(&function, &args)?;
				if send {
					self.proxy.wrap_send_without_xa(resource, &inner)
				} else {
					self.proxy.wrap_call_without_xa(resource, &inner)
				}
			}
		};

		let route = ProxyRoute {
			resource: target,
			xa_transaction_id: xa.map(|(id, _)| id.to_string()),
			xa_transaction_seq: xa.map(|(_, seq)| seq).unwrap_or_default(),
		};
		Ok(Invocation {
			data,
			to,
			function: Some(function),
			proxy: Some((contract.raw.clone(), route)),
		})
	}

	/// Identifies the resource, request and function behind on-chain input.
	fn decode_invocation(
		&self,
		input: &[u8],
		to: Option<Address>,
		is_by_proxy: bool,
	) -> Result<(String, TransactionRequest, Option<Function>), StubError> {
		if is_by_proxy {
			let invocation = self.proxy.decode(input)?;
			// XA calls name a full path, the others a bare resource name.
			let name = invocation
				.target()
				.rsplit('.')
				.next()
				.unwrap_or_default()
				.to_string();
			let contract = self.contract(&name)?;
			let unwrapped = self.proxy.unwrap(input, Some(&contract.abi))?;
			let arg_count = unwrapped.args.as_ref().map_or(0, Vec::len);
			let function = self
				.functions
				.function_by_name(&contract.abi, &unwrapped.method, arg_count)?
				.clone();

			let mut request = TransactionRequest::new(unwrapped.method, unwrapped.args);
			match &invocation {
				ProxyInvocation::SendTransaction {
					xa_transaction_id,
					xa_transaction_seq,
					..
				} => request = request.with_xa(xa_transaction_id.as_str(), *xa_transaction_seq),
				ProxyInvocation::ConstantCall {
					xa_transaction_id, ..
				} => request = request.with_xa(xa_transaction_id.as_str(), 0),
				_ => {}
			}
			return Ok((name, request, Some(function)));
		}

		let contract = to
			.and_then(|address| self.abis.find_by_address(&address))
			.ok_or_else(|| {
				StubError::new(
					StatusCode::AbiNotExist,
					format!("No ABI registered for address {:?}", to),
				)
			})?;
		let function = self.functions.function_by_selector(&contract.abi, input)?;
		let args = self.functions.decode_with_abi_input(function, input)?;
		Ok((
			contract.name.clone(),
			TransactionRequest::new(function.name.clone(), args),
			Some(function.clone()),
		))
	}

	/// Decodes return data. Without a known function the default `string[]`
	/// shape applies.
	fn decode_output(
		&self,
		function: Option<&Function>,
		wrapped: bool,
		output: &[u8],
	) -> Result<Vec<String>, StubError> {
		match function {
			Some(function) if wrapped => {
				let inner = self.proxy.decode_output(output)?;
				Ok(self.functions.decode_with_abi_output(function, &inner)?)
			}
			Some(function) => Ok(self.functions.decode_with_abi_output(function, output)?),
			None => Ok(self
				.functions
				.decode_default_output(output)?
				.unwrap_or_default()),
		}
	}

	fn reverted(&self, status: u64, output: &[u8], message: Option<&str>) -> TransactionResponse {
		let message = self
			.functions
			.decode_revert_message(output)
			.or_else(|| message.filter(|m| !m.is_empty()).map(str::to_string))
			.unwrap_or_else(|| format!("Execution failed with status {}", status));
		TransactionResponse::reverted(i32::try_from(status).unwrap_or(i32::MAX), message)
	}

	async fn submit(
		&self,
		params: TransactionParams,
		connection: &Connection,
	) -> Result<TransactionReceipt, StubError> {
		let response = connection
			.handle(Request::new(RequestType::SendTransaction, params.to_bytes()?))
			.await;
		if !response.is_success() {
			return Err(StubError::from_response(
				&response,
				StatusCode::SendTransactionNotSuccessStatus,
			));
		}
		Ok(serde_json::from_slice(&response.data)?)
	}

	fn proofs_supported(&self) -> bool {
		supports_transaction_proof(self.properties.node_version.as_deref())
	}

	fn receipt_encoding(&self) -> ReceiptEncoding {
		let version = self
			.properties
			.node_version
			.as_deref()
			.and_then(|v| v.parse::<NodeVersion>().ok());
		ReceiptEncoding::for_version(version.as_ref())
	}

	async fn fetch_header(
		&self,
		block_manager: &dyn BlockManager,
		number: u64,
	) -> Result<Block, StubError> {
		block_manager.get_block(number).await.map_err(|e| {
			warn!(block_number = number, error = %e, "Cannot fetch block header");
			StubError::new(StatusCode::FetchBlockHeaderFailed, e.to_string())
		})
	}

	async fn verify_sent(
		&self,
		receipt: &TransactionReceipt,
		block_manager: &dyn BlockManager,
	) -> Result<(), StubError> {
		if !self.proofs_supported() {
			warn!(
				tx_hash = %receipt.transaction_hash,
				node_version = ?self.properties.node_version,
				"Node does not serve proofs, skipping verification"
			);
			return Ok(());
		}

		let block = self.fetch_header(block_manager, receipt.block_number).await?;
		let receipt_proof = receipt.receipt_proof.as_deref().ok_or_else(|| {
			StubError::new(
				StatusCode::TransactionReceiptProofVerifyFailed,
				"Receipt carries no receipt proof",
			)
		})?;
		self.check_receipt(&block, receipt, receipt_proof)?;

		let tx_proof = receipt.tx_proof.as_deref().ok_or_else(|| {
			StubError::new(
				StatusCode::TransactionProofVerifyFailed,
				"Receipt carries no transaction proof",
			)
		})?;
		self.check_transaction(
			&block,
			&receipt.transaction_hash,
			receipt.transaction_index,
			tx_proof,
		)
	}

	fn check_receipt(
		&self,
		block: &Block,
		receipt: &TransactionReceipt,
		proof: &[MerkleProofUnit],
	) -> Result<(), StubError> {
		let failed = |message: String| {
			warn!(
				tx_hash = %receipt.transaction_hash,
				block_number = block.number(),
				reason = %message,
				"Receipt proof verification failed"
			);
			StubError::new(StatusCode::TransactionReceiptProofVerifyFailed, message)
		};

		let verified = self
			.verifier
			.verify_receipt(
				&block.block_header.receipt_root,
				receipt,
				proof,
				self.receipt_encoding(),
			)
			.map_err(|e| failed(e.to_string()))?;
		if !verified {
			return Err(failed(format!(
				"Receipt of {} does not match receipts root of block {}",
				receipt.transaction_hash,
				block.number()
			)));
		}
		Ok(())
	}

	fn check_transaction(
		&self,
		block: &Block,
		transaction_hash: &str,
		index: Option<u64>,
		proof: &[MerkleProofUnit],
	) -> Result<(), StubError> {
		let failed = |message: String| {
			warn!(
				tx_hash = %transaction_hash,
				block_number = block.number(),
				reason = %message,
				"Transaction proof verification failed"
			);
			StubError::new(StatusCode::TransactionProofVerifyFailed, message)
		};

		let verified = self
			.verifier
			.verify_transaction(
				&block.block_header.transaction_root,
				transaction_hash,
				index,
				proof,
			)
			.map_err(|e| failed(e.to_string()))?;
		if !verified {
			return Err(failed(format!(
				"Transaction {} does not match transactions root of block {}",
				transaction_hash,
				block.number()
			)));
		}
		Ok(())
	}
}

/// First block at which a transaction signed at `block_number` expires.
fn block_limit(block_number: u64) -> Result<u64, StubError> {
	block_number.checked_add(BLOCK_LIMIT_STEP).ok_or_else(|| {
		StubError::new(
			StatusCode::HandleSendTransactionFailed,
			format!("Block number {} leaves no room for a block limit", block_number),
		)
	})
}

fn parse_address(value: &str) -> Result<Address, StubError> {
	value
		.trim()
		.parse::<Address>()
		.map_err(|e| StubError::invalid_parameter(format!("Invalid address '{}': {}", value, e)))
}
