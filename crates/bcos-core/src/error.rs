use crate::client::ClientError;
use bcos_codec::CodecError;
use bcos_transaction::TransactionError;
use bcos_types::{Response, StatusCode};
use bcos_verify::VerifyError;
use thiserror::Error;

/// Failure of a stub operation, classified by router status code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct StubError {
	pub code: StatusCode,
	pub message: String,
}

impl StubError {
	pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
		}
	}

	pub fn invalid_parameter(message: impl Into<String>) -> Self {
		Self::new(StatusCode::InvalidParameter, message)
	}

	/// Lifts a failed connection response. Codes outside the known table
	/// are reported as `fallback`.
	pub fn from_response(response: &Response, fallback: StatusCode) -> Self {
		let code = response
			.status()
			.filter(|status| !status.is_success())
			.unwrap_or(fallback);
		Self::new(code, response.message.clone())
	}

	pub fn code(&self) -> StatusCode {
		self.code
	}
}

impl From<CodecError> for StubError {
	fn from(err: CodecError) -> Self {
		let code = match &err {
			CodecError::MethodNotExist(_) => StatusCode::MethodNotExist,
			CodecError::InvalidParameter(_) => StatusCode::InvalidParameter,
			CodecError::AbiNotExist(_) => StatusCode::AbiNotExist,
			CodecError::Encode(_) => StatusCode::EncodeAbiFailed,
			CodecError::Decode(_) => StatusCode::UnclassifiedError,
		};
		Self::new(code, err.to_string())
	}
}

impl From<TransactionError> for StubError {
	fn from(err: TransactionError) -> Self {
		let code = match &err {
			TransactionError::InvalidBlockLimit(_) | TransactionError::Decode(_) => {
				StatusCode::InvalidParameter
			}
			TransactionError::Signing(_) => StatusCode::UnclassifiedError,
		};
		Self::new(code, err.to_string())
	}
}

impl From<VerifyError> for StubError {
	fn from(err: VerifyError) -> Self {
		Self::new(StatusCode::UnclassifiedError, err.to_string())
	}
}

impl From<ClientError> for StubError {
	fn from(err: ClientError) -> Self {
		Self::new(StatusCode::UnclassifiedError, err.to_string())
	}
}

impl From<serde_json::Error> for StubError {
	fn from(err: serde_json::Error) -> Self {
		Self::new(StatusCode::UnclassifiedError, err.to_string())
	}
}
