//! Status codes reported to the router.

use std::fmt;

/// Closed set of outcomes the stub reports.
///
/// The numeric values are stable and travel in `Response::error_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StatusCode {
	Success = 0,

	InvalidParameter = 2000,
	UnrecognizedRequestType = 2001,

	TransactionProofVerifyFailed = 2010,
	TransactionReceiptProofVerifyFailed = 2011,

	HandleSendTransactionFailed = 2021,
	HandleCallRequestFailed = 2022,
	HandleGetBlockNumberFailed = 2023,
	HandleGetBlockFailed = 2024,
	HandleGetTransactionProofFailed = 2025,

	TransactionReceiptNotExist = 2030,
	TransactionNotExist = 2031,
	BlockNotExist = 2032,

	FetchBlockHeaderFailed = 2040,
	CallNotSuccessStatus = 2041,
	SendTransactionNotSuccessStatus = 2042,

	AbiNotExist = 2050,
	EncodeAbiFailed = 2051,
	MethodNotExist = 2052,

	UnclassifiedError = 2100,
}

impl StatusCode {
	const ALL: [StatusCode; 20] = [
		StatusCode::Success,
		StatusCode::InvalidParameter,
		StatusCode::UnrecognizedRequestType,
		StatusCode::TransactionProofVerifyFailed,
		StatusCode::TransactionReceiptProofVerifyFailed,
		StatusCode::HandleSendTransactionFailed,
		StatusCode::HandleCallRequestFailed,
		StatusCode::HandleGetBlockNumberFailed,
		StatusCode::HandleGetBlockFailed,
		StatusCode::HandleGetTransactionProofFailed,
		StatusCode::TransactionReceiptNotExist,
		StatusCode::TransactionNotExist,
		StatusCode::BlockNotExist,
		StatusCode::FetchBlockHeaderFailed,
		StatusCode::CallNotSuccessStatus,
		StatusCode::SendTransactionNotSuccessStatus,
		StatusCode::AbiNotExist,
		StatusCode::EncodeAbiFailed,
		StatusCode::MethodNotExist,
		StatusCode::UnclassifiedError,
	];

	pub fn code(self) -> i32 {
		self as i32
	}

	pub fn from_code(code: i32) -> Option<Self> {
		Self::ALL.iter().copied().find(|s| s.code() == code)
	}

	pub fn is_success(self) -> bool {
		self == StatusCode::Success
	}

	pub fn name(self) -> &'static str {
		match self {
			StatusCode::Success => "Success",
			StatusCode::InvalidParameter => "InvalidParameter",
			StatusCode::UnrecognizedRequestType => "UnrecognizedRequestType",
			StatusCode::TransactionProofVerifyFailed => "TransactionProofVerifyFailed",
			StatusCode::TransactionReceiptProofVerifyFailed => {
				"TransactionReceiptProofVerifyFailed"
			}
			StatusCode::HandleSendTransactionFailed => "HandleSendTransactionFailed",
			StatusCode::HandleCallRequestFailed => "HandleCallRequestFailed",
			StatusCode::HandleGetBlockNumberFailed => "HandleGetBlockNumberFailed",
			StatusCode::HandleGetBlockFailed => "HandleGetBlockFailed",
			StatusCode::HandleGetTransactionProofFailed => "HandleGetTransactionProofFailed",
			StatusCode::TransactionReceiptNotExist => "TransactionReceiptNotExist",
			StatusCode::TransactionNotExist => "TransactionNotExist",
			StatusCode::BlockNotExist => "BlockNotExist",
			StatusCode::FetchBlockHeaderFailed => "FetchBlockHeaderFailed",
			StatusCode::CallNotSuccessStatus => "CallNotSuccessStatus",
			StatusCode::SendTransactionNotSuccessStatus => "SendTransactionNotSuccessStatus",
			StatusCode::AbiNotExist => "ABINotExist",
			StatusCode::EncodeAbiFailed => "EncodeAbiFailed",
			StatusCode::MethodNotExist => "MethodNotExist",
			StatusCode::UnclassifiedError => "UnclassifiedError",
		}
	}
}

impl fmt::Display for StatusCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}({})", self.name(), self.code())
	}
}

impl From<StatusCode> for i32 {
	fn from(status: StatusCode) -> Self {
		status.code()
	}
}
