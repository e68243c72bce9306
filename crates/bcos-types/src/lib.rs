//! Shared types for the BCOS stub.
//!
//! Everything that crosses a crate boundary lives here: the router-facing
//! request and response envelopes, the ledger JSON models returned by the
//! client collaborator, status codes and the resource path.

pub mod block;
pub mod constants;
pub mod crypto;
pub mod ledger;
pub mod params;
pub mod path;
pub mod request;
pub mod serde_helpers;
pub mod status;
pub mod transaction;
pub mod version;

pub use alloy_primitives::{Address, Bytes, B256, U256};
pub use block::*;
pub use crypto::*;
pub use ledger::*;
pub use params::*;
pub use path::*;
pub use request::*;
pub use status::*;
pub use transaction::*;
pub use version::*;
