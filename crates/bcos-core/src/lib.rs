//! Core of the BCOS stub.
//!
//! [`Connection`] dispatches router requests to a [`LedgerClient`], and
//! [`Driver`] turns router-level transaction requests into proxy-aware,
//! signed and proof-verified ledger operations on top of a connection.

pub mod client;
pub mod connection;
pub mod driver;
pub mod error;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{BlockManager, ClientError, ConnectionBlockManager, LedgerClient};
pub use connection::Connection;
pub use driver::{Driver, DriverProperties, TransactionContext};
pub use error::StubError;
