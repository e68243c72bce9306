//! Well-known values shared by the driver and the connection.

/// Address used as `from` for read-only calls when no account is bound.
pub const DEFAULT_ADDRESS: &str = "0x1111111111111111111111111111111111111111";

/// Resource name the proxy contract is registered under.
pub const PROXY_NAME: &str = "WeCrossProxy";

/// Custom command name used by the router for deployments.
pub const CUSTOM_COMMAND_DEPLOY: &str = "deploy";

pub const DEFAULT_GROUP_ID: &str = "group0";
pub const DEFAULT_CHAIN_ID: &str = "chain0";

/// Blocks added to the observed height to form a transaction's block limit.
pub const BLOCK_LIMIT_STEP: u64 = 500;

pub const DEFAULT_GAS_PRICE: u64 = 3_000_000_000;
pub const DEFAULT_GAS_LIMIT: u64 = 3_000_000_000;
