//! Node version parsing and the features that depend on it.

use std::fmt;
use std::str::FromStr;

/// Semantic version reported by a node, e.g. `v3.2.0` or `2.9.0-rc1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeVersion {
	pub major: u32,
	pub minor: u32,
	pub patch: u32,
}

impl NodeVersion {
	pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
		Self {
			major,
			minor,
			patch,
		}
	}

	/// Nodes from 3.2 on return transaction and receipt proofs.
	pub fn supports_transaction_proof(&self) -> bool {
		self.major == 3 && self.minor >= 2
	}

	/// Receipts carry `remainGas` from minor version 9 on.
	pub fn has_remain_gas(&self) -> bool {
		self.minor >= 9
	}
}

impl FromStr for NodeVersion {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim().trim_start_matches(|c: char| c == 'v' || c == 'V');
		let core = trimmed
			.split(|c: char| c == '-' || c == '+' || c.is_whitespace())
			.next()
			.unwrap_or_default();

		let mut parts = core.split('.');
		let mut next = |name: &str, required: bool| -> Result<u32, String> {
			match parts.next() {
				Some(p) => p
					.parse::<u32>()
					.map_err(|e| format!("Invalid {} version in '{}': {}", name, s, e)),
				None if required => Err(format!("Missing {} version in '{}'", name, s)),
				None => Ok(0),
			}
		};

		let major = next("major", true)?;
		let minor = next("minor", true)?;
		let patch = next("patch", false)?;
		Ok(NodeVersion::new(major, minor, patch))
	}
}

impl fmt::Display for NodeVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
	}
}

/// Whether a node with the given version string can serve proofs.
///
/// A missing or unparsable version is treated as supported.
pub fn supports_transaction_proof(version: Option<&str>) -> bool {
	match version.map(str::trim) {
		None | Some("") => true,
		Some(v) => v
			.parse::<NodeVersion>()
			.map(|v| v.supports_transaction_proof())
			.unwrap_or(true),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_versions() {
		assert_eq!("v3.2.0".parse::<NodeVersion>().unwrap(), NodeVersion::new(3, 2, 0));
		assert_eq!("2.9.0".parse::<NodeVersion>().unwrap(), NodeVersion::new(2, 9, 0));
		assert_eq!(
			"3.6.1-rc1".parse::<NodeVersion>().unwrap(),
			NodeVersion::new(3, 6, 1)
		);
		assert_eq!("3.1".parse::<NodeVersion>().unwrap(), NodeVersion::new(3, 1, 0));
		assert!("three".parse::<NodeVersion>().is_err());
		assert!("3".parse::<NodeVersion>().is_err());
	}

	#[test]
	fn test_transaction_proof_support() {
		assert!(supports_transaction_proof(None));
		assert!(supports_transaction_proof(Some("")));
		assert!(supports_transaction_proof(Some("garbage")));
		assert!(supports_transaction_proof(Some("3.2.0")));
		assert!(supports_transaction_proof(Some("v3.6.0")));
		assert!(!supports_transaction_proof(Some("3.1.0")));
		assert!(!supports_transaction_proof(Some("2.9.0")));
	}

	#[test]
	fn test_remain_gas_threshold() {
		assert!(NodeVersion::new(2, 9, 0).has_remain_gas());
		assert!(!NodeVersion::new(2, 8, 0).has_remain_gas());
	}
}
