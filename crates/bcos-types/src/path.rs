use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
	#[error("Invalid path '{0}': expected zone.chain.resource")]
	Malformed(String),
}

/// Resource identifier in `zone.chain.resource` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path {
	zone: String,
	chain: String,
	resource: String,
}

impl Path {
	pub fn new(
		zone: impl Into<String>,
		chain: impl Into<String>,
		resource: impl Into<String>,
	) -> Self {
		Self {
			zone: zone.into(),
			chain: chain.into(),
			resource: resource.into(),
		}
	}

	pub fn zone(&self) -> &str {
		&self.zone
	}

	pub fn chain(&self) -> &str {
		&self.chain
	}

	pub fn resource(&self) -> &str {
		&self.resource
	}
}

impl FromStr for Path {
	type Err = PathError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let parts: Vec<&str> = s.split('.').collect();
		match parts.as_slice() {
			[zone, chain, resource]
				if !zone.is_empty() && !chain.is_empty() && !resource.is_empty() =>
			{
				Ok(Path::new(*zone, *chain, *resource))
			}
			_ => Err(PathError::Malformed(s.to_string())),
		}
	}
}

impl TryFrom<String> for Path {
	type Error = PathError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<Path> for String {
	fn from(path: Path) -> Self {
		path.to_string()
	}
}

impl fmt::Display for Path {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}.{}", self.zone, self.chain, self.resource)
	}
}
