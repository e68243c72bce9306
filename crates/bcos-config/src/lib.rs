//! Configuration loading for the stub.
//!
//! Files are TOML with `${VAR}` placeholders resolved from the environment.
//! A handful of settings can also be overridden by prefixed variables.

use std::collections::HashSet;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub mod types;

pub use types::*;

use bcos_types::Address;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution
#[derive(Default)]
pub struct ConfigLoader {
	file_path: Option<String>,
	env_prefix: String,
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "BCOS_STUB_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<StubConfig, ConfigError> {
		let Some(file_path) = &self.file_path else {
			return Err(ConfigError::FileNotFound(
				"No configuration file specified".to_string(),
			));
		};

		if !Path::new(file_path).exists() {
			return Err(ConfigError::FileNotFound(file_path.clone()));
		}

		debug!(path = %file_path, "Loading configuration");
		let content = tokio::fs::read_to_string(file_path).await?;
		self.load_str(&content)
	}

	/// Same pipeline as [`load`](Self::load) for configuration text already in memory.
	pub fn load_str(&self, content: &str) -> Result<StubConfig, ConfigError> {
		let substituted = self.substitute_env_vars(content)?;

		let mut config: StubConfig =
			toml::from_str(&substituted).map_err(|e| ConfigError::ParseError(e.to_string()))?;

		self.apply_env_overrides(&mut config);
		self.validate_config(&config)?;

		Ok(config)
	}

	fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
		let mut result = content.to_string();

		// Find and replace ${VAR_NAME} patterns
		let re = regex::Regex::new(r"\$\{([^}]+)\}")
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value = env::var(var_name)
				.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, &env_value);
		}

		Ok(result)
	}

	fn apply_env_overrides(&self, config: &mut StubConfig) {
		if let Ok(group_id) = env::var(format!("{}GROUP_ID", self.env_prefix)) {
			debug!(%group_id, "Overriding group id from environment");
			config.chain.group_id = group_id;
		}

		if let Ok(chain_id) = env::var(format!("{}CHAIN_ID", self.env_prefix)) {
			debug!(%chain_id, "Overriding chain id from environment");
			config.chain.chain_id = chain_id;
		}

		if let Ok(version) = env::var(format!("{}NODE_VERSION", self.env_prefix)) {
			debug!(%version, "Overriding node version from environment");
			config.chain.node_version = Some(version);
		}
	}

	fn validate_config(&self, config: &StubConfig) -> Result<(), ConfigError> {
		if config.chain.group_id.trim().is_empty() {
			return Err(ConfigError::ValidationError(
				"group_id must not be empty".to_string(),
			));
		}

		if config.chain.chain_id.trim().is_empty() {
			return Err(ConfigError::ValidationError(
				"chain_id must not be empty".to_string(),
			));
		}

		if let Some(proxy) = &config.proxy {
			validate_address("proxy", &proxy.address)?;
			validate_abi("proxy", &proxy.abi)?;
		}

		let mut names = HashSet::new();
		for resource in &config.resources {
			if resource.name.trim().is_empty() {
				return Err(ConfigError::ValidationError(
					"Resource name must not be empty".to_string(),
				));
			}
			if !names.insert(resource.name.as_str()) {
				return Err(ConfigError::ValidationError(format!(
					"Duplicate resource '{}'",
					resource.name
				)));
			}
			if let Some(address) = &resource.address {
				validate_address(&resource.name, address)?;
			}
			validate_abi(&resource.name, &resource.abi)?;
		}

		Ok(())
	}
}

fn validate_address(owner: &str, address: &str) -> Result<(), ConfigError> {
	address.parse::<Address>().map(|_| ()).map_err(|e| {
		ConfigError::ValidationError(format!("Invalid address for {}: {}", owner, e))
	})
}

fn validate_abi(owner: &str, abi: &str) -> Result<(), ConfigError> {
	match serde_json::from_str::<serde_json::Value>(abi) {
		Ok(serde_json::Value::Array(_)) => Ok(()),
		Ok(_) => Err(ConfigError::ValidationError(format!(
			"ABI for {} must be a JSON array",
			owner
		))),
		Err(e) => Err(ConfigError::ValidationError(format!(
			"Invalid ABI for {}: {}",
			owner, e
		))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bcos_types::CryptoKind;
	use std::io::Write;

	const MINIMAL: &str = r#"
[chain]
name = "bcos"
"#;

	const FULL: &str = r#"
[chain]
name = "bcos"
group_id = "group1"
chain_id = "chain1"
crypto = "GM"
node_version = "3.2.0"

[proxy]
address = "0x7ba8711a62d7e1377988efff0cb9de45c6353169"
abi = '[{"type":"function","name":"constantCall","inputs":[],"outputs":[],"stateMutability":"view"}]'

[[resources]]
name = "HelloWorld"
address = "0x35039a08bd5aa848fe9ce1c49bf1e3c2ba640434"
abi = "[]"
"#;

	#[test]
	fn test_defaults() {
		let config = ConfigLoader::new()
			.with_env_prefix("BCOS_TEST_DEFAULTS_")
			.load_str(MINIMAL)
			.unwrap();
		assert_eq!(config.chain.group_id, "group0");
		assert_eq!(config.chain.chain_id, "chain0");
		assert_eq!(config.chain.crypto, CryptoKind::Ecdsa);
		assert!(config.proxy.is_none());
		assert!(config.resources.is_empty());
	}

	#[test]
	fn test_full_config() {
		let config = ConfigLoader::new()
			.with_env_prefix("BCOS_TEST_FULL_")
			.load_str(FULL)
			.unwrap();
		assert_eq!(config.chain.group_id, "group1");
		assert_eq!(config.chain.crypto, CryptoKind::Gm);
		assert_eq!(config.chain.node_version.as_deref(), Some("3.2.0"));
		assert_eq!(config.resources[0].name, "HelloWorld");
	}

	#[test]
	fn test_example_config() {
		let config = ConfigLoader::new()
			.with_env_prefix("BCOS_TEST_EXAMPLE_")
			.load_str(include_str!("../../../config/example.toml"))
			.unwrap();
		assert_eq!(config.chain.node_version.as_deref(), Some("3.2.0"));
		assert!(config.proxy.is_none());
		assert_eq!(config.resources.len(), 1);

		let value = serde_json::to_value(&config).unwrap();
		let mut sections: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
		sections.sort();
		assert_eq!(sections, vec!["chain", "proxy", "resources"]);
	}

	#[tokio::test]
	async fn test_load_from_file_with_substitution() {
		env::set_var("BCOS_TEST_SUBST_NAME", "substituted");
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "[chain]\nname = \"${{BCOS_TEST_SUBST_NAME}}\"\n").unwrap();

		let config = ConfigLoader::new()
			.with_file(file.path())
			.with_env_prefix("BCOS_TEST_SUBST_")
			.load()
			.await
			.unwrap();
		assert_eq!(config.chain.name, "substituted");
	}

	#[tokio::test]
	async fn test_missing_file() {
		let result = ConfigLoader::new().load().await;
		assert!(matches!(result, Err(ConfigError::FileNotFound(_))));

		let dir = tempfile::tempdir().unwrap();
		let result = ConfigLoader::new()
			.with_file(dir.path().join("absent.toml"))
			.load()
			.await;
		assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
	}

	#[test]
	fn test_missing_env_var() {
		let result = ConfigLoader::new().load_str("[chain]\nname = \"${BCOS_TEST_NOT_SET_ANYWHERE}\"\n");
		assert!(matches!(result, Err(ConfigError::EnvVarNotFound(name)) if name == "BCOS_TEST_NOT_SET_ANYWHERE"));
	}

	#[test]
	fn test_env_overrides() {
		env::set_var("BCOS_TEST_OVERRIDE_GROUP_ID", "group9");
		env::set_var("BCOS_TEST_OVERRIDE_NODE_VERSION", "2.9.0");
		let config = ConfigLoader::new()
			.with_env_prefix("BCOS_TEST_OVERRIDE_")
			.load_str(MINIMAL)
			.unwrap();
		assert_eq!(config.chain.group_id, "group9");
		assert_eq!(config.chain.chain_id, "chain0");
		assert_eq!(config.chain.node_version.as_deref(), Some("2.9.0"));
	}

	#[test]
	fn test_validation() {
		let loader = ConfigLoader::new().with_env_prefix("BCOS_TEST_VALIDATION_");

		let empty_group = "[chain]\nname = \"bcos\"\ngroup_id = \"\"\n";
		assert!(matches!(loader.load_str(empty_group), Err(ConfigError::ValidationError(_))));

		let bad_address = FULL.replace("0x7ba8711a62d7e1377988efff0cb9de45c6353169", "0x12");
		assert!(matches!(loader.load_str(&bad_address), Err(ConfigError::ValidationError(_))));

		let bad_abi = FULL.replace("abi = \"[]\"", "abi = \"{not json\"");
		assert!(matches!(loader.load_str(&bad_abi), Err(ConfigError::ValidationError(_))));

		let duplicate = format!(
			"{}\n[[resources]]\nname = \"HelloWorld\"\nabi = \"[]\"\n",
			FULL
		);
		assert!(matches!(loader.load_str(&duplicate), Err(ConfigError::ValidationError(_))));

		assert!(matches!(loader.load_str("[chain"), Err(ConfigError::ParseError(_))));
	}
}
