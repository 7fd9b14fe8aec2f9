//! Configuration module for the chain-parameter engine.
//!
//! Configuration is a single TOML file. `${VAR}` and `${VAR:-default}`
//! placeholders are substituted from the environment before parsing, and the
//! parsed configuration is validated before it is handed to the engine.

use chainparams_types::{networks::deserialize_networks, Chain, NetworksConfig};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message only, not the whole input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration of the engine and its service binary.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Engine identity and request bounds.
	pub engine: EngineConfig,
	/// Parameter cache lifetimes.
	#[serde(default)]
	pub cache: CacheConfig,
	/// Pending-transaction tracker timing.
	#[serde(default)]
	pub tracker: TrackerConfig,
	/// Per-chain network endpoints.
	#[serde(deserialize_with = "deserialize_networks")]
	pub networks: NetworksConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Engine identity and request bounds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
	/// Identifier used in logs.
	pub id: String,
	/// Upper bound for a single adapter resolution, in seconds.
	#[serde(default = "default_request_timeout_seconds")]
	pub request_timeout_seconds: u64,
}

impl EngineConfig {
	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_seconds)
	}
}

/// Parameter cache lifetimes.
///
/// Chains listed in `fast_finality_chains` use `fast_ttl_seconds`; every other
/// chain uses `default_ttl_seconds`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
	#[serde(default = "default_ttl_seconds")]
	pub default_ttl_seconds: u64,
	#[serde(default = "default_fast_ttl_seconds")]
	pub fast_ttl_seconds: u64,
	#[serde(default = "default_fast_finality_chains")]
	pub fast_finality_chains: Vec<Chain>,
	/// Interval of the background sweep removing expired entries.
	#[serde(default = "default_cleanup_interval_seconds")]
	pub cleanup_interval_seconds: u64,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			default_ttl_seconds: default_ttl_seconds(),
			fast_ttl_seconds: default_fast_ttl_seconds(),
			fast_finality_chains: default_fast_finality_chains(),
			cleanup_interval_seconds: default_cleanup_interval_seconds(),
		}
	}
}

/// Pending-transaction tracker timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
	#[serde(default = "default_poll_interval_seconds")]
	pub poll_interval_seconds: u64,
	/// Entries older than this are dropped without confirmation.
	#[serde(default = "default_expiry_seconds")]
	pub expiry_seconds: u64,
}

impl Default for TrackerConfig {
	fn default() -> Self {
		Self {
			poll_interval_seconds: default_poll_interval_seconds(),
			expiry_seconds: default_expiry_seconds(),
		}
	}
}

impl TrackerConfig {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_secs(self.poll_interval_seconds)
	}

	pub fn expiry(&self) -> Duration {
		Duration::from_secs(self.expiry_seconds)
	}
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	#[serde(default = "default_api_host")]
	pub host: String,
	#[serde(default = "default_api_port")]
	pub port: u16,
}

fn default_request_timeout_seconds() -> u64 {
	15
}

fn default_ttl_seconds() -> u64 {
	60
}

fn default_fast_ttl_seconds() -> u64 {
	10
}

fn default_fast_finality_chains() -> Vec<Chain> {
	vec![Chain::Solana]
}

fn default_cleanup_interval_seconds() -> u64 {
	60
}

fn default_poll_interval_seconds() -> u64 {
	10
}

fn default_expiry_seconds() -> u64 {
	600
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of `VAR_NAME`, or with `default` for
/// `${VAR_NAME:-default}` when the variable is unset.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut output = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match std::env::var(name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						name.as_str()
					)))
				},
			},
		};

		output.push_str(&input[last_end..whole.start()]);
		output.push_str(&value);
		last_end = whole.end();
	}
	output.push_str(&input[last_end..]);

	Ok(output)
}

impl Config {
	/// Loads configuration from a file, resolving environment variables.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path).await?;
		content.parse()
	}

	/// Validates the configuration:
	/// - engine id is not empty
	/// - at least one network is configured, each with an http(s) endpoint
	/// - timeouts, TTLs and intervals are positive
	/// - the fast TTL does not exceed the default TTL
	fn validate(&self) -> Result<(), ConfigError> {
		if self.engine.id.trim().is_empty() {
			return Err(ConfigError::Validation("Engine ID cannot be empty".into()));
		}
		if self.engine.request_timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"request_timeout_seconds must be greater than 0".into(),
			));
		}

		if self.networks.is_empty() {
			return Err(ConfigError::Validation(
				"At least one network must be configured".into(),
			));
		}
		for (chain, network) in &self.networks {
			if !(network.rpc_url.starts_with("http://") || network.rpc_url.starts_with("https://")) {
				return Err(ConfigError::Validation(format!(
					"Network {} has invalid rpc_url '{}': must start with http:// or https://",
					chain, network.rpc_url
				)));
			}
		}

		let positive = [
			("cache.default_ttl_seconds", self.cache.default_ttl_seconds),
			("cache.fast_ttl_seconds", self.cache.fast_ttl_seconds),
			(
				"cache.cleanup_interval_seconds",
				self.cache.cleanup_interval_seconds,
			),
			(
				"tracker.poll_interval_seconds",
				self.tracker.poll_interval_seconds,
			),
			("tracker.expiry_seconds", self.tracker.expiry_seconds),
		];
		for (name, value) in positive {
			if value == 0 {
				return Err(ConfigError::Validation(format!(
					"{} must be greater than 0",
					name
				)));
			}
		}

		if self.cache.fast_ttl_seconds > self.cache.default_ttl_seconds {
			return Err(ConfigError::Validation(format!(
				"cache.fast_ttl_seconds ({}) cannot exceed cache.default_ttl_seconds ({})",
				self.cache.fast_ttl_seconds, self.cache.default_ttl_seconds
			)));
		}

		if let Some(api) = &self.api {
			if api.enabled && api.host.trim().is_empty() {
				return Err(ConfigError::Validation(
					"api.host cannot be empty when the API is enabled".into(),
				));
			}
		}

		Ok(())
	}
}

/// Parses TOML, resolving environment variables first and validating after.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
