//! Configuration module for the farmgate marketplace engine.
//!
//! This module provides structures and utilities for managing engine configuration.
//! It supports loading configuration from TOML files and provides validation to ensure
//! all required configuration values are properly set.

use farmgate_types::ReceiptResetPolicy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
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
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the marketplace engine.
///
/// This structure contains all configuration sections required for the engine
/// to operate: the market identity, storage backends, intake sources,
/// notification sinks, lifecycle policies, and optional seed fixtures.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this market instance.
	pub market: MarketConfig,
	/// Configuration for the storage backend.
	pub store: StoreConfig,
	/// Configuration for intake sources.
	pub intake: IntakeConfig,
	/// Configuration for notification delivery.
	pub notifications: NotificationsConfig,
	/// Lifecycle policy knobs.
	#[serde(default)]
	pub lifecycle: LifecycleConfig,
	/// Optional seed fixtures loaded at startup.
	pub seed: Option<SeedConfig>,
}

/// Configuration specific to the market instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketConfig {
	/// Unique identifier for this market instance.
	pub id: String,
	/// Capacity of the broadcast event bus.
	/// Defaults to 1000 events if not specified.
	#[serde(default = "default_event_buffer_size")]
	pub event_buffer_size: usize,
}

/// Returns the default event bus capacity.
///
/// This provides a default capacity of 1000 buffered events
/// when no explicit capacity is configured.
fn default_event_buffer_size() -> usize {
	1000
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for intake sources.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntakeConfig {
	/// Map of intake source names to their configurations.
	/// Each source has its own configuration format stored as raw TOML values.
	pub sources: HashMap<String, toml::Value>,
}

/// Configuration for notification delivery.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationsConfig {
	/// Map of notification sink names to their configurations.
	/// Each sink has its own configuration format stored as raw TOML values.
	pub sinks: HashMap<String, toml::Value>,
}

/// Lifecycle policy knobs for order and negotiation handling.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LifecycleConfig {
	/// Receipt upload behavior: whether the status reset to pending
	/// applies always or only before shipment.
	#[serde(default)]
	pub receipt_reset: ReceiptResetPolicy,
	/// Minimum quantity a buyer may request when opening a negotiation.
	/// Defaults to 10 units.
	#[serde(default = "default_min_offer_qty")]
	pub min_offer_qty: u32,
	/// Width of the delivery-date window in days, counted from the day
	/// after the offer is made. Defaults to 7 days.
	#[serde(default = "default_offer_window_days")]
	pub offer_window_days: u32,
}

impl Default for LifecycleConfig {
	fn default() -> Self {
		Self {
			receipt_reset: ReceiptResetPolicy::default(),
			min_offer_qty: default_min_offer_qty(),
			offer_window_days: default_offer_window_days(),
		}
	}
}

/// Returns the default minimum offer quantity.
///
/// This provides a default threshold of 10 units for negotiation requests
/// when no explicit minimum is configured.
fn default_min_offer_qty() -> u32 {
	10
}

/// Returns the default delivery-date window in days.
///
/// This provides a default window of 7 calendar days for negotiation
/// delivery dates when no explicit window is configured.
fn default_offer_window_days() -> u32 {
	7
}

/// Seed fixture paths loaded once at startup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SeedConfig {
	/// Path to a JSON array of orders.
	pub orders: Option<PathBuf>,
	/// Path to a JSON array of negotiations.
	pub negotiations: Option<PathBuf>,
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	// Limit input size to prevent ReDoS attacks
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file.
	///
	/// Environment variables in the file are resolved and the configuration
	/// is validated after parsing.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let contents = tokio::fs::read_to_string(path).await?;
		contents.parse()
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// This method performs validation across all configuration sections:
	/// - Ensures the market ID is not empty
	/// - Validates the storage backend selection
	/// - Checks that at least one intake source is configured
	/// - Checks that at least one notification sink is configured
	/// - Bounds the lifecycle policy knobs
	fn validate(&self) -> Result<(), ConfigError> {
		// Validate market config
		if self.market.id.is_empty() {
			return Err(ConfigError::Validation("Market ID cannot be empty".into()));
		}
		if self.market.event_buffer_size == 0 {
			return Err(ConfigError::Validation(
				"Market event_buffer_size must be greater than 0".into(),
			));
		}

		// Validate store config
		if self.store.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if self.store.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self.store.implementations.contains_key(&self.store.primary) {
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.store.primary
			)));
		}

		// Validate intake config
		if self.intake.sources.is_empty() {
			return Err(ConfigError::Validation(
				"At least one intake source required".into(),
			));
		}

		// Validate notifications config
		if self.notifications.sinks.is_empty() {
			return Err(ConfigError::Validation(
				"At least one notification sink required".into(),
			));
		}

		// Validate lifecycle knobs
		if self.lifecycle.min_offer_qty == 0 {
			return Err(ConfigError::Validation(
				"Lifecycle min_offer_qty must be at least 1".into(),
			));
		}
		if self.lifecycle.offer_window_days == 0 {
			return Err(ConfigError::Validation(
				"Lifecycle offer_window_days must be at least 1".into(),
			));
		}
		if self.lifecycle.offer_window_days > 90 {
			return Err(ConfigError::Validation(
				"Lifecycle offer_window_days cannot exceed 90".into(),
			));
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// This allows configuration to be parsed from TOML strings using the standard
/// string parsing interface. Environment variables are resolved and the
/// configuration is automatically validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const BASE_CONFIG: &str = r#"
[market]
id = "test-market"

[store]
primary = "memory"
[store.implementations.memory]

[intake]
[intake.sources.replay]
path = "./fixtures/actions.json"

[notifications]
[notifications.sinks.log]
"#;

	#[test]
	fn test_env_var_resolution() {
		// Set up test environment variables
		std::env::set_var("TEST_DATA_DIR", "/tmp/market");
		std::env::set_var("TEST_MARKET_ID", "env-market");

		let input = "path = \"${TEST_DATA_DIR}/${TEST_MARKET_ID}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "path = \"/tmp/market/env-market\"");

		// Clean up
		std::env::remove_var("TEST_DATA_DIR");
		std::env::remove_var("TEST_MARKET_ID");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("MISSING_VAR"));
	}

	#[test]
	fn test_parse_base_config_with_defaults() {
		let config: Config = BASE_CONFIG.parse().unwrap();
		assert_eq!(config.market.id, "test-market");
		assert_eq!(config.market.event_buffer_size, 1000);
		assert_eq!(config.lifecycle.min_offer_qty, 10);
		assert_eq!(config.lifecycle.offer_window_days, 7);
		assert!(matches!(
			config.lifecycle.receipt_reset,
			ReceiptResetPolicy::Always
		));
		assert!(config.seed.is_none());
	}

	#[test]
	fn test_lifecycle_overrides() {
		let config_str = format!(
			"{}\n{}",
			BASE_CONFIG,
			r#"
[lifecycle]
receipt_reset = "before-shipment"
min_offer_qty = 25
offer_window_days = 14
"#
		);

		let config: Config = config_str.parse().unwrap();
		assert!(matches!(
			config.lifecycle.receipt_reset,
			ReceiptResetPolicy::BeforeShipment
		));
		assert_eq!(config.lifecycle.min_offer_qty, 25);
		assert_eq!(config.lifecycle.offer_window_days, 14);
	}

	#[test]
	fn test_primary_store_must_be_configured() {
		let config_str = r#"
[market]
id = "test-market"

[store]
primary = "file"
[store.implementations.memory]

[intake]
[intake.sources.replay]

[notifications]
[notifications.sinks.log]
"#;

		let result = Config::from_str(config_str);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("Primary storage 'file' not found"));
	}

	#[test]
	fn test_empty_intake_rejected() {
		let config_str = r#"
[market]
id = "test-market"

[store]
primary = "memory"
[store.implementations.memory]

[intake]
sources = {}

[notifications]
[notifications.sinks.log]
"#;

		let result = Config::from_str(config_str);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("At least one intake source required"));
	}

	#[test]
	fn test_offer_window_bounds() {
		let config_str = format!(
			"{}\n{}",
			BASE_CONFIG,
			r#"
[lifecycle]
offer_window_days = 120
"#
		);

		let result = Config::from_str(&config_str);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("offer_window_days cannot exceed 90"));
	}

	#[test]
	fn test_config_with_env_vars() {
		std::env::set_var("TEST_FARMGATE_ID", "farmgate-env");

		let config_str = r#"
[market]
id = "${TEST_FARMGATE_ID}"

[store]
primary = "memory"
[store.implementations.memory]

[intake]
[intake.sources.replay]
path = "${TEST_FIXTURES:-./fixtures}/actions.json"

[notifications]
[notifications.sinks.log]
"#;

		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.market.id, "farmgate-env");
		let replay = &config.intake.sources["replay"];
		assert_eq!(
			replay.get("path").and_then(|v| v.as_str()),
			Some("./fixtures/actions.json")
		);

		std::env::remove_var("TEST_FARMGATE_ID");
	}

	#[tokio::test]
	async fn test_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "{}", BASE_CONFIG).unwrap();

		let config = Config::from_file(file.path().to_str().unwrap())
			.await
			.unwrap();
		assert_eq!(config.market.id, "test-market");
	}

	#[tokio::test]
	async fn test_from_file_missing_path() {
		let result = Config::from_file("/nonexistent/farmgate.toml").await;
		assert!(matches!(result, Err(ConfigError::Io(_))));
	}
}
