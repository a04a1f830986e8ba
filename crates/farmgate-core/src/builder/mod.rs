//! Builder pattern for constructing market engines.
//!
//! Provides a flexible way to compose a MarketEngine from pluggable
//! implementations using factory functions. Supports pluggable storage
//! backends, intake sources, and notification sinks keyed by the
//! implementation names used in configuration.

use crate::engine::{event_bus::EventBus, MarketEngine};
use farmgate_config::Config;
use farmgate_intake::{ActionSource, IntakeError, IntakeService};
use farmgate_notify::{NotifyError, NotifyService, NotifySink};
use farmgate_storage::{StorageError, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during market engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Container for all factory functions needed to build a MarketEngine.
///
/// Each factory function takes a TOML configuration value and returns the
/// corresponding implementation. The maps are keyed by the implementation
/// names referenced in the configuration tables.
pub struct MarketFactories<SF, IF, NF> {
	pub storage_factories: HashMap<String, SF>,
	pub intake_factories: HashMap<String, IF>,
	pub sink_factories: HashMap<String, NF>,
}

/// Builder for constructing a MarketEngine with pluggable implementations.
pub struct MarketBuilder {
	config: Config,
}

impl MarketBuilder {
	/// Creates a new MarketBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the MarketEngine using factories for each component type.
	pub async fn build<SF, IF, NF>(
		self,
		factories: MarketFactories<SF, IF, NF>,
	) -> Result<MarketEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
		IF: Fn(&toml::Value) -> Result<Box<dyn ActionSource>, IntakeError>,
		NF: Fn(&toml::Value) -> Result<Box<dyn NotifySink>, NotifyError>,
	{
		// Create storage implementations
		let mut storage_impls = HashMap::new();
		for (name, config) in &self.config.store.implementations {
			if let Some(factory) = factories.storage_factories.get(name) {
				match factory(config) {
					Ok(implementation) => {
						storage_impls.insert(name.clone(), implementation);
						let is_primary = &self.config.store.primary == name;
						tracing::info!(component = "store", implementation = %name, enabled = %is_primary, "Loaded");
					}
					Err(e) => {
						tracing::error!(
							component = "store",
							implementation = %name,
							error = %e,
							"Failed to create storage implementation"
						);
						return Err(BuilderError::Config(format!(
							"Failed to create storage implementation '{}': {}",
							name, e
						)));
					}
				}
			}
		}

		if storage_impls.is_empty() {
			return Err(BuilderError::Config(
				"No valid storage implementations available".into(),
			));
		}

		// Get the primary storage implementation
		let primary_store = &self.config.store.primary;
		let storage_backend = storage_impls.remove(primary_store).ok_or_else(|| {
			BuilderError::MissingComponent(format!(
				"Primary store '{}' has no registered factory",
				primary_store
			))
		})?;

		let storage = Arc::new(StorageService::new(storage_backend));

		// Create intake sources
		let mut sources: Vec<Box<dyn ActionSource>> = Vec::new();
		for (name, config) in &self.config.intake.sources {
			if let Some(factory) = factories.intake_factories.get(name) {
				match factory(config) {
					Ok(source) => {
						sources.push(source);
						tracing::info!(component = "intake", implementation = %name, "Loaded");
					}
					Err(e) => {
						tracing::error!(
							component = "intake",
							implementation = %name,
							error = %e,
							"Failed to create intake source"
						);
						return Err(BuilderError::Config(format!(
							"Failed to create intake source '{}': {}",
							name, e
						)));
					}
				}
			}
		}

		if sources.is_empty() {
			tracing::warn!(
				"No intake sources available - actions will only arrive through embedded handles"
			);
		}

		let intake = Arc::new(IntakeService::new(sources));

		// Create notification sinks
		let mut sinks: HashMap<String, Box<dyn NotifySink>> = HashMap::new();
		for (name, config) in &self.config.notifications.sinks {
			if let Some(factory) = factories.sink_factories.get(name) {
				match factory(config) {
					Ok(sink) => {
						sinks.insert(name.clone(), sink);
						tracing::info!(component = "notifications", implementation = %name, "Loaded");
					}
					Err(e) => {
						tracing::error!(
							component = "notifications",
							implementation = %name,
							error = %e,
							"Failed to create notification sink"
						);
						return Err(BuilderError::Config(format!(
							"Failed to create notification sink '{}': {}",
							name, e
						)));
					}
				}
			}
		}

		if sinks.is_empty() {
			tracing::warn!(
				"No notification sinks available - lifecycle notifications will be dropped"
			);
		}

		let notify = Arc::new(NotifyService::new(sinks));

		let event_bus = EventBus::new(self.config.market.event_buffer_size);

		Ok(MarketEngine::new(
			self.config,
			storage,
			intake,
			notify,
			event_bus,
		))
	}
}
