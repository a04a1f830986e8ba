//! Action intake module for the farmgate marketplace engine.
//!
//! This module handles the arrival of marketplace actions from various
//! sources. It provides abstractions for different intake mechanisms such
//! as replaying a recorded action file or reading line-delimited input,
//! all feeding the engine's action channel.

use async_trait::async_trait;
use farmgate_types::{ImplementationRegistry, MarketAction};
use thiserror::Error;
use tokio::sync::mpsc;

/// Re-export implementations
pub mod implementations {
	pub mod replay;
	pub mod stdin;
}

/// Errors that can occur during action intake operations.
#[derive(Debug, Error)]
pub enum IntakeError {
	/// Error that occurs when a source fails to produce actions.
	#[error("Source error: {0}")]
	Source(String),
	/// Error that occurs when trying to start an already running source.
	#[error("Already running")]
	AlreadyRunning,
	/// Error that occurs when parsing or decoding an action fails.
	#[error("Parse error: {0}")]
	Parse(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for action sources.
///
/// This trait must be implemented by any intake source that wants to
/// integrate with the engine. It provides methods for starting and
/// stopping action production.
#[async_trait]
pub trait ActionSource: Send + Sync {
	/// Starts producing actions from this source.
	///
	/// Produced actions are sent through the provided channel. The source
	/// should continue until stop is called or its input is exhausted.
	async fn start(&self, sender: mpsc::UnboundedSender<MarketAction>) -> Result<(), IntakeError>;

	/// Stops producing actions from this source.
	///
	/// This method should cleanly shut down any active production tasks
	/// and release associated resources.
	async fn stop(&self) -> Result<(), IntakeError>;
}

/// Type alias for intake source factory functions.
///
/// This is the function signature that all intake sources must provide
/// to create instances of their source.
pub type SourceFactory = fn(&toml::Value) -> Result<Box<dyn ActionSource>, IntakeError>;

/// Registry trait for intake source implementations.
///
/// This trait extends the base ImplementationRegistry to specify that
/// intake sources must provide a SourceFactory.
pub trait SourceRegistry: ImplementationRegistry<Factory = SourceFactory> {}

/// Get all registered intake source implementations.
///
/// Returns a vector of (name, factory) tuples for all available sources.
/// This is used by the factory registry to automatically register all
/// implementations.
pub fn get_all_implementations() -> Vec<(&'static str, SourceFactory)> {
	use implementations::{replay, stdin};

	vec![
		(replay::Registry::NAME, replay::Registry::factory()),
		(stdin::Registry::NAME, stdin::Registry::factory()),
	]
}

/// Service that manages multiple action sources.
///
/// The IntakeService coordinates the configured sources, allowing the
/// engine to receive actions from several channels simultaneously.
pub struct IntakeService {
	/// Collection of action sources to run.
	sources: Vec<Box<dyn ActionSource>>,
}

impl IntakeService {
	/// Creates a new IntakeService with the specified sources.
	///
	/// Each source runs independently once started.
	pub fn new(sources: Vec<Box<dyn ActionSource>>) -> Self {
		Self { sources }
	}

	/// Starts all configured sources.
	///
	/// All produced actions from any source are sent through the provided
	/// channel. If any source fails to start, the entire operation fails.
	pub async fn start_all(
		&self,
		sender: mpsc::UnboundedSender<MarketAction>,
	) -> Result<(), IntakeError> {
		for source in &self.sources {
			source.start(sender.clone()).await?;
		}
		Ok(())
	}

	/// Stops all active sources.
	pub async fn stop_all(&self) -> Result<(), IntakeError> {
		for source in &self.sources {
			source.stop().await?;
		}
		Ok(())
	}
}
