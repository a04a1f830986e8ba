//! Notification module for the farmgate marketplace engine.
//!
//! This module turns lifecycle transitions into user-facing notifications
//! and delivers them through pluggable sinks. It carries two observation
//! paths: the event-driven dispatcher fed by store events (the primary
//! path) and the snapshot-diffing watcher for collection-polling consumers.

use async_trait::async_trait;
use farmgate_types::{ImplementationRegistry, Notification};
use std::collections::HashMap;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod feed;
	pub mod log;
}

/// Message templates shared by the notifier and the watcher.
pub mod messages;
/// Snapshot-diffing watcher over the order collection.
pub mod watcher;

pub use implementations::feed::FeedHandle;
pub use watcher::SnapshotWatcher;

/// Errors that can occur during notification delivery.
#[derive(Debug, Error)]
pub enum NotifyError {
	/// Error that occurs when a sink fails to deliver a notification.
	#[error("Delivery error: {0}")]
	Delivery(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for notification sinks.
///
/// This trait must be implemented by any delivery target that wants to
/// receive notifications from the engine. Delivery is best-effort; a
/// failing sink never stops the others.
#[async_trait]
pub trait NotifySink: Send + Sync {
	/// Delivers a single notification to this sink.
	async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Type alias for notification sink factory functions.
///
/// This is the function signature that all sink implementations must provide
/// to create instances of their sink.
pub type SinkFactory = fn(&toml::Value) -> Result<Box<dyn NotifySink>, NotifyError>;

/// Registry trait for notification sink implementations.
///
/// This trait extends the base ImplementationRegistry to specify that
/// sink implementations must provide a SinkFactory.
pub trait SinkRegistry: ImplementationRegistry<Factory = SinkFactory> {}

/// Get all registered sink implementations.
///
/// Returns a vector of (name, factory) tuples for all available sink
/// implementations. This is used by the factory registry to automatically
/// register all implementations.
pub fn get_all_implementations() -> Vec<(&'static str, SinkFactory)> {
	use implementations::{feed, log};

	vec![
		(feed::Registry::NAME, feed::Registry::factory()),
		(log::Registry::NAME, log::Registry::factory()),
	]
}

/// Service that fans notifications out to every configured sink.
///
/// The NotifyService owns the sink map built from configuration. A sink
/// that fails to deliver is logged and skipped so one broken target never
/// silences the rest.
pub struct NotifyService {
	/// Map of sink names to their implementations.
	sinks: HashMap<String, Box<dyn NotifySink>>,
}

impl NotifyService {
	/// Creates a new NotifyService with the specified sinks.
	pub fn new(sinks: HashMap<String, Box<dyn NotifySink>>) -> Self {
		Self { sinks }
	}

	/// Delivers a notification to every configured sink.
	pub async fn deliver(&self, notification: &Notification) {
		for (name, sink) in &self.sinks {
			if let Err(e) = sink.deliver(notification).await {
				tracing::warn!(
					sink = %name,
					notification_id = %notification.id,
					error = %e,
					"Failed to deliver notification"
				);
			}
		}
	}

	/// Returns the number of configured sinks.
	pub fn sink_count(&self) -> usize {
		self.sinks.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use farmgate_types::OrderStatus;
	use std::sync::{Arc, Mutex};

	struct RecordingSink {
		seen: Arc<Mutex<Vec<Notification>>>,
	}

	#[async_trait]
	impl NotifySink for RecordingSink {
		async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
			self.seen.lock().unwrap().push(notification.clone());
			Ok(())
		}
	}

	struct FailingSink;

	#[async_trait]
	impl NotifySink for FailingSink {
		async fn deliver(&self, _notification: &Notification) -> Result<(), NotifyError> {
			Err(NotifyError::Delivery("sink offline".to_string()))
		}
	}

	#[tokio::test]
	async fn test_fan_out_survives_failing_sink() {
		let seen = Arc::new(Mutex::new(Vec::new()));
		let mut sinks: HashMap<String, Box<dyn NotifySink>> = HashMap::new();
		sinks.insert("broken".to_string(), Box::new(FailingSink));
		sinks.insert(
			"recording".to_string(),
			Box::new(RecordingSink { seen: seen.clone() }),
		);

		let service = NotifyService::new(sinks);
		let notification = Notification::for_order(
			"buyer-1",
			"ord-1",
			OrderStatus::Shipped,
			"Your order ord-1 is out for delivery",
		);
		service.deliver(&notification).await;

		let seen = seen.lock().unwrap();
		assert_eq!(seen.len(), 1);
		assert_eq!(seen[0].recipient_id, "buyer-1");
	}

	#[test]
	fn test_all_implementations_registered() {
		let implementations = get_all_implementations();
		let names: Vec<&str> = implementations.iter().map(|(name, _)| *name).collect();
		assert!(names.contains(&"feed"));
		assert!(names.contains(&"log"));
	}
}
