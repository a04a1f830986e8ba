//! In-memory feed sink for embedding callers.
//!
//! This module provides a sink that retains a bounded per-recipient inbox,
//! readable through a cloneable handle. An embedding UI constructs the sink
//! directly, keeps the handle, and polls it for fresh notifications.

use crate::{NotifyError, NotifySink};
use async_trait::async_trait;
use dashmap::DashMap;
use farmgate_types::Notification;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Arc;

/// Configuration for the feed sink.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSinkConfig {
	/// Maximum notifications retained per recipient.
	#[serde(default = "default_retention")]
	pub retention: usize,
}

fn default_retention() -> usize {
	50
}

/// Cloneable read handle over the per-recipient feed.
#[derive(Clone, Default)]
pub struct FeedHandle {
	/// Per-recipient inboxes, newest notification at the front.
	inner: Arc<DashMap<String, VecDeque<Notification>>>,
}

impl FeedHandle {
	/// Returns the retained notifications for a recipient, newest first.
	pub fn notifications_for(&self, recipient_id: &str) -> Vec<Notification> {
		self.inner
			.get(recipient_id)
			.map(|inbox| inbox.iter().cloned().collect())
			.unwrap_or_default()
	}

	/// Returns the number of recipients holding at least one notification.
	pub fn recipient_count(&self) -> usize {
		self.inner.len()
	}
}

/// Notification sink retaining a bounded in-memory inbox per recipient.
pub struct FeedSink {
	/// The shared feed written by deliveries and read through handles.
	feed: FeedHandle,
	/// Maximum notifications retained per recipient.
	retention: usize,
}

impl FeedSink {
	/// Creates a feed sink retaining at most `retention` notifications
	/// per recipient.
	pub fn new(retention: usize) -> Self {
		Self {
			feed: FeedHandle::default(),
			retention,
		}
	}

	/// Returns a cloneable read handle over the feed.
	pub fn handle(&self) -> FeedHandle {
		self.feed.clone()
	}
}

#[async_trait]
impl NotifySink for FeedSink {
	async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
		let mut inbox = self
			.feed
			.inner
			.entry(notification.recipient_id.clone())
			.or_default();

		inbox.push_front(notification.clone());
		while inbox.len() > self.retention {
			inbox.pop_back();
		}

		Ok(())
	}
}

/// Factory function to create a feed sink from configuration.
///
/// Configuration parameters:
/// - `retention`: Maximum notifications kept per recipient (default: 50)
pub fn create_sink(config: &toml::Value) -> Result<Box<dyn NotifySink>, NotifyError> {
	let feed_config: FeedSinkConfig = config
		.clone()
		.try_into()
		.map_err(|e| NotifyError::Configuration(format!("Invalid feed sink config: {}", e)))?;

	if feed_config.retention == 0 {
		return Err(NotifyError::Configuration(
			"Feed sink retention must be greater than 0".to_string(),
		));
	}

	Ok(Box::new(FeedSink::new(feed_config.retention)))
}

/// Registry for the in-memory feed sink implementation.
pub struct Registry;

impl farmgate_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "feed";
	type Factory = crate::SinkFactory;

	fn factory() -> Self::Factory {
		create_sink
	}
}

impl crate::SinkRegistry for Registry {}
