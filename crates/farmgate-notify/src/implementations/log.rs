//! Logging sink backed by structured tracing output.
//!
//! The default demo-visible sink: every notification lands in the service
//! log with the recipient and subject fields attached.

use crate::{NotifyError, NotifySink};
use async_trait::async_trait;
use farmgate_types::{utils::truncate_id, Notification, NotificationSubject};

/// Notification sink writing to the tracing subscriber.
pub struct LogSink;

#[async_trait]
impl NotifySink for LogSink {
	async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
		match &notification.subject {
			NotificationSubject::Order { order_id, status } => {
				tracing::info!(
					recipient = %notification.recipient_id,
					order_id = %truncate_id(order_id),
					status = %status,
					"{}",
					notification.message
				);
			},
			NotificationSubject::Negotiation {
				negotiation_id,
				status,
			} => {
				tracing::info!(
					recipient = %notification.recipient_id,
					negotiation_id = %truncate_id(negotiation_id),
					status = %status,
					"{}",
					notification.message
				);
			},
		}

		Ok(())
	}
}

/// Factory function to create a log sink from configuration.
///
/// Configuration parameters:
/// - None required for the log sink
pub fn create_sink(_config: &toml::Value) -> Result<Box<dyn NotifySink>, NotifyError> {
	Ok(Box::new(LogSink))
}

/// Registry for the logging sink implementation.
pub struct Registry;

impl farmgate_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "log";
	type Factory = crate::SinkFactory;

	fn factory() -> Self::Factory {
		create_sink
	}
}

impl crate::SinkRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use farmgate_types::NegotiationStatus;

	#[tokio::test]
	async fn test_delivery_never_fails() {
		let sink = LogSink;

		let order_note = Notification::for_order(
			"buyer-1",
			"ord-1001",
			farmgate_types::OrderStatus::Delivered,
			"Your order ord-1001 has been delivered",
		);
		assert!(sink.deliver(&order_note).await.is_ok());

		let negotiation_note = Notification::for_negotiation(
			"buyer-1",
			"neg-2002",
			NegotiationStatus::Agreed,
			"Green Valley Farm accepted your offer for White Maize",
		);
		assert!(sink.deliver(&negotiation_note).await.is_ok());
	}
}
