//! Event bus for broadcasting lifecycle events to subscribers.
//!
//! Wraps a tokio broadcast channel so the stores can publish transition
//! events without knowing who consumes them. Subscribers that fall behind
//! lose the oldest buffered events rather than blocking the publisher.

use farmgate_types::MarketEvent;
use tokio::sync::broadcast;

/// Broadcast channel distributing market events to all subscribers.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<MarketEvent>,
}

impl EventBus {
	/// Creates a new event bus with the given buffer capacity.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to every current subscriber.
	///
	/// Fails only when nobody is subscribed; publishers that run before the
	/// engine loop starts (seeding) discard the result with `.ok()`.
	pub fn publish(
		&self,
		event: MarketEvent,
	) -> Result<(), broadcast::error::SendError<MarketEvent>> {
		self.sender.send(event).map(|_| ())
	}

	/// Creates a new subscription to the event stream.
	pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
		self.sender.subscribe()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use farmgate_types::{OrderEvent, OrderStatus};

	#[tokio::test]
	async fn test_publish_reaches_subscriber() {
		let bus = EventBus::new(16);
		let mut rx = bus.subscribe();

		bus.publish(MarketEvent::Order(OrderEvent::StatusChanged {
			order_id: "ord-1".to_string(),
			old_status: OrderStatus::Pending,
			new_status: OrderStatus::Paid,
		}))
		.unwrap();

		match rx.recv().await.unwrap() {
			MarketEvent::Order(OrderEvent::StatusChanged { order_id, .. }) => {
				assert_eq!(order_id, "ord-1");
			}
			other => panic!("unexpected event: {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_publish_without_subscribers_errors() {
		let bus = EventBus::new(16);
		let result = bus.publish(MarketEvent::Order(OrderEvent::StatusChanged {
			order_id: "ord-1".to_string(),
			old_status: OrderStatus::Pending,
			new_status: OrderStatus::Paid,
		}));
		assert!(result.is_err());
	}
}
