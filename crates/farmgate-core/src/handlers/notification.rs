//! Notification handler converting store events into user notifications.
//!
//! Subscribed by the engine loop to the event bus: order status changes in
//! the buyer-relevant set notify the buyer, a newly opened negotiation
//! notifies the seller, and every negotiation response notifies the buyer.
//! Delivery failures are logged by the sink service and never stop the loop.

use crate::state::{NegotiationStore, OrderStore};
use farmgate_notify::messages::{
	negotiation_opened_message, negotiation_status_message, order_status_message,
};
use farmgate_notify::NotifyService;
use farmgate_types::{
	truncate_id, MarketEvent, NegotiationEvent, NegotiationStatus, Notification, OrderEvent,
};
use std::sync::Arc;

/// Handler for converting lifecycle events into notifications.
pub struct NotificationHandler {
	orders: Arc<OrderStore>,
	negotiations: Arc<NegotiationStore>,
	notify: Arc<NotifyService>,
}

impl NotificationHandler {
	pub fn new(
		orders: Arc<OrderStore>,
		negotiations: Arc<NegotiationStore>,
		notify: Arc<NotifyService>,
	) -> Self {
		Self {
			orders,
			negotiations,
			notify,
		}
	}

	/// Converts one event into notifications and delivers them.
	pub async fn handle(&self, event: MarketEvent) {
		match event {
			MarketEvent::Order(OrderEvent::StatusChanged {
				order_id,
				new_status,
				..
			}) if new_status.notifies_buyer() => {
				match self.orders.get(&order_id).await {
					Ok(order) => {
						let notification = Notification::for_order(
							&order.buyer_id,
							&order_id,
							new_status,
							order_status_message(&order_id, new_status),
						);
						self.notify.deliver(&notification).await;
					}
					Err(e) => {
						tracing::warn!(
							order_id = %truncate_id(&order_id),
							error = %e,
							"Skipping notification for unknown order"
						);
					}
				}
			}
			MarketEvent::Negotiation(NegotiationEvent::Opened { negotiation }) => {
				let notification = Notification::for_negotiation(
					&negotiation.seller_id,
					&negotiation.id,
					NegotiationStatus::Open,
					negotiation_opened_message(&negotiation),
				);
				self.notify.deliver(&notification).await;
			}
			MarketEvent::Negotiation(NegotiationEvent::StatusChanged {
				negotiation_id,
				new_status,
				..
			}) => match self.negotiations.get(&negotiation_id).await {
				Ok(negotiation) => {
					let notification = Notification::for_negotiation(
						&negotiation.buyer_id,
						&negotiation_id,
						new_status,
						negotiation_status_message(&negotiation, new_status),
					);
					self.notify.deliver(&notification).await;
				}
				Err(e) => {
					tracing::warn!(
						negotiation_id = %truncate_id(&negotiation_id),
						error = %e,
						"Skipping notification for unknown negotiation"
					);
				}
			},
			// Creation and receipt events carry no buyer-facing message.
			_ => {}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::event_bus::EventBus;
	use chrono::{Days, Utc};
	use farmgate_notify::implementations::feed::FeedSink;
	use farmgate_notify::NotifySink;
	use farmgate_storage::{implementations::memory::MemoryStorage, StorageService};
	use farmgate_types::{
		CheckoutRequest, CounterOffer, NotificationSubject, OfferRequest, OrderItem, OrderStatus,
		ReceiptResetPolicy,
	};
	use rust_decimal::Decimal;
	use std::collections::HashMap;

	struct Fixture {
		handler: NotificationHandler,
		orders: Arc<OrderStore>,
		negotiations: Arc<NegotiationStore>,
		feed: farmgate_notify::FeedHandle,
		bus: EventBus,
	}

	fn fixture() -> Fixture {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::default())));
		let bus = EventBus::new(64);
		let orders = Arc::new(OrderStore::new(
			storage.clone(),
			bus.clone(),
			ReceiptResetPolicy::Always,
		));
		let negotiations = Arc::new(NegotiationStore::new(storage, bus.clone()));

		let sink = FeedSink::new(50);
		let feed = sink.handle();
		let mut sinks: HashMap<String, Box<dyn NotifySink>> = HashMap::new();
		sinks.insert("feed".to_string(), Box::new(sink));
		let notify = Arc::new(NotifyService::new(sinks));

		Fixture {
			handler: NotificationHandler::new(orders.clone(), negotiations.clone(), notify),
			orders,
			negotiations,
			feed,
			bus,
		}
	}

	fn checkout(id: &str) -> CheckoutRequest {
		CheckoutRequest {
			id: Some(id.to_string()),
			buyer_id: "buyer-1".to_string(),
			buyer_name: "Amara".to_string(),
			items: vec![OrderItem {
				product_id: "prod-tomato".to_string(),
				product_name: "Roma Tomatoes".to_string(),
				qty: 5,
				price_per_kg: Decimal::new(280, 2),
			}],
			subtotal: Decimal::new(1400, 2),
			delivery_fee: Decimal::new(500, 2),
			points_discount: None,
			earned_points: None,
			total: Decimal::new(1900, 2),
			status: None,
		}
	}

	fn offer(id: &str) -> OfferRequest {
		OfferRequest {
			id: Some(id.to_string()),
			product_id: "prod-maize".to_string(),
			product_name: "White Maize".to_string(),
			buyer_id: "buyer-1".to_string(),
			buyer_name: "Amara".to_string(),
			seller_id: "seller-7".to_string(),
			seller_name: "Green Valley Farm".to_string(),
			current_price: Decimal::new(150, 2),
			requested_price: Decimal::new(120, 2),
			requested_qty: 50,
			notes: None,
			delivery_date: Utc::now()
				.date_naive()
				.checked_add_days(Days::new(3))
				.unwrap(),
		}
	}

	async fn drain(fixture: &Fixture, rx: &mut tokio::sync::broadcast::Receiver<MarketEvent>) {
		while let Ok(event) = rx.try_recv() {
			fixture.handler.handle(event).await;
		}
	}

	#[tokio::test]
	async fn test_buyer_notified_on_shipment_only() {
		let fixture = fixture();
		let mut rx = fixture.bus.subscribe();

		fixture.orders.create(checkout("ord-1")).await.unwrap();
		fixture.orders.mark_paid("ord-1").await.unwrap();
		fixture
			.orders
			.update_status("ord-1", OrderStatus::Shipped, None, None)
			.await
			.unwrap();
		drain(&fixture, &mut rx).await;

		// Created and the pending->paid change stay silent; shipped notifies.
		let inbox = fixture.feed.notifications_for("buyer-1");
		assert_eq!(inbox.len(), 1);
		assert_eq!(
			inbox[0].subject,
			NotificationSubject::Order {
				order_id: "ord-1".to_string(),
				status: OrderStatus::Shipped,
			}
		);
	}

	#[tokio::test]
	async fn test_each_transition_notifies_individually() {
		let fixture = fixture();
		let mut rx = fixture.bus.subscribe();

		fixture.orders.create(checkout("ord-1")).await.unwrap();
		fixture.orders.mark_paid("ord-1").await.unwrap();
		fixture
			.orders
			.update_status("ord-1", OrderStatus::Shipped, None, None)
			.await
			.unwrap();
		fixture.orders.mark_delivered("ord-1").await.unwrap();
		drain(&fixture, &mut rx).await;

		// Shipped and delivered each produced their own notification.
		let inbox = fixture.feed.notifications_for("buyer-1");
		assert_eq!(inbox.len(), 2);
		assert_eq!(
			inbox[0].subject,
			NotificationSubject::Order {
				order_id: "ord-1".to_string(),
				status: OrderStatus::Delivered,
			}
		);
		assert_eq!(
			inbox[1].subject,
			NotificationSubject::Order {
				order_id: "ord-1".to_string(),
				status: OrderStatus::Shipped,
			}
		);
	}

	#[tokio::test]
	async fn test_negotiation_routes_to_seller_then_buyer() {
		let fixture = fixture();
		let mut rx = fixture.bus.subscribe();

		fixture.negotiations.open(offer("neg-1")).await.unwrap();
		drain(&fixture, &mut rx).await;

		let seller_inbox = fixture.feed.notifications_for("seller-7");
		assert_eq!(seller_inbox.len(), 1);
		assert!(seller_inbox[0].message.contains("Amara"));

		fixture
			.negotiations
			.counter(
				"neg-1",
				CounterOffer {
					counter_price: Decimal::new(135, 2),
					counter_notes: None,
				},
			)
			.await
			.unwrap();
		drain(&fixture, &mut rx).await;

		let buyer_inbox = fixture.feed.notifications_for("buyer-1");
		assert_eq!(buyer_inbox.len(), 1);
		assert_eq!(
			buyer_inbox[0].subject,
			NotificationSubject::Negotiation {
				negotiation_id: "neg-1".to_string(),
				status: NegotiationStatus::Countered,
			}
		);
		// The message carries the freshly persisted counter price.
		assert!(buyer_inbox[0].message.contains("1.35"));
	}
}
