//! Order store implementation.
//!
//! The authoritative mutation layer for the order collection. Transitions are
//! validated against the forward-only status table, applied atomically, and
//! published on the event bus as they happen. The receipt-upload reset to
//! pending is the single sanctioned way back and is governed by the
//! configured reset policy.

use crate::engine::event_bus::EventBus;
use chrono::{DateTime, Utc};
use farmgate_lifecycle::{is_valid_order_transition, receipt_reset_allowed};
use farmgate_storage::{StorageError, StorageService};
use farmgate_types::{
	CheckoutRequest, MarketEvent, Order, OrderEvent, OrderStatus, ReceiptResetPolicy, StorageKey,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during order state management.
///
/// These errors represent failures in storage operations, rejected
/// transitions, missing orders, and duplicate creation attempts.
#[derive(Debug, Error)]
pub enum OrderStateError {
	#[error("Storage error: {0}")]
	Storage(String),
	#[error("Invalid status transition from {from} to {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	#[error("Order not found: {0}")]
	NotFound(String),
	#[error("Order already exists: {0}")]
	Duplicate(String),
	#[error("Receipt upload rejected: order {order_id} is already {status}")]
	ReceiptRejected {
		order_id: String,
		status: OrderStatus,
	},
}

/// Manages the order collection with transition validation and persistence.
pub struct OrderStore {
	storage: Arc<StorageService>,
	event_bus: EventBus,
	receipt_reset: ReceiptResetPolicy,
}

impl OrderStore {
	pub fn new(
		storage: Arc<StorageService>,
		event_bus: EventBus,
		receipt_reset: ReceiptResetPolicy,
	) -> Self {
		Self {
			storage,
			event_bus,
			receipt_reset,
		}
	}

	/// Creates a new order from a checkout payload.
	///
	/// Assigns an id when the payload carries none and inserts the order at
	/// the head of the listing index. Publishes `OrderEvent::Created`.
	pub async fn create(&self, request: CheckoutRequest) -> Result<Order, OrderStateError> {
		self.insert(request.into_order(Utc::now())).await
	}

	/// Inserts a fully-formed order, guarding id uniqueness.
	///
	/// Seeding uses this directly so fixtures with pre-set statuses land
	/// as-is.
	pub async fn insert(&self, order: Order) -> Result<Order, OrderStateError> {
		let exists = self
			.storage
			.exists(StorageKey::Orders.as_str(), &order.id)
			.await
			.map_err(|e| OrderStateError::Storage(e.to_string()))?;
		if exists {
			return Err(OrderStateError::Duplicate(order.id));
		}

		self.storage
			.store(StorageKey::Orders.as_str(), &order.id, &order)
			.await
			.map_err(|e| OrderStateError::Storage(e.to_string()))?;
		self.push_index(&order.id).await?;

		self.event_bus
			.publish(MarketEvent::Order(OrderEvent::Created {
				order: order.clone(),
			}))
			.ok();

		Ok(order)
	}

	/// Transitions an order to a new status with validation.
	///
	/// The explicit timestamps are applied only when supplied and not already
	/// set; stamped timestamps are never overwritten or cleared.
	pub async fn update_status(
		&self,
		order_id: &str,
		new_status: OrderStatus,
		paid_at: Option<DateTime<Utc>>,
		delivered_at: Option<DateTime<Utc>>,
	) -> Result<Order, OrderStateError> {
		let order = self.load(order_id).await?;
		let old_status = order.status;

		if !is_valid_order_transition(old_status, new_status) {
			return Err(OrderStateError::InvalidTransition {
				from: old_status,
				to: new_status,
			});
		}

		let updated = self
			.update_with(order_id, |o| {
				o.status = new_status;
				if o.paid_at.is_none() {
					o.paid_at = paid_at;
				}
				if o.delivered_at.is_none() {
					o.delivered_at = delivered_at;
				}
			})
			.await?;

		self.publish_status_change(order_id, old_status, new_status);
		Ok(updated)
	}

	/// Attaches a payment receipt and forces the order back to pending.
	///
	/// Re-uploading overwrites the previous receipt. Under the
	/// `before-shipment` policy the reset is rejected once the order has
	/// shipped. Publishes `ReceiptUploaded`, plus `StatusChanged` when the
	/// status actually moved.
	pub async fn upload_receipt(
		&self,
		order_id: &str,
		receipt_url: String,
	) -> Result<Order, OrderStateError> {
		let order = self.load(order_id).await?;
		let old_status = order.status;

		if !receipt_reset_allowed(self.receipt_reset, old_status) {
			return Err(OrderStateError::ReceiptRejected {
				order_id: order_id.to_string(),
				status: old_status,
			});
		}

		let updated = self
			.update_with(order_id, |o| {
				o.receipt_url = Some(receipt_url.clone());
				o.status = OrderStatus::Pending;
			})
			.await?;

		self.event_bus
			.publish(MarketEvent::Order(OrderEvent::ReceiptUploaded {
				order_id: order_id.to_string(),
				receipt_url,
			}))
			.ok();

		if old_status != OrderStatus::Pending {
			self.publish_status_change(order_id, old_status, OrderStatus::Pending);
		}

		Ok(updated)
	}

	/// Convenience transition to paid, stamping the payment timestamp.
	///
	/// Calling this on an already paid order is a no-op returning the order
	/// unchanged; the original `paid_at` survives.
	pub async fn mark_paid(&self, order_id: &str) -> Result<Order, OrderStateError> {
		let order = self.load(order_id).await?;
		if order.status == OrderStatus::Paid {
			return Ok(order);
		}

		let old_status = order.status;
		if !is_valid_order_transition(old_status, OrderStatus::Paid) {
			return Err(OrderStateError::InvalidTransition {
				from: old_status,
				to: OrderStatus::Paid,
			});
		}

		let now = Utc::now();
		let updated = self
			.update_with(order_id, |o| {
				o.status = OrderStatus::Paid;
				if o.paid_at.is_none() {
					o.paid_at = Some(now);
				}
			})
			.await?;

		self.publish_status_change(order_id, old_status, OrderStatus::Paid);
		Ok(updated)
	}

	/// Convenience transition to delivered, stamping the delivery timestamp.
	pub async fn mark_delivered(&self, order_id: &str) -> Result<Order, OrderStateError> {
		let order = self.load(order_id).await?;
		if order.status == OrderStatus::Delivered {
			return Ok(order);
		}

		let old_status = order.status;
		if !is_valid_order_transition(old_status, OrderStatus::Delivered) {
			return Err(OrderStateError::InvalidTransition {
				from: old_status,
				to: OrderStatus::Delivered,
			});
		}

		let now = Utc::now();
		let updated = self
			.update_with(order_id, |o| {
				o.status = OrderStatus::Delivered;
				if o.delivered_at.is_none() {
					o.delivered_at = Some(now);
				}
			})
			.await?;

		self.publish_status_change(order_id, old_status, OrderStatus::Delivered);
		Ok(updated)
	}

	/// Gets an order by id.
	pub async fn get(&self, order_id: &str) -> Result<Order, OrderStateError> {
		self.load(order_id).await
	}

	/// Lists all orders, newest first per the insertion index.
	pub async fn list(&self) -> Result<Vec<Order>, OrderStateError> {
		let ids = self.load_index().await?;
		let mut orders = Vec::with_capacity(ids.len());
		for id in &ids {
			orders.push(self.load(id).await?);
		}
		Ok(orders)
	}

	async fn load(&self, order_id: &str) -> Result<Order, OrderStateError> {
		self.storage
			.retrieve(StorageKey::Orders.as_str(), order_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => OrderStateError::NotFound(order_id.to_string()),
				other => OrderStateError::Storage(other.to_string()),
			})
	}

	/// Updates an order with a closure and persists it.
	async fn update_with<F>(&self, order_id: &str, updater: F) -> Result<Order, OrderStateError>
	where
		F: FnOnce(&mut Order),
	{
		let mut order = self.load(order_id).await?;
		updater(&mut order);

		self.storage
			.update(StorageKey::Orders.as_str(), order_id, &order)
			.await
			.map_err(|e| OrderStateError::Storage(e.to_string()))?;

		Ok(order)
	}

	async fn load_index(&self) -> Result<Vec<String>, OrderStateError> {
		match self
			.storage
			.retrieve(StorageKey::Indexes.as_str(), StorageKey::Orders.as_str())
			.await
		{
			Ok(ids) => Ok(ids),
			Err(StorageError::NotFound) => Ok(Vec::new()),
			Err(e) => Err(OrderStateError::Storage(e.to_string())),
		}
	}

	async fn push_index(&self, order_id: &str) -> Result<(), OrderStateError> {
		let mut ids = self.load_index().await?;
		ids.insert(0, order_id.to_string());
		self.storage
			.store(StorageKey::Indexes.as_str(), StorageKey::Orders.as_str(), &ids)
			.await
			.map_err(|e| OrderStateError::Storage(e.to_string()))
	}

	fn publish_status_change(&self, order_id: &str, old: OrderStatus, new: OrderStatus) {
		self.event_bus
			.publish(MarketEvent::Order(OrderEvent::StatusChanged {
				order_id: order_id.to_string(),
				old_status: old,
				new_status: new,
			}))
			.ok();
	}
}
