//! Event types for lifecycle transitions.
//!
//! This module defines the event system used by the engine for communication
//! between the stores and downstream consumers. Every applied transition is
//! published synchronously at the moment it happens, so consumers see each
//! status change individually instead of diffing collection snapshots.

use crate::{Negotiation, NegotiationStatus, Order, OrderStatus};
use serde::{Deserialize, Serialize};

/// Main event type encompassing all marketplace events.
///
/// Events are categorized by the entity that produces them, allowing
/// consumers to filter and handle specific event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MarketEvent {
	/// Events from the order store.
	Order(OrderEvent),
	/// Events from the negotiation store.
	Negotiation(NegotiationEvent),
}

/// Events related to order lifecycle changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEvent {
	/// A new order has been created.
	Created { order: Order },
	/// An order moved from one status to another.
	StatusChanged {
		order_id: String,
		old_status: OrderStatus,
		new_status: OrderStatus,
	},
	/// A payment receipt has been attached to an order.
	ReceiptUploaded {
		order_id: String,
		receipt_url: String,
	},
}

/// Events related to negotiation lifecycle changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NegotiationEvent {
	/// A buyer has opened a new negotiation.
	Opened { negotiation: Negotiation },
	/// A negotiation moved from one status to another.
	StatusChanged {
		negotiation_id: String,
		old_status: NegotiationStatus,
		new_status: NegotiationStatus,
	},
}
