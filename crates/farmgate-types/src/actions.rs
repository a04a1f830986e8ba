//! Action payloads submitted through the intake boundary.
//!
//! This module defines the action values that drive the engine: every
//! user-triggered mutation arrives as one of these shapes, whether from an
//! embedding UI handle, a replay file, or piped line input.

use crate::{CheckoutRequest, CounterOffer, OfferRequest, OrderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Main action type encompassing all marketplace actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarketAction {
	/// Actions against the order collection.
	Order(OrderAction),
	/// Actions against the negotiation collection.
	Negotiation(NegotiationAction),
}

/// Actions that mutate the order collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OrderAction {
	/// Create a new order from a checkout payload.
	Create(CheckoutRequest),
	/// Overwrite an order's status, optionally stamping timestamps.
	UpdateStatus {
		order_id: String,
		status: OrderStatus,
		#[serde(skip_serializing_if = "Option::is_none")]
		paid_at: Option<DateTime<Utc>>,
		#[serde(skip_serializing_if = "Option::is_none")]
		delivered_at: Option<DateTime<Utc>>,
	},
	/// Attach a payment receipt, resetting the order to pending.
	UploadReceipt {
		order_id: String,
		receipt_url: String,
	},
	/// Mark an order as paid, stamping the payment timestamp.
	MarkPaid { order_id: String },
	/// Mark an order as delivered, stamping the delivery timestamp.
	MarkDelivered { order_id: String },
}

impl OrderAction {
	/// Returns the order id this action targets, if it targets an existing order.
	pub fn order_id(&self) -> Option<&str> {
		match self {
			OrderAction::Create(_) => None,
			OrderAction::UpdateStatus { order_id, .. }
			| OrderAction::UploadReceipt { order_id, .. }
			| OrderAction::MarkPaid { order_id }
			| OrderAction::MarkDelivered { order_id } => Some(order_id),
		}
	}
}

/// Actions that mutate the negotiation collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NegotiationAction {
	/// Open a new negotiation from a buyer's offer.
	Open(OfferRequest),
	/// Counter the buyer's offer with a seller price.
	Counter {
		negotiation_id: String,
		#[serde(flatten)]
		counter: CounterOffer,
	},
	/// Accept the negotiation terms.
	Accept { negotiation_id: String },
	/// Reject the negotiation.
	Reject { negotiation_id: String },
}

impl NegotiationAction {
	/// Returns the negotiation id this action targets, if it targets an existing thread.
	pub fn negotiation_id(&self) -> Option<&str> {
		match self {
			NegotiationAction::Open(_) => None,
			NegotiationAction::Counter { negotiation_id, .. }
			| NegotiationAction::Accept { negotiation_id }
			| NegotiationAction::Reject { negotiation_id } => Some(negotiation_id),
		}
	}
}
