//! Notification types produced for buyers and sellers.
//!
//! A notification is the user-facing record of a lifecycle transition,
//! addressed to a single recipient and delivered through the configured
//! sinks. The subject ties it back to the entity that changed.

use crate::{NegotiationStatus, OrderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-facing notification about a lifecycle transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
	/// Unique identifier for this notification.
	pub id: String,
	/// Identifier of the user this notification is addressed to.
	pub recipient_id: String,
	/// The entity and status change this notification refers to.
	pub subject: NotificationSubject,
	/// Human-readable message text.
	pub message: String,
	/// Timestamp when this notification was produced.
	pub created_at: DateTime<Utc>,
}

/// The entity a notification refers to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NotificationSubject {
	/// An order reached the given status.
	Order {
		order_id: String,
		status: OrderStatus,
	},
	/// A negotiation reached the given status.
	Negotiation {
		negotiation_id: String,
		status: NegotiationStatus,
	},
}

impl Notification {
	/// Builds an order notification addressed to the given recipient.
	pub fn for_order(
		recipient_id: impl Into<String>,
		order_id: impl Into<String>,
		status: OrderStatus,
		message: impl Into<String>,
	) -> Self {
		Self {
			id: Uuid::new_v4().to_string(),
			recipient_id: recipient_id.into(),
			subject: NotificationSubject::Order {
				order_id: order_id.into(),
				status,
			},
			message: message.into(),
			created_at: Utc::now(),
		}
	}

	/// Builds a negotiation notification addressed to the given recipient.
	pub fn for_negotiation(
		recipient_id: impl Into<String>,
		negotiation_id: impl Into<String>,
		status: NegotiationStatus,
		message: impl Into<String>,
	) -> Self {
		Self {
			id: Uuid::new_v4().to_string(),
			recipient_id: recipient_id.into(),
			subject: NotificationSubject::Negotiation {
				negotiation_id: negotiation_id.into(),
				status,
			},
			message: message.into(),
			created_at: Utc::now(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_order_notification_subject() {
		let notification = Notification::for_order(
			"buyer-1",
			"ord-1001",
			OrderStatus::Shipped,
			"Your order is out for delivery",
		);

		assert_eq!(notification.recipient_id, "buyer-1");
		assert_eq!(
			notification.subject,
			NotificationSubject::Order {
				order_id: "ord-1001".to_string(),
				status: OrderStatus::Shipped,
			}
		);
		assert!(!notification.id.is_empty());
	}
}
