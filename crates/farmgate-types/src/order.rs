//! Purchase order types for the marketplace engine.
//!
//! This module defines the buyer-facing order entity, its line items, the
//! fulfillment status enum, and the checkout payload used to create orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Represents a buyer's purchase order with its fulfillment state.
///
/// An order is created from a validated checkout payload and tracks the
/// forward-moving fulfillment status together with payment and delivery
/// timestamps throughout its lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Unique identifier for this order, assigned at creation.
	pub id: String,
	/// Identifier of the purchasing buyer.
	pub buyer_id: String,
	/// Denormalized display name of the buyer.
	pub buyer_name: String,
	/// Ordered line items; never empty.
	pub items: Vec<OrderItem>,
	/// Sum of all line totals.
	pub subtotal: Decimal,
	/// Delivery fee charged on top of the subtotal.
	pub delivery_fee: Decimal,
	/// Discount redeemed from loyalty points, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub points_discount: Option<Decimal>,
	/// Loyalty points earned by this purchase, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub earned_points: Option<u32>,
	/// Amount charged: subtotal plus delivery fee minus points discount.
	pub total: Decimal,
	/// Current fulfillment status of the order.
	pub status: OrderStatus,
	/// Payment receipt uploaded by the buyer, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub receipt_url: Option<String>,
	/// Timestamp when this order was created.
	pub created_at: DateTime<Utc>,
	/// Timestamp when this order was paid; set exactly once, never cleared.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub paid_at: Option<DateTime<Utc>>,
	/// Timestamp when this order was delivered; set exactly once, never cleared.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivered_at: Option<DateTime<Utc>>,
}

/// A single product line within an order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
	/// Identifier of the purchased product.
	#[validate(length(min = 1))]
	pub product_id: String,
	/// Denormalized display name of the product.
	#[validate(length(min = 1))]
	pub product_name: String,
	/// Quantity in kilograms; always positive.
	#[validate(range(min = 1))]
	pub qty: u32,
	/// Unit price per kilogram at checkout time.
	#[validate(custom(function = "validate_positive_amount"))]
	pub price_per_kg: Decimal,
}

impl OrderItem {
	/// Returns the line total for this item.
	pub fn line_total(&self) -> Decimal {
		self.price_per_kg * Decimal::from(self.qty)
	}
}

/// Checkout payload for creating a new order.
///
/// The cart computes all monetary fields before submission; the handler
/// validates the structural fields here and the totals arithmetic at the
/// intake boundary. An omitted id is assigned at creation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
	/// Optional pre-assigned order identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Identifier of the purchasing buyer.
	#[validate(length(min = 1))]
	pub buyer_id: String,
	/// Display name of the buyer.
	#[validate(length(min = 1))]
	pub buyer_name: String,
	/// Line items from the cart; must not be empty.
	#[validate(length(min = 1), nested)]
	pub items: Vec<OrderItem>,
	/// Sum of all line totals as computed by the cart.
	pub subtotal: Decimal,
	/// Delivery fee as computed by the cart.
	pub delivery_fee: Decimal,
	/// Discount redeemed from loyalty points, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub points_discount: Option<Decimal>,
	/// Loyalty points earned by this purchase, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub earned_points: Option<u32>,
	/// Amount charged for the order.
	pub total: Decimal,
	/// Explicit initial status; defaults to pending when omitted.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<OrderStatus>,
}

impl CheckoutRequest {
	/// Converts the checkout payload into a fully-formed order.
	///
	/// Assigns a fresh id when none was supplied and stamps the creation
	/// timestamp. Payment and delivery timestamps start unset.
	pub fn into_order(self, now: DateTime<Utc>) -> Order {
		Order {
			id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
			buyer_id: self.buyer_id,
			buyer_name: self.buyer_name,
			items: self.items,
			subtotal: self.subtotal,
			delivery_fee: self.delivery_fee,
			points_discount: self.points_discount,
			earned_points: self.earned_points,
			total: self.total,
			status: self.status.unwrap_or(OrderStatus::Pending),
			receipt_url: None,
			created_at: now,
			paid_at: None,
			delivered_at: None,
		}
	}
}

/// Fulfillment status of an order.
///
/// Statuses move strictly forward; the only sanctioned way back to
/// `Pending` is a receipt upload, which is its own operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
	/// Order has been placed but not yet paid.
	Pending,
	/// Payment has been received.
	Paid,
	/// Seller is preparing the order.
	Processing,
	/// Order is out for delivery.
	Shipped,
	/// Order has reached the buyer.
	Delivered,
}

impl OrderStatus {
	/// Returns true when a transition into this status should notify the buyer.
	pub fn notifies_buyer(&self) -> bool {
		matches!(
			self,
			OrderStatus::Processing | OrderStatus::Shipped | OrderStatus::Delivered
		)
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderStatus::Pending => write!(f, "pending"),
			OrderStatus::Paid => write!(f, "paid"),
			OrderStatus::Processing => write!(f, "processing"),
			OrderStatus::Shipped => write!(f, "shipped"),
			OrderStatus::Delivered => write!(f, "delivered"),
		}
	}
}

/// Policy governing the receipt-upload reset to pending.
///
/// The source marketplace always resets, treating a late upload as a
/// re-review trigger even after shipment; `BeforeShipment` closes that
/// window once the order has shipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReceiptResetPolicy {
	/// A receipt upload always forces the order back to pending.
	#[default]
	Always,
	/// A receipt upload is rejected once the order has shipped or been delivered.
	BeforeShipment,
}

/// Validates that a monetary amount is strictly positive.
pub fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
	if amount.is_sign_positive() && !amount.is_zero() {
		Ok(())
	} else {
		Err(ValidationError::new("amount_not_positive"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_item() -> OrderItem {
		OrderItem {
			product_id: "prod-tomato".to_string(),
			product_name: "Roma Tomatoes".to_string(),
			qty: 5,
			price_per_kg: Decimal::new(280, 2),
		}
	}

	#[test]
	fn test_line_total() {
		let item = sample_item();
		assert_eq!(item.line_total(), Decimal::new(1400, 2));
	}

	#[test]
	fn test_checkout_defaults_to_pending() {
		let request = CheckoutRequest {
			id: None,
			buyer_id: "buyer-1".to_string(),
			buyer_name: "Amara".to_string(),
			items: vec![sample_item()],
			subtotal: Decimal::new(1400, 2),
			delivery_fee: Decimal::new(500, 2),
			points_discount: None,
			earned_points: None,
			total: Decimal::new(1900, 2),
			status: None,
		};

		let order = request.into_order(Utc::now());
		assert_eq!(order.status, OrderStatus::Pending);
		assert!(!order.id.is_empty());
		assert!(order.paid_at.is_none());
		assert!(order.delivered_at.is_none());
	}

	#[test]
	fn test_checkout_validation_rejects_empty_items() {
		let request = CheckoutRequest {
			id: None,
			buyer_id: "buyer-1".to_string(),
			buyer_name: "Amara".to_string(),
			items: vec![],
			subtotal: Decimal::ZERO,
			delivery_fee: Decimal::ZERO,
			points_discount: None,
			earned_points: None,
			total: Decimal::ZERO,
			status: None,
		};

		assert!(request.validate().is_err());
	}

	#[test]
	fn test_item_validation_rejects_non_positive_price() {
		let mut item = sample_item();
		item.price_per_kg = Decimal::ZERO;
		assert!(item.validate().is_err());

		item.price_per_kg = Decimal::new(-100, 2);
		assert!(item.validate().is_err());
	}

	#[test]
	fn test_status_serializes_lowercase() {
		let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
		assert_eq!(json, "\"shipped\"");

		let parsed: OrderStatus = serde_json::from_str("\"processing\"").unwrap();
		assert_eq!(parsed, OrderStatus::Processing);
	}

	#[test]
	fn test_buyer_notification_statuses() {
		assert!(!OrderStatus::Pending.notifies_buyer());
		assert!(!OrderStatus::Paid.notifies_buyer());
		assert!(OrderStatus::Processing.notifies_buyer());
		assert!(OrderStatus::Shipped.notifies_buyer());
		assert!(OrderStatus::Delivered.notifies_buyer());
	}

	#[test]
	fn test_order_round_trips_camel_case() {
		let order = CheckoutRequest {
			id: Some("ord-1001".to_string()),
			buyer_id: "buyer-1".to_string(),
			buyer_name: "Amara".to_string(),
			items: vec![sample_item()],
			subtotal: Decimal::new(1400, 2),
			delivery_fee: Decimal::new(500, 2),
			points_discount: Some(Decimal::new(100, 2)),
			earned_points: Some(14),
			total: Decimal::new(1800, 2),
			status: None,
		}
		.into_order(Utc::now());

		let json = serde_json::to_value(&order).unwrap();
		assert_eq!(json["buyerName"], "Amara");
		assert_eq!(json["deliveryFee"], "5.00");
		assert_eq!(json["items"][0]["pricePerKg"], "2.80");

		let back: Order = serde_json::from_value(json).unwrap();
		assert_eq!(back.id, "ord-1001");
		assert_eq!(back.earned_points, Some(14));
	}
}
