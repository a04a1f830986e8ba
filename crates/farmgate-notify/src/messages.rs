//! Message templates for lifecycle notifications.
//!
//! One place for the user-facing wording so the event-driven notifier and
//! the snapshot watcher produce identical text for the same transition.

use farmgate_types::{Negotiation, NegotiationStatus, OrderStatus};

/// Returns the message for an order transition into the given status.
pub fn order_status_message(order_id: &str, status: OrderStatus) -> String {
	match status {
		OrderStatus::Pending => format!("Order {} is awaiting payment", order_id),
		OrderStatus::Paid => format!("Payment received for order {}", order_id),
		OrderStatus::Processing => format!("Your order {} is being prepared", order_id),
		OrderStatus::Shipped => format!("Your order {} is out for delivery", order_id),
		OrderStatus::Delivered => format!("Your order {} has been delivered", order_id),
	}
}

/// Returns the message announcing a freshly opened negotiation to the seller.
pub fn negotiation_opened_message(negotiation: &Negotiation) -> String {
	format!(
		"{} offered {} per kg for {} ({} kg)",
		negotiation.buyer_name,
		negotiation.requested_price,
		negotiation.product_name,
		negotiation.requested_qty
	)
}

/// Returns the message for a negotiation transition, addressed to the buyer.
pub fn negotiation_status_message(negotiation: &Negotiation, status: NegotiationStatus) -> String {
	match status {
		NegotiationStatus::Open => {
			format!("Your offer for {} was submitted", negotiation.product_name)
		},
		NegotiationStatus::Countered => match negotiation.counter_price {
			Some(price) => format!(
				"{} countered with {} per kg for {}",
				negotiation.seller_name, price, negotiation.product_name
			),
			None => format!(
				"{} countered your offer for {}",
				negotiation.seller_name, negotiation.product_name
			),
		},
		NegotiationStatus::Agreed => format!(
			"{} accepted your offer for {}",
			negotiation.seller_name, negotiation.product_name
		),
		NegotiationStatus::Rejected => format!(
			"{} declined your offer for {}",
			negotiation.seller_name, negotiation.product_name
		),
	}
}
