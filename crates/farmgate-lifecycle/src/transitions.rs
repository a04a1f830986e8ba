//! Status transition tables for orders and negotiations.
//!
//! Orders move strictly forward through
//! Pending -> Paid -> Processing -> Shipped -> Delivered; jumps that skip
//! intermediate states are allowed, backward moves are not. Negotiations
//! move Open -> Countered -> Agreed/Rejected, with re-countering permitted;
//! Agreed and Rejected accept no further transitions.

use farmgate_types::{NegotiationStatus, OrderStatus, ReceiptResetPolicy};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

// Static transition table - each state maps to allowed next states
static ORDER_TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		OrderStatus::Pending,
		HashSet::from([
			OrderStatus::Paid,
			OrderStatus::Processing,
			OrderStatus::Shipped,
			OrderStatus::Delivered,
		]),
	);
	m.insert(
		OrderStatus::Paid,
		HashSet::from([
			OrderStatus::Processing,
			OrderStatus::Shipped,
			OrderStatus::Delivered,
		]),
	);
	m.insert(
		OrderStatus::Processing,
		HashSet::from([OrderStatus::Shipped, OrderStatus::Delivered]),
	);
	m.insert(
		OrderStatus::Shipped,
		HashSet::from([OrderStatus::Delivered]),
	);
	m.insert(OrderStatus::Delivered, HashSet::new()); // terminal
	m
});

static NEGOTIATION_TRANSITIONS: Lazy<HashMap<NegotiationStatus, HashSet<NegotiationStatus>>> =
	Lazy::new(|| {
		let mut m = HashMap::new();
		m.insert(
			NegotiationStatus::Open,
			HashSet::from([
				NegotiationStatus::Countered,
				NegotiationStatus::Agreed,
				NegotiationStatus::Rejected,
			]),
		);
		m.insert(
			NegotiationStatus::Countered,
			HashSet::from([
				// Re-countering overwrites the previous counter
				NegotiationStatus::Countered,
				NegotiationStatus::Agreed,
				NegotiationStatus::Rejected,
			]),
		);
		m.insert(NegotiationStatus::Agreed, HashSet::new()); // terminal
		m.insert(NegotiationStatus::Rejected, HashSet::new()); // terminal
		m
	});

/// Checks if an order status transition is valid.
///
/// The single sanctioned move back to `Pending` is the receipt upload,
/// which is its own operation and never consults this table.
pub fn is_valid_order_transition(from: OrderStatus, to: OrderStatus) -> bool {
	ORDER_TRANSITIONS
		.get(&from)
		.is_some_and(|set| set.contains(&to))
}

/// Checks if a negotiation status transition is valid.
pub fn is_valid_negotiation_transition(from: NegotiationStatus, to: NegotiationStatus) -> bool {
	NEGOTIATION_TRANSITIONS
		.get(&from)
		.is_some_and(|set| set.contains(&to))
}

/// Checks whether a receipt upload may reset an order in the given status
/// back to pending under the configured policy.
pub fn receipt_reset_allowed(policy: ReceiptResetPolicy, current: OrderStatus) -> bool {
	match policy {
		ReceiptResetPolicy::Always => true,
		ReceiptResetPolicy::BeforeShipment => {
			!matches!(current, OrderStatus::Shipped | OrderStatus::Delivered)
		},
	}
}
