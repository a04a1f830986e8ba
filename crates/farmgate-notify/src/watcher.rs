//! Snapshot-diffing watcher over the order collection.
//!
//! The watcher compares successive observations of the full collection and
//! raises a notification for every order whose status moved to a
//! buyer-relevant value between them. Collection-polling consumers use it
//! where the event-driven dispatcher is not available; two transitions
//! collapsed into one observation surface as a single notification for the
//! final status, which is the known limit of snapshot diffing.

use crate::messages::order_status_message;
use farmgate_types::{Notification, Order, OrderStatus};
use std::collections::HashMap;

/// Watches order-collection snapshots and emits buyer-facing notifications.
pub struct SnapshotWatcher {
	/// Previously observed collection keyed by order id.
	previous: HashMap<String, OrderStatus>,
	/// Whether an observation has primed the snapshot yet.
	primed: bool,
}

impl SnapshotWatcher {
	/// Creates a watcher with an unprimed snapshot.
	pub fn new() -> Self {
		Self {
			previous: HashMap::new(),
			primed: false,
		}
	}

	/// Observes the current collection and returns the notifications due.
	///
	/// The first observation only primes the snapshot and returns nothing;
	/// transitions that happen before the watcher mounts are never
	/// surfaced. Orders absent from the previous snapshot are treated as
	/// creations, not transitions.
	pub fn observe(&mut self, orders: &[Order]) -> Vec<Notification> {
		let mut notifications = Vec::new();

		if self.primed {
			for order in orders {
				let changed = self
					.previous
					.get(&order.id)
					.is_some_and(|prev| *prev != order.status);
				if changed && order.status.notifies_buyer() {
					notifications.push(Notification::for_order(
						&order.buyer_id,
						&order.id,
						order.status,
						order_status_message(&order.id, order.status),
					));
				}
			}
		}

		self.previous = orders
			.iter()
			.map(|order| (order.id.clone(), order.status))
			.collect();
		self.primed = true;

		notifications
	}
}

impl Default for SnapshotWatcher {
	fn default() -> Self {
		Self::new()
	}
}
