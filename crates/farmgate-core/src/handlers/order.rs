//! Order handler for processing order actions.
//!
//! Applies the checkout policy at the intake boundary, then drives the order
//! store. Policy failures never reach the store; store failures leave the
//! collection unchanged.

use crate::state::OrderStore;
use farmgate_lifecycle::CheckoutPolicy;
use farmgate_types::{truncate_id, OrderAction};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Errors that can occur during order action handling.
///
/// These errors separate boundary validation failures from state
/// transition failures reported by the store.
#[derive(Debug, Error)]
pub enum OrderError {
	#[error("Policy error: {0}")]
	Policy(String),
	#[error("State error: {0}")]
	State(String),
}

/// Handler for processing order actions.
pub struct OrderHandler {
	store: Arc<OrderStore>,
	policy: CheckoutPolicy,
}

impl OrderHandler {
	pub fn new(store: Arc<OrderStore>, policy: CheckoutPolicy) -> Self {
		Self { store, policy }
	}

	/// Applies a single order action through the store.
	#[instrument(skip_all)]
	pub async fn handle(&self, action: OrderAction) -> Result<(), OrderError> {
		match action {
			OrderAction::Create(request) => {
				self.policy
					.validate(&request)
					.map_err(|e| OrderError::Policy(e.to_string()))?;
				let order = self
					.store
					.create(request)
					.await
					.map_err(|e| OrderError::State(e.to_string()))?;
				tracing::info!(
					order_id = %truncate_id(&order.id),
					total = %order.total,
					"Order created"
				);
			}
			OrderAction::UpdateStatus {
				order_id,
				status,
				paid_at,
				delivered_at,
			} => {
				let order = self
					.store
					.update_status(&order_id, status, paid_at, delivered_at)
					.await
					.map_err(|e| OrderError::State(e.to_string()))?;
				tracing::info!(
					order_id = %truncate_id(&order.id),
					status = %order.status,
					"Order status updated"
				);
			}
			OrderAction::UploadReceipt {
				order_id,
				receipt_url,
			} => {
				let order = self
					.store
					.upload_receipt(&order_id, receipt_url)
					.await
					.map_err(|e| OrderError::State(e.to_string()))?;
				tracing::info!(
					order_id = %truncate_id(&order.id),
					status = %order.status,
					"Receipt uploaded"
				);
			}
			OrderAction::MarkPaid { order_id } => {
				let order = self
					.store
					.mark_paid(&order_id)
					.await
					.map_err(|e| OrderError::State(e.to_string()))?;
				tracing::info!(order_id = %truncate_id(&order.id), "Order marked paid");
			}
			OrderAction::MarkDelivered { order_id } => {
				let order = self
					.store
					.mark_delivered(&order_id)
					.await
					.map_err(|e| OrderError::State(e.to_string()))?;
				tracing::info!(order_id = %truncate_id(&order.id), "Order marked delivered");
			}
		}

		Ok(())
	}
}
