//! Negotiation handler for processing negotiation actions.
//!
//! Applies the offer policy at the intake boundary for new offers, then
//! drives the negotiation store. Seller responses go straight to the store,
//! which enforces the transition machine.

use crate::state::NegotiationStore;
use chrono::Utc;
use farmgate_lifecycle::OfferPolicy;
use farmgate_types::{truncate_id, NegotiationAction};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Errors that can occur during negotiation action handling.
#[derive(Debug, Error)]
pub enum NegotiationError {
	#[error("Policy error: {0}")]
	Policy(String),
	#[error("State error: {0}")]
	State(String),
}

/// Handler for processing negotiation actions.
pub struct NegotiationHandler {
	store: Arc<NegotiationStore>,
	policy: OfferPolicy,
}

impl NegotiationHandler {
	pub fn new(store: Arc<NegotiationStore>, policy: OfferPolicy) -> Self {
		Self { store, policy }
	}

	/// Applies a single negotiation action through the store.
	#[instrument(skip_all)]
	pub async fn handle(&self, action: NegotiationAction) -> Result<(), NegotiationError> {
		match action {
			NegotiationAction::Open(request) => {
				self.policy
					.validate(&request, Utc::now().date_naive())
					.map_err(|e| NegotiationError::Policy(e.to_string()))?;
				let negotiation = self
					.store
					.open(request)
					.await
					.map_err(|e| NegotiationError::State(e.to_string()))?;
				tracing::info!(
					negotiation_id = %truncate_id(&negotiation.id),
					product = %negotiation.product_name,
					requested_price = %negotiation.requested_price,
					"Negotiation opened"
				);
			}
			NegotiationAction::Counter {
				negotiation_id,
				counter,
			} => {
				let counter_price = counter.counter_price;
				let negotiation = self
					.store
					.counter(&negotiation_id, counter)
					.await
					.map_err(|e| NegotiationError::State(e.to_string()))?;
				tracing::info!(
					negotiation_id = %truncate_id(&negotiation.id),
					counter_price = %counter_price,
					"Negotiation countered"
				);
			}
			NegotiationAction::Accept { negotiation_id } => {
				let negotiation = self
					.store
					.accept(&negotiation_id)
					.await
					.map_err(|e| NegotiationError::State(e.to_string()))?;
				tracing::info!(
					negotiation_id = %truncate_id(&negotiation.id),
					"Negotiation accepted"
				);
			}
			NegotiationAction::Reject { negotiation_id } => {
				let negotiation = self
					.store
					.reject(&negotiation_id)
					.await
					.map_err(|e| NegotiationError::State(e.to_string()))?;
				tracing::info!(
					negotiation_id = %truncate_id(&negotiation.id),
					"Negotiation rejected"
				);
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::event_bus::EventBus;
	use chrono::Days;
	use farmgate_storage::{implementations::memory::MemoryStorage, StorageService};
	use farmgate_types::{NegotiationStatus, OfferRequest};
	use rust_decimal::Decimal;

	fn test_handler() -> (NegotiationHandler, Arc<NegotiationStore>) {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::default())));
		let store = Arc::new(NegotiationStore::new(storage, EventBus::new(64)));
		(
			NegotiationHandler::new(store.clone(), OfferPolicy::default()),
			store,
		)
	}

	fn offer(qty: u32) -> OfferRequest {
		OfferRequest {
			id: Some("neg-1".to_string()),
			product_id: "prod-maize".to_string(),
			product_name: "White Maize".to_string(),
			buyer_id: "buyer-1".to_string(),
			buyer_name: "Amara".to_string(),
			seller_id: "seller-7".to_string(),
			seller_name: "Green Valley Farm".to_string(),
			current_price: Decimal::new(150, 2),
			requested_price: Decimal::new(120, 2),
			requested_qty: qty,
			notes: None,
			delivery_date: Utc::now()
				.date_naive()
				.checked_add_days(Days::new(3))
				.unwrap(),
		}
	}

	#[tokio::test]
	async fn test_open_passes_policy_and_lands_in_store() {
		let (handler, store) = test_handler();

		handler
			.handle(NegotiationAction::Open(offer(50)))
			.await
			.unwrap();

		let negotiation = store.get("neg-1").await.unwrap();
		assert_eq!(negotiation.status, NegotiationStatus::Open);
	}

	#[tokio::test]
	async fn test_open_below_minimum_qty_never_reaches_store() {
		let (handler, store) = test_handler();

		let err = handler
			.handle(NegotiationAction::Open(offer(3)))
			.await
			.unwrap_err();
		assert!(matches!(err, NegotiationError::Policy(_)));
		assert!(store.list().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_seller_responses_flow_through_store() {
		let (handler, store) = test_handler();

		handler
			.handle(NegotiationAction::Open(offer(50)))
			.await
			.unwrap();
		handler
			.handle(NegotiationAction::Accept {
				negotiation_id: "neg-1".to_string(),
			})
			.await
			.unwrap();

		let negotiation = store.get("neg-1").await.unwrap();
		assert_eq!(negotiation.status, NegotiationStatus::Agreed);

		let err = handler
			.handle(NegotiationAction::Reject {
				negotiation_id: "neg-1".to_string(),
			})
			.await
			.unwrap_err();
		assert!(matches!(err, NegotiationError::State(_)));
	}
}
