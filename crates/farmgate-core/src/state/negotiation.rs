//! Negotiation store implementation.
//!
//! The authoritative mutation layer for the negotiation collection. Seller
//! responses move a thread through the open/countered/agreed/rejected
//! machine; terminal states accept nothing further. Every applied transition
//! advances `updated_at` and is published on the event bus.

use crate::engine::event_bus::EventBus;
use chrono::Utc;
use farmgate_lifecycle::is_valid_negotiation_transition;
use farmgate_storage::{StorageError, StorageService};
use farmgate_types::{
	CounterOffer, MarketEvent, Negotiation, NegotiationEvent, NegotiationStatus, OfferRequest,
	StorageKey,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during negotiation state management.
#[derive(Debug, Error)]
pub enum NegotiationStateError {
	#[error("Storage error: {0}")]
	Storage(String),
	#[error("Invalid status transition from {from} to {to}")]
	InvalidTransition {
		from: NegotiationStatus,
		to: NegotiationStatus,
	},
	#[error("Negotiation not found: {0}")]
	NotFound(String),
	#[error("Negotiation already exists: {0}")]
	Duplicate(String),
}

/// Manages the negotiation collection with transition validation and persistence.
pub struct NegotiationStore {
	storage: Arc<StorageService>,
	event_bus: EventBus,
}

impl NegotiationStore {
	pub fn new(storage: Arc<StorageService>, event_bus: EventBus) -> Self {
		Self { storage, event_bus }
	}

	/// Opens a new negotiation from a buyer's offer.
	///
	/// Assigns an id when the payload carries none and inserts the thread at
	/// the head of the listing index. Publishes `NegotiationEvent::Opened`.
	pub async fn open(&self, request: OfferRequest) -> Result<Negotiation, NegotiationStateError> {
		self.insert(request.into_negotiation(Utc::now())).await
	}

	/// Inserts a fully-formed negotiation, guarding id uniqueness.
	pub async fn insert(
		&self,
		negotiation: Negotiation,
	) -> Result<Negotiation, NegotiationStateError> {
		let exists = self
			.storage
			.exists(StorageKey::Negotiations.as_str(), &negotiation.id)
			.await
			.map_err(|e| NegotiationStateError::Storage(e.to_string()))?;
		if exists {
			return Err(NegotiationStateError::Duplicate(negotiation.id));
		}

		self.storage
			.store(
				StorageKey::Negotiations.as_str(),
				&negotiation.id,
				&negotiation,
			)
			.await
			.map_err(|e| NegotiationStateError::Storage(e.to_string()))?;
		self.push_index(&negotiation.id).await?;

		self.event_bus
			.publish(MarketEvent::Negotiation(NegotiationEvent::Opened {
				negotiation: negotiation.clone(),
			}))
			.ok();

		Ok(negotiation)
	}

	/// Records the seller's counter to the buyer's offer.
	///
	/// Re-countering an already countered negotiation is permitted and
	/// overwrites the previous counter fields.
	pub async fn counter(
		&self,
		negotiation_id: &str,
		counter: CounterOffer,
	) -> Result<Negotiation, NegotiationStateError> {
		let negotiation = self.load(negotiation_id).await?;
		let old_status = negotiation.status;

		if !is_valid_negotiation_transition(old_status, NegotiationStatus::Countered) {
			return Err(NegotiationStateError::InvalidTransition {
				from: old_status,
				to: NegotiationStatus::Countered,
			});
		}

		let updated = self
			.update_with(negotiation_id, |n| {
				n.counter_price = Some(counter.counter_price);
				n.counter_notes = counter.counter_notes;
				n.status = NegotiationStatus::Countered;
			})
			.await?;

		self.publish_status_change(negotiation_id, old_status, NegotiationStatus::Countered);
		Ok(updated)
	}

	/// Marks the negotiation as agreed.
	pub async fn accept(
		&self,
		negotiation_id: &str,
	) -> Result<Negotiation, NegotiationStateError> {
		self.transition(negotiation_id, NegotiationStatus::Agreed)
			.await
	}

	/// Marks the negotiation as rejected.
	pub async fn reject(
		&self,
		negotiation_id: &str,
	) -> Result<Negotiation, NegotiationStateError> {
		self.transition(negotiation_id, NegotiationStatus::Rejected)
			.await
	}

	/// Gets a negotiation by id.
	pub async fn get(&self, negotiation_id: &str) -> Result<Negotiation, NegotiationStateError> {
		self.load(negotiation_id).await
	}

	/// Lists all negotiations, newest first per the insertion index.
	pub async fn list(&self) -> Result<Vec<Negotiation>, NegotiationStateError> {
		let ids = self.load_index().await?;
		let mut negotiations = Vec::with_capacity(ids.len());
		for id in &ids {
			negotiations.push(self.load(id).await?);
		}
		Ok(negotiations)
	}

	async fn transition(
		&self,
		negotiation_id: &str,
		new_status: NegotiationStatus,
	) -> Result<Negotiation, NegotiationStateError> {
		let negotiation = self.load(negotiation_id).await?;
		let old_status = negotiation.status;

		if !is_valid_negotiation_transition(old_status, new_status) {
			return Err(NegotiationStateError::InvalidTransition {
				from: old_status,
				to: new_status,
			});
		}

		let updated = self
			.update_with(negotiation_id, |n| {
				n.status = new_status;
			})
			.await?;

		self.publish_status_change(negotiation_id, old_status, new_status);
		Ok(updated)
	}

	async fn load(&self, negotiation_id: &str) -> Result<Negotiation, NegotiationStateError> {
		self.storage
			.retrieve(StorageKey::Negotiations.as_str(), negotiation_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => {
					NegotiationStateError::NotFound(negotiation_id.to_string())
				}
				other => NegotiationStateError::Storage(other.to_string()),
			})
	}

	/// Updates a negotiation with a closure, advancing `updated_at`.
	async fn update_with<F>(
		&self,
		negotiation_id: &str,
		updater: F,
	) -> Result<Negotiation, NegotiationStateError>
	where
		F: FnOnce(&mut Negotiation),
	{
		let mut negotiation = self.load(negotiation_id).await?;
		updater(&mut negotiation);
		negotiation.updated_at = Utc::now();

		self.storage
			.update(
				StorageKey::Negotiations.as_str(),
				negotiation_id,
				&negotiation,
			)
			.await
			.map_err(|e| NegotiationStateError::Storage(e.to_string()))?;

		Ok(negotiation)
	}

	async fn load_index(&self) -> Result<Vec<String>, NegotiationStateError> {
		match self
			.storage
			.retrieve(
				StorageKey::Indexes.as_str(),
				StorageKey::Negotiations.as_str(),
			)
			.await
		{
			Ok(ids) => Ok(ids),
			Err(StorageError::NotFound) => Ok(Vec::new()),
			Err(e) => Err(NegotiationStateError::Storage(e.to_string())),
		}
	}

	async fn push_index(&self, negotiation_id: &str) -> Result<(), NegotiationStateError> {
		let mut ids = self.load_index().await?;
		ids.insert(0, negotiation_id.to_string());
		self.storage
			.store(
				StorageKey::Indexes.as_str(),
				StorageKey::Negotiations.as_str(),
				&ids,
			)
			.await
			.map_err(|e| NegotiationStateError::Storage(e.to_string()))
	}

	fn publish_status_change(
		&self,
		negotiation_id: &str,
		old: NegotiationStatus,
		new: NegotiationStatus,
	) {
		self.event_bus
			.publish(MarketEvent::Negotiation(NegotiationEvent::StatusChanged {
				negotiation_id: negotiation_id.to_string(),
				old_status: old,
				new_status: new,
			}))
			.ok();
	}
}
