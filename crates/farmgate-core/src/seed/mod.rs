//! Seeding module for loading fixture collections at startup.
//!
//! Fixtures are JSON arrays of fully-formed entities inserted through the
//! stores before the engine loop subscribes, so loading emits no
//! notifications. Duplicate ids are logged and skipped; everything else is
//! fatal so a broken fixture never half-loads silently.

use crate::state::{
	NegotiationStateError, NegotiationStore, OrderStateError, OrderStore,
};
use farmgate_config::SeedConfig;
use farmgate_types::{truncate_id, Negotiation, Order};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Errors that can occur while loading seed fixtures.
#[derive(Debug, Error)]
pub enum SeedError {
	#[error("Fixture error: {0}")]
	Fixture(String),
	#[error("Store error: {0}")]
	Store(String),
}

/// Report of a seeding run.
#[derive(Debug, Default)]
pub struct SeedReport {
	/// Number of orders inserted.
	pub orders_loaded: usize,
	/// Number of order fixtures skipped as duplicates.
	pub orders_skipped: usize,
	/// Number of negotiations inserted.
	pub negotiations_loaded: usize,
	/// Number of negotiation fixtures skipped as duplicates.
	pub negotiations_skipped: usize,
}

/// Service that loads fixture files into the stores.
pub struct SeedService {
	orders: Arc<OrderStore>,
	negotiations: Arc<NegotiationStore>,
}

impl SeedService {
	pub fn new(orders: Arc<OrderStore>, negotiations: Arc<NegotiationStore>) -> Self {
		Self {
			orders,
			negotiations,
		}
	}

	/// Loads the configured fixture files, returning counts.
	#[instrument(skip_all)]
	pub async fn load(&self, config: &SeedConfig) -> Result<SeedReport, SeedError> {
		let mut report = SeedReport::default();

		if let Some(path) = &config.orders {
			let fixtures: Vec<Order> = read_fixture(path).await?;
			for order in fixtures {
				match self.orders.insert(order).await {
					Ok(_) => report.orders_loaded += 1,
					Err(OrderStateError::Duplicate(id)) => {
						tracing::warn!(
							order_id = %truncate_id(&id),
							"Skipping duplicate order fixture"
						);
						report.orders_skipped += 1;
					}
					Err(e) => return Err(SeedError::Store(e.to_string())),
				}
			}
		}

		if let Some(path) = &config.negotiations {
			let fixtures: Vec<Negotiation> = read_fixture(path).await?;
			for negotiation in fixtures {
				match self.negotiations.insert(negotiation).await {
					Ok(_) => report.negotiations_loaded += 1,
					Err(NegotiationStateError::Duplicate(id)) => {
						tracing::warn!(
							negotiation_id = %truncate_id(&id),
							"Skipping duplicate negotiation fixture"
						);
						report.negotiations_skipped += 1;
					}
					Err(e) => return Err(SeedError::Store(e.to_string())),
				}
			}
		}

		tracing::info!(
			orders = report.orders_loaded,
			negotiations = report.negotiations_loaded,
			skipped = report.orders_skipped + report.negotiations_skipped,
			"Seed fixtures loaded"
		);

		Ok(report)
	}
}

async fn read_fixture<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, SeedError> {
	let raw = tokio::fs::read(path)
		.await
		.map_err(|e| SeedError::Fixture(format!("{}: {}", path.display(), e)))?;
	serde_json::from_slice(&raw)
		.map_err(|e| SeedError::Fixture(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::event_bus::EventBus;
	use farmgate_storage::{implementations::memory::MemoryStorage, StorageService};
	use farmgate_types::{OrderStatus, ReceiptResetPolicy};
	use std::io::Write;
	use tempfile::NamedTempFile;

	const ORDERS_JSON: &str = r#"[
		{
			"id": "ord-1001",
			"buyerId": "buyer-1",
			"buyerName": "Amara",
			"items": [
				{
					"productId": "prod-tomato",
					"productName": "Roma Tomatoes",
					"qty": 5,
					"pricePerKg": "2.80"
				}
			],
			"subtotal": "14.00",
			"deliveryFee": "5.00",
			"total": "19.00",
			"status": "paid",
			"createdAt": "2026-08-20T08:30:00Z",
			"paidAt": "2026-08-20T09:00:00Z"
		},
		{
			"id": "ord-1002",
			"buyerId": "buyer-2",
			"buyerName": "Kofi",
			"items": [
				{
					"productId": "prod-maize",
					"productName": "White Maize",
					"qty": 20,
					"pricePerKg": "1.50"
				}
			],
			"subtotal": "30.00",
			"deliveryFee": "5.00",
			"total": "35.00",
			"status": "pending",
			"createdAt": "2026-08-21T10:00:00Z"
		}
	]"#;

	const NEGOTIATIONS_JSON: &str = r#"[
		{
			"id": "neg-1",
			"productId": "prod-maize",
			"productName": "White Maize",
			"buyerId": "buyer-1",
			"buyerName": "Amara",
			"sellerId": "seller-7",
			"sellerName": "Green Valley Farm",
			"currentPrice": "1.50",
			"requestedPrice": "1.20",
			"requestedQty": 50,
			"status": "open",
			"deliveryDate": "2026-08-27",
			"createdAt": "2026-08-22T12:00:00Z",
			"updatedAt": "2026-08-22T12:00:00Z"
		}
	]"#;

	fn seed_fixture() -> (SeedService, Arc<OrderStore>, Arc<NegotiationStore>) {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::default())));
		let bus = EventBus::new(64);
		let orders = Arc::new(OrderStore::new(
			storage.clone(),
			bus.clone(),
			ReceiptResetPolicy::Always,
		));
		let negotiations = Arc::new(NegotiationStore::new(storage, bus));
		(
			SeedService::new(orders.clone(), negotiations.clone()),
			orders,
			negotiations,
		)
	}

	fn write_fixture(content: &str) -> NamedTempFile {
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(content.as_bytes()).unwrap();
		file
	}

	#[tokio::test]
	async fn test_load_inserts_fixtures_as_is() {
		let (seeder, orders, negotiations) = seed_fixture();
		let orders_file = write_fixture(ORDERS_JSON);
		let negotiations_file = write_fixture(NEGOTIATIONS_JSON);

		let config = SeedConfig {
			orders: Some(orders_file.path().to_path_buf()),
			negotiations: Some(negotiations_file.path().to_path_buf()),
		};
		let report = seeder.load(&config).await.unwrap();

		assert_eq!(report.orders_loaded, 2);
		assert_eq!(report.negotiations_loaded, 1);
		assert_eq!(report.orders_skipped, 0);

		// Pre-set statuses land unchanged, newest fixture first.
		let listed = orders.list().await.unwrap();
		assert_eq!(listed[0].id, "ord-1002");
		assert_eq!(listed[1].id, "ord-1001");
		assert_eq!(listed[1].status, OrderStatus::Paid);
		assert!(listed[1].paid_at.is_some());

		assert_eq!(negotiations.list().await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn test_load_skips_duplicates() {
		let (seeder, orders, _negotiations) = seed_fixture();
		let orders_file = write_fixture(ORDERS_JSON);

		let config = SeedConfig {
			orders: Some(orders_file.path().to_path_buf()),
			negotiations: None,
		};
		seeder.load(&config).await.unwrap();
		let report = seeder.load(&config).await.unwrap();

		assert_eq!(report.orders_loaded, 0);
		assert_eq!(report.orders_skipped, 2);
		assert_eq!(orders.list().await.unwrap().len(), 2);
	}

	#[tokio::test]
	async fn test_missing_fixture_file_is_fatal() {
		let (seeder, _orders, _negotiations) = seed_fixture();

		let config = SeedConfig {
			orders: Some("/nonexistent/orders.json".into()),
			negotiations: None,
		};
		let err = seeder.load(&config).await.unwrap_err();
		assert!(matches!(err, SeedError::Fixture(_)));
	}
}
