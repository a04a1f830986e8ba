//! Core market engine that orchestrates the order and negotiation lifecycle.
//!
//! This module contains the main MarketEngine struct which owns the stores,
//! wires intake actions to the handlers, and runs the single-writer event
//! loop that applies every mutation strictly in arrival order.

pub mod event_bus;

use crate::handlers::{NegotiationHandler, NotificationHandler, OrderHandler};
use crate::state::{NegotiationStore, OrderStore};
use farmgate_config::Config;
use farmgate_intake::IntakeService;
use farmgate_lifecycle::{CheckoutPolicy, OfferPolicy};
use farmgate_notify::NotifyService;
use farmgate_storage::StorageService;
use farmgate_types::MarketAction;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Service error: {0}")]
	Service(String),
	#[error("Engine loop is already running")]
	AlreadyRunning,
	#[error("Engine loop has stopped")]
	Stopped,
}

/// Cloneable handle for submitting actions into the engine loop.
///
/// Embedding callers hold one of these instead of an intake source; actions
/// submitted here join the same channel the sources feed and are applied in
/// arrival order.
#[derive(Clone)]
pub struct ActionHandle {
	sender: mpsc::UnboundedSender<MarketAction>,
}

impl ActionHandle {
	/// Submits an action for sequential application.
	pub fn submit(&self, action: MarketAction) -> Result<(), EngineError> {
		self.sender.send(action).map_err(|_| EngineError::Stopped)
	}
}

/// Main market engine that owns the collections and the event loop.
pub struct MarketEngine {
	/// Engine configuration.
	config: Config,
	/// Storage service backing both stores.
	storage: Arc<StorageService>,
	/// Authoritative order collection.
	orders: Arc<OrderStore>,
	/// Authoritative negotiation collection.
	negotiations: Arc<NegotiationStore>,
	/// Intake service feeding the action channel.
	intake: Arc<IntakeService>,
	/// Notification delivery service.
	notify: Arc<NotifyService>,
	/// Event bus for lifecycle events.
	event_bus: event_bus::EventBus,
	/// Order action handler.
	order_handler: OrderHandler,
	/// Negotiation action handler.
	negotiation_handler: NegotiationHandler,
	/// Event-driven notification dispatcher.
	notification_handler: NotificationHandler,
	/// Sender side of the action channel, cloned into handles.
	action_tx: mpsc::UnboundedSender<MarketAction>,
	/// Receiver side, taken exactly once by `run`.
	action_rx: Mutex<Option<mpsc::UnboundedReceiver<MarketAction>>>,
}

impl MarketEngine {
	/// Creates a new market engine wiring stores and handlers together.
	pub fn new(
		config: Config,
		storage: Arc<StorageService>,
		intake: Arc<IntakeService>,
		notify: Arc<NotifyService>,
		event_bus: event_bus::EventBus,
	) -> Self {
		let orders = Arc::new(OrderStore::new(
			storage.clone(),
			event_bus.clone(),
			config.lifecycle.receipt_reset,
		));
		let negotiations = Arc::new(NegotiationStore::new(storage.clone(), event_bus.clone()));

		let order_handler = OrderHandler::new(orders.clone(), CheckoutPolicy::default());
		let negotiation_handler = NegotiationHandler::new(
			negotiations.clone(),
			OfferPolicy {
				min_qty: config.lifecycle.min_offer_qty,
				window_days: config.lifecycle.offer_window_days,
			},
		);
		let notification_handler =
			NotificationHandler::new(orders.clone(), negotiations.clone(), notify.clone());

		let (action_tx, action_rx) = mpsc::unbounded_channel();

		Self {
			config,
			storage,
			orders,
			negotiations,
			intake,
			notify,
			event_bus,
			order_handler,
			negotiation_handler,
			notification_handler,
			action_tx,
			action_rx: Mutex::new(Some(action_rx)),
		}
	}

	/// Main execution loop for the market engine.
	///
	/// This method:
	/// 1. Starts the intake sources feeding the action channel
	/// 2. Subscribes to the event bus for notification dispatch
	/// 3. Applies actions one at a time, in arrival order
	/// 4. Handles graceful shutdown on Ctrl+C
	pub async fn run(&self) -> Result<(), EngineError> {
		let mut action_rx = self
			.action_rx
			.lock()
			.await
			.take()
			.ok_or(EngineError::AlreadyRunning)?;

		self.intake
			.start_all(self.action_tx.clone())
			.await
			.map_err(|e| EngineError::Service(e.to_string()))?;

		let mut event_rx = self.event_bus.subscribe();

		loop {
			tokio::select! {
				// Apply submitted actions sequentially
				Some(action) = action_rx.recv() => {
					self.dispatch(action).await;
				}

				// Convert store events into notifications
				Ok(event) = event_rx.recv() => {
					self.notification_handler.handle(event).await;
				}

				// Shutdown signal
				_ = tokio::signal::ctrl_c() => {
					break;
				}
			}
		}

		self.intake
			.stop_all()
			.await
			.map_err(|e| EngineError::Service(e.to_string()))?;

		Ok(())
	}

	/// Applies one action through the matching handler.
	///
	/// Handler errors are logged and do not stop the loop; the failed action
	/// left the collections unchanged.
	async fn dispatch(&self, action: MarketAction) {
		match action {
			MarketAction::Order(action) => {
				if let Err(e) = self.order_handler.handle(action).await {
					tracing::warn!(error = %e, "Order action failed");
				}
			}
			MarketAction::Negotiation(action) => {
				if let Err(e) = self.negotiation_handler.handle(action).await {
					tracing::warn!(error = %e, "Negotiation action failed");
				}
			}
		}
	}

	/// Returns a cloneable handle for submitting actions.
	pub fn handle(&self) -> ActionHandle {
		ActionHandle {
			sender: self.action_tx.clone(),
		}
	}

	/// Returns a reference to the event bus.
	pub fn event_bus(&self) -> &event_bus::EventBus {
		&self.event_bus
	}

	/// Returns a reference to the configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Returns a reference to the storage service.
	pub fn storage(&self) -> &Arc<StorageService> {
		&self.storage
	}

	/// Returns a reference to the order store.
	pub fn orders(&self) -> &Arc<OrderStore> {
		&self.orders
	}

	/// Returns a reference to the negotiation store.
	pub fn negotiations(&self) -> &Arc<NegotiationStore> {
		&self.negotiations
	}

	/// Returns a reference to the notification service.
	pub fn notify(&self) -> &Arc<NotifyService> {
		&self.notify
	}
}
