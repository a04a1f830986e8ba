//! Replay intake source reading actions from a recorded JSON file.
//!
//! The demo driver: a JSON array of actions is fed into the engine in file
//! order, optionally spaced by a configurable delay so log output reads
//! like live traffic.

use crate::{ActionSource, IntakeError};
use async_trait::async_trait;
use farmgate_types::MarketAction;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

/// Configuration for the replay source.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaySourceConfig {
	/// Path to the JSON array of actions.
	pub path: PathBuf,
	/// Delay between replayed actions in milliseconds.
	#[serde(default)]
	pub delay_ms: u64,
}

/// Action source replaying a recorded JSON file.
pub struct ReplaySource {
	/// Replay configuration.
	config: ReplaySourceConfig,
	/// Flag indicating if the replay is active.
	is_running: Arc<AtomicBool>,
	/// Channel for signaling replay shutdown.
	stop_signal: Arc<Mutex<Option<mpsc::Sender<()>>>>,
}

impl ReplaySource {
	/// Creates a new replay source for the given configuration.
	pub fn new(config: ReplaySourceConfig) -> Self {
		Self {
			config,
			is_running: Arc::new(AtomicBool::new(false)),
			stop_signal: Arc::new(Mutex::new(None)),
		}
	}

	/// Reads and feeds the recorded actions until exhausted or stopped.
	async fn replay_loop(
		path: PathBuf,
		delay_ms: u64,
		sender: mpsc::UnboundedSender<MarketAction>,
		mut stop_rx: mpsc::Receiver<()>,
	) {
		let actions = match Self::load_actions(&path).await {
			Ok(actions) => actions,
			Err(e) => {
				tracing::error!(path = %path.display(), error = %e, "Failed to load replay file");
				return;
			},
		};

		let total = actions.len();
		for action in actions {
			if delay_ms > 0 {
				tokio::select! {
					_ = tokio::time::sleep(Duration::from_millis(delay_ms)) => {},
					_ = stop_rx.recv() => {
						tracing::debug!("Replay stopped before completion");
						return;
					},
				}
			} else if stop_rx.try_recv().is_ok() {
				tracing::debug!("Replay stopped before completion");
				return;
			}

			if sender.send(action).is_err() {
				tracing::debug!("Action channel closed, stopping replay");
				return;
			}
		}

		tracing::info!(count = total, path = %path.display(), "Replay source finished");
	}

	/// Loads and parses the recorded action file.
	async fn load_actions(path: &Path) -> Result<Vec<MarketAction>, IntakeError> {
		let raw = tokio::fs::read(path)
			.await
			.map_err(|e| IntakeError::Source(e.to_string()))?;
		serde_json::from_slice(&raw).map_err(|e| IntakeError::Parse(e.to_string()))
	}
}

#[async_trait]
impl ActionSource for ReplaySource {
	async fn start(&self, sender: mpsc::UnboundedSender<MarketAction>) -> Result<(), IntakeError> {
		if self.is_running.load(Ordering::SeqCst) {
			return Err(IntakeError::AlreadyRunning);
		}

		let (stop_tx, stop_rx) = mpsc::channel(1);
		*self.stop_signal.lock().await = Some(stop_tx);

		// Spawn replay task
		let path = self.config.path.clone();
		let delay_ms = self.config.delay_ms;

		tokio::spawn(async move {
			Self::replay_loop(path, delay_ms, sender, stop_rx).await;
		});

		self.is_running.store(true, Ordering::SeqCst);
		Ok(())
	}

	async fn stop(&self) -> Result<(), IntakeError> {
		if !self.is_running.load(Ordering::SeqCst) {
			return Ok(());
		}

		if let Some(stop_tx) = self.stop_signal.lock().await.take() {
			let _ = stop_tx.send(()).await;
		}

		self.is_running.store(false, Ordering::SeqCst);
		Ok(())
	}
}

/// Factory function to create a replay source from configuration.
///
/// Configuration parameters:
/// - `path`: Path to the JSON array of actions (required)
/// - `delay_ms`: Delay between actions in milliseconds (default: 0)
pub fn create_source(config: &toml::Value) -> Result<Box<dyn ActionSource>, IntakeError> {
	let replay_config: ReplaySourceConfig = config
		.clone()
		.try_into()
		.map_err(|e| IntakeError::Configuration(format!("Invalid replay config: {}", e)))?;

	if !replay_config.path.exists() {
		return Err(IntakeError::Configuration(format!(
			"Replay file not found: {}",
			replay_config.path.display()
		)));
	}

	Ok(Box::new(ReplaySource::new(replay_config)))
}

/// Registry for the replay intake source.
pub struct Registry;

impl farmgate_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "replay";
	type Factory = crate::SourceFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl crate::SourceRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use farmgate_types::{MarketAction, OrderAction};
	use std::io::Write;

	const ACTIONS_JSON: &str = r#"[
		{ "order": { "markPaid": { "orderId": "ord-1" } } },
		{ "order": { "updateStatus": { "orderId": "ord-1", "status": "shipped" } } },
		{ "negotiation": { "accept": { "negotiationId": "neg-1" } } }
	]"#;

	fn fixture_file(contents: &str) -> tempfile::NamedTempFile {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "{}", contents).unwrap();
		file
	}

	#[tokio::test]
	async fn test_replays_actions_in_order() {
		let file = fixture_file(ACTIONS_JSON);
		let source = ReplaySource::new(ReplaySourceConfig {
			path: file.path().to_path_buf(),
			delay_ms: 0,
		});

		let (tx, mut rx) = mpsc::unbounded_channel();
		source.start(tx).await.unwrap();

		let first = rx.recv().await.unwrap();
		assert!(matches!(
			first,
			MarketAction::Order(OrderAction::MarkPaid { ref order_id }) if order_id == "ord-1"
		));

		let second = rx.recv().await.unwrap();
		assert!(matches!(
			second,
			MarketAction::Order(OrderAction::UpdateStatus { .. })
		));

		let third = rx.recv().await.unwrap();
		assert!(matches!(third, MarketAction::Negotiation(_)));

		// File exhausted; channel closes when the replay task drops the sender
		assert!(rx.recv().await.is_none());
	}

	#[tokio::test]
	async fn test_double_start_rejected() {
		let file = fixture_file(ACTIONS_JSON);
		let source = ReplaySource::new(ReplaySourceConfig {
			path: file.path().to_path_buf(),
			delay_ms: 0,
		});

		let (tx, _rx) = mpsc::unbounded_channel();
		source.start(tx.clone()).await.unwrap();

		let result = source.start(tx).await;
		assert!(matches!(result, Err(IntakeError::AlreadyRunning)));
	}

	#[tokio::test]
	async fn test_factory_rejects_missing_file() {
		let config: toml::Value = toml::from_str("path = \"/nonexistent/actions.json\"").unwrap();
		let result = create_source(&config);
		assert!(matches!(result, Err(IntakeError::Configuration(_))));
	}

	#[tokio::test]
	async fn test_malformed_file_produces_nothing() {
		let file = fixture_file("this is not json");
		let source = ReplaySource::new(ReplaySourceConfig {
			path: file.path().to_path_buf(),
			delay_ms: 0,
		});

		let (tx, mut rx) = mpsc::unbounded_channel();
		source.start(tx).await.unwrap();

		assert!(rx.recv().await.is_none());
	}
}
