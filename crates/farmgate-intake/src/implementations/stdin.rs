//! Line-delimited intake source reading actions from standard input.
//!
//! Each input line holds one JSON-encoded action; blank lines are skipped
//! and malformed lines are logged and dropped so one typo never ends an
//! interactive session.

use crate::{ActionSource, IntakeError};
use async_trait::async_trait;
use farmgate_types::MarketAction;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};

/// Action source reading line-delimited JSON from standard input.
pub struct StdinSource {
	/// Flag indicating if the reader is active.
	is_running: Arc<AtomicBool>,
	/// Channel for signaling reader shutdown.
	stop_signal: Arc<Mutex<Option<mpsc::Sender<()>>>>,
}

impl StdinSource {
	/// Creates a new stdin source.
	pub fn new() -> Self {
		Self {
			is_running: Arc::new(AtomicBool::new(false)),
			stop_signal: Arc::new(Mutex::new(None)),
		}
	}

	/// Parses one input line into an action.
	fn parse_line(line: &str) -> Result<MarketAction, IntakeError> {
		serde_json::from_str(line).map_err(|e| IntakeError::Parse(e.to_string()))
	}

	/// Reads lines until EOF or a stop signal.
	async fn read_loop(sender: mpsc::UnboundedSender<MarketAction>, mut stop_rx: mpsc::Receiver<()>) {
		let mut lines = BufReader::new(tokio::io::stdin()).lines();

		loop {
			tokio::select! {
				line = lines.next_line() => {
					match line {
						Ok(Some(line)) => {
							let trimmed = line.trim();
							if trimmed.is_empty() {
								continue;
							}
							match Self::parse_line(trimmed) {
								Ok(action) => {
									if sender.send(action).is_err() {
										tracing::debug!("Action channel closed, stopping stdin reader");
										return;
									}
								},
								Err(e) => {
									tracing::warn!(error = %e, "Dropping malformed input line");
								},
							}
						},
						Ok(None) => {
							tracing::debug!("Stdin reached EOF");
							return;
						},
						Err(e) => {
							tracing::error!(error = %e, "Failed to read from stdin");
							return;
						},
					}
				},
				_ = stop_rx.recv() => {
					tracing::debug!("Stdin reader stopped");
					return;
				},
			}
		}
	}
}

impl Default for StdinSource {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl ActionSource for StdinSource {
	async fn start(&self, sender: mpsc::UnboundedSender<MarketAction>) -> Result<(), IntakeError> {
		if self.is_running.load(Ordering::SeqCst) {
			return Err(IntakeError::AlreadyRunning);
		}

		let (stop_tx, stop_rx) = mpsc::channel(1);
		*self.stop_signal.lock().await = Some(stop_tx);

		tokio::spawn(async move {
			Self::read_loop(sender, stop_rx).await;
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

/// Factory function to create a stdin source from configuration.
///
/// Configuration parameters:
/// - None required for the stdin source
pub fn create_source(_config: &toml::Value) -> Result<Box<dyn ActionSource>, IntakeError> {
	Ok(Box::new(StdinSource::new()))
}

/// Registry for the stdin intake source.
pub struct Registry;

impl farmgate_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "stdin";
	type Factory = crate::SourceFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl crate::SourceRegistry for Registry {}
