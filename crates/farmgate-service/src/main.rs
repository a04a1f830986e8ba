//! Main entry point for the farmgate marketplace service.
//!
//! This binary runs the order and negotiation lifecycle engine with
//! pluggable implementations for each component: storage backends, intake
//! sources, and notification sinks are selected by name from the
//! configuration file and wired together through factory registries.

use anyhow::Context;
use clap::Parser;
use farmgate_config::Config;
use farmgate_core::{MarketBuilder, MarketEngine, MarketFactories, SeedService};
use std::collections::HashMap;
use std::path::PathBuf;

/// Command-line arguments for the marketplace service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml", env = "FARMGATE_CONFIG")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the marketplace service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the market engine from the implementation registries
/// 5. Loads seed fixtures, then runs the engine until interrupted
#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	tracing::info!("Started market service");

	let config_path = args.config.to_string_lossy();
	let config = Config::from_file(&config_path)
		.await
		.with_context(|| format!("Failed to load configuration from {}", config_path))?;
	tracing::info!("Loaded configuration [{}]", config.market.id);

	let engine = build_engine(config).await?;

	// Seed before the loop subscribes so fixture loading emits no
	// notifications, matching the watcher's initial-load skip.
	if let Some(seed) = engine.config().seed.clone() {
		let seeder = SeedService::new(engine.orders().clone(), engine.negotiations().clone());
		seeder
			.load(&seed)
			.await
			.context("Failed to load seed fixtures")?;
	}

	engine.run().await?;

	tracing::info!("Stopped market service");
	Ok(())
}

/// Collects a registry's (name, factory) pairs into the map the builder expects.
fn factory_map<F>(implementations: Vec<(&'static str, F)>) -> HashMap<String, F> {
	implementations
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect()
}

/// Builds the market engine with all registered implementations.
///
/// This function wires up the concrete implementations for:
/// - Storage backends (in-memory, file)
/// - Intake sources (replay file, line-delimited stdin)
/// - Notification sinks (structured log, per-recipient feed)
async fn build_engine(config: Config) -> anyhow::Result<MarketEngine> {
	let factories = MarketFactories {
		storage_factories: factory_map(farmgate_storage::get_all_implementations()),
		intake_factories: factory_map(farmgate_intake::get_all_implementations()),
		sink_factories: factory_map(farmgate_notify::get_all_implementations()),
	};

	Ok(MarketBuilder::new(config).build(factories).await?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use farmgate_types::{Negotiation, NegotiationStatus, Order, OrderItem, OrderStatus};
	use rust_decimal::Decimal;
	use std::io::Write;
	use tempfile::NamedTempFile;

	const BASE_CONFIG: &str = r#"
		[market]
		id = "test-service"

		[store]
		primary = "memory"
		[store.implementations.memory]

		[intake.sources.stdin]

		[notifications.sinks.log]
		[notifications.sinks.feed]
		retention = 16
	"#;

	#[test]
	fn test_args_default_values() {
		let args = Args {
			config: PathBuf::from("config.toml"),
			log_level: "info".to_string(),
		};

		assert_eq!(args.config, PathBuf::from("config.toml"));
		assert_eq!(args.log_level, "info");
	}

	#[test]
	fn test_factory_maps_cover_all_registries() {
		let storage = factory_map(farmgate_storage::get_all_implementations());
		assert!(storage.contains_key("memory"));
		assert!(storage.contains_key("file"));

		let intake = factory_map(farmgate_intake::get_all_implementations());
		assert!(intake.contains_key("replay"));
		assert!(intake.contains_key("stdin"));

		let sinks = factory_map(farmgate_notify::get_all_implementations());
		assert!(sinks.contains_key("log"));
		assert!(sinks.contains_key("feed"));
	}

	#[tokio::test]
	async fn test_build_engine_from_inline_config() {
		let config: Config = BASE_CONFIG.parse().unwrap();

		let engine = build_engine(config).await.unwrap();

		assert_eq!(engine.config().market.id, "test-service");
		assert_eq!(engine.notify().sink_count(), 2);
	}

	#[tokio::test]
	async fn test_build_engine_rejects_unregistered_primary_store() {
		// "redis" passes config validation but has no registered factory.
		let config: Config = r#"
			[market]
			id = "test-service"

			[store]
			primary = "redis"
			[store.implementations.redis]

			[intake.sources.stdin]

			[notifications.sinks.log]
		"#
		.parse()
		.unwrap();

		assert!(build_engine(config).await.is_err());
	}

	fn order_fixture(id: &str, status: OrderStatus) -> Order {
		Order {
			id: id.to_string(),
			buyer_id: "buyer-1".to_string(),
			buyer_name: "Amara".to_string(),
			items: vec![OrderItem {
				product_id: "prod-yam".to_string(),
				product_name: "Puna Yams".to_string(),
				qty: 20,
				price_per_kg: Decimal::new(150, 2),
			}],
			subtotal: Decimal::new(3000, 2),
			delivery_fee: Decimal::new(500, 2),
			points_discount: None,
			earned_points: None,
			total: Decimal::new(3500, 2),
			status,
			receipt_url: None,
			created_at: Utc::now(),
			paid_at: None,
			delivered_at: None,
		}
	}

	fn negotiation_fixture(id: &str) -> Negotiation {
		Negotiation {
			id: id.to_string(),
			product_id: "prod-yam".to_string(),
			product_name: "Puna Yams".to_string(),
			buyer_id: "buyer-1".to_string(),
			buyer_name: "Amara".to_string(),
			seller_id: "seller-1".to_string(),
			seller_name: "Kwame Farms".to_string(),
			current_price: Decimal::new(150, 2),
			requested_price: Decimal::new(120, 2),
			requested_qty: 50,
			counter_price: None,
			counter_notes: None,
			notes: None,
			status: NegotiationStatus::Open,
			delivery_date: Utc::now().date_naive(),
			created_at: Utc::now(),
			updated_at: Utc::now(),
		}
	}

	#[tokio::test]
	async fn test_seeded_engine_serves_fixture_collections() {
		let mut orders_file = NamedTempFile::new().unwrap();
		let orders = vec![
			order_fixture("ord-1", OrderStatus::Pending),
			order_fixture("ord-2", OrderStatus::Delivered),
		];
		orders_file
			.write_all(serde_json::to_vec(&orders).unwrap().as_slice())
			.unwrap();

		let mut negotiations_file = NamedTempFile::new().unwrap();
		let negotiations = vec![negotiation_fixture("neg-1")];
		negotiations_file
			.write_all(serde_json::to_vec(&negotiations).unwrap().as_slice())
			.unwrap();

		let config_text = format!(
			r#"
			[market]
			id = "test-service"

			[store]
			primary = "memory"
			[store.implementations.memory]

			[intake.sources.stdin]

			[notifications.sinks.log]

			[seed]
			orders = "{}"
			negotiations = "{}"
			"#,
			orders_file.path().display(),
			negotiations_file.path().display(),
		);
		let config: Config = config_text.parse().unwrap();

		let engine = build_engine(config).await.unwrap();
		let seed = engine.config().seed.clone().unwrap();
		let seeder = SeedService::new(engine.orders().clone(), engine.negotiations().clone());
		let report = seeder.load(&seed).await.unwrap();

		assert_eq!(report.orders_loaded, 2);
		assert_eq!(report.negotiations_loaded, 1);

		// Fixtures land newest-first, so the second file entry heads the list.
		let listed = engine.orders().list().await.unwrap();
		assert_eq!(listed.len(), 2);
		assert_eq!(listed[0].id, "ord-2");
		assert_eq!(listed[0].status, OrderStatus::Delivered);

		let threads = engine.negotiations().list().await.unwrap();
		assert_eq!(threads.len(), 1);
		assert_eq!(threads[0].status, NegotiationStatus::Open);
	}
}
