//! Registry trait for self-registering implementations.
//!
//! This module provides the base trait that all pluggable implementations must
//! implement to register themselves with their configuration name and factory
//! function.

/// Base trait for implementation registries.
///
/// Each implementation module (storage backends, intake sources, notification
/// sinks) must provide a Registry struct that implements this trait. This
/// ensures that every implementation declares its configuration name and
/// provides a factory function.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This should match the key used in the TOML configuration, for example:
	/// - "memory" for store.implementations.memory
	/// - "replay" for intake.sources.replay
	/// - "feed" for notifications.sinks.feed
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	///
	/// Each module defines its own factory type, for example:
	/// - StoreFactory for storage backends
	/// - IntakeFactory for intake sources
	type Factory;

	/// Get the factory function for this implementation.
	///
	/// Returns the factory function that can create instances of this
	/// implementation when provided with the appropriate configuration.
	fn factory() -> Self::Factory;
}
