//! Common types module for the farmgate marketplace engine.
//!
//! This module defines the core data types and structures used throughout
//! the lifecycle engine. It provides a centralized location for shared types
//! to ensure consistency across all marketplace components.

/// Action payloads submitted through the intake boundary.
pub mod actions;
/// Status display metadata shared by buyer and seller dashboards.
pub mod display;
/// Event types for lifecycle transitions.
pub mod events;
/// Negotiation thread types and offer payloads.
pub mod negotiation;
/// Notification types produced for buyers and sellers.
pub mod notification;
/// Purchase order types including line items and checkout payloads.
pub mod order;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Storage keys for the persisted collections.
pub mod storage;
/// Utility functions for formatting identifiers.
pub mod utils;

// Re-export all types for convenient access
pub use actions::*;
pub use events::*;
pub use negotiation::*;
pub use notification::*;
pub use order::*;
pub use registry::ImplementationRegistry;
pub use storage::*;
pub use utils::truncate_id;
