//! Core engine for the farmgate marketplace.
//!
//! This crate provides the orchestration logic for the order and negotiation
//! lifecycle: the storage-backed stores that own the collections, the
//! handlers that validate and apply actions, the single-writer engine loop,
//! the event-driven notification dispatch, the startup seeding, and the
//! builder that assembles an engine from pluggable implementations.

pub mod builder;
pub mod engine;
pub mod handlers;
pub mod seed;
pub mod state;

pub use builder::{BuilderError, MarketBuilder, MarketFactories};
pub use engine::{event_bus::EventBus, ActionHandle, EngineError, MarketEngine};
pub use seed::{SeedError, SeedReport, SeedService};
pub use state::{NegotiationStateError, NegotiationStore, OrderStateError, OrderStore};
