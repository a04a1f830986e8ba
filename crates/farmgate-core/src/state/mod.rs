//! State management for the marketplace collections.
//!
//! This module provides the storage-backed stores that own the order and
//! negotiation collections, validate lifecycle transitions, and publish an
//! event for every applied change.

pub mod negotiation;
pub mod order;

pub use negotiation::{NegotiationStateError, NegotiationStore};
pub use order::{OrderStateError, OrderStore};
