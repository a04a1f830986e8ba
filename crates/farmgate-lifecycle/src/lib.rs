//! Lifecycle rules for the farmgate marketplace engine.
//!
//! This crate holds the pure state-machine tables governing order and
//! negotiation status transitions, plus the intake-boundary policies the
//! handlers apply before a payload is allowed to reach a store. Nothing
//! here touches storage or emits events; the stores own those concerns.

/// Intake-boundary policies for checkout and offer payloads.
pub mod policy;
/// Status transition tables for orders and negotiations.
pub mod transitions;

pub use policy::{CheckoutPolicy, OfferPolicy, PolicyError};
pub use transitions::{
	is_valid_negotiation_transition, is_valid_order_transition, receipt_reset_allowed,
};
