//! Action and event handlers for the engine loop.
//!
//! This module contains the handlers the engine dispatches to: order and
//! negotiation actions are validated at the boundary and applied through the
//! stores, and store events are converted into buyer and seller
//! notifications.

pub mod negotiation;
pub mod notification;
pub mod order;

pub use negotiation::NegotiationHandler;
pub use notification::NotificationHandler;
pub use order::OrderHandler;
