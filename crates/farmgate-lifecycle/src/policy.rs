//! Intake-boundary policies for checkout and offer payloads.
//!
//! The stores accept any well-shaped entity; these policies are the gate a
//! payload must pass before the handler lets it reach a store. Structural
//! field checks run first, then the arithmetic and business rules.

use chrono::{Days, NaiveDate};
use farmgate_types::{CheckoutRequest, OfferRequest};
use rust_decimal::Decimal;
use thiserror::Error;
use validator::Validate;

/// Errors produced by the intake-boundary policies.
#[derive(Debug, Error)]
pub enum PolicyError {
	/// Structural validation of the payload failed.
	#[error("Invalid payload: {0}")]
	InvalidPayload(String),
	/// The declared subtotal does not match the sum of line totals.
	#[error("Subtotal {declared} does not match line totals {computed}")]
	SubtotalMismatch { declared: Decimal, computed: Decimal },
	/// The declared total does not match subtotal plus fee minus discount.
	#[error("Total {declared} does not match expected {expected}")]
	TotalMismatch { declared: Decimal, expected: Decimal },
	/// The requested quantity is below the configured minimum.
	#[error("Requested quantity {qty} is below the minimum of {min}")]
	QuantityBelowMinimum { qty: u32, min: u32 },
	/// The delivery date falls outside the allowed window.
	#[error("Delivery date {date} is outside the window {earliest} to {latest}")]
	DeliveryDateOutsideWindow {
		date: NaiveDate,
		earliest: NaiveDate,
		latest: NaiveDate,
	},
}

/// Checkout arithmetic checks applied before an order is created.
///
/// The cart computes every monetary field client-side; this policy verifies
/// the declared figures are internally consistent before trusting them.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutPolicy;

impl CheckoutPolicy {
	/// Validates a checkout payload structurally and arithmetically.
	pub fn validate(&self, request: &CheckoutRequest) -> Result<(), PolicyError> {
		request
			.validate()
			.map_err(|e| PolicyError::InvalidPayload(e.to_string()))?;

		let computed: Decimal = request.items.iter().map(|item| item.line_total()).sum();
		if computed != request.subtotal {
			return Err(PolicyError::SubtotalMismatch {
				declared: request.subtotal,
				computed,
			});
		}

		let expected = request.subtotal + request.delivery_fee
			- request.points_discount.unwrap_or(Decimal::ZERO);
		if expected != request.total {
			return Err(PolicyError::TotalMismatch {
				declared: request.total,
				expected,
			});
		}

		Ok(())
	}
}

/// Offer checks applied before a negotiation is opened.
///
/// Enforced at creation time only; seeded negotiations and later
/// transitions never pass through this policy.
#[derive(Debug, Clone, Copy)]
pub struct OfferPolicy {
	/// Minimum quantity a buyer may request.
	pub min_qty: u32,
	/// Width of the delivery-date window in days, starting tomorrow.
	pub window_days: u32,
}

impl Default for OfferPolicy {
	fn default() -> Self {
		Self {
			min_qty: 10,
			window_days: 7,
		}
	}
}

impl OfferPolicy {
	/// Validates an offer payload against the quantity minimum and the
	/// delivery-date window computed from the given date.
	pub fn validate(&self, request: &OfferRequest, today: NaiveDate) -> Result<(), PolicyError> {
		request
			.validate()
			.map_err(|e| PolicyError::InvalidPayload(e.to_string()))?;

		if request.requested_qty < self.min_qty {
			return Err(PolicyError::QuantityBelowMinimum {
				qty: request.requested_qty,
				min: self.min_qty,
			});
		}

		let earliest = today.succ_opt().unwrap_or(NaiveDate::MAX);
		let latest = today
			.checked_add_days(Days::new(u64::from(self.window_days)))
			.unwrap_or(NaiveDate::MAX);
		if request.delivery_date < earliest || request.delivery_date > latest {
			return Err(PolicyError::DeliveryDateOutsideWindow {
				date: request.delivery_date,
				earliest,
				latest,
			});
		}

		Ok(())
	}
}
