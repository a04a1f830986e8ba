//! Negotiation thread types for the marketplace engine.
//!
//! This module defines the price-negotiation entity shared between one buyer
//! and one seller for a single product, together with the offer and counter
//! payloads used to drive it.

use crate::order::validate_positive_amount;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Represents a price negotiation between a buyer and a seller.
///
/// A negotiation snapshots the listed price at creation and carries the
/// buyer's offer; the seller answers by countering, accepting, or rejecting.
/// Identity and reference fields are immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Negotiation {
	/// Unique identifier for this negotiation, assigned at creation.
	pub id: String,
	/// Identifier of the negotiated product.
	pub product_id: String,
	/// Denormalized display name of the product.
	pub product_name: String,
	/// Identifier of the offering buyer.
	pub buyer_id: String,
	/// Denormalized display name of the buyer.
	pub buyer_name: String,
	/// Identifier of the listing seller.
	pub seller_id: String,
	/// Denormalized display name of the seller.
	pub seller_name: String,
	/// The listed price per kilogram at negotiation time; immutable snapshot.
	pub current_price: Decimal,
	/// Price per kilogram offered by the buyer.
	pub requested_price: Decimal,
	/// Quantity in kilograms requested by the buyer.
	pub requested_qty: u32,
	/// Counter price set when the seller counters.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub counter_price: Option<Decimal>,
	/// Free-text notes attached to the counter.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub counter_notes: Option<String>,
	/// Buyer's free-text notes from the offer form.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
	/// Current status of the negotiation thread.
	pub status: NegotiationStatus,
	/// Buyer-chosen delivery date; immutable after creation.
	pub delivery_date: NaiveDate,
	/// Timestamp when this negotiation was opened.
	pub created_at: DateTime<Utc>,
	/// Timestamp of the last applied transition.
	pub updated_at: DateTime<Utc>,
}

/// Offer payload for opening a new negotiation.
///
/// Structural fields are validated here; the quantity minimum and the
/// delivery-date window are policy checks applied at the intake boundary.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OfferRequest {
	/// Optional pre-assigned negotiation identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Identifier of the negotiated product.
	#[validate(length(min = 1))]
	pub product_id: String,
	/// Display name of the product.
	#[validate(length(min = 1))]
	pub product_name: String,
	/// Identifier of the offering buyer.
	#[validate(length(min = 1))]
	pub buyer_id: String,
	/// Display name of the buyer.
	#[validate(length(min = 1))]
	pub buyer_name: String,
	/// Identifier of the listing seller.
	#[validate(length(min = 1))]
	pub seller_id: String,
	/// Display name of the seller.
	#[validate(length(min = 1))]
	pub seller_name: String,
	/// The listed price per kilogram being negotiated against.
	#[validate(custom(function = "validate_positive_amount"))]
	pub current_price: Decimal,
	/// Price per kilogram offered by the buyer.
	#[validate(custom(function = "validate_positive_amount"))]
	pub requested_price: Decimal,
	/// Quantity in kilograms requested by the buyer.
	pub requested_qty: u32,
	/// Buyer's free-text notes.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
	/// Buyer-chosen delivery date.
	pub delivery_date: NaiveDate,
}

impl OfferRequest {
	/// Converts the offer payload into an open negotiation.
	///
	/// Assigns a fresh id when none was supplied; both timestamps start at
	/// the creation instant and the counter fields start unset.
	pub fn into_negotiation(self, now: DateTime<Utc>) -> Negotiation {
		Negotiation {
			id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
			product_id: self.product_id,
			product_name: self.product_name,
			buyer_id: self.buyer_id,
			buyer_name: self.buyer_name,
			seller_id: self.seller_id,
			seller_name: self.seller_name,
			current_price: self.current_price,
			requested_price: self.requested_price,
			requested_qty: self.requested_qty,
			counter_price: None,
			counter_notes: None,
			notes: self.notes,
			status: NegotiationStatus::Open,
			delivery_date: self.delivery_date,
			created_at: now,
			updated_at: now,
		}
	}
}

/// Counter payload submitted by the seller.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CounterOffer {
	/// Price per kilogram countered by the seller.
	#[validate(custom(function = "validate_positive_amount"))]
	pub counter_price: Decimal,
	/// Free-text notes explaining the counter.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub counter_notes: Option<String>,
}

/// Status of a negotiation thread.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum NegotiationStatus {
	/// Buyer's offer is awaiting a seller response.
	Open,
	/// Seller has countered the offer.
	Countered,
	/// Both sides have agreed on terms.
	Agreed,
	/// Seller has rejected the offer.
	Rejected,
}

impl NegotiationStatus {
	/// Returns true for terminal statuses that accept no further transitions.
	pub fn is_terminal(&self) -> bool {
		matches!(self, NegotiationStatus::Agreed | NegotiationStatus::Rejected)
	}
}

impl fmt::Display for NegotiationStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NegotiationStatus::Open => write!(f, "open"),
			NegotiationStatus::Countered => write!(f, "countered"),
			NegotiationStatus::Agreed => write!(f, "agreed"),
			NegotiationStatus::Rejected => write!(f, "rejected"),
		}
	}
}
