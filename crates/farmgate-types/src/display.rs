//! Status display metadata shared by buyer and seller dashboards.
//!
//! Both dashboards render the same badge for a given status, so the
//! label, color token, and icon name live here rather than in each view.

use crate::{NegotiationStatus, OrderStatus};

impl OrderStatus {
	/// Human-readable badge label.
	pub fn label(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "Pending",
			OrderStatus::Paid => "Paid",
			OrderStatus::Processing => "Processing",
			OrderStatus::Shipped => "Shipped",
			OrderStatus::Delivered => "Delivered",
		}
	}

	/// Color token used for the status badge.
	pub fn color(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "yellow",
			OrderStatus::Paid => "blue",
			OrderStatus::Processing => "orange",
			OrderStatus::Shipped => "purple",
			OrderStatus::Delivered => "green",
		}
	}

	/// Icon name used for the status badge.
	pub fn icon(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "clock",
			OrderStatus::Paid => "credit-card",
			OrderStatus::Processing => "package",
			OrderStatus::Shipped => "truck",
			OrderStatus::Delivered => "check-circle",
		}
	}
}

impl NegotiationStatus {
	/// Human-readable badge label.
	pub fn label(&self) -> &'static str {
		match self {
			NegotiationStatus::Open => "Open",
			NegotiationStatus::Countered => "Countered",
			NegotiationStatus::Agreed => "Agreed",
			NegotiationStatus::Rejected => "Rejected",
		}
	}

	/// Color token used for the status badge.
	pub fn color(&self) -> &'static str {
		match self {
			NegotiationStatus::Open => "blue",
			NegotiationStatus::Countered => "orange",
			NegotiationStatus::Agreed => "green",
			NegotiationStatus::Rejected => "red",
		}
	}

	/// Icon name used for the status badge.
	pub fn icon(&self) -> &'static str {
		match self {
			NegotiationStatus::Open => "message-circle",
			NegotiationStatus::Countered => "arrow-left-right",
			NegotiationStatus::Agreed => "handshake",
			NegotiationStatus::Rejected => "x-circle",
		}
	}
}
