//! Requisition data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use acopio_shared::types::{FrontSpecialtyId, RequisitionId, RequisitionLineId, Unit, UserId};

use crate::item::{ItemKind, ItemRef};

/// Fulfillment status of a requisition line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    /// Nothing received yet.
    Pending,
    /// Some quantity received, less than requested.
    Partial,
    /// Received quantity covers the request.
    Fulfilled,
    /// Line cancelled; excluded from reconciliation.
    Cancelled,
}

impl LineStatus {
    /// Derives the status from received vs requested quantities.
    ///
    /// Cancellation is an explicit state transition, never derived, so this
    /// only returns `Pending`, `Partial`, or `Fulfilled`.
    #[must_use]
    pub fn derive(received: Decimal, requested: Decimal) -> Self {
        if received <= Decimal::ZERO {
            Self::Pending
        } else if received < requested {
            Self::Partial
        } else {
            Self::Fulfilled
        }
    }

    /// Returns true if the line still participates in reconciliation.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// A requisition header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requisition {
    /// Requisition ID.
    pub id: RequisitionId,
    /// Work-front/specialty this requisition draws budget from.
    pub front_specialty_id: FrontSpecialtyId,
    /// Optional block/sector within the front.
    pub block: Option<String>,
    /// User who raised the requisition.
    pub requested_by: UserId,
    /// Requisition date.
    pub date: NaiveDate,
}

/// A requisition line: one demand unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequisitionLine {
    /// Line ID.
    pub id: RequisitionLineId,
    /// Owning requisition.
    pub requisition_id: RequisitionId,
    /// Item category.
    pub kind: ItemKind,
    /// Item identity; absent for free-text service lines.
    pub item: Option<ItemRef>,
    /// Unit of measure.
    pub unit: Unit,
    /// Quantity requested by the front.
    pub quantity_requested: Decimal,
    /// Denormalized running total of received quantity.
    ///
    /// The movement ledger is the source of truth; this field is a cache
    /// mutated only by the reconciliation receipt path and the repair
    /// operation.
    pub quantity_fulfilled: Decimal,
    /// Fulfillment status.
    pub status: LineStatus,
}

impl RequisitionLine {
    /// Raw outstanding balance: requested minus fulfilled, floored at zero.
    ///
    /// Over-receipt (fulfilled > requested) is a data-integrity condition
    /// the repair path reports; here it simply clamps.
    #[must_use]
    pub fn outstanding(&self) -> Decimal {
        (self.quantity_requested - self.quantity_fulfilled).max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_line(requested: Decimal, fulfilled: Decimal) -> RequisitionLine {
        RequisitionLine {
            id: RequisitionLineId::new(),
            requisition_id: RequisitionId::new(),
            kind: ItemKind::Material,
            item: None,
            unit: Unit::Un,
            quantity_requested: requested,
            quantity_fulfilled: fulfilled,
            status: LineStatus::derive(fulfilled, requested),
        }
    }

    #[test]
    fn test_derive_pending() {
        assert_eq!(LineStatus::derive(dec!(0), dec!(10)), LineStatus::Pending);
        assert_eq!(LineStatus::derive(dec!(-1), dec!(10)), LineStatus::Pending);
    }

    #[test]
    fn test_derive_partial() {
        assert_eq!(LineStatus::derive(dec!(3), dec!(10)), LineStatus::Partial);
    }

    #[test]
    fn test_derive_fulfilled() {
        assert_eq!(LineStatus::derive(dec!(10), dec!(10)), LineStatus::Fulfilled);
        // Over-receipt still reads as fulfilled; repair reports the excess.
        assert_eq!(LineStatus::derive(dec!(12), dec!(10)), LineStatus::Fulfilled);
    }

    #[test]
    fn test_is_open() {
        assert!(LineStatus::Pending.is_open());
        assert!(LineStatus::Partial.is_open());
        assert!(LineStatus::Fulfilled.is_open());
        assert!(!LineStatus::Cancelled.is_open());
    }

    #[test]
    fn test_outstanding_clamps_at_zero() {
        assert_eq!(make_line(dec!(10), dec!(4)).outstanding(), dec!(6));
        assert_eq!(make_line(dec!(10), dec!(10)).outstanding(), dec!(0));
        assert_eq!(make_line(dec!(10), dec!(12)).outstanding(), dec!(0));
    }
}
