//! Reconciliation error types.

use rust_decimal::Decimal;
use thiserror::Error;

use acopio_shared::types::{PurchaseOrderLineId, RequisitionLineId};

use crate::allocation::AllocationError;

/// Errors that can occur during reconciliation operations.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// Receipt quantity must be positive.
    #[error("Receipt quantity must be positive")]
    NonPositiveQuantity,

    /// Receipt quantity exceeds the available balance for the chosen path.
    #[error("Receipt of {requested} exceeds available balance {available}")]
    ExceedsAvailable {
        /// Quantity the caller tried to register.
        requested: Decimal,
        /// Balance currently open on the chosen path.
        available: Decimal,
    },

    /// The requisition line has no item identity to match movements against.
    #[error("Requisition line {0} has no item reference")]
    MissingItem(RequisitionLineId),

    /// The requisition line is cancelled and accepts no receipts.
    #[error("Requisition line {0} is cancelled")]
    LineCancelled(RequisitionLineId),

    /// The chosen order line is not linked to the requisition line.
    #[error("Order line {0} is not linked to this requisition line")]
    UnlinkedOrderLine(PurchaseOrderLineId),

    /// Allocation failed.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

impl ReconciliationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveQuantity => "NON_POSITIVE_QUANTITY",
            Self::ExceedsAvailable { .. } => "EXCEEDS_AVAILABLE",
            Self::MissingItem(_) => "MISSING_ITEM_REFERENCE",
            Self::LineCancelled(_) => "LINE_CANCELLED",
            Self::UnlinkedOrderLine(_) => "UNLINKED_ORDER_LINE",
            Self::Allocation(inner) => inner.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NonPositiveQuantity
            | Self::ExceedsAvailable { .. }
            | Self::MissingItem(_)
            | Self::LineCancelled(_)
            | Self::UnlinkedOrderLine(_) => 400,
            Self::Allocation(inner) => inner.http_status_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ReconciliationError::NonPositiveQuantity.error_code(),
            "NON_POSITIVE_QUANTITY"
        );
        assert_eq!(
            ReconciliationError::ExceedsAvailable {
                requested: dec!(10),
                available: dec!(4),
            }
            .error_code(),
            "EXCEEDS_AVAILABLE"
        );
        assert_eq!(
            ReconciliationError::Allocation(AllocationError::LineNotFound(
                PurchaseOrderLineId::new()
            ))
            .error_code(),
            "ORDER_LINE_NOT_FOUND"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            ReconciliationError::ExceedsAvailable {
                requested: dec!(10),
                available: dec!(4),
            }
            .http_status_code(),
            400
        );
        assert_eq!(
            ReconciliationError::Allocation(AllocationError::LineNotFound(
                PurchaseOrderLineId::new()
            ))
            .http_status_code(),
            404
        );
    }

    #[test]
    fn test_error_display() {
        let err = ReconciliationError::ExceedsAvailable {
            requested: dec!(12),
            available: dec!(3.5),
        };
        assert_eq!(
            err.to_string(),
            "Receipt of 12 exceeds available balance 3.5"
        );
    }
}
