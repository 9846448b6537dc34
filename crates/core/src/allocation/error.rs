//! Allocation error types.

use rust_decimal::Decimal;
use thiserror::Error;

use acopio_shared::types::PurchaseOrderLineId;

/// Errors that can occur during allocation.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// A live order line carries a zero or negative ordered quantity.
    #[error("Order line {line_id} has invalid ordered quantity {quantity}")]
    InvalidLineQuantity {
        /// The offending order line.
        line_id: PurchaseOrderLineId,
        /// The invalid quantity.
        quantity: Decimal,
    },

    /// The requested order line is not present in the snapshot.
    #[error("Order line not found: {0}")]
    LineNotFound(PurchaseOrderLineId),
}

impl AllocationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidLineQuantity { .. } => "INVALID_LINE_QUANTITY",
            Self::LineNotFound(_) => "ORDER_LINE_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidLineQuantity { .. } => 400,
            Self::LineNotFound(_) => 404,
        }
    }
}
