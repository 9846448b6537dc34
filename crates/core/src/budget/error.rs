//! Budget error types.

use thiserror::Error;

/// Errors that can occur during budget operations.
#[derive(Debug, Error)]
pub enum BudgetError {
    /// Requested quantity must be positive.
    #[error("Requested quantity must be positive")]
    NonPositiveQuantity,

    /// Pending-in-form quantity cannot be negative.
    #[error("Pending-in-form quantity cannot be negative")]
    NegativePending,
}

impl BudgetError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveQuantity => "NON_POSITIVE_QUANTITY",
            Self::NegativePending => "NEGATIVE_PENDING",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NonPositiveQuantity | Self::NegativePending => 400,
        }
    }
}
