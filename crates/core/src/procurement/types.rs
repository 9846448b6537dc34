//! Purchase request and purchase order data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use acopio_shared::types::{
    PurchaseOrderId, PurchaseOrderLineId, PurchaseRequestId, PurchaseRequestLineId, RequisitionId,
};

use crate::item::ItemRef;

/// Status of a purchase-request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestLineStatus {
    /// Line is open for ordering.
    Open,
    /// Line has been closed (fully sourced or withdrawn).
    Closed,
}

/// A purchase-request (SC) line.
///
/// Links back to its requisition via item identity; the owning requisition
/// id is resolved at ingestion and carried here so allocation can match
/// movements without re-deriving the linkage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLine {
    /// Line ID.
    pub id: PurchaseRequestLineId,
    /// Owning purchase request.
    pub request_id: PurchaseRequestId,
    /// Requisition this line sources demand from.
    pub requisition_id: RequisitionId,
    /// Item identity.
    pub item: ItemRef,
    /// Approved-for-purchase quantity.
    pub quantity: Decimal,
    /// Line status.
    pub status: RequestLineStatus,
}

/// Status of a purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order issued to the supplier.
    Issued,
    /// Order cancelled; excluded from all pending computations.
    Cancelled,
    /// Order fully received.
    Received,
}

impl OrderStatus {
    /// Returns true if the order participates in allocation.
    #[must_use]
    pub fn counts_for_allocation(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// A purchase-order (OC) line.
///
/// References exactly one purchase-request line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    /// Line ID.
    pub id: PurchaseOrderLineId,
    /// Purchase-request line this order line sources.
    pub request_line_id: PurchaseRequestLineId,
    /// Ordered quantity.
    pub quantity: Decimal,
}

/// A purchase order with its lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// Order ID.
    pub id: PurchaseOrderId,
    /// Order status.
    pub status: OrderStatus,
    /// Date the order was placed; drives oldest-first allocation.
    pub order_date: NaiveDate,
    /// Order lines.
    pub lines: Vec<OrderLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_orders_excluded_from_allocation() {
        assert!(OrderStatus::Issued.counts_for_allocation());
        assert!(OrderStatus::Received.counts_for_allocation());
        assert!(!OrderStatus::Cancelled.counts_for_allocation());
    }
}
