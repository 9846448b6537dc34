//! Reconciliation domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use acopio_shared::types::{
    PurchaseOrderLineId, PurchaseRequestLineId, RequisitionLineId,
};

use crate::requisition::LineStatus;

/// Allocation path a receipt is registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source")]
pub enum ReceiptSource {
    /// Delivery against a specific purchase-order line.
    PurchaseOrder {
        /// The order line the clerk is receiving against.
        order_line_id: PurchaseOrderLineId,
    },
    /// Out-of-process petty-cash purchase; consumes only the raw
    /// outstanding balance, never OC-pipeline pending.
    PettyCash,
}

/// Result of applying a receipt to a requisition line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptOutcome {
    /// The line receiving the quantity.
    pub line_id: RequisitionLineId,
    /// New fulfilled running total to persist.
    pub new_fulfilled: Decimal,
    /// New line status to persist.
    pub new_status: LineStatus,
    /// Integrity warnings raised while computing the outcome.
    pub warnings: Vec<IntegrityWarning>,
}

/// Data-integrity conditions: surfaced, never fatal.
///
/// Computation proceeds with best-effort clamping; the caller logs these
/// and the repair report carries them to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum IntegrityWarning {
    /// A line's fulfilled total exceeds its requested quantity.
    OverFulfilled {
        /// The affected requisition line.
        line_id: RequisitionLineId,
        /// Requested quantity.
        requested: Decimal,
        /// Fulfilled total that exceeds it.
        fulfilled: Decimal,
    },
    /// An order line references a purchase-request line absent from the
    /// snapshot; its pending is treated as zero.
    OrphanOrderLine {
        /// The dangling order line.
        order_line_id: PurchaseOrderLineId,
        /// The missing request line it points at.
        request_line_id: PurchaseRequestLineId,
    },
}

/// Result of rebuilding a line's fulfillment cache from the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulfillmentRepair {
    /// The repaired requisition line.
    pub line_id: RequisitionLineId,
    /// Recomputed fulfilled total.
    pub quantity_fulfilled: Decimal,
    /// Recomputed status.
    pub status: LineStatus,
    /// True when the recomputed value differs from the stored cache.
    pub changed: bool,
    /// Integrity warnings raised during recomputation.
    pub warnings: Vec<IntegrityWarning>,
}

/// Pending quantity for one order line, for the per-order pending view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinePending {
    /// Order line ID.
    pub line_id: PurchaseOrderLineId,
    /// Purchase-request line the order line sources.
    pub request_line_id: PurchaseRequestLineId,
    /// Ordered quantity.
    pub ordered: Decimal,
    /// Quantity still open to receive.
    pub pending: Decimal,
}
