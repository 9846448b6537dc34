//! The oldest-order-first allocation walk.
//!
//! Several purchase orders may source the same purchase-request line, each
//! for part (or more than all) of the approved quantity. Warehouse receipts
//! do not say which order they belong to; the ledger only records item and
//! requisition. Allocation therefore attributes the cumulative consumed
//! quantity to order lines in temporal order: the oldest order absorbs
//! receipts first, and each line's pending quantity is whatever of its
//! ordered quantity remains uncovered.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use acopio_shared::types::{PurchaseOrderId, PurchaseOrderLineId, PurchaseRequestLineId};

use super::error::AllocationError;
use crate::procurement::{OrderStatus, PurchaseOrder};

/// A purchase-order line flattened with its owning order's header data.
#[derive(Debug, Clone)]
pub struct AllocatableLine {
    /// Order line ID.
    pub line_id: PurchaseOrderLineId,
    /// Owning order ID.
    pub order_id: PurchaseOrderId,
    /// Owning order status.
    pub order_status: OrderStatus,
    /// Owning order date.
    pub order_date: NaiveDate,
    /// Ordered quantity.
    pub quantity: Decimal,
}

/// Allocation result for one order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineAllocation {
    /// Order line ID.
    pub line_id: PurchaseOrderLineId,
    /// Owning order ID.
    pub order_id: PurchaseOrderId,
    /// Ordered quantity.
    pub ordered: Decimal,
    /// Consumed quantity attributed to this line.
    pub allocated: Decimal,
    /// Ordered quantity still open to receive.
    pub pending: Decimal,
}

/// Result of allocating consumed quantity across a request line's orders.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    /// Per-line allocations, in allocation (oldest-first) order.
    pub allocations: Vec<LineAllocation>,
    /// Consumed quantity not absorbed by any line (over-receipt).
    pub unabsorbed: Decimal,
}

impl AllocationOutcome {
    /// Total pending quantity across all lines.
    #[must_use]
    pub fn total_pending(&self) -> Decimal {
        self.allocations.iter().map(|a| a.pending).sum()
    }
}

/// Flattens the order lines referencing one purchase-request line.
///
/// Keeps cancelled orders' lines out entirely; they take no part in any
/// pending computation.
#[must_use]
pub fn lines_for_request(
    orders: &[PurchaseOrder],
    request_line_id: PurchaseRequestLineId,
) -> Vec<AllocatableLine> {
    orders
        .iter()
        .filter(|order| order.status.counts_for_allocation())
        .flat_map(|order| {
            order
                .lines
                .iter()
                .filter(|line| line.request_line_id == request_line_id)
                .map(|line| AllocatableLine {
                    line_id: line.id,
                    order_id: order.id,
                    order_status: order.status,
                    order_date: order.order_date,
                    quantity: line.quantity,
                })
        })
        .collect()
}

/// Allocates consumed quantity across order lines, oldest order first.
///
/// Ties on `order_date` break by line id; ids are UUID v7, so equal-dated
/// orders allocate in creation sequence. Negative `consumed` (an empty or
/// corrected ledger) clamps to zero.
///
/// # Errors
///
/// Returns `AllocationError::InvalidLineQuantity` if any live line has a
/// zero or negative ordered quantity.
pub fn allocate(
    lines: &[AllocatableLine],
    consumed: Decimal,
) -> Result<AllocationOutcome, AllocationError> {
    let mut live: Vec<&AllocatableLine> = lines
        .iter()
        .filter(|line| line.order_status.counts_for_allocation())
        .collect();

    for line in &live {
        if line.quantity <= Decimal::ZERO {
            return Err(AllocationError::InvalidLineQuantity {
                line_id: line.line_id,
                quantity: line.quantity,
            });
        }
    }

    live.sort_by(|a, b| {
        a.order_date
            .cmp(&b.order_date)
            .then_with(|| a.line_id.cmp(&b.line_id))
    });

    let mut remaining = consumed.max(Decimal::ZERO);
    let mut allocations = Vec::with_capacity(live.len());

    for line in live {
        let allocated = line.quantity.min(remaining);
        remaining -= allocated;
        allocations.push(LineAllocation {
            line_id: line.line_id,
            order_id: line.order_id,
            ordered: line.quantity,
            allocated,
            pending: line.quantity - allocated,
        });
    }

    Ok(AllocationOutcome {
        allocations,
        unabsorbed: remaining,
    })
}

/// Pending quantity for one order line.
///
/// Walks the same oldest-first order as [`allocate`] but stops at the
/// target line. A cancelled line has nothing open to receive and reports
/// zero.
///
/// # Errors
///
/// Returns `AllocationError::LineNotFound` if the target line is absent
/// from the snapshot, or `InvalidLineQuantity` as in [`allocate`].
pub fn pending_for_line(
    lines: &[AllocatableLine],
    consumed: Decimal,
    target: PurchaseOrderLineId,
) -> Result<Decimal, AllocationError> {
    let Some(line) = lines.iter().find(|line| line.line_id == target) else {
        return Err(AllocationError::LineNotFound(target));
    };
    if !line.order_status.counts_for_allocation() {
        return Ok(Decimal::ZERO);
    }

    let outcome = allocate(lines, consumed)?;
    outcome
        .allocations
        .into_iter()
        .find(|a| a.line_id == target)
        .map(|a| a.pending)
        .ok_or(AllocationError::LineNotFound(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_line(order_date: NaiveDate, quantity: Decimal) -> AllocatableLine {
        AllocatableLine {
            line_id: PurchaseOrderLineId::new(),
            order_id: PurchaseOrderId::new(),
            order_status: OrderStatus::Issued,
            order_date,
            quantity,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn pendings(outcome: &AllocationOutcome) -> Vec<Decimal> {
        outcome.allocations.iter().map(|a| a.pending).collect()
    }

    #[test]
    fn test_no_lines_nothing_to_allocate() {
        let outcome = allocate(&[], dec!(12)).unwrap();
        assert!(outcome.allocations.is_empty());
        assert_eq!(outcome.unabsorbed, dec!(12));
        assert_eq!(outcome.total_pending(), dec!(0));
    }

    #[test]
    fn test_no_double_allocation_partial_spill() {
        // Lines [10, 5] oldest first, consumed 12: pending [0, 3].
        let lines = vec![make_line(date(1), dec!(10)), make_line(date(2), dec!(5))];

        let outcome = allocate(&lines, dec!(12)).unwrap();
        assert_eq!(pendings(&outcome), vec![dec!(0), dec!(3)]);
        assert_eq!(outcome.unabsorbed, dec!(0));
    }

    #[test]
    fn test_no_double_allocation_first_line_partial() {
        // Same lines, consumed 8: pending [2, 5].
        let lines = vec![make_line(date(1), dec!(10)), make_line(date(2), dec!(5))];

        let outcome = allocate(&lines, dec!(8)).unwrap();
        assert_eq!(pendings(&outcome), vec![dec!(2), dec!(5)]);
    }

    #[test]
    fn test_allocation_sorts_by_order_date() {
        // Input deliberately newest-first; allocation still favors the
        // older order.
        let newer = make_line(date(20), dec!(10));
        let older = make_line(date(1), dec!(10));
        let lines = vec![newer.clone(), older.clone()];

        let outcome = allocate(&lines, dec!(10)).unwrap();
        assert_eq!(outcome.allocations[0].line_id, older.line_id);
        assert_eq!(outcome.allocations[0].pending, dec!(0));
        assert_eq!(outcome.allocations[1].line_id, newer.line_id);
        assert_eq!(outcome.allocations[1].pending, dec!(10));
    }

    #[test]
    fn test_equal_dates_tie_break_by_creation_sequence() {
        // Two orders on the same date: the earlier-created line (smaller
        // UUID v7) absorbs receipts first.
        let first = make_line(date(5), dec!(10));
        let second = make_line(date(5), dec!(10));
        assert!(first.line_id < second.line_id);

        // Input order reversed to prove sorting is what decides.
        let outcome = allocate(&[second.clone(), first.clone()], dec!(10)).unwrap();
        assert_eq!(outcome.allocations[0].line_id, first.line_id);
        assert_eq!(outcome.allocations[0].allocated, dec!(10));
        assert_eq!(outcome.allocations[1].allocated, dec!(0));
    }

    #[test]
    fn test_cancelled_lines_are_skipped() {
        let mut cancelled = make_line(date(1), dec!(10));
        cancelled.order_status = OrderStatus::Cancelled;
        let live = make_line(date(2), dec!(5));

        let outcome = allocate(&[cancelled, live.clone()], dec!(4)).unwrap();
        assert_eq!(outcome.allocations.len(), 1);
        assert_eq!(outcome.allocations[0].line_id, live.line_id);
        assert_eq!(outcome.allocations[0].pending, dec!(1));
    }

    #[test]
    fn test_zero_quantity_line_rejected() {
        let lines = vec![make_line(date(1), dec!(0))];
        assert!(matches!(
            allocate(&lines, dec!(5)),
            Err(AllocationError::InvalidLineQuantity { .. })
        ));
    }

    #[test]
    fn test_negative_quantity_line_rejected() {
        let lines = vec![make_line(date(1), dec!(-3))];
        assert!(matches!(
            allocate(&lines, dec!(5)),
            Err(AllocationError::InvalidLineQuantity { .. })
        ));
    }

    #[test]
    fn test_cancelled_invalid_quantity_is_ignored() {
        // A cancelled order with bad data must not poison live allocation.
        let mut cancelled = make_line(date(1), dec!(0));
        cancelled.order_status = OrderStatus::Cancelled;
        let live = make_line(date(2), dec!(5));

        let outcome = allocate(&[cancelled, live], dec!(2)).unwrap();
        assert_eq!(pendings(&outcome), vec![dec!(3)]);
    }

    #[test]
    fn test_negative_consumed_clamps_to_zero() {
        let lines = vec![make_line(date(1), dec!(10))];
        let outcome = allocate(&lines, dec!(-4)).unwrap();
        assert_eq!(pendings(&outcome), vec![dec!(10)]);
        assert_eq!(outcome.unabsorbed, dec!(0));
    }

    #[test]
    fn test_over_receipt_leaves_unabsorbed_remainder() {
        let lines = vec![make_line(date(1), dec!(10))];
        let outcome = allocate(&lines, dec!(14)).unwrap();
        assert_eq!(pendings(&outcome), vec![dec!(0)]);
        assert_eq!(outcome.unabsorbed, dec!(4));
    }

    #[test]
    fn test_fractional_quantities_allocate_exactly() {
        let lines = vec![make_line(date(1), dec!(2.5)), make_line(date(2), dec!(1.25))];
        let outcome = allocate(&lines, dec!(3.1)).unwrap();
        assert_eq!(pendings(&outcome), vec![dec!(0), dec!(0.65)]);
    }

    #[test]
    fn test_pending_for_line_found() {
        let a = make_line(date(1), dec!(30));
        let b = make_line(date(2), dec!(20));
        let lines = vec![a.clone(), b.clone()];

        assert_eq!(pending_for_line(&lines, dec!(35), a.line_id).unwrap(), dec!(0));
        assert_eq!(pending_for_line(&lines, dec!(35), b.line_id).unwrap(), dec!(15));
    }

    #[test]
    fn test_pending_for_cancelled_line_is_zero() {
        let mut cancelled = make_line(date(1), dec!(10));
        cancelled.order_status = OrderStatus::Cancelled;
        let id = cancelled.line_id;

        assert_eq!(pending_for_line(&[cancelled], dec!(5), id).unwrap(), dec!(0));
    }

    #[test]
    fn test_pending_for_missing_line_errors() {
        let lines = vec![make_line(date(1), dec!(10))];
        assert!(matches!(
            pending_for_line(&lines, dec!(5), PurchaseOrderLineId::new()),
            Err(AllocationError::LineNotFound(_))
        ));
    }

    #[test]
    fn test_lines_for_request_filters_cancelled_and_other_requests() {
        use crate::procurement::OrderLine;

        let target = PurchaseRequestLineId::new();
        let other = PurchaseRequestLineId::new();

        let live_order = PurchaseOrder {
            id: PurchaseOrderId::new(),
            status: OrderStatus::Issued,
            order_date: date(1),
            lines: vec![
                OrderLine {
                    id: PurchaseOrderLineId::new(),
                    request_line_id: target,
                    quantity: dec!(10),
                },
                OrderLine {
                    id: PurchaseOrderLineId::new(),
                    request_line_id: other,
                    quantity: dec!(99),
                },
            ],
        };
        let cancelled_order = PurchaseOrder {
            id: PurchaseOrderId::new(),
            status: OrderStatus::Cancelled,
            order_date: date(2),
            lines: vec![OrderLine {
                id: PurchaseOrderLineId::new(),
                request_line_id: target,
                quantity: dec!(5),
            }],
        };

        let flattened = lines_for_request(&[live_order, cancelled_order], target);
        assert_eq!(flattened.len(), 1);
        assert_eq!(flattened[0].quantity, dec!(10));
    }
}
