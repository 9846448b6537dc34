//! Reconciliation service over collection snapshots.
//!
//! All functions here are pure and synchronous: collaborators fetch the
//! relevant collections, hand them in, and persist whatever the service
//! says. Nothing is incrementally maintained; every call re-derives from
//! the full relevant history.

use std::collections::HashMap;

use rust_decimal::Decimal;

use acopio_shared::types::{PurchaseOrderId, PurchaseOrderLineId};

use super::error::ReconciliationError;
use super::types::{
    FulfillmentRepair, IntegrityWarning, LinePending, ReceiptOutcome, ReceiptSource,
};
use crate::allocation::{allocate, lines_for_request, pending_for_line};
use crate::movement::{Movement, consumed_for, received_for};
use crate::procurement::{PurchaseOrder, RequestLine};
use crate::requisition::{LineStatus, RequisitionLine};

/// Reconciliation service for requisition-level balances.
pub struct ReconciliationService;

impl ReconciliationService {
    /// Purchase-request lines sourcing a requisition line, matched by
    /// owning requisition and item identity.
    #[must_use]
    pub fn request_lines_for<'a>(
        line: &RequisitionLine,
        request_lines: &'a [RequestLine],
    ) -> Vec<&'a RequestLine> {
        let Some(item) = line.item.as_ref() else {
            return Vec::new();
        };
        request_lines
            .iter()
            .filter(|rl| rl.requisition_id == line.requisition_id && rl.item.matches(item))
            .collect()
    }

    /// Quantity committed to open purchase orders for this line: the sum of
    /// pending quantities across every non-cancelled order line linked to
    /// it through its purchase-request lines.
    ///
    /// # Errors
    ///
    /// Propagates allocation failures (invalid ordered quantities).
    pub fn pending_in_pipeline(
        line: &RequisitionLine,
        request_lines: &[RequestLine],
        orders: &[PurchaseOrder],
        movements: &[Movement],
    ) -> Result<Decimal, ReconciliationError> {
        let mut total = Decimal::ZERO;
        for rl in Self::request_lines_for(line, request_lines) {
            let allocatable = lines_for_request(orders, rl.id);
            if allocatable.is_empty() {
                continue;
            }
            let consumed = consumed_for(movements, &rl.item, rl.requisition_id);
            total += allocate(&allocatable, consumed)?.total_pending();
        }
        Ok(total)
    }

    /// Requisition-line quantity not yet received and not committed to an
    /// open order: `requested - fulfilled - pending_in_pipeline`, floored
    /// at zero.
    ///
    /// # Errors
    ///
    /// Propagates allocation failures.
    pub fn free_to_purchase(
        line: &RequisitionLine,
        request_lines: &[RequestLine],
        orders: &[PurchaseOrder],
        movements: &[Movement],
    ) -> Result<Decimal, ReconciliationError> {
        let pipeline = Self::pending_in_pipeline(line, request_lines, orders, movements)?;
        Ok((line.quantity_requested - line.quantity_fulfilled - pipeline).max(Decimal::ZERO))
    }

    /// A line may take petty-cash receipts only while it has free balance.
    ///
    /// # Errors
    ///
    /// Propagates allocation failures.
    pub fn petty_cash_eligible(
        line: &RequisitionLine,
        request_lines: &[RequestLine],
        orders: &[PurchaseOrder],
        movements: &[Movement],
    ) -> Result<bool, ReconciliationError> {
        Ok(Self::free_to_purchase(line, request_lines, orders, movements)? > Decimal::ZERO)
    }

    /// Pending quantity per order line across the whole snapshot.
    ///
    /// Order lines referencing request lines absent from the snapshot are
    /// left out; their pending is treated as zero.
    fn pending_by_order_line(
        orders: &[PurchaseOrder],
        request_lines: &[RequestLine],
        movements: &[Movement],
    ) -> Result<HashMap<PurchaseOrderLineId, Decimal>, ReconciliationError> {
        let mut pending = HashMap::new();
        for rl in request_lines {
            let allocatable = lines_for_request(orders, rl.id);
            if allocatable.is_empty() {
                continue;
            }
            let consumed = consumed_for(movements, &rl.item, rl.requisition_id);
            for allocation in allocate(&allocatable, consumed)?.allocations {
                pending.insert(allocation.line_id, allocation.pending);
            }
        }
        Ok(pending)
    }

    /// Orders still open to receive against: every non-cancelled order with
    /// at least one line whose pending quantity is positive. Fully
    /// receiving an order's last open line drops it from this set.
    ///
    /// # Errors
    ///
    /// Propagates allocation failures.
    pub fn active_orders(
        orders: &[PurchaseOrder],
        request_lines: &[RequestLine],
        movements: &[Movement],
    ) -> Result<Vec<PurchaseOrderId>, ReconciliationError> {
        let pending = Self::pending_by_order_line(orders, request_lines, movements)?;
        Ok(orders
            .iter()
            .filter(|order| order.status.counts_for_allocation())
            .filter(|order| {
                order.lines.iter().any(|line| {
                    pending
                        .get(&line.id)
                        .is_some_and(|p| *p > Decimal::ZERO)
                })
            })
            .map(|order| order.id)
            .collect())
    }

    /// Per-line pending view for one order.
    ///
    /// Lines of cancelled orders and orphan lines report zero pending.
    ///
    /// # Errors
    ///
    /// Propagates allocation failures.
    pub fn order_pending(
        order: &PurchaseOrder,
        orders: &[PurchaseOrder],
        request_lines: &[RequestLine],
        movements: &[Movement],
    ) -> Result<Vec<LinePending>, ReconciliationError> {
        let pending = Self::pending_by_order_line(orders, request_lines, movements)?;
        Ok(order
            .lines
            .iter()
            .map(|line| LinePending {
                line_id: line.id,
                request_line_id: line.request_line_id,
                ordered: line.quantity,
                pending: pending.get(&line.id).copied().unwrap_or(Decimal::ZERO),
            })
            .collect())
    }

    /// Order lines pointing at request lines the snapshot does not contain.
    #[must_use]
    pub fn orphan_order_lines(
        orders: &[PurchaseOrder],
        request_lines: &[RequestLine],
    ) -> Vec<IntegrityWarning> {
        orders
            .iter()
            .filter(|order| order.status.counts_for_allocation())
            .flat_map(|order| order.lines.iter())
            .filter(|line| !request_lines.iter().any(|rl| rl.id == line.request_line_id))
            .map(|line| IntegrityWarning::OrphanOrderLine {
                order_line_id: line.id,
                request_line_id: line.request_line_id,
            })
            .collect()
    }

    /// Validates a receipt and computes the fulfillment update to persist.
    ///
    /// The validation runs against the balance of the chosen path before
    /// anything is written: petty cash draws on the free-to-purchase
    /// balance, an order-line receipt draws on that line's pending
    /// quantity. The caller appends the movement and persists the returned
    /// totals in one transaction; no partial writes.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the quantity is non-positive,
    /// exceeds the available balance, or the chosen order line is not
    /// linked to this requisition line.
    pub fn apply_receipt(
        line: &RequisitionLine,
        quantity: Decimal,
        source: ReceiptSource,
        request_lines: &[RequestLine],
        orders: &[PurchaseOrder],
        movements: &[Movement],
    ) -> Result<ReceiptOutcome, ReconciliationError> {
        if quantity <= Decimal::ZERO {
            return Err(ReconciliationError::NonPositiveQuantity);
        }
        if !line.status.is_open() {
            return Err(ReconciliationError::LineCancelled(line.id));
        }

        let available = match source {
            ReceiptSource::PettyCash => {
                Self::free_to_purchase(line, request_lines, orders, movements)?
            }
            ReceiptSource::PurchaseOrder { order_line_id } => {
                Self::order_line_available(line, order_line_id, request_lines, orders, movements)?
            }
        };

        if quantity > available {
            return Err(ReconciliationError::ExceedsAvailable {
                requested: quantity,
                available,
            });
        }

        let new_fulfilled = line.quantity_fulfilled + quantity;
        let mut warnings = Vec::new();
        if new_fulfilled > line.quantity_requested {
            warnings.push(IntegrityWarning::OverFulfilled {
                line_id: line.id,
                requested: line.quantity_requested,
                fulfilled: new_fulfilled,
            });
        }

        Ok(ReceiptOutcome {
            line_id: line.id,
            new_fulfilled,
            new_status: LineStatus::derive(new_fulfilled, line.quantity_requested),
            warnings,
        })
    }

    /// Pending balance of one order line, after checking it is actually
    /// linked to the requisition line being received.
    fn order_line_available(
        line: &RequisitionLine,
        order_line_id: PurchaseOrderLineId,
        request_lines: &[RequestLine],
        orders: &[PurchaseOrder],
        movements: &[Movement],
    ) -> Result<Decimal, ReconciliationError> {
        let item = line
            .item
            .as_ref()
            .ok_or(ReconciliationError::MissingItem(line.id))?;

        let (order, order_line) = orders
            .iter()
            .find_map(|order| {
                order
                    .lines
                    .iter()
                    .find(|candidate| candidate.id == order_line_id)
                    .map(|line| (order, line))
            })
            .ok_or(ReconciliationError::Allocation(
                crate::allocation::AllocationError::LineNotFound(order_line_id),
            ))?;

        // A cancelled order has nothing open to receive.
        if !order.status.counts_for_allocation() {
            return Ok(Decimal::ZERO);
        }

        let request_line = request_lines
            .iter()
            .find(|rl| rl.id == order_line.request_line_id)
            .ok_or(ReconciliationError::UnlinkedOrderLine(order_line_id))?;

        if request_line.requisition_id != line.requisition_id || !request_line.item.matches(item) {
            return Err(ReconciliationError::UnlinkedOrderLine(order_line_id));
        }

        let allocatable = lines_for_request(orders, request_line.id);
        let consumed = consumed_for(movements, &request_line.item, request_line.requisition_id);
        Ok(pending_for_line(&allocatable, consumed, order_line_id)?)
    }

    /// Rebuilds a line's fulfillment cache from the movement ledger.
    ///
    /// The ledger is the source of truth; the stored running total is only
    /// a cache. Free-text lines without an item reference have no ledger
    /// identity, so their cache stands as-is.
    #[must_use]
    pub fn rebuild_fulfillment(line: &RequisitionLine, movements: &[Movement]) -> FulfillmentRepair {
        let Some(item) = line.item.as_ref() else {
            return FulfillmentRepair {
                line_id: line.id,
                quantity_fulfilled: line.quantity_fulfilled,
                status: line.status,
                changed: false,
                warnings: Vec::new(),
            };
        };

        let recomputed = received_for(movements, item, line.requisition_id);
        let status = if line.status == LineStatus::Cancelled {
            LineStatus::Cancelled
        } else {
            LineStatus::derive(recomputed, line.quantity_requested)
        };

        let mut warnings = Vec::new();
        if recomputed > line.quantity_requested {
            warnings.push(IntegrityWarning::OverFulfilled {
                line_id: line.id,
                requested: line.quantity_requested,
                fulfilled: recomputed,
            });
        }

        FulfillmentRepair {
            line_id: line.id,
            quantity_fulfilled: recomputed,
            status,
            changed: recomputed != line.quantity_fulfilled || status != line.status,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    use acopio_shared::types::{
        MaterialId, MovementId, PurchaseRequestId, PurchaseRequestLineId, RequisitionId,
        RequisitionLineId, Unit, UserId,
    };

    use crate::item::{ItemKind, ItemRef};
    use crate::movement::{Direction, MovementSource};
    use crate::procurement::{OrderLine, OrderStatus, RequestLineStatus};

    struct Scenario {
        line: RequisitionLine,
        request_lines: Vec<RequestLine>,
        orders: Vec<PurchaseOrder>,
        movements: Vec<Movement>,
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, day).unwrap()
    }

    fn make_order(status: OrderStatus, order_date: NaiveDate, lines: Vec<OrderLine>) -> PurchaseOrder {
        PurchaseOrder {
            id: PurchaseOrderId::new(),
            status,
            order_date,
            lines,
        }
    }

    fn make_movement(
        item: &ItemRef,
        quantity: Decimal,
        requisition_id: RequisitionId,
        source: MovementSource,
    ) -> Movement {
        Movement {
            id: MovementId::new(),
            direction: Direction::In,
            item: item.clone(),
            quantity,
            requisition_id,
            source,
            destination: None,
            recorded_by: UserId::new(),
            recorded_at: Utc::now(),
        }
    }

    /// Requisition line for 50 units, one SC line approving 50, OC-A for 30
    /// (older) and OC-B for 20.
    fn two_order_scenario() -> Scenario {
        let requisition_id = RequisitionId::new();
        let item = ItemRef::Material {
            id: MaterialId::new(),
        };

        let line = RequisitionLine {
            id: RequisitionLineId::new(),
            requisition_id,
            kind: ItemKind::Material,
            item: Some(item.clone()),
            unit: Unit::Bag,
            quantity_requested: dec!(50),
            quantity_fulfilled: dec!(0),
            status: LineStatus::Pending,
        };

        let request_line = RequestLine {
            id: PurchaseRequestLineId::new(),
            request_id: PurchaseRequestId::new(),
            requisition_id,
            item,
            quantity: dec!(50),
            status: RequestLineStatus::Open,
        };

        let order_a = make_order(
            OrderStatus::Issued,
            date(1),
            vec![OrderLine {
                id: PurchaseOrderLineId::new(),
                request_line_id: request_line.id,
                quantity: dec!(30),
            }],
        );
        let order_b = make_order(
            OrderStatus::Issued,
            date(10),
            vec![OrderLine {
                id: PurchaseOrderLineId::new(),
                request_line_id: request_line.id,
                quantity: dec!(20),
            }],
        );

        Scenario {
            line,
            request_lines: vec![request_line],
            orders: vec![order_a, order_b],
            movements: Vec::new(),
        }
    }

    #[test]
    fn test_end_to_end_partial_receipt() {
        let mut s = two_order_scenario();
        let item = s.line.item.clone().unwrap();

        // Warehouse receives 35 against the OC pipeline.
        s.movements.push(make_movement(
            &item,
            dec!(35),
            s.line.requisition_id,
            MovementSource::PurchaseOrder,
        ));

        let pending_a = ReconciliationService::order_pending(
            &s.orders[0],
            &s.orders,
            &s.request_lines,
            &s.movements,
        )
        .unwrap();
        let pending_b = ReconciliationService::order_pending(
            &s.orders[1],
            &s.orders,
            &s.request_lines,
            &s.movements,
        )
        .unwrap();

        // OC-A (30, older) fully consumed; OC-B keeps 20 - 5 = 15.
        assert_eq!(pending_a[0].pending, dec!(0));
        assert_eq!(pending_b[0].pending, dec!(15));

        // Fulfillment cache rebuild sees the 35 and reads Partial.
        let repair = ReconciliationService::rebuild_fulfillment(&s.line, &s.movements);
        assert_eq!(repair.quantity_fulfilled, dec!(35));
        assert_eq!(repair.status, LineStatus::Partial);
        assert!(repair.changed);

        // With the cache updated, free-to-purchase closes to zero.
        s.line.quantity_fulfilled = repair.quantity_fulfilled;
        s.line.status = repair.status;
        let free = ReconciliationService::free_to_purchase(
            &s.line,
            &s.request_lines,
            &s.orders,
            &s.movements,
        )
        .unwrap();
        assert_eq!(free, dec!(0));
    }

    #[test]
    fn test_free_to_purchase_before_any_order() {
        let s = two_order_scenario();
        // Orders commit the full 50, so nothing is free even with no receipts.
        let free = ReconciliationService::free_to_purchase(
            &s.line,
            &s.request_lines,
            &s.orders,
            &s.movements,
        )
        .unwrap();
        assert_eq!(free, dec!(0));

        // Without the pipeline, the whole requested quantity is free.
        let free = ReconciliationService::free_to_purchase(&s.line, &s.request_lines, &[], &[])
            .unwrap();
        assert_eq!(free, dec!(50));
    }

    #[test]
    fn test_petty_cash_consumes_free_balance_only() {
        let mut s = two_order_scenario();
        // Shrink the pipeline: cancel OC-B so 20 of the 50 stays free.
        s.orders[1].status = OrderStatus::Cancelled;

        let item = s.line.item.clone().unwrap();
        s.movements.push(make_movement(
            &item,
            dec!(8),
            s.line.requisition_id,
            MovementSource::PettyCash,
        ));
        s.line.quantity_fulfilled = dec!(8);
        s.line.status = LineStatus::Partial;

        // Petty cash reduced fulfilled and therefore free...
        let free = ReconciliationService::free_to_purchase(
            &s.line,
            &s.request_lines,
            &s.orders,
            &s.movements,
        )
        .unwrap();
        assert_eq!(free, dec!(50) - dec!(8) - dec!(30));

        // ...but OC-A's pending is untouched.
        let pending = ReconciliationService::order_pending(
            &s.orders[0],
            &s.orders,
            &s.request_lines,
            &s.movements,
        )
        .unwrap();
        assert_eq!(pending[0].pending, dec!(30));
    }

    #[test]
    fn test_active_orders_drop_out_on_full_receipt() {
        let mut s = two_order_scenario();
        let item = s.line.item.clone().unwrap();

        let active = ReconciliationService::active_orders(
            &s.orders,
            &s.request_lines,
            &s.movements,
        )
        .unwrap();
        assert_eq!(active.len(), 2);

        // Receive OC-A's 30 in full: only OC-B stays active.
        s.movements.push(make_movement(
            &item,
            dec!(30),
            s.line.requisition_id,
            MovementSource::PurchaseOrder,
        ));
        let active = ReconciliationService::active_orders(
            &s.orders,
            &s.request_lines,
            &s.movements,
        )
        .unwrap();
        assert_eq!(active, vec![s.orders[1].id]);

        // Receive the remaining 20: the active set empties.
        s.movements.push(make_movement(
            &item,
            dec!(20),
            s.line.requisition_id,
            MovementSource::PurchaseOrder,
        ));
        let active = ReconciliationService::active_orders(
            &s.orders,
            &s.request_lines,
            &s.movements,
        )
        .unwrap();
        assert!(active.is_empty());
    }

    #[test]
    fn test_apply_receipt_against_order_line() {
        let s = two_order_scenario();
        let target = s.orders[0].lines[0].id;

        let outcome = ReconciliationService::apply_receipt(
            &s.line,
            dec!(30),
            ReceiptSource::PurchaseOrder {
                order_line_id: target,
            },
            &s.request_lines,
            &s.orders,
            &s.movements,
        )
        .unwrap();

        assert_eq!(outcome.new_fulfilled, dec!(30));
        assert_eq!(outcome.new_status, LineStatus::Partial);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_apply_receipt_rejects_excess_on_order_path() {
        let s = two_order_scenario();
        let target = s.orders[0].lines[0].id;

        // OC-A only has 30 pending.
        let err = ReconciliationService::apply_receipt(
            &s.line,
            dec!(31),
            ReceiptSource::PurchaseOrder {
                order_line_id: target,
            },
            &s.request_lines,
            &s.orders,
            &s.movements,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ReconciliationError::ExceedsAvailable {
                available, ..
            } if available == dec!(30)
        ));
    }

    #[test]
    fn test_apply_receipt_rejects_petty_cash_without_free_balance() {
        let s = two_order_scenario();

        // Pipeline covers the whole request; free balance is zero.
        let err = ReconciliationService::apply_receipt(
            &s.line,
            dec!(1),
            ReceiptSource::PettyCash,
            &s.request_lines,
            &s.orders,
            &s.movements,
        )
        .unwrap_err();

        assert!(matches!(err, ReconciliationError::ExceedsAvailable { .. }));
    }

    #[test]
    fn test_apply_receipt_petty_cash_within_free_balance() {
        let mut s = two_order_scenario();
        s.orders[1].status = OrderStatus::Cancelled; // frees 20

        let outcome = ReconciliationService::apply_receipt(
            &s.line,
            dec!(20),
            ReceiptSource::PettyCash,
            &s.request_lines,
            &s.orders,
            &s.movements,
        )
        .unwrap();

        assert_eq!(outcome.new_fulfilled, dec!(20));
        assert_eq!(outcome.new_status, LineStatus::Partial);
    }

    #[test]
    fn test_apply_receipt_rejects_cancelled_order_line() {
        let mut s = two_order_scenario();
        s.orders[0].status = OrderStatus::Cancelled;
        let target = s.orders[0].lines[0].id;

        let err = ReconciliationService::apply_receipt(
            &s.line,
            dec!(1),
            ReceiptSource::PurchaseOrder {
                order_line_id: target,
            },
            &s.request_lines,
            &s.orders,
            &s.movements,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ReconciliationError::ExceedsAvailable { available, .. } if available == dec!(0)
        ));
    }

    #[test]
    fn test_apply_receipt_rejects_non_positive_quantity() {
        let s = two_order_scenario();
        for qty in [dec!(0), dec!(-5)] {
            let err = ReconciliationService::apply_receipt(
                &s.line,
                qty,
                ReceiptSource::PettyCash,
                &s.request_lines,
                &s.orders,
                &s.movements,
            )
            .unwrap_err();
            assert!(matches!(err, ReconciliationError::NonPositiveQuantity));
        }
    }

    #[test]
    fn test_apply_receipt_rejects_cancelled_line() {
        let mut s = two_order_scenario();
        s.line.status = LineStatus::Cancelled;

        let err = ReconciliationService::apply_receipt(
            &s.line,
            dec!(1),
            ReceiptSource::PettyCash,
            &s.request_lines,
            &s.orders,
            &s.movements,
        )
        .unwrap_err();
        assert!(matches!(err, ReconciliationError::LineCancelled(_)));
    }

    #[test]
    fn test_apply_receipt_rejects_unlinked_order_line() {
        let s = two_order_scenario();

        // An order line for a different requisition's request line.
        let foreign_request = RequestLine {
            id: PurchaseRequestLineId::new(),
            request_id: PurchaseRequestId::new(),
            requisition_id: RequisitionId::new(),
            item: ItemRef::Material {
                id: MaterialId::new(),
            },
            quantity: dec!(10),
            status: RequestLineStatus::Open,
        };
        let foreign_order = make_order(
            OrderStatus::Issued,
            date(3),
            vec![OrderLine {
                id: PurchaseOrderLineId::new(),
                request_line_id: foreign_request.id,
                quantity: dec!(10),
            }],
        );
        let foreign_line_id = foreign_order.lines[0].id;

        let mut request_lines = s.request_lines.clone();
        request_lines.push(foreign_request);
        let mut orders = s.orders.clone();
        orders.push(foreign_order);

        let err = ReconciliationService::apply_receipt(
            &s.line,
            dec!(1),
            ReceiptSource::PurchaseOrder {
                order_line_id: foreign_line_id,
            },
            &request_lines,
            &orders,
            &s.movements,
        )
        .unwrap_err();
        assert!(matches!(err, ReconciliationError::UnlinkedOrderLine(_)));
    }

    #[test]
    fn test_over_receipt_warns_but_proceeds() {
        let mut s = two_order_scenario();
        // Over-ordering is allowed: grow OC-B to 30 so the pipeline commits
        // 60 against a request of 50, with 45 already received.
        s.orders[1].lines[0].quantity = dec!(30);
        let item = s.line.item.clone().unwrap();
        s.movements.push(make_movement(
            &item,
            dec!(45),
            s.line.requisition_id,
            MovementSource::PurchaseOrder,
        ));
        s.line.quantity_fulfilled = dec!(45);
        s.line.status = LineStatus::Partial;

        // OC-B has 15 pending (30 + 15 of its 30 absorbed); receiving 10
        // of it pushes fulfilled past the requested 50.
        let outcome = ReconciliationService::apply_receipt(
            &s.line,
            dec!(10),
            ReceiptSource::PurchaseOrder {
                order_line_id: s.orders[1].lines[0].id,
            },
            &s.request_lines,
            &s.orders,
            &s.movements,
        )
        .unwrap();

        assert_eq!(outcome.new_fulfilled, dec!(55));
        assert_eq!(outcome.new_status, LineStatus::Fulfilled);
        assert_eq!(
            outcome.warnings,
            vec![IntegrityWarning::OverFulfilled {
                line_id: s.line.id,
                requested: dec!(50),
                fulfilled: dec!(55),
            }]
        );
    }

    #[test]
    fn test_rebuild_fulfillment_reports_over_receipt() {
        let mut s = two_order_scenario();
        let item = s.line.item.clone().unwrap();
        s.movements.push(make_movement(
            &item,
            dec!(60),
            s.line.requisition_id,
            MovementSource::PurchaseOrder,
        ));

        let repair = ReconciliationService::rebuild_fulfillment(&s.line, &s.movements);
        assert_eq!(repair.quantity_fulfilled, dec!(60));
        assert_eq!(repair.status, LineStatus::Fulfilled);
        assert_eq!(
            repair.warnings,
            vec![IntegrityWarning::OverFulfilled {
                line_id: s.line.id,
                requested: dec!(50),
                fulfilled: dec!(60),
            }]
        );
    }

    #[test]
    fn test_rebuild_fulfillment_keeps_cancelled_status() {
        let mut s = two_order_scenario();
        s.line.status = LineStatus::Cancelled;
        let item = s.line.item.clone().unwrap();
        s.movements.push(make_movement(
            &item,
            dec!(5),
            s.line.requisition_id,
            MovementSource::PurchaseOrder,
        ));

        let repair = ReconciliationService::rebuild_fulfillment(&s.line, &s.movements);
        assert_eq!(repair.quantity_fulfilled, dec!(5));
        assert_eq!(repair.status, LineStatus::Cancelled);
    }

    #[test]
    fn test_rebuild_fulfillment_without_item_keeps_cache() {
        let mut s = two_order_scenario();
        s.line.item = None;
        s.line.quantity_fulfilled = dec!(7);

        let repair = ReconciliationService::rebuild_fulfillment(&s.line, &s.movements);
        assert_eq!(repair.quantity_fulfilled, dec!(7));
        assert!(!repair.changed);
    }

    #[test]
    fn test_orphan_order_lines_reported() {
        let s = two_order_scenario();
        let dangling = PurchaseRequestLineId::new();
        let mut orders = s.orders.clone();
        orders.push(make_order(
            OrderStatus::Issued,
            date(20),
            vec![OrderLine {
                id: PurchaseOrderLineId::new(),
                request_line_id: dangling,
                quantity: dec!(5),
            }],
        ));

        let warnings = ReconciliationService::orphan_order_lines(&orders, &s.request_lines);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            IntegrityWarning::OrphanOrderLine { request_line_id, .. }
                if request_line_id == dangling
        ));
    }

    #[test]
    fn test_petty_cash_eligibility_follows_free_balance() {
        let mut s = two_order_scenario();

        // Pipeline covers the full request: not eligible.
        let eligible = ReconciliationService::petty_cash_eligible(
            &s.line,
            &s.request_lines,
            &s.orders,
            &s.movements,
        )
        .unwrap();
        assert!(!eligible);

        // Cancelling an order frees balance: eligible again.
        s.orders[1].status = OrderStatus::Cancelled;
        let eligible = ReconciliationService::petty_cash_eligible(
            &s.line,
            &s.request_lines,
            &s.orders,
            &s.movements,
        )
        .unwrap();
        assert!(eligible);
    }

    #[test]
    fn test_request_line_with_no_orders_has_zero_pipeline() {
        let s = two_order_scenario();
        let pipeline = ReconciliationService::pending_in_pipeline(
            &s.line,
            &s.request_lines,
            &[],
            &s.movements,
        )
        .unwrap();
        assert_eq!(pipeline, dec!(0));
    }
}
