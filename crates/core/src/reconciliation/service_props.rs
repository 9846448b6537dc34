//! Property-based tests for requisition-level reconciliation.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use acopio_shared::types::{
    MaterialId, MovementId, PurchaseOrderId, PurchaseOrderLineId, PurchaseRequestId,
    PurchaseRequestLineId, RequisitionId, RequisitionLineId, Unit, UserId,
};

use super::service::ReconciliationService;
use crate::item::{ItemKind, ItemRef};
use crate::movement::{Direction, Movement, MovementSource};
use crate::procurement::{OrderLine, OrderStatus, PurchaseOrder, RequestLine, RequestLineStatus};
use crate::requisition::{LineStatus, RequisitionLine};

/// A generated single-request-line world: one requisition line, one SC
/// line, a handful of orders, and a receipt history.
#[derive(Debug, Clone)]
struct World {
    line: RequisitionLine,
    request_lines: Vec<RequestLine>,
    orders: Vec<PurchaseOrder>,
    movements: Vec<Movement>,
}

fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn world_strategy() -> impl Strategy<Value = World> {
    (
        quantity_strategy(),
        prop::collection::vec((quantity_strategy(), 0u32..40u32), 0..5),
        prop::collection::vec((quantity_strategy(), prop::bool::ANY), 0..5),
    )
        .prop_map(|(requested, order_specs, receipt_specs)| {
            let requisition_id = RequisitionId::new();
            let item = ItemRef::Material {
                id: MaterialId::new(),
            };

            let request_line = RequestLine {
                id: PurchaseRequestLineId::new(),
                request_id: PurchaseRequestId::new(),
                requisition_id,
                item: item.clone(),
                quantity: requested,
                status: RequestLineStatus::Open,
            };

            let orders: Vec<PurchaseOrder> = order_specs
                .into_iter()
                .map(|(quantity, day_offset)| PurchaseOrder {
                    id: PurchaseOrderId::new(),
                    status: OrderStatus::Issued,
                    order_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
                        + chrono::Days::new(u64::from(day_offset)),
                    lines: vec![OrderLine {
                        id: PurchaseOrderLineId::new(),
                        request_line_id: request_line.id,
                        quantity,
                    }],
                })
                .collect();

            let movements: Vec<Movement> = receipt_specs
                .into_iter()
                .map(|(quantity, petty_cash)| Movement {
                    id: MovementId::new(),
                    direction: Direction::In,
                    item: item.clone(),
                    quantity,
                    requisition_id,
                    source: if petty_cash {
                        MovementSource::PettyCash
                    } else {
                        MovementSource::PurchaseOrder
                    },
                    destination: None,
                    recorded_by: UserId::new(),
                    recorded_at: Utc::now(),
                })
                .collect();

            let fulfilled: Decimal = movements.iter().map(|m| m.quantity).sum();

            let line = RequisitionLine {
                id: RequisitionLineId::new(),
                requisition_id,
                kind: ItemKind::Material,
                item: Some(item),
                unit: Unit::Un,
                quantity_requested: requested,
                quantity_fulfilled: fulfilled,
                status: LineStatus::derive(fulfilled, requested),
            };

            World {
                line,
                request_lines: vec![request_line],
                orders,
                movements,
            }
        })
}

fn petty_cash_movement(world: &World, quantity: Decimal) -> Movement {
    Movement {
        id: MovementId::new(),
        direction: Direction::In,
        item: world.line.item.clone().unwrap(),
        quantity,
        requisition_id: world.line.requisition_id,
        source: MovementSource::PettyCash,
        destination: None,
        recorded_by: UserId::new(),
        recorded_at: Utc::now(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 150, max_global_rejects: 50_000, ..ProptestConfig::default() })]

    /// **Idempotence**: recomputing free-to-purchase over an unchanged
    /// snapshot yields the same value.
    #[test]
    fn prop_free_to_purchase_idempotent(world in world_strategy()) {
        let first = ReconciliationService::free_to_purchase(
            &world.line, &world.request_lines, &world.orders, &world.movements,
        ).unwrap();
        let second = ReconciliationService::free_to_purchase(
            &world.line, &world.request_lines, &world.orders, &world.movements,
        ).unwrap();

        prop_assert_eq!(first, second);
    }

    /// **Clamping**: free-to-purchase and pipeline pending never go
    /// negative, whatever the receipt history looks like.
    #[test]
    fn prop_balances_never_negative(world in world_strategy()) {
        let pipeline = ReconciliationService::pending_in_pipeline(
            &world.line, &world.request_lines, &world.orders, &world.movements,
        ).unwrap();
        let free = ReconciliationService::free_to_purchase(
            &world.line, &world.request_lines, &world.orders, &world.movements,
        ).unwrap();

        prop_assert!(pipeline >= Decimal::ZERO);
        prop_assert!(free >= Decimal::ZERO);
    }

    /// **Petty-cash isolation**: a petty-cash receipt never changes any
    /// order line's pending quantity.
    #[test]
    fn prop_petty_cash_never_touches_pipeline(
        world in world_strategy(),
        extra in quantity_strategy(),
    ) {
        let before: Vec<_> = world
            .orders
            .iter()
            .map(|order| {
                ReconciliationService::order_pending(
                    order, &world.orders, &world.request_lines, &world.movements,
                ).unwrap()
            })
            .collect();

        let mut movements = world.movements.clone();
        movements.push(petty_cash_movement(&world, extra));

        let after: Vec<_> = world
            .orders
            .iter()
            .map(|order| {
                ReconciliationService::order_pending(
                    order, &world.orders, &world.request_lines, &movements,
                ).unwrap()
            })
            .collect();

        for (b, a) in before.iter().zip(after.iter()) {
            for (lb, la) in b.iter().zip(a.iter()) {
                prop_assert_eq!(lb.pending, la.pending);
            }
        }
    }

    /// **Pipeline bound**: pending in the pipeline never exceeds the total
    /// ordered quantity.
    #[test]
    fn prop_pipeline_bounded_by_ordered(world in world_strategy()) {
        let ordered_total: Decimal = world
            .orders
            .iter()
            .filter(|o| o.status.counts_for_allocation())
            .flat_map(|o| o.lines.iter())
            .map(|l| l.quantity)
            .sum();

        let pipeline = ReconciliationService::pending_in_pipeline(
            &world.line, &world.request_lines, &world.orders, &world.movements,
        ).unwrap();

        prop_assert!(pipeline <= ordered_total);
    }

    /// **Receipt arithmetic**: a validated receipt adds exactly its
    /// quantity to the fulfilled total and derives the matching status.
    #[test]
    fn prop_receipt_outcome_consistent(world in world_strategy()) {
        let free = ReconciliationService::free_to_purchase(
            &world.line, &world.request_lines, &world.orders, &world.movements,
        ).unwrap();
        prop_assume!(free > Decimal::ZERO);

        let outcome = ReconciliationService::apply_receipt(
            &world.line,
            free,
            super::types::ReceiptSource::PettyCash,
            &world.request_lines,
            &world.orders,
            &world.movements,
        ).unwrap();

        prop_assert_eq!(
            outcome.new_fulfilled,
            world.line.quantity_fulfilled + free
        );
        prop_assert_eq!(
            outcome.new_status,
            LineStatus::derive(outcome.new_fulfilled, world.line.quantity_requested)
        );
    }
}
