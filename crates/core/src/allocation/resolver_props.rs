//! Property-based tests for the allocation walk.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use acopio_shared::types::{PurchaseOrderId, PurchaseOrderLineId};

use super::resolver::{AllocatableLine, allocate};
use crate::procurement::OrderStatus;

/// Strategy for ordered quantities (positive, 2 decimal places).
fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for consumed quantities (non-negative, 2 decimal places).
fn consumed_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..2_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for a set of allocatable lines with arbitrary dates.
fn lines_strategy(max_len: usize) -> impl Strategy<Value = Vec<AllocatableLine>> {
    prop::collection::vec((quantity_strategy(), 0u32..60u32), 1..=max_len).prop_map(|specs| {
        specs
            .into_iter()
            .map(|(quantity, day_offset)| AllocatableLine {
                line_id: PurchaseOrderLineId::new(),
                order_id: PurchaseOrderId::new(),
                order_status: OrderStatus::Issued,
                order_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
                    + chrono::Days::new(u64::from(day_offset)),
                quantity,
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// **Conservation**: allocated quantities plus the unabsorbed remainder
    /// always reconstruct the consumed input, and allocation never invents
    /// consumption.
    #[test]
    fn prop_conservation(
        lines in lines_strategy(8),
        consumed in consumed_strategy(),
    ) {
        let outcome = allocate(&lines, consumed).unwrap();

        let allocated_total: Decimal =
            outcome.allocations.iter().map(|a| a.allocated).sum();

        prop_assert_eq!(allocated_total + outcome.unabsorbed, consumed);
        prop_assert!(allocated_total <= consumed);
    }

    /// **Bounds**: every line's pending stays within [0, ordered], and
    /// allocated + pending always equals ordered.
    #[test]
    fn prop_pending_bounds(
        lines in lines_strategy(8),
        consumed in consumed_strategy(),
    ) {
        let outcome = allocate(&lines, consumed).unwrap();

        for alloc in &outcome.allocations {
            prop_assert!(alloc.pending >= Decimal::ZERO);
            prop_assert!(alloc.pending <= alloc.ordered);
            prop_assert_eq!(alloc.allocated + alloc.pending, alloc.ordered);
        }
    }

    /// **Monotonicity**: increasing consumed never increases any line's
    /// pending quantity.
    #[test]
    fn prop_pending_monotone_in_consumed(
        lines in lines_strategy(8),
        consumed in consumed_strategy(),
        extra in consumed_strategy(),
    ) {
        let before = allocate(&lines, consumed).unwrap();
        let after = allocate(&lines, consumed + extra).unwrap();

        for (b, a) in before.allocations.iter().zip(after.allocations.iter()) {
            prop_assert_eq!(b.line_id, a.line_id);
            prop_assert!(a.pending <= b.pending);
        }
    }

    /// **Input-order invariance**: allocation depends on order dates and
    /// creation sequence, never on the order the snapshot was fetched in.
    #[test]
    fn prop_input_order_irrelevant(
        lines in lines_strategy(8),
        consumed in consumed_strategy(),
    ) {
        let mut reversed = lines.clone();
        reversed.reverse();

        let forward = allocate(&lines, consumed).unwrap();
        let backward = allocate(&reversed, consumed).unwrap();

        prop_assert_eq!(forward.allocations, backward.allocations);
    }

    /// **Determinism**: the same snapshot always allocates identically.
    #[test]
    fn prop_deterministic(
        lines in lines_strategy(8),
        consumed in consumed_strategy(),
    ) {
        let first = allocate(&lines, consumed).unwrap();
        let second = allocate(&lines, consumed).unwrap();

        prop_assert_eq!(first.allocations, second.allocations);
        prop_assert_eq!(first.unabsorbed, second.unabsorbed);
    }

    /// **Full absorption**: when consumed covers the total ordered
    /// quantity, nothing stays pending.
    #[test]
    fn prop_full_consumption_clears_pending(
        lines in lines_strategy(8),
    ) {
        let total: Decimal = lines.iter().map(|l| l.quantity).sum();
        let outcome = allocate(&lines, total).unwrap();

        prop_assert_eq!(outcome.total_pending(), Decimal::ZERO);
        prop_assert_eq!(outcome.unabsorbed, Decimal::ZERO);
    }
}
