//! Stock balance aggregation.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::item::ItemRef;
use crate::movement::{Direction, Movement};

/// Warehouse balance for one item: entries, exits, and what remains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockBalance {
    /// Item identity.
    pub item: ItemRef,
    /// Total quantity entered.
    pub received: Decimal,
    /// Total quantity issued out.
    pub issued: Decimal,
    /// On-hand balance (received - issued).
    pub on_hand: Decimal,
}

/// Aggregates the ledger into per-item stock balances.
///
/// Groups by exact item identity (legacy references group by their
/// normalized description through `ItemRef` equality of the stored value).
/// The result is sorted by descending on-hand quantity so report screens
/// show the heaviest stock first.
#[must_use]
pub fn stock_balances(movements: &[Movement]) -> Vec<StockBalance> {
    let mut by_item: HashMap<&ItemRef, (Decimal, Decimal)> = HashMap::new();

    for movement in movements {
        let entry = by_item.entry(&movement.item).or_default();
        match movement.direction {
            Direction::In => entry.0 += movement.quantity,
            Direction::Out => entry.1 += movement.quantity,
        }
    }

    let mut balances: Vec<StockBalance> = by_item
        .into_iter()
        .map(|(item, (received, issued))| StockBalance {
            item: item.clone(),
            received,
            issued,
            on_hand: received - issued,
        })
        .collect();

    balances.sort_by(|a, b| b.on_hand.cmp(&a.on_hand));
    balances
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use acopio_shared::types::{MaterialId, MovementId, RequisitionId, UserId};

    use crate::movement::MovementSource;

    fn make_movement(item: &ItemRef, direction: Direction, quantity: Decimal) -> Movement {
        Movement {
            id: MovementId::new(),
            direction,
            item: item.clone(),
            quantity,
            requisition_id: RequisitionId::new(),
            source: MovementSource::PurchaseOrder,
            destination: None,
            recorded_by: UserId::new(),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_ledger_empty_report() {
        assert!(stock_balances(&[]).is_empty());
    }

    #[test]
    fn test_balances_net_entries_and_exits() {
        let cement = ItemRef::Material {
            id: MaterialId::new(),
        };
        let rebar = ItemRef::Material {
            id: MaterialId::new(),
        };

        let movements = vec![
            make_movement(&cement, Direction::In, dec!(100)),
            make_movement(&cement, Direction::Out, dec!(30)),
            make_movement(&rebar, Direction::In, dec!(10)),
        ];

        let balances = stock_balances(&movements);
        assert_eq!(balances.len(), 2);

        // Sorted by on-hand descending: cement (70) before rebar (10).
        assert_eq!(balances[0].item, cement);
        assert_eq!(balances[0].received, dec!(100));
        assert_eq!(balances[0].issued, dec!(30));
        assert_eq!(balances[0].on_hand, dec!(70));
        assert_eq!(balances[1].on_hand, dec!(10));
    }

    #[test]
    fn test_over_issued_item_goes_negative() {
        // An exit without a matching entry is a data condition the report
        // must show, not hide.
        let item = ItemRef::Material {
            id: MaterialId::new(),
        };
        let movements = vec![make_movement(&item, Direction::Out, dec!(5))];

        let balances = stock_balances(&movements);
        assert_eq!(balances[0].on_hand, dec!(-5));
    }
}
