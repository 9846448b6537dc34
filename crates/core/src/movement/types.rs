//! Warehouse movement data types and ledger sums.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use acopio_shared::types::{MovementId, RequisitionId, UserId};

use crate::item::ItemRef;

/// Direction of a warehouse movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Material entering the warehouse.
    In,
    /// Material leaving the warehouse.
    Out,
}

/// Origin of an inbound movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementSource {
    /// Delivery against a purchase order.
    PurchaseOrder,
    /// Out-of-process petty-cash purchase.
    PettyCash,
}

/// One immutable ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    /// Movement ID.
    pub id: MovementId,
    /// Entry or exit.
    pub direction: Direction,
    /// Item moved.
    pub item: ItemRef,
    /// Quantity moved (always positive).
    pub quantity: Decimal,
    /// Requisition this movement is registered against.
    pub requisition_id: RequisitionId,
    /// Origin of the material (inbound only; exits reuse `PurchaseOrder`).
    pub source: MovementSource,
    /// Destination or use noted by the warehouse clerk.
    pub destination: Option<String>,
    /// User who registered the movement.
    pub recorded_by: UserId,
    /// Registration timestamp.
    pub recorded_at: DateTime<Utc>,
}

/// Sum of inbound quantity consumed from the OC pipeline.
///
/// Petty-cash entries never consume pipeline quantity, so they are
/// excluded here; they only reduce the requisition line's raw outstanding
/// balance.
#[must_use]
pub fn consumed_for(movements: &[Movement], item: &ItemRef, requisition_id: RequisitionId) -> Decimal {
    movements
        .iter()
        .filter(|m| {
            m.direction == Direction::In
                && m.source != MovementSource::PettyCash
                && m.requisition_id == requisition_id
                && m.item.matches(item)
        })
        .map(|m| m.quantity)
        .sum()
}

/// Sum of all inbound quantity received for an item on a requisition,
/// regardless of source. This is the ledger-derived value of a line's
/// `quantity_fulfilled` cache.
#[must_use]
pub fn received_for(movements: &[Movement], item: &ItemRef, requisition_id: RequisitionId) -> Decimal {
    movements
        .iter()
        .filter(|m| {
            m.direction == Direction::In
                && m.requisition_id == requisition_id
                && m.item.matches(item)
        })
        .map(|m| m.quantity)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;
    use acopio_shared::types::MaterialId;
    use rust_decimal_macros::dec;

    fn material() -> ItemRef {
        ItemRef::Material {
            id: MaterialId::new(),
        }
    }

    fn make_movement(
        direction: Direction,
        item: &ItemRef,
        quantity: Decimal,
        requisition_id: RequisitionId,
        source: MovementSource,
    ) -> Movement {
        Movement {
            id: MovementId::new(),
            direction,
            item: item.clone(),
            quantity,
            requisition_id,
            source,
            destination: None,
            recorded_by: UserId::new(),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_consumed_excludes_petty_cash() {
        let item = material();
        let req = RequisitionId::new();
        let movements = vec![
            make_movement(Direction::In, &item, dec!(10), req, MovementSource::PurchaseOrder),
            make_movement(Direction::In, &item, dec!(5), req, MovementSource::PettyCash),
        ];

        assert_eq!(consumed_for(&movements, &item, req), dec!(10));
        assert_eq!(received_for(&movements, &item, req), dec!(15));
    }

    #[test]
    fn test_sums_ignore_exits() {
        let item = material();
        let req = RequisitionId::new();
        let movements = vec![
            make_movement(Direction::In, &item, dec!(10), req, MovementSource::PurchaseOrder),
            make_movement(Direction::Out, &item, dec!(4), req, MovementSource::PurchaseOrder),
        ];

        assert_eq!(consumed_for(&movements, &item, req), dec!(10));
        assert_eq!(received_for(&movements, &item, req), dec!(10));
    }

    #[test]
    fn test_sums_scoped_to_requisition_and_item() {
        let item = material();
        let other_item = material();
        let req = RequisitionId::new();
        let other_req = RequisitionId::new();
        let movements = vec![
            make_movement(Direction::In, &item, dec!(10), req, MovementSource::PurchaseOrder),
            make_movement(Direction::In, &item, dec!(7), other_req, MovementSource::PurchaseOrder),
            make_movement(Direction::In, &other_item, dec!(3), req, MovementSource::PurchaseOrder),
        ];

        assert_eq!(consumed_for(&movements, &item, req), dec!(10));
    }

    #[test]
    fn test_legacy_items_match_by_description() {
        let item = ItemRef::Legacy {
            description: "Clavos 3\"".to_string(),
            kind: ItemKind::Material,
        };
        let entry_item = ItemRef::Legacy {
            description: "  clavos  3\"".to_string(),
            kind: ItemKind::Material,
        };
        let req = RequisitionId::new();
        let movements = vec![make_movement(
            Direction::In,
            &entry_item,
            dec!(2),
            req,
            MovementSource::PurchaseOrder,
        )];

        assert_eq!(received_for(&movements, &item, req), dec!(2));
    }

    #[test]
    fn test_empty_ledger_sums_to_zero() {
        assert_eq!(
            consumed_for(&[], &material(), RequisitionId::new()),
            Decimal::ZERO
        );
    }
}
