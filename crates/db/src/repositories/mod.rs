//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations, hiding
//! the `SeaORM` implementation details from the rest of the application.
//! Snapshot loaders here assemble the pure domain collections the core
//! functions compute over.

pub mod budget;
pub mod material;
pub mod movement;
pub mod purchase;
pub mod requisition;

pub use budget::{BudgetError, BudgetRepository, UpsertBudgetLineInput};
pub use material::{CreateMaterialInput, MaterialError, MaterialRepository};
pub use movement::{MovementError, MovementRepository, RecordIssueInput, RecordReceiptInput};
pub use purchase::{
    CreateOrderInput, CreateOrderLineInput, CreatePurchaseRequestInput, CreateRequestLineInput,
    PurchaseError, PurchaseRepository,
};
pub use requisition::{
    CreateRequisitionInput, CreateRequisitionLineInput, RequisitionError, RequisitionRepository,
};

use std::str::FromStr;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use acopio_core::item::{ItemKind, ItemRef};
use acopio_core::movement::{Direction, Movement, MovementSource};
use acopio_core::procurement::{
    OrderLine, OrderStatus, PurchaseOrder, RequestLine, RequestLineStatus,
};
use acopio_core::requisition::{LineStatus, RequisitionLine};
use acopio_shared::types::{
    EquipmentId, MaterialId, MovementId, PpeId, PurchaseOrderId, PurchaseOrderLineId,
    PurchaseRequestId, PurchaseRequestLineId, RequisitionId, RequisitionLineId, Unit, UserId,
};

use crate::entities::{
    purchase_order_lines, purchase_orders, purchase_request_lines, requisition_lines,
    sea_orm_active_enums, warehouse_movements,
};

// ============================================================================
// Enum mappings between active enums and core types
// ============================================================================

pub(crate) fn item_kind_to_core(kind: sea_orm_active_enums::ItemKind) -> ItemKind {
    match kind {
        sea_orm_active_enums::ItemKind::Material => ItemKind::Material,
        sea_orm_active_enums::ItemKind::Service => ItemKind::Service,
        sea_orm_active_enums::ItemKind::Equipment => ItemKind::Equipment,
        sea_orm_active_enums::ItemKind::Ppe => ItemKind::Ppe,
    }
}

pub(crate) fn item_kind_from_core(kind: ItemKind) -> sea_orm_active_enums::ItemKind {
    match kind {
        ItemKind::Material => sea_orm_active_enums::ItemKind::Material,
        ItemKind::Service => sea_orm_active_enums::ItemKind::Service,
        ItemKind::Equipment => sea_orm_active_enums::ItemKind::Equipment,
        ItemKind::Ppe => sea_orm_active_enums::ItemKind::Ppe,
    }
}

pub(crate) fn line_status_to_core(status: sea_orm_active_enums::LineStatus) -> LineStatus {
    match status {
        sea_orm_active_enums::LineStatus::Pending => LineStatus::Pending,
        sea_orm_active_enums::LineStatus::Partial => LineStatus::Partial,
        sea_orm_active_enums::LineStatus::Fulfilled => LineStatus::Fulfilled,
        sea_orm_active_enums::LineStatus::Cancelled => LineStatus::Cancelled,
    }
}

pub(crate) fn line_status_from_core(status: LineStatus) -> sea_orm_active_enums::LineStatus {
    match status {
        LineStatus::Pending => sea_orm_active_enums::LineStatus::Pending,
        LineStatus::Partial => sea_orm_active_enums::LineStatus::Partial,
        LineStatus::Fulfilled => sea_orm_active_enums::LineStatus::Fulfilled,
        LineStatus::Cancelled => sea_orm_active_enums::LineStatus::Cancelled,
    }
}

pub(crate) fn order_status_to_core(status: sea_orm_active_enums::OrderStatus) -> OrderStatus {
    match status {
        sea_orm_active_enums::OrderStatus::Issued => OrderStatus::Issued,
        sea_orm_active_enums::OrderStatus::Cancelled => OrderStatus::Cancelled,
        sea_orm_active_enums::OrderStatus::Received => OrderStatus::Received,
    }
}

// ============================================================================
// Item reference mapping
// ============================================================================

/// Item identity columns shared by requisition lines, request lines, and
/// warehouse movements.
pub(crate) struct ItemColumns {
    pub kind: sea_orm_active_enums::ItemKind,
    pub material_id: Option<Uuid>,
    pub equipment_id: Option<Uuid>,
    pub ppe_id: Option<Uuid>,
    pub item_description: Option<String>,
}

pub(crate) fn item_columns(item: &ItemRef) -> ItemColumns {
    let kind = item_kind_from_core(item.kind());
    match item {
        ItemRef::Material { id } => ItemColumns {
            kind,
            material_id: Some(id.into_inner()),
            equipment_id: None,
            ppe_id: None,
            item_description: None,
        },
        ItemRef::Equipment { id } => ItemColumns {
            kind,
            material_id: None,
            equipment_id: Some(id.into_inner()),
            ppe_id: None,
            item_description: None,
        },
        ItemRef::Ppe { id } => ItemColumns {
            kind,
            material_id: None,
            equipment_id: None,
            ppe_id: Some(id.into_inner()),
            item_description: None,
        },
        ItemRef::Legacy { description, .. } => ItemColumns {
            kind,
            material_id: None,
            equipment_id: None,
            ppe_id: None,
            item_description: Some(description.clone()),
        },
    }
}

pub(crate) fn item_ref_from_columns(
    kind: sea_orm_active_enums::ItemKind,
    material_id: Option<Uuid>,
    equipment_id: Option<Uuid>,
    ppe_id: Option<Uuid>,
    item_description: Option<&str>,
) -> Option<ItemRef> {
    if let Some(id) = material_id {
        return Some(ItemRef::Material {
            id: MaterialId::from_uuid(id),
        });
    }
    if let Some(id) = equipment_id {
        return Some(ItemRef::Equipment {
            id: EquipmentId::from_uuid(id),
        });
    }
    if let Some(id) = ppe_id {
        return Some(ItemRef::Ppe {
            id: PpeId::from_uuid(id),
        });
    }
    item_description.map(|description| ItemRef::Legacy {
        description: description.to_string(),
        kind: item_kind_to_core(kind),
    })
}

// ============================================================================
// Snapshot loaders
// ============================================================================

pub(crate) fn requisition_line_to_core(model: &requisition_lines::Model) -> RequisitionLine {
    RequisitionLine {
        id: RequisitionLineId::from_uuid(model.id),
        requisition_id: RequisitionId::from_uuid(model.requisition_id),
        kind: item_kind_to_core(model.kind),
        item: item_ref_from_columns(
            model.kind,
            model.material_id,
            model.equipment_id,
            model.ppe_id,
            model.item_description.as_deref(),
        ),
        // Units were free text in legacy exports; unknown strings read as
        // pieces rather than failing the whole snapshot.
        unit: Unit::from_str(&model.unit).unwrap_or(Unit::Un),
        quantity_requested: model.quantity_requested,
        quantity_fulfilled: model.quantity_fulfilled,
        status: line_status_to_core(model.status),
    }
}

fn request_line_to_core(model: &purchase_request_lines::Model) -> Option<RequestLine> {
    let item = item_ref_from_columns(
        model.kind,
        model.material_id,
        model.equipment_id,
        model.ppe_id,
        model.item_description.as_deref(),
    )?;
    Some(RequestLine {
        id: PurchaseRequestLineId::from_uuid(model.id),
        request_id: PurchaseRequestId::from_uuid(model.purchase_request_id),
        requisition_id: RequisitionId::from_uuid(model.requisition_id),
        item,
        quantity: model.quantity,
        status: match model.status {
            sea_orm_active_enums::RequestLineStatus::Open => RequestLineStatus::Open,
            sea_orm_active_enums::RequestLineStatus::Closed => RequestLineStatus::Closed,
        },
    })
}

pub(crate) fn movement_to_core(model: &warehouse_movements::Model) -> Option<Movement> {
    let item = item_ref_from_columns(
        model.kind,
        model.material_id,
        model.equipment_id,
        model.ppe_id,
        model.item_description.as_deref(),
    )?;
    Some(Movement {
        id: MovementId::from_uuid(model.id),
        direction: match model.direction {
            sea_orm_active_enums::MovementDirection::In => Direction::In,
            sea_orm_active_enums::MovementDirection::Out => Direction::Out,
        },
        item,
        quantity: model.quantity,
        requisition_id: RequisitionId::from_uuid(model.requisition_id),
        source: match model.source {
            sea_orm_active_enums::MovementSource::PurchaseOrder => MovementSource::PurchaseOrder,
            sea_orm_active_enums::MovementSource::PettyCash => MovementSource::PettyCash,
        },
        destination: model.destination.clone(),
        recorded_by: UserId::from_uuid(model.recorded_by),
        recorded_at: model.recorded_at.into(),
    })
}

/// Loads the purchase-request lines sourcing a requisition.
pub(crate) async fn load_request_lines<C: ConnectionTrait>(
    conn: &C,
    requisition_id: Uuid,
) -> Result<Vec<RequestLine>, DbErr> {
    let models = purchase_request_lines::Entity::find()
        .filter(purchase_request_lines::Column::RequisitionId.eq(requisition_id))
        .order_by_asc(purchase_request_lines::Column::CreatedAt)
        .all(conn)
        .await?;

    Ok(models.iter().filter_map(request_line_to_core).collect())
}

/// Loads the purchase orders whose lines reference the given request lines,
/// with only those lines attached.
pub(crate) async fn load_orders_for_request_lines<C: ConnectionTrait>(
    conn: &C,
    request_line_ids: &[Uuid],
) -> Result<Vec<PurchaseOrder>, DbErr> {
    if request_line_ids.is_empty() {
        return Ok(Vec::new());
    }

    let line_models = purchase_order_lines::Entity::find()
        .filter(
            purchase_order_lines::Column::PurchaseRequestLineId.is_in(request_line_ids.to_vec()),
        )
        .all(conn)
        .await?;

    let order_ids: Vec<Uuid> = {
        let mut ids: Vec<Uuid> = line_models.iter().map(|l| l.purchase_order_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }

    let order_models = purchase_orders::Entity::find()
        .filter(purchase_orders::Column::Id.is_in(order_ids))
        .order_by_asc(purchase_orders::Column::OrderDate)
        .all(conn)
        .await?;

    Ok(order_models
        .into_iter()
        .map(|order| {
            let lines = line_models
                .iter()
                .filter(|line| line.purchase_order_id == order.id)
                .map(|line| OrderLine {
                    id: PurchaseOrderLineId::from_uuid(line.id),
                    request_line_id: PurchaseRequestLineId::from_uuid(
                        line.purchase_request_line_id,
                    ),
                    quantity: line.quantity,
                })
                .collect();
            PurchaseOrder {
                id: PurchaseOrderId::from_uuid(order.id),
                status: order_status_to_core(order.status),
                order_date: order.order_date,
                lines,
            }
        })
        .collect())
}

/// Loads the movement ledger for a requisition, oldest first.
pub(crate) async fn load_movements<C: ConnectionTrait>(
    conn: &C,
    requisition_id: Uuid,
    direction: Option<Direction>,
) -> Result<Vec<Movement>, DbErr> {
    let mut query = warehouse_movements::Entity::find()
        .filter(warehouse_movements::Column::RequisitionId.eq(requisition_id));

    if let Some(direction) = direction {
        let db_direction = match direction {
            Direction::In => sea_orm_active_enums::MovementDirection::In,
            Direction::Out => sea_orm_active_enums::MovementDirection::Out,
        };
        query = query.filter(warehouse_movements::Column::Direction.eq(db_direction));
    }

    let models = query
        .order_by_asc(warehouse_movements::Column::RecordedAt)
        .all(conn)
        .await?;

    Ok(models.iter().filter_map(movement_to_core).collect())
}
