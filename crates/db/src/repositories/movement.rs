//! Warehouse movement repository: the ledger read paths and the receipt
//! write path.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::warn;
use uuid::Uuid;

use acopio_core::movement::{Direction, Movement};
use acopio_core::reconciliation::{
    ReceiptOutcome, ReceiptSource, ReconciliationError, ReconciliationService,
};
use acopio_shared::types::PageRequest;

use crate::entities::{requisition_lines, sea_orm_active_enums, warehouse_movements};
use crate::repositories::{
    item_columns, line_status_from_core, load_movements, load_orders_for_request_lines,
    load_request_lines, requisition_line_to_core,
};

/// Error types for warehouse movement operations.
#[derive(Debug, thiserror::Error)]
pub enum MovementError {
    /// Requisition line not found.
    #[error("Requisition line not found: {0}")]
    LineNotFound(Uuid),

    /// The requisition line has no item identity to register against.
    #[error("Requisition line {0} has no item reference")]
    MissingItem(Uuid),

    /// Receipt validation failed.
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    /// An exit quantity must be positive.
    #[error("Movement quantity must be positive")]
    InvalidQuantity,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for registering a warehouse receipt (entry).
#[derive(Debug, Clone)]
pub struct RecordReceiptInput {
    /// Requisition line the receipt fulfills.
    pub requisition_line_id: Uuid,
    /// Received quantity.
    pub quantity: Decimal,
    /// Allocation path: a purchase-order line, or petty cash.
    pub source: ReceiptSource,
    /// Destination or use noted by the clerk.
    pub destination: Option<String>,
    /// Registering user.
    pub recorded_by: Uuid,
}

/// Input for registering a warehouse issue (exit).
#[derive(Debug, Clone)]
pub struct RecordIssueInput {
    /// Requisition line the material was drawn for.
    pub requisition_line_id: Uuid,
    /// Issued quantity.
    pub quantity: Decimal,
    /// Destination or use.
    pub destination: Option<String>,
    /// Registering user.
    pub recorded_by: Uuid,
}

/// Warehouse movement repository.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    db: DatabaseConnection,
}

impl MovementRepository {
    /// Creates a new movement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads a requisition's movements as domain values, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn movements_for_requisition(
        &self,
        requisition_id: Uuid,
        direction: Option<Direction>,
    ) -> Result<Vec<Movement>, MovementError> {
        Ok(load_movements(&self.db, requisition_id, direction).await?)
    }

    /// Loads the whole movement ledger as domain values, for the global
    /// stock report.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn all_movements(&self) -> Result<Vec<Movement>, MovementError> {
        let models = warehouse_movements::Entity::find()
            .order_by_asc(warehouse_movements::Column::RecordedAt)
            .all(&self.db)
            .await?;
        Ok(models
            .iter()
            .filter_map(crate::repositories::movement_to_core)
            .collect())
    }

    /// Lists movement rows for the ledger screen, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        requisition_id: Option<Uuid>,
        direction: Option<Direction>,
        page: &PageRequest,
    ) -> Result<(Vec<warehouse_movements::Model>, u64), MovementError> {
        let mut query = warehouse_movements::Entity::find();

        if let Some(requisition_id) = requisition_id {
            query = query.filter(warehouse_movements::Column::RequisitionId.eq(requisition_id));
        }
        if let Some(direction) = direction {
            let db_direction = match direction {
                Direction::In => sea_orm_active_enums::MovementDirection::In,
                Direction::Out => sea_orm_active_enums::MovementDirection::Out,
            };
            query = query.filter(warehouse_movements::Column::Direction.eq(db_direction));
        }

        let total = query.clone().count(&self.db).await?;
        let models = query
            .order_by_desc(warehouse_movements::Column::RecordedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;
        Ok((models, total))
    }

    /// Registers a warehouse receipt against a requisition line.
    ///
    /// Validation runs against the chosen path's balance before anything
    /// is written; the movement append and the fulfillment cache update
    /// then commit together, so a failed validation leaves no partial
    /// state behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the line does not exist, the receipt fails
    /// validation, or a database operation fails.
    pub async fn record_receipt(
        &self,
        input: RecordReceiptInput,
    ) -> Result<ReceiptOutcome, MovementError> {
        let txn = self.db.begin().await?;

        let line_model = requisition_lines::Entity::find_by_id(input.requisition_line_id)
            .one(&txn)
            .await?
            .ok_or(MovementError::LineNotFound(input.requisition_line_id))?;
        let line = requisition_line_to_core(&line_model);

        let request_lines = load_request_lines(&txn, line_model.requisition_id).await?;
        let request_line_ids: Vec<Uuid> =
            request_lines.iter().map(|rl| rl.id.into_inner()).collect();
        let orders = load_orders_for_request_lines(&txn, &request_line_ids).await?;
        let movements = load_movements(&txn, line_model.requisition_id, None).await?;

        let outcome = ReconciliationService::apply_receipt(
            &line,
            input.quantity,
            input.source,
            &request_lines,
            &orders,
            &movements,
        )
        .map_err(MovementError::Reconciliation)?;

        for warning in &outcome.warnings {
            warn!(line_id = %line_model.id, ?warning, "Receipt integrity warning");
        }

        let item = line
            .item
            .clone()
            .ok_or(MovementError::MissingItem(line_model.id))?;
        let columns = item_columns(&item);

        let source = match input.source {
            ReceiptSource::PurchaseOrder { .. } => sea_orm_active_enums::MovementSource::PurchaseOrder,
            ReceiptSource::PettyCash => sea_orm_active_enums::MovementSource::PettyCash,
        };

        let movement = warehouse_movements::ActiveModel {
            id: Set(Uuid::now_v7()),
            direction: Set(sea_orm_active_enums::MovementDirection::In),
            kind: Set(columns.kind),
            material_id: Set(columns.material_id),
            equipment_id: Set(columns.equipment_id),
            ppe_id: Set(columns.ppe_id),
            item_description: Set(columns.item_description),
            quantity: Set(input.quantity),
            requisition_id: Set(line_model.requisition_id),
            source: Set(source),
            destination: Set(input.destination),
            recorded_by: Set(input.recorded_by),
            recorded_at: Set(Utc::now().into()),
        };
        movement.insert(&txn).await?;

        let mut active: requisition_lines::ActiveModel = line_model.into();
        active.quantity_fulfilled = Set(outcome.new_fulfilled);
        active.status = Set(line_status_from_core(outcome.new_status));
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(outcome)
    }

    /// Registers a warehouse issue (exit) against a requisition line.
    ///
    /// Exits do not touch the fulfillment cache; they only extend the
    /// ledger and reduce the stock report's on-hand balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the line does not exist, the quantity is
    /// non-positive, or the insert fails.
    pub async fn record_issue(
        &self,
        input: RecordIssueInput,
    ) -> Result<warehouse_movements::Model, MovementError> {
        if input.quantity <= Decimal::ZERO {
            return Err(MovementError::InvalidQuantity);
        }

        let line_model = requisition_lines::Entity::find_by_id(input.requisition_line_id)
            .one(&self.db)
            .await?
            .ok_or(MovementError::LineNotFound(input.requisition_line_id))?;
        let line = requisition_line_to_core(&line_model);
        let item = line
            .item
            .ok_or(MovementError::MissingItem(line_model.id))?;
        let columns = item_columns(&item);

        let movement = warehouse_movements::ActiveModel {
            id: Set(Uuid::now_v7()),
            direction: Set(sea_orm_active_enums::MovementDirection::Out),
            kind: Set(columns.kind),
            material_id: Set(columns.material_id),
            equipment_id: Set(columns.equipment_id),
            ppe_id: Set(columns.ppe_id),
            item_description: Set(columns.item_description),
            quantity: Set(input.quantity),
            requisition_id: Set(line_model.requisition_id),
            source: Set(sea_orm_active_enums::MovementSource::PurchaseOrder),
            destination: Set(input.destination),
            recorded_by: Set(input.recorded_by),
            recorded_at: Set(Utc::now().into()),
        };
        Ok(movement.insert(&self.db).await?)
    }
}
