//! Requisition repository.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::warn;
use uuid::Uuid;

use acopio_core::item::ItemRef;
use acopio_core::reconciliation::{FulfillmentRepair, ReconciliationService};
use acopio_core::requisition::RequisitionLine;
use acopio_shared::types::PageRequest;

use crate::entities::{budget_lines, requisition_lines, requisitions};
use crate::repositories::{
    item_columns, line_status_from_core, load_movements, requisition_line_to_core,
};

/// Error types for requisition operations.
#[derive(Debug, thiserror::Error)]
pub enum RequisitionError {
    /// Requisition not found.
    #[error("Requisition not found: {0}")]
    NotFound(Uuid),

    /// Requisition line not found.
    #[error("Requisition line not found: {0}")]
    LineNotFound(Uuid),

    /// A line quantity must be positive.
    #[error("Requisition line quantity must be positive")]
    InvalidQuantity,

    /// A requisition needs at least one line.
    #[error("Requisition must have at least one line")]
    NoLines,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a requisition line.
#[derive(Debug, Clone)]
pub struct CreateRequisitionLineInput {
    /// Item identity (catalog reference or legacy description).
    pub item: ItemRef,
    /// Unit of measure.
    pub unit: String,
    /// Requested quantity.
    pub quantity_requested: Decimal,
}

/// Input for creating a requisition with its lines.
#[derive(Debug, Clone)]
pub struct CreateRequisitionInput {
    /// Work-front/specialty consuming budget.
    pub front_specialty_id: Uuid,
    /// Optional block/sector.
    pub block: Option<String>,
    /// Requesting user.
    pub requested_by: Uuid,
    /// Requisition date.
    pub date: NaiveDate,
    /// Demand lines.
    pub lines: Vec<CreateRequisitionLineInput>,
}

/// Requisition repository.
#[derive(Debug, Clone)]
pub struct RequisitionRepository {
    db: DatabaseConnection,
}

impl RequisitionRepository {
    /// Creates a new requisition repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a requisition with its lines and accrues budget
    /// utilization for budgeted materials, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the input has no lines, a non-positive
    /// quantity, or the database operation fails.
    pub async fn create(
        &self,
        input: CreateRequisitionInput,
    ) -> Result<(requisitions::Model, Vec<requisition_lines::Model>), RequisitionError> {
        if input.lines.is_empty() {
            return Err(RequisitionError::NoLines);
        }
        for line in &input.lines {
            if line.quantity_requested <= Decimal::ZERO {
                return Err(RequisitionError::InvalidQuantity);
            }
        }

        let txn = self.db.begin().await?;
        let now = Utc::now();

        let header = requisitions::ActiveModel {
            id: Set(Uuid::now_v7()),
            front_specialty_id: Set(input.front_specialty_id),
            block: Set(input.block),
            requested_by: Set(input.requested_by),
            date: Set(input.date),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let header = header.insert(&txn).await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in input.lines {
            let columns = item_columns(&line.item);
            let model = requisition_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                requisition_id: Set(header.id),
                kind: Set(columns.kind),
                material_id: Set(columns.material_id),
                equipment_id: Set(columns.equipment_id),
                ppe_id: Set(columns.ppe_id),
                item_description: Set(columns.item_description),
                unit: Set(line.unit),
                quantity_requested: Set(line.quantity_requested),
                quantity_fulfilled: Set(Decimal::ZERO),
                status: Set(crate::entities::sea_orm_active_enums::LineStatus::Pending),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            };
            let model = model.insert(&txn).await?;

            // Budgeted materials accrue utilization as soon as the
            // demand is persisted.
            if let Some(material_id) = model.material_id {
                Self::accrue_utilization(
                    &txn,
                    input.front_specialty_id,
                    material_id,
                    model.quantity_requested,
                )
                .await?;
            }

            lines.push(model);
        }

        txn.commit().await?;
        Ok((header, lines))
    }

    async fn accrue_utilization<C: sea_orm::ConnectionTrait>(
        conn: &C,
        front_specialty_id: Uuid,
        material_id: Uuid,
        quantity: Decimal,
    ) -> Result<(), DbErr> {
        let budget = budget_lines::Entity::find()
            .filter(budget_lines::Column::FrontSpecialtyId.eq(front_specialty_id))
            .filter(budget_lines::Column::MaterialId.eq(material_id))
            .one(conn)
            .await?;

        if let Some(budget) = budget {
            let utilized = budget.quantity_utilized + quantity;
            let mut active: budget_lines::ActiveModel = budget.into();
            active.quantity_utilized = Set(utilized);
            active.updated_at = Set(Utc::now().into());
            active.update(conn).await?;
        }
        Ok(())
    }

    /// Gets a requisition header by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the requisition is not found or the query fails.
    pub async fn get(&self, id: Uuid) -> Result<requisitions::Model, RequisitionError> {
        requisitions::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RequisitionError::NotFound(id))
    }

    /// Lists requisitions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        page: &PageRequest,
    ) -> Result<(Vec<requisitions::Model>, u64), RequisitionError> {
        let total = requisitions::Entity::find().count(&self.db).await?;
        let models = requisitions::Entity::find()
            .order_by_desc(requisitions::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;
        Ok((models, total))
    }

    /// Loads a requisition's lines as domain values.
    ///
    /// # Errors
    ///
    /// Returns an error if the requisition is not found or the query fails.
    pub async fn lines(&self, requisition_id: Uuid) -> Result<Vec<RequisitionLine>, RequisitionError> {
        self.get(requisition_id).await?;
        let models = requisition_lines::Entity::find()
            .filter(requisition_lines::Column::RequisitionId.eq(requisition_id))
            .order_by_asc(requisition_lines::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.iter().map(requisition_line_to_core).collect())
    }

    /// Loads a single requisition line as a domain value.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not found or the query fails.
    pub async fn line(&self, line_id: Uuid) -> Result<RequisitionLine, RequisitionError> {
        let model = requisition_lines::Entity::find_by_id(line_id)
            .one(&self.db)
            .await?
            .ok_or(RequisitionError::LineNotFound(line_id))?;
        Ok(requisition_line_to_core(&model))
    }

    /// Rebuilds the fulfillment caches of a requisition's lines from the
    /// movement ledger and persists whatever changed.
    ///
    /// The ledger is the source of truth; this is the repair path for the
    /// denormalized `quantity_fulfilled` totals. Integrity findings are
    /// logged and returned, never fatal.
    ///
    /// # Errors
    ///
    /// Returns an error if the requisition is not found or a database
    /// operation fails.
    pub async fn repair(&self, requisition_id: Uuid) -> Result<Vec<FulfillmentRepair>, RequisitionError> {
        self.get(requisition_id).await?;

        let txn = self.db.begin().await?;

        let line_models = requisition_lines::Entity::find()
            .filter(requisition_lines::Column::RequisitionId.eq(requisition_id))
            .order_by_asc(requisition_lines::Column::CreatedAt)
            .all(&txn)
            .await?;
        let movements = load_movements(&txn, requisition_id, None).await?;

        let mut repairs = Vec::with_capacity(line_models.len());
        for model in line_models {
            let line = requisition_line_to_core(&model);
            let repair = ReconciliationService::rebuild_fulfillment(&line, &movements);

            for warning in &repair.warnings {
                warn!(line_id = %model.id, ?warning, "Fulfillment integrity warning");
            }

            if repair.changed {
                let mut active: requisition_lines::ActiveModel = model.into();
                active.quantity_fulfilled = Set(repair.quantity_fulfilled);
                active.status = Set(line_status_from_core(repair.status));
                active.updated_at = Set(Utc::now().into());
                active.update(&txn).await?;
            }

            repairs.push(repair);
        }

        txn.commit().await?;
        Ok(repairs)
    }
}
