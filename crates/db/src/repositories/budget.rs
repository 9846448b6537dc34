//! Budget repository.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use acopio_core::budget::{BudgetCheck, BudgetLine, BudgetService};
use acopio_shared::types::{BudgetLineId, FrontSpecialtyId, MaterialId};

use crate::entities::{budget_lines, materials};

/// Error types for budget operations.
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    /// Budget line not found.
    #[error("Budget line not found: {0}")]
    NotFound(Uuid),

    /// Material not found in the catalog.
    #[error("Material not found: {0}")]
    MaterialNotFound(Uuid),

    /// Budget check rejected the input.
    #[error(transparent)]
    Check(#[from] acopio_core::budget::BudgetError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating or replacing a budget line.
#[derive(Debug, Clone)]
pub struct UpsertBudgetLineInput {
    /// Work-front/specialty the budget belongs to.
    pub front_specialty_id: Uuid,
    /// Budgeted material.
    pub material_id: Uuid,
    /// Budgeted quantity.
    pub quantity_budgeted: Decimal,
}

/// Budget repository.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates or updates the budget line for a (front/specialty,
    /// material) pairing. Utilization is preserved on update.
    ///
    /// # Errors
    ///
    /// Returns an error if the material does not exist or the database
    /// operation fails.
    pub async fn upsert_line(
        &self,
        input: UpsertBudgetLineInput,
    ) -> Result<budget_lines::Model, BudgetError> {
        materials::Entity::find_by_id(input.material_id)
            .one(&self.db)
            .await?
            .ok_or(BudgetError::MaterialNotFound(input.material_id))?;

        let existing = budget_lines::Entity::find()
            .filter(budget_lines::Column::FrontSpecialtyId.eq(input.front_specialty_id))
            .filter(budget_lines::Column::MaterialId.eq(input.material_id))
            .one(&self.db)
            .await?;

        let now = Utc::now().into();
        if let Some(existing) = existing {
            let mut active: budget_lines::ActiveModel = existing.into();
            active.quantity_budgeted = Set(input.quantity_budgeted);
            active.updated_at = Set(now);
            Ok(active.update(&self.db).await?)
        } else {
            let line = budget_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                front_specialty_id: Set(input.front_specialty_id),
                material_id: Set(input.material_id),
                quantity_budgeted: Set(input.quantity_budgeted),
                quantity_utilized: Set(Decimal::ZERO),
                created_at: Set(now),
                updated_at: Set(now),
            };
            Ok(line.insert(&self.db).await?)
        }
    }

    /// Lists the budget lines of a front/specialty.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_front(
        &self,
        front_specialty_id: Uuid,
    ) -> Result<Vec<budget_lines::Model>, BudgetError> {
        Ok(budget_lines::Entity::find()
            .filter(budget_lines::Column::FrontSpecialtyId.eq(front_specialty_id))
            .order_by_asc(budget_lines::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Loads the budget line for a (front/specialty, material) pairing as
    /// a domain value.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn line_for(
        &self,
        front_specialty_id: Uuid,
        material_id: Uuid,
    ) -> Result<Option<BudgetLine>, BudgetError> {
        let model = budget_lines::Entity::find()
            .filter(budget_lines::Column::FrontSpecialtyId.eq(front_specialty_id))
            .filter(budget_lines::Column::MaterialId.eq(material_id))
            .one(&self.db)
            .await?;

        Ok(model.map(|model| BudgetLine {
            id: BudgetLineId::from_uuid(model.id),
            front_specialty_id: FrontSpecialtyId::from_uuid(model.front_specialty_id),
            material_id: MaterialId::from_uuid(model.material_id),
            quantity_budgeted: model.quantity_budgeted,
            quantity_utilized: model.quantity_utilized,
        }))
    }

    /// Runs the read-only budget gate for a prospective requisition line.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantities are invalid or the query fails.
    pub async fn check(
        &self,
        front_specialty_id: Uuid,
        material_id: Uuid,
        requested: Decimal,
        pending_in_form: Decimal,
    ) -> Result<BudgetCheck, BudgetError> {
        let line = self.line_for(front_specialty_id, material_id).await?;
        Ok(BudgetService::check(line.as_ref(), requested, pending_in_form)?)
    }
}
