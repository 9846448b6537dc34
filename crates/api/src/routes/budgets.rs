//! Budget routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use acopio_core::budget::BudgetCheckStatus;
use acopio_shared::BudgetPolicy;
use acopio_db::repositories::{BudgetError, BudgetRepository, UpsertBudgetLineInput};

use super::{error_response, internal_error};
use crate::AppState;

/// Creates the budget routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budget/lines", get(list_budget_lines))
        .route("/budget/lines", put(upsert_budget_line))
        .route("/budget/check", post(check_budget))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating or replacing a budget line.
#[derive(Debug, Deserialize)]
pub struct UpsertBudgetLineBody {
    /// Work-front/specialty.
    pub front_specialty_id: Uuid,
    /// Budgeted material.
    pub material_id: Uuid,
    /// Budgeted quantity.
    pub quantity_budgeted: Decimal,
}

/// Query parameters for listing budget lines.
#[derive(Debug, Deserialize)]
pub struct BudgetLinesQuery {
    /// Work-front/specialty.
    pub front_specialty_id: Uuid,
}

/// Request body for the read-only budget gate.
#[derive(Debug, Deserialize)]
pub struct BudgetCheckBody {
    /// Work-front/specialty.
    pub front_specialty_id: Uuid,
    /// Material being requested.
    pub material_id: Uuid,
    /// Requested quantity.
    pub requested: Decimal,
    /// Quantity already typed into the same form.
    #[serde(default)]
    pub pending_in_form: Decimal,
}

/// Budget line response.
#[derive(Debug, Serialize)]
pub struct BudgetLineResponse {
    /// Budget line id.
    pub id: Uuid,
    /// Work-front/specialty.
    pub front_specialty_id: Uuid,
    /// Material.
    pub material_id: Uuid,
    /// Budgeted quantity.
    pub quantity_budgeted: Decimal,
    /// Utilized quantity.
    pub quantity_utilized: Decimal,
}

/// Budget check response: the classification plus the verdict under the
/// configured policy.
#[derive(Debug, Serialize)]
pub struct BudgetCheckResponse {
    /// Check outcome.
    pub status: BudgetCheckStatus,
    /// Projected utilization.
    pub projected: Decimal,
    /// Budgeted quantity, when a budget line exists.
    pub budgeted: Option<Decimal>,
    /// True when the configured policy would reject this line.
    pub blocked: bool,
}

// ============================================================================
// Handlers
// ============================================================================

fn map_budget_error(err: BudgetError) -> Response {
    match &err {
        BudgetError::NotFound(_) | BudgetError::MaterialNotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "not_found", err)
        }
        BudgetError::Check(inner) => error_response(
            StatusCode::from_u16(inner.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            inner.error_code(),
            err,
        ),
        BudgetError::Database(_) => internal_error(err),
    }
}

/// Creates or replaces the budget line for a (front/specialty, material).
async fn upsert_budget_line(
    State(state): State<AppState>,
    Json(body): Json<UpsertBudgetLineBody>,
) -> Response {
    let repo = BudgetRepository::new(state.conn());
    match repo
        .upsert_line(UpsertBudgetLineInput {
            front_specialty_id: body.front_specialty_id,
            material_id: body.material_id,
            quantity_budgeted: body.quantity_budgeted,
        })
        .await
    {
        Ok(model) => {
            info!(budget_line_id = %model.id, "Budget line upserted");
            Json(BudgetLineResponse {
                id: model.id,
                front_specialty_id: model.front_specialty_id,
                material_id: model.material_id,
                quantity_budgeted: model.quantity_budgeted,
                quantity_utilized: model.quantity_utilized,
            })
            .into_response()
        }
        Err(err) => map_budget_error(err),
    }
}

/// Lists the budget lines of a front/specialty.
async fn list_budget_lines(
    State(state): State<AppState>,
    Query(query): Query<BudgetLinesQuery>,
) -> Response {
    let repo = BudgetRepository::new(state.conn());
    match repo.list_for_front(query.front_specialty_id).await {
        Ok(models) => {
            let data: Vec<BudgetLineResponse> = models
                .into_iter()
                .map(|model| BudgetLineResponse {
                    id: model.id,
                    front_specialty_id: model.front_specialty_id,
                    material_id: model.material_id,
                    quantity_budgeted: model.quantity_budgeted,
                    quantity_utilized: model.quantity_utilized,
                })
                .collect();
            Json(data).into_response()
        }
        Err(err) => map_budget_error(err),
    }
}

/// Runs the read-only budget gate for a prospective requisition line.
async fn check_budget(State(state): State<AppState>, Json(body): Json<BudgetCheckBody>) -> Response {
    let repo = BudgetRepository::new(state.conn());
    match repo
        .check(
            body.front_specialty_id,
            body.material_id,
            body.requested,
            body.pending_in_form,
        )
        .await
    {
        Ok(check) => {
            let blocked = state.budget.policy == BudgetPolicy::Block
                && check.status == BudgetCheckStatus::OverBudget;
            Json(BudgetCheckResponse {
                status: check.status,
                projected: check.projected,
                budgeted: check.budgeted,
                blocked,
            })
            .into_response()
        }
        Err(err) => map_budget_error(err),
    }
}
