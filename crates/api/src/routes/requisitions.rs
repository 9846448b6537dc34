//! Requisition routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use acopio_core::budget::{BudgetCheck, BudgetCheckStatus};
use acopio_core::item::ItemRef;
use acopio_core::reconciliation::{FulfillmentRepair, ReconciliationService};
use acopio_core::requisition::LineStatus;
use acopio_shared::BudgetPolicy;
use acopio_shared::types::{PageRequest, PageResponse};
use acopio_db::repositories::{
    BudgetRepository, CreateRequisitionInput, CreateRequisitionLineInput, MovementRepository,
    PurchaseRepository, RequisitionError, RequisitionRepository,
};

use super::{ItemRefBody, error_response, internal_error};
use crate::AppState;

/// Creates the requisition routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/requisitions", get(list_requisitions))
        .route("/requisitions", post(create_requisition))
        .route("/requisitions/{id}", get(get_requisition))
        .route("/requisitions/{id}/repair", post(repair_requisition))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for one requisition line.
#[derive(Debug, Deserialize)]
pub struct RequisitionLineRequest {
    /// Item identity.
    #[serde(flatten)]
    pub item: ItemRefBody,
    /// Unit of measure.
    pub unit: String,
    /// Requested quantity.
    pub quantity: Decimal,
}

/// Request body for creating a requisition.
#[derive(Debug, Deserialize)]
pub struct CreateRequisitionRequest {
    /// Work-front/specialty consuming budget.
    pub front_specialty_id: Uuid,
    /// Optional block/sector.
    pub block: Option<String>,
    /// Requesting user.
    pub requested_by: Uuid,
    /// Requisition date.
    pub date: NaiveDate,
    /// Demand lines.
    pub lines: Vec<RequisitionLineRequest>,
}

/// Budget finding for one line of a create request.
#[derive(Debug, Serialize)]
pub struct LineBudgetFinding {
    /// Index of the line in the request.
    pub line_index: usize,
    /// Check outcome.
    pub status: BudgetCheckStatus,
    /// Projected utilization.
    pub projected: Decimal,
    /// Budgeted quantity, when a budget line exists.
    pub budgeted: Option<Decimal>,
}

/// Response for a created requisition.
#[derive(Debug, Serialize)]
pub struct CreateRequisitionResponse {
    /// New requisition id.
    pub id: Uuid,
    /// New line ids, in request order.
    pub line_ids: Vec<Uuid>,
    /// Budget findings for lines that were not plainly ok.
    pub budget_findings: Vec<LineBudgetFinding>,
}

/// Requisition header response.
#[derive(Debug, Serialize)]
pub struct RequisitionResponse {
    /// Requisition id.
    pub id: Uuid,
    /// Front/specialty id.
    pub front_specialty_id: Uuid,
    /// Block/sector.
    pub block: Option<String>,
    /// Requesting user.
    pub requested_by: Uuid,
    /// Requisition date.
    pub date: NaiveDate,
}

/// Requisition line with computed balances.
#[derive(Debug, Serialize)]
pub struct RequisitionLineResponse {
    /// Line id.
    pub id: Uuid,
    /// Item identity.
    pub item: Option<ItemRef>,
    /// Unit of measure.
    pub unit: String,
    /// Requested quantity.
    pub quantity_requested: Decimal,
    /// Fulfilled running total.
    pub quantity_fulfilled: Decimal,
    /// Fulfillment status.
    pub status: LineStatus,
    /// Quantity committed to open orders.
    pub pending_in_pipeline: Decimal,
    /// Quantity still free to purchase.
    pub free_to_purchase: Decimal,
}

/// Requisition detail response.
#[derive(Debug, Serialize)]
pub struct RequisitionDetailResponse {
    /// Header.
    #[serde(flatten)]
    pub header: RequisitionResponse,
    /// Lines with computed balances.
    pub lines: Vec<RequisitionLineResponse>,
}

// ============================================================================
// Handlers
// ============================================================================

fn map_requisition_error(err: RequisitionError) -> Response {
    match &err {
        RequisitionError::NotFound(_) | RequisitionError::LineNotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "not_found", err)
        }
        RequisitionError::InvalidQuantity | RequisitionError::NoLines => {
            error_response(StatusCode::BAD_REQUEST, "validation_error", err)
        }
        RequisitionError::Database(_) => internal_error(err),
    }
}

/// Runs the budget gate over the request's material lines.
///
/// Quantities already typed into the same form count as pending for the
/// lines after them.
async fn budget_findings(
    budget_repo: &BudgetRepository,
    request: &CreateRequisitionRequest,
) -> Result<Vec<LineBudgetFinding>, Response> {
    let mut findings = Vec::new();
    let mut in_form: HashMap<Uuid, Decimal> = HashMap::new();

    for (line_index, line) in request.lines.iter().enumerate() {
        let Some(material_id) = line.item.material_id else {
            continue;
        };
        if line.quantity <= Decimal::ZERO {
            // The repository rejects it with a proper validation error.
            continue;
        }

        let pending_in_form = in_form.get(&material_id).copied().unwrap_or(Decimal::ZERO);
        let check: BudgetCheck = budget_repo
            .check(
                request.front_specialty_id,
                material_id,
                line.quantity,
                pending_in_form,
            )
            .await
            .map_err(internal_error)?;

        if check.status != BudgetCheckStatus::Ok {
            findings.push(LineBudgetFinding {
                line_index,
                status: check.status,
                projected: check.projected,
                budgeted: check.budgeted,
            });
        }

        *in_form.entry(material_id).or_insert(Decimal::ZERO) += line.quantity;
    }

    Ok(findings)
}

/// Creates a requisition with its lines, applying the configured budget
/// policy.
async fn create_requisition(
    State(state): State<AppState>,
    Json(request): Json<CreateRequisitionRequest>,
) -> Response {
    let budget_repo = BudgetRepository::new(state.conn());

    let findings = match budget_findings(&budget_repo, &request).await {
        Ok(findings) => findings,
        Err(response) => return response,
    };

    if state.budget.policy == BudgetPolicy::Block
        && findings
            .iter()
            .any(|f| f.status == BudgetCheckStatus::OverBudget)
    {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "over_budget",
                "message": "One or more lines exceed the available budget",
                "findings": findings,
            })),
        )
            .into_response();
    }

    let mut lines = Vec::with_capacity(request.lines.len());
    for (index, line) in request.lines.iter().enumerate() {
        let Some(item) = line.item.resolve() else {
            return error_response(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("Line {index} has no item id or description"),
            );
        };
        lines.push(CreateRequisitionLineInput {
            item,
            unit: line.unit.clone(),
            quantity_requested: line.quantity,
        });
    }

    let repo = RequisitionRepository::new(state.conn());
    let input = CreateRequisitionInput {
        front_specialty_id: request.front_specialty_id,
        block: request.block,
        requested_by: request.requested_by,
        date: request.date,
        lines,
    };

    match repo.create(input).await {
        Ok((header, line_models)) => {
            info!(requisition_id = %header.id, lines = line_models.len(), "Requisition created");
            (
                StatusCode::CREATED,
                Json(CreateRequisitionResponse {
                    id: header.id,
                    line_ids: line_models.into_iter().map(|l| l.id).collect(),
                    budget_findings: findings,
                }),
            )
                .into_response()
        }
        Err(err) => map_requisition_error(err),
    }
}

/// Lists requisitions, newest first.
async fn list_requisitions(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Response {
    let repo = RequisitionRepository::new(state.conn());
    match repo.list(&page).await {
        Ok((models, total)) => {
            let data: Vec<RequisitionResponse> = models
                .into_iter()
                .map(|model| RequisitionResponse {
                    id: model.id,
                    front_specialty_id: model.front_specialty_id,
                    block: model.block,
                    requested_by: model.requested_by,
                    date: model.date,
                })
                .collect();
            Json(PageResponse::new(data, page.page, page.per_page, total)).into_response()
        }
        Err(err) => map_requisition_error(err),
    }
}

/// Gets a requisition with per-line computed balances.
async fn get_requisition(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = RequisitionRepository::new(state.conn());
    let purchase_repo = PurchaseRepository::new(state.conn());
    let movement_repo = MovementRepository::new(state.conn());

    let header = match repo.get(id).await {
        Ok(header) => header,
        Err(err) => return map_requisition_error(err),
    };
    let lines = match repo.lines(id).await {
        Ok(lines) => lines,
        Err(err) => return map_requisition_error(err),
    };

    let request_lines = match purchase_repo.request_lines_for_requisition(id).await {
        Ok(v) => v,
        Err(err) => return internal_error(err),
    };
    let orders = match purchase_repo.orders_for_requisition(id).await {
        Ok(v) => v,
        Err(err) => return internal_error(err),
    };
    let movements = match movement_repo.movements_for_requisition(id, None).await {
        Ok(v) => v,
        Err(err) => return internal_error(err),
    };

    let mut line_responses = Vec::with_capacity(lines.len());
    for line in &lines {
        let pipeline = match ReconciliationService::pending_in_pipeline(
            line,
            &request_lines,
            &orders,
            &movements,
        ) {
            Ok(v) => v,
            Err(err) => {
                return error_response(
                    StatusCode::from_u16(err.http_status_code())
                        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                    err.error_code(),
                    err,
                );
            }
        };
        let free = (line.quantity_requested - line.quantity_fulfilled - pipeline)
            .max(Decimal::ZERO);

        line_responses.push(RequisitionLineResponse {
            id: line.id.into_inner(),
            item: line.item.clone(),
            unit: line.unit.to_string(),
            quantity_requested: line.quantity_requested,
            quantity_fulfilled: line.quantity_fulfilled,
            status: line.status,
            pending_in_pipeline: pipeline,
            free_to_purchase: free,
        });
    }

    Json(RequisitionDetailResponse {
        header: RequisitionResponse {
            id: header.id,
            front_specialty_id: header.front_specialty_id,
            block: header.block,
            requested_by: header.requested_by,
            date: header.date,
        },
        lines: line_responses,
    })
    .into_response()
}

/// Rebuilds the fulfillment caches of a requisition from the ledger.
async fn repair_requisition(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = RequisitionRepository::new(state.conn());
    match repo.repair(id).await {
        Ok(repairs) => {
            let changed = repairs.iter().filter(|r| r.changed).count();
            info!(requisition_id = %id, changed, "Requisition repaired");
            Json(repairs.into_iter().collect::<Vec<FulfillmentRepair>>()).into_response()
        }
        Err(err) => map_requisition_error(err),
    }
}
