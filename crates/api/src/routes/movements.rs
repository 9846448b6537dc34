//! Warehouse ledger routes: listing, receipts, and issues.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use acopio_core::movement::Direction;
use acopio_core::reconciliation::ReceiptSource;
use acopio_shared::types::{PageRequest, PageResponse, PurchaseOrderLineId};
use acopio_db::entities::warehouse_movements;
use acopio_db::repositories::{
    MovementError, MovementRepository, RecordIssueInput, RecordReceiptInput,
};

use super::{error_response, internal_error};
use crate::AppState;

/// Creates the warehouse ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/movements", get(list_movements))
        .route(
            "/requisitions/{id}/lines/{line_id}/receipts",
            post(record_receipt),
        )
        .route(
            "/requisitions/{id}/lines/{line_id}/issues",
            post(record_issue),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for the ledger listing.
#[derive(Debug, Deserialize)]
pub struct MovementsQuery {
    /// Filter by requisition.
    pub requisition_id: Option<Uuid>,
    /// Filter by direction.
    pub direction: Option<Direction>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl MovementsQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Request body for registering a receipt.
#[derive(Debug, Deserialize)]
pub struct RecordReceiptBody {
    /// Received quantity.
    pub quantity: Decimal,
    /// Allocation path: "purchase_order" or "petty_cash".
    pub source: ReceiptSourceBody,
    /// Order line, required for the purchase-order path.
    pub order_line_id: Option<Uuid>,
    /// Destination or use.
    pub destination: Option<String>,
    /// Registering user.
    pub recorded_by: Uuid,
}

/// Wire form of the receipt source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptSourceBody {
    /// Delivery against a purchase order.
    PurchaseOrder,
    /// Petty-cash purchase.
    PettyCash,
}

/// Request body for registering an issue (exit).
#[derive(Debug, Deserialize)]
pub struct RecordIssueBody {
    /// Issued quantity.
    pub quantity: Decimal,
    /// Destination or use.
    pub destination: Option<String>,
    /// Registering user.
    pub recorded_by: Uuid,
}

/// One ledger row.
#[derive(Debug, Serialize)]
pub struct MovementResponse {
    /// Movement id.
    pub id: Uuid,
    /// Direction.
    pub direction: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Requisition.
    pub requisition_id: Uuid,
    /// Source.
    pub source: String,
    /// Destination or use.
    pub destination: Option<String>,
    /// Registration timestamp.
    pub recorded_at: DateTime<FixedOffset>,
}

impl From<warehouse_movements::Model> for MovementResponse {
    fn from(model: warehouse_movements::Model) -> Self {
        use acopio_db::entities::sea_orm_active_enums::{MovementDirection, MovementSource};
        Self {
            id: model.id,
            direction: match model.direction {
                MovementDirection::In => "in".to_string(),
                MovementDirection::Out => "out".to_string(),
            },
            quantity: model.quantity,
            requisition_id: model.requisition_id,
            source: match model.source {
                MovementSource::PurchaseOrder => "purchase_order".to_string(),
                MovementSource::PettyCash => "petty_cash".to_string(),
            },
            destination: model.destination,
            recorded_at: model.recorded_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

fn map_movement_error(err: MovementError) -> Response {
    match &err {
        MovementError::LineNotFound(_) => error_response(StatusCode::NOT_FOUND, "not_found", err),
        MovementError::MissingItem(_) | MovementError::InvalidQuantity => {
            error_response(StatusCode::BAD_REQUEST, "validation_error", err)
        }
        MovementError::Reconciliation(inner) => error_response(
            StatusCode::from_u16(inner.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            inner.error_code(),
            err,
        ),
        MovementError::Database(_) => internal_error(err),
    }
}

/// Lists ledger rows, newest first.
async fn list_movements(State(state): State<AppState>, Query(query): Query<MovementsQuery>) -> Response {
    let page = query.page_request();
    let repo = MovementRepository::new(state.conn());
    match repo.list(query.requisition_id, query.direction, &page).await {
        Ok((models, total)) => {
            let data: Vec<MovementResponse> =
                models.into_iter().map(MovementResponse::from).collect();
            Json(PageResponse::new(data, page.page, page.per_page, total)).into_response()
        }
        Err(err) => map_movement_error(err),
    }
}

/// Registers a warehouse receipt against a requisition line.
async fn record_receipt(
    State(state): State<AppState>,
    Path((_requisition_id, line_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<RecordReceiptBody>,
) -> Response {
    let source = match body.source {
        ReceiptSourceBody::PettyCash => ReceiptSource::PettyCash,
        ReceiptSourceBody::PurchaseOrder => {
            let Some(order_line_id) = body.order_line_id else {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    "order_line_id is required for purchase_order receipts",
                );
            };
            ReceiptSource::PurchaseOrder {
                order_line_id: PurchaseOrderLineId::from_uuid(order_line_id),
            }
        }
    };

    let repo = MovementRepository::new(state.conn());
    match repo
        .record_receipt(RecordReceiptInput {
            requisition_line_id: line_id,
            quantity: body.quantity,
            source,
            destination: body.destination,
            recorded_by: body.recorded_by,
        })
        .await
    {
        Ok(outcome) => {
            info!(
                line_id = %line_id,
                new_fulfilled = %outcome.new_fulfilled,
                "Receipt registered"
            );
            // Receipts change stock; drop stale report snapshots.
            state.report_cache.invalidate_all();
            (StatusCode::CREATED, Json(outcome)).into_response()
        }
        Err(err) => map_movement_error(err),
    }
}

/// Registers a warehouse issue (exit) against a requisition line.
async fn record_issue(
    State(state): State<AppState>,
    Path((_requisition_id, line_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<RecordIssueBody>,
) -> Response {
    let repo = MovementRepository::new(state.conn());
    match repo
        .record_issue(RecordIssueInput {
            requisition_line_id: line_id,
            quantity: body.quantity,
            destination: body.destination,
            recorded_by: body.recorded_by,
        })
        .await
    {
        Ok(model) => {
            info!(line_id = %line_id, movement_id = %model.id, "Issue registered");
            state.report_cache.invalidate_all();
            (StatusCode::CREATED, Json(MovementResponse::from(model))).into_response()
        }
        Err(err) => map_movement_error(err),
    }
}
