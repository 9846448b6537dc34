//! Purchase request (SC) and purchase order (OC) routes.

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
use tracing::info;
use uuid::Uuid;

use acopio_core::procurement::OrderStatus;
use acopio_core::reconciliation::{LinePending, ReconciliationService};
use acopio_db::repositories::{
    CreateOrderInput, CreateOrderLineInput, CreatePurchaseRequestInput, CreateRequestLineInput,
    MovementRepository, PurchaseError, PurchaseRepository,
};

use super::{ItemRefBody, error_response, internal_error};
use crate::AppState;

/// Creates the purchasing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/purchase-requests", post(create_purchase_request))
        .route("/purchase-orders", post(create_purchase_order))
        .route("/purchase-orders/active", get(list_active_orders))
        .route("/purchase-orders/{id}/pending", get(get_order_pending))
        .route("/purchase-orders/{id}/cancel", post(cancel_order))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for one purchase-request line.
#[derive(Debug, Deserialize)]
pub struct RequestLineBody {
    /// Requisition the line sources demand from.
    pub requisition_id: Uuid,
    /// Item identity.
    #[serde(flatten)]
    pub item: ItemRefBody,
    /// Approved-for-purchase quantity.
    pub quantity: Decimal,
}

/// Request body for creating a purchase request.
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseRequestBody {
    /// Request date.
    pub request_date: NaiveDate,
    /// Request lines.
    pub lines: Vec<RequestLineBody>,
}

/// Request body for one purchase-order line.
#[derive(Debug, Deserialize)]
pub struct OrderLineBody {
    /// Purchase-request line being sourced.
    pub purchase_request_line_id: Uuid,
    /// Ordered quantity.
    pub quantity: Decimal,
}

/// Request body for creating a purchase order.
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseOrderBody {
    /// Order date.
    pub order_date: NaiveDate,
    /// Supplier display name.
    pub supplier_name: Option<String>,
    /// Order lines.
    pub lines: Vec<OrderLineBody>,
}

/// Query parameters for the active-orders view.
#[derive(Debug, Deserialize)]
pub struct ActiveOrdersQuery {
    /// Requisition scoping the view.
    pub requisition_id: Uuid,
}

/// Response entry for an active order.
#[derive(Debug, Serialize)]
pub struct ActiveOrderResponse {
    /// Order id.
    pub id: Uuid,
    /// Order status.
    pub status: OrderStatus,
    /// Order date.
    pub order_date: NaiveDate,
}

/// Response with created ids.
#[derive(Debug, Serialize)]
pub struct CreatedWithLinesResponse {
    /// Created header id.
    pub id: Uuid,
    /// Created line ids, in request order.
    pub line_ids: Vec<Uuid>,
}

// ============================================================================
// Handlers
// ============================================================================

fn map_purchase_error(err: PurchaseError) -> Response {
    match &err {
        PurchaseError::RequisitionNotFound(_)
        | PurchaseError::RequestLineNotFound(_)
        | PurchaseError::OrderNotFound(_) => error_response(StatusCode::NOT_FOUND, "not_found", err),
        PurchaseError::InvalidQuantity | PurchaseError::NoLines => {
            error_response(StatusCode::BAD_REQUEST, "validation_error", err)
        }
        PurchaseError::Database(_) => internal_error(err),
    }
}

/// Ingests a purchase request (SC) with its lines.
async fn create_purchase_request(
    State(state): State<AppState>,
    Json(request): Json<CreatePurchaseRequestBody>,
) -> Response {
    let mut lines = Vec::with_capacity(request.lines.len());
    for (index, line) in request.lines.iter().enumerate() {
        let Some(item) = line.item.resolve() else {
            return error_response(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("Line {index} has no item id or description"),
            );
        };
        lines.push(CreateRequestLineInput {
            requisition_id: line.requisition_id,
            item,
            quantity: line.quantity,
        });
    }

    let repo = PurchaseRepository::new(state.conn());
    match repo
        .create_request(CreatePurchaseRequestInput {
            request_date: request.request_date,
            lines,
        })
        .await
    {
        Ok((header, line_models)) => {
            info!(purchase_request_id = %header.id, "Purchase request created");
            (
                StatusCode::CREATED,
                Json(CreatedWithLinesResponse {
                    id: header.id,
                    line_ids: line_models.into_iter().map(|l| l.id).collect(),
                }),
            )
                .into_response()
        }
        Err(err) => map_purchase_error(err),
    }
}

/// Ingests a purchase order (OC) with its lines.
async fn create_purchase_order(
    State(state): State<AppState>,
    Json(request): Json<CreatePurchaseOrderBody>,
) -> Response {
    let repo = PurchaseRepository::new(state.conn());
    let input = CreateOrderInput {
        order_date: request.order_date,
        supplier_name: request.supplier_name,
        lines: request
            .lines
            .into_iter()
            .map(|line| CreateOrderLineInput {
                purchase_request_line_id: line.purchase_request_line_id,
                quantity: line.quantity,
            })
            .collect(),
    };

    match repo.create_order(input).await {
        Ok((header, line_models)) => {
            info!(purchase_order_id = %header.id, "Purchase order created");
            (
                StatusCode::CREATED,
                Json(CreatedWithLinesResponse {
                    id: header.id,
                    line_ids: line_models.into_iter().map(|l| l.id).collect(),
                }),
            )
                .into_response()
        }
        Err(err) => map_purchase_error(err),
    }
}

/// Cancels a purchase order.
async fn cancel_order(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = PurchaseRepository::new(state.conn());
    match repo.cancel_order(id).await {
        Ok(model) => {
            info!(purchase_order_id = %id, "Purchase order cancelled");
            Json(serde_json::json!({ "id": model.id, "status": "cancelled" })).into_response()
        }
        Err(err) => map_purchase_error(err),
    }
}

/// Lists the orders still open to receive against for a requisition.
async fn list_active_orders(
    State(state): State<AppState>,
    Query(query): Query<ActiveOrdersQuery>,
) -> Response {
    let purchase_repo = PurchaseRepository::new(state.conn());
    let movement_repo = MovementRepository::new(state.conn());

    let request_lines = match purchase_repo
        .request_lines_for_requisition(query.requisition_id)
        .await
    {
        Ok(v) => v,
        Err(err) => return map_purchase_error(err),
    };
    let orders = match purchase_repo
        .orders_for_requisition(query.requisition_id)
        .await
    {
        Ok(v) => v,
        Err(err) => return map_purchase_error(err),
    };
    let movements = match movement_repo
        .movements_for_requisition(query.requisition_id, None)
        .await
    {
        Ok(v) => v,
        Err(err) => return internal_error(err),
    };

    match ReconciliationService::active_orders(&orders, &request_lines, &movements) {
        Ok(active_ids) => {
            let data: Vec<ActiveOrderResponse> = orders
                .iter()
                .filter(|order| active_ids.contains(&order.id))
                .map(|order| ActiveOrderResponse {
                    id: order.id.into_inner(),
                    status: order.status,
                    order_date: order.order_date,
                })
                .collect();
            Json(data).into_response()
        }
        Err(err) => error_response(
            StatusCode::from_u16(err.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            err.error_code(),
            err,
        ),
    }
}

/// Returns the pending quantity per line of one order.
async fn get_order_pending(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = PurchaseRepository::new(state.conn());
    let snapshot = match repo.order_snapshot(id).await {
        Ok(snapshot) => snapshot,
        Err(err) => return map_purchase_error(err),
    };

    match ReconciliationService::order_pending(
        &snapshot.order,
        &snapshot.orders,
        &snapshot.request_lines,
        &snapshot.movements,
    ) {
        Ok(lines) => Json(lines.into_iter().collect::<Vec<LinePending>>()).into_response(),
        Err(err) => error_response(
            StatusCode::from_u16(err.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            err.error_code(),
            err,
        ),
    }
}
