//! Report routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use acopio_core::report::stock_balances;
use acopio_db::repositories::MovementRepository;

use super::internal_error;
use crate::AppState;

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/reports/stock", get(stock_report))
}

/// Query parameters for the stock report.
#[derive(Debug, Deserialize)]
pub struct StockReportQuery {
    /// Scope the report to one requisition; omit for the whole site.
    pub requisition_id: Option<Uuid>,
}

/// Serves the stock balance report through the TTL snapshot cache.
async fn stock_report(State(state): State<AppState>, Query(query): Query<StockReportQuery>) -> Response {
    let scope = query
        .requisition_id
        .map_or_else(|| "all".to_string(), |id| id.to_string());

    if let Some(snapshot) = state.report_cache.get(&scope) {
        return Json(snapshot.as_ref().clone()).into_response();
    }

    let repo = MovementRepository::new(state.conn());
    let movements = match query.requisition_id {
        Some(requisition_id) => repo.movements_for_requisition(requisition_id, None).await,
        None => repo.all_movements().await,
    };
    let movements = match movements {
        Ok(movements) => movements,
        Err(err) => return internal_error(err),
    };

    let snapshot = state
        .report_cache
        .get_or_refresh(&scope, || stock_balances(&movements));

    Json(snapshot.as_ref().clone()).into_response()
}
