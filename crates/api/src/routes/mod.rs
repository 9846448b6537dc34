//! API route definitions.

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::AppState;

pub mod budgets;
pub mod health;
pub mod movements;
pub mod orders;
pub mod reports;
pub mod requisitions;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(requisitions::routes())
        .merge(orders::routes())
        .merge(movements::routes())
        .merge(budgets::routes())
        .merge(reports::routes())
}

/// Item identity fields shared by requisition and purchasing payloads.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ItemRefBody {
    /// Item category.
    pub kind: acopio_core::item::ItemKind,
    /// Catalog material id.
    pub material_id: Option<uuid::Uuid>,
    /// Catalog equipment id.
    pub equipment_id: Option<uuid::Uuid>,
    /// Catalog PPE id.
    pub ppe_id: Option<uuid::Uuid>,
    /// Free-text description for legacy rows.
    pub description: Option<String>,
}

impl ItemRefBody {
    /// Builds the item reference, preferring catalog ids over the
    /// description fallback.
    pub(crate) fn resolve(&self) -> Option<acopio_core::item::ItemRef> {
        use acopio_core::item::ItemRef;
        use acopio_shared::types::{EquipmentId, MaterialId, PpeId};

        if let Some(id) = self.material_id {
            return Some(ItemRef::Material {
                id: MaterialId::from_uuid(id),
            });
        }
        if let Some(id) = self.equipment_id {
            return Some(ItemRef::Equipment {
                id: EquipmentId::from_uuid(id),
            });
        }
        if let Some(id) = self.ppe_id {
            return Some(ItemRef::Ppe {
                id: PpeId::from_uuid(id),
            });
        }
        self.description.as_ref().map(|description| ItemRef::Legacy {
            description: description.clone(),
            kind: self.kind,
        })
    }
}

/// Builds the standard JSON error body.
pub(crate) fn error_response(
    status: StatusCode,
    code: &str,
    message: impl std::fmt::Display,
) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.to_string(),
        })),
    )
        .into_response()
}

/// Shorthand for a 500 with a logged cause.
pub(crate) fn internal_error(err: impl std::fmt::Display) -> Response {
    tracing::error!(error = %err, "Internal error");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "An error occurred",
    )
}
