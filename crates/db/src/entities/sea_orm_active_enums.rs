//! `SeaORM` active enums mirroring the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "item_kind")]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Construction material.
    #[sea_orm(string_value = "material")]
    Material,
    /// Contracted service.
    #[sea_orm(string_value = "service")]
    Service,
    /// Machinery or tools.
    #[sea_orm(string_value = "equipment")]
    Equipment,
    /// Personal protective equipment.
    #[sea_orm(string_value = "ppe")]
    Ppe,
}

/// Requisition line fulfillment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "line_status")]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    /// Nothing received yet.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Partially received.
    #[sea_orm(string_value = "partial")]
    Partial,
    /// Fully received.
    #[sea_orm(string_value = "fulfilled")]
    Fulfilled,
    /// Cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Purchase-request line status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "request_line_status")]
#[serde(rename_all = "lowercase")]
pub enum RequestLineStatus {
    /// Open for ordering.
    #[sea_orm(string_value = "open")]
    Open,
    /// Closed.
    #[sea_orm(string_value = "closed")]
    Closed,
}

/// Purchase order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_status")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Issued to the supplier.
    #[sea_orm(string_value = "issued")]
    Issued,
    /// Cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Fully received.
    #[sea_orm(string_value = "received")]
    Received,
}

/// Warehouse movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "movement_direction")]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    /// Entry into the warehouse.
    #[sea_orm(string_value = "in")]
    In,
    /// Exit from the warehouse.
    #[sea_orm(string_value = "out")]
    Out,
}

/// Warehouse movement source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "movement_source")]
#[serde(rename_all = "snake_case")]
pub enum MovementSource {
    /// Delivery against a purchase order.
    #[sea_orm(string_value = "purchase_order")]
    PurchaseOrder,
    /// Petty-cash purchase.
    #[sea_orm(string_value = "petty_cash")]
    PettyCash,
}
