//! `SeaORM` Entity for purchase order (OC) lines.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_order_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub purchase_request_line_id: Uuid,
    pub quantity: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase_orders::Entity",
        from = "Column::PurchaseOrderId",
        to = "super::purchase_orders::Column::Id"
    )]
    PurchaseOrders,
    #[sea_orm(
        belongs_to = "super::purchase_request_lines::Entity",
        from = "Column::PurchaseRequestLineId",
        to = "super::purchase_request_lines::Column::Id"
    )]
    PurchaseRequestLines,
}

impl Related<super::purchase_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrders.def()
    }
}

impl Related<super::purchase_request_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseRequestLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
