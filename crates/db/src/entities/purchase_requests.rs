//! `SeaORM` Entity for purchase request (SC) headers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub request_date: Date,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchase_request_lines::Entity")]
    PurchaseRequestLines,
}

impl Related<super::purchase_request_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseRequestLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
