//! `SeaORM` Entity for requisition lines.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ItemKind, LineStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "requisition_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub requisition_id: Uuid,
    pub kind: ItemKind,
    pub material_id: Option<Uuid>,
    pub equipment_id: Option<Uuid>,
    pub ppe_id: Option<Uuid>,
    pub item_description: Option<String>,
    pub unit: String,
    pub quantity_requested: Decimal,
    pub quantity_fulfilled: Decimal,
    pub status: LineStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::requisitions::Entity",
        from = "Column::RequisitionId",
        to = "super::requisitions::Column::Id"
    )]
    Requisitions,
}

impl Related<super::requisitions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requisitions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
