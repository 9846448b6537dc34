//! `SeaORM` Entity for the append-only warehouse movement ledger.
//!
//! Rows are never updated or deleted; corrections are new rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ItemKind, MovementDirection, MovementSource};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "warehouse_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub direction: MovementDirection,
    pub kind: ItemKind,
    pub material_id: Option<Uuid>,
    pub equipment_id: Option<Uuid>,
    pub ppe_id: Option<Uuid>,
    pub item_description: Option<String>,
    pub quantity: Decimal,
    pub requisition_id: Uuid,
    pub source: MovementSource,
    pub destination: Option<String>,
    pub recorded_by: Uuid,
    pub recorded_at: DateTimeWithTimeZone,
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
