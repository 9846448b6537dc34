//! `SeaORM` entity definitions.

pub mod budget_lines;
pub mod materials;
pub mod purchase_order_lines;
pub mod purchase_orders;
pub mod purchase_request_lines;
pub mod purchase_requests;
pub mod requisition_lines;
pub mod requisitions;
pub mod sea_orm_active_enums;
pub mod warehouse_movements;
