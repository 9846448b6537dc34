//! Purchase request (SC) and purchase order (OC) repository.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use acopio_core::item::{ItemRef, resolve_legacy};
use acopio_core::movement::Movement;
use acopio_core::procurement::{PurchaseOrder, RequestLine};
use acopio_shared::types::PurchaseOrderId;

use crate::entities::{
    materials, purchase_order_lines, purchase_orders, purchase_request_lines, purchase_requests,
    requisitions, sea_orm_active_enums,
};
use crate::repositories::{
    item_columns, item_kind_to_core, load_movements, load_orders_for_request_lines,
    load_request_lines, order_status_to_core,
};

/// Error types for purchasing operations.
#[derive(Debug, thiserror::Error)]
pub enum PurchaseError {
    /// Requisition not found.
    #[error("Requisition not found: {0}")]
    RequisitionNotFound(Uuid),

    /// Purchase-request line not found.
    #[error("Purchase request line not found: {0}")]
    RequestLineNotFound(Uuid),

    /// Purchase order not found.
    #[error("Purchase order not found: {0}")]
    OrderNotFound(Uuid),

    /// A line quantity must be positive.
    #[error("Line quantity must be positive")]
    InvalidQuantity,

    /// An order or request needs at least one line.
    #[error("At least one line is required")]
    NoLines,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for one purchase-request line.
#[derive(Debug, Clone)]
pub struct CreateRequestLineInput {
    /// Requisition the line sources demand from.
    pub requisition_id: Uuid,
    /// Item identity; legacy descriptions are resolved against the
    /// catalog at ingestion.
    pub item: ItemRef,
    /// Approved-for-purchase quantity.
    pub quantity: Decimal,
}

/// Input for creating a purchase request.
#[derive(Debug, Clone)]
pub struct CreatePurchaseRequestInput {
    /// Request date.
    pub request_date: NaiveDate,
    /// Request lines.
    pub lines: Vec<CreateRequestLineInput>,
}

/// Input for one purchase-order line.
#[derive(Debug, Clone)]
pub struct CreateOrderLineInput {
    /// Purchase-request line the order sources.
    pub purchase_request_line_id: Uuid,
    /// Ordered quantity.
    pub quantity: Decimal,
}

/// Input for creating a purchase order.
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    /// Order date; drives oldest-first allocation.
    pub order_date: NaiveDate,
    /// Supplier display name.
    pub supplier_name: Option<String>,
    /// Order lines.
    pub lines: Vec<CreateOrderLineInput>,
}

/// Snapshot of an order with everything allocation needs: the order
/// itself, its peers over the same request lines, those request lines,
/// and the relevant movement ledger.
#[derive(Debug, Clone)]
pub struct OrderSnapshot {
    /// The requested order.
    pub order: PurchaseOrder,
    /// All orders (the requested one included) referencing the same
    /// request lines.
    pub orders: Vec<PurchaseOrder>,
    /// The request lines those orders reference.
    pub request_lines: Vec<RequestLine>,
    /// Movements of the requisitions behind those request lines.
    pub movements: Vec<Movement>,
}

/// Purchasing repository.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    db: DatabaseConnection,
}

impl PurchaseRepository {
    /// Creates a new purchasing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a purchase request with its lines.
    ///
    /// Legacy item descriptions are resolved to canonical catalog ids
    /// where the catalog has a match; unresolved descriptions are stored
    /// as-is and keep matching by description downstream.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced requisition does not exist, a
    /// quantity is non-positive, or the database operation fails.
    pub async fn create_request(
        &self,
        input: CreatePurchaseRequestInput,
    ) -> Result<(purchase_requests::Model, Vec<purchase_request_lines::Model>), PurchaseError> {
        if input.lines.is_empty() {
            return Err(PurchaseError::NoLines);
        }
        for line in &input.lines {
            if line.quantity <= Decimal::ZERO {
                return Err(PurchaseError::InvalidQuantity);
            }
        }

        let catalog = self.catalog_entries().await?;

        let txn = self.db.begin().await?;
        let now = Utc::now();

        let header = purchase_requests::ActiveModel {
            id: Set(Uuid::now_v7()),
            request_date: Set(input.request_date),
            created_at: Set(now.into()),
        };
        let header = header.insert(&txn).await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in input.lines {
            requisitions::Entity::find_by_id(line.requisition_id)
                .one(&txn)
                .await?
                .ok_or(PurchaseError::RequisitionNotFound(line.requisition_id))?;

            let item = match &line.item {
                ItemRef::Legacy { description, kind } => {
                    resolve_legacy(&catalog, description, *kind).unwrap_or_else(|| line.item.clone())
                }
                other => other.clone(),
            };
            let columns = item_columns(&item);

            let model = purchase_request_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                purchase_request_id: Set(header.id),
                requisition_id: Set(line.requisition_id),
                kind: Set(columns.kind),
                material_id: Set(columns.material_id),
                equipment_id: Set(columns.equipment_id),
                ppe_id: Set(columns.ppe_id),
                item_description: Set(columns.item_description),
                quantity: Set(line.quantity),
                status: Set(sea_orm_active_enums::RequestLineStatus::Open),
                created_at: Set(now.into()),
            };
            lines.push(model.insert(&txn).await?);
        }

        txn.commit().await?;
        Ok((header, lines))
    }

    async fn catalog_entries(&self) -> Result<Vec<acopio_core::item::CatalogEntry>, DbErr> {
        use acopio_core::item::{CatalogEntry, ItemKind};
        use acopio_shared::types::{EquipmentId, MaterialId, PpeId};

        let models = materials::Entity::find().all(&self.db).await?;
        Ok(models
            .into_iter()
            .map(|model| {
                let item = match item_kind_to_core(model.kind) {
                    ItemKind::Equipment => ItemRef::Equipment {
                        id: EquipmentId::from_uuid(model.id),
                    },
                    ItemKind::Ppe => ItemRef::Ppe {
                        id: PpeId::from_uuid(model.id),
                    },
                    ItemKind::Material | ItemKind::Service => ItemRef::Material {
                        id: MaterialId::from_uuid(model.id),
                    },
                };
                CatalogEntry {
                    item,
                    description: model.name,
                }
            })
            .collect())
    }

    /// Creates a purchase order with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced request line does not exist, a
    /// quantity is non-positive, or the database operation fails.
    pub async fn create_order(
        &self,
        input: CreateOrderInput,
    ) -> Result<(purchase_orders::Model, Vec<purchase_order_lines::Model>), PurchaseError> {
        if input.lines.is_empty() {
            return Err(PurchaseError::NoLines);
        }
        for line in &input.lines {
            if line.quantity <= Decimal::ZERO {
                return Err(PurchaseError::InvalidQuantity);
            }
        }

        let txn = self.db.begin().await?;
        let now = Utc::now();

        let header = purchase_orders::ActiveModel {
            id: Set(Uuid::now_v7()),
            status: Set(sea_orm_active_enums::OrderStatus::Issued),
            order_date: Set(input.order_date),
            supplier_name: Set(input.supplier_name),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let header = header.insert(&txn).await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in input.lines {
            purchase_request_lines::Entity::find_by_id(line.purchase_request_line_id)
                .one(&txn)
                .await?
                .ok_or(PurchaseError::RequestLineNotFound(
                    line.purchase_request_line_id,
                ))?;

            let model = purchase_order_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                purchase_order_id: Set(header.id),
                purchase_request_line_id: Set(line.purchase_request_line_id),
                quantity: Set(line.quantity),
                created_at: Set(now.into()),
            };
            lines.push(model.insert(&txn).await?);
        }

        txn.commit().await?;
        Ok((header, lines))
    }

    /// Cancels a purchase order, dropping it from every pending
    /// computation.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the update fails.
    pub async fn cancel_order(&self, order_id: Uuid) -> Result<purchase_orders::Model, PurchaseError> {
        let order = purchase_orders::Entity::find_by_id(order_id)
            .one(&self.db)
            .await?
            .ok_or(PurchaseError::OrderNotFound(order_id))?;

        let mut active: purchase_orders::ActiveModel = order.into();
        active.status = Set(sea_orm_active_enums::OrderStatus::Cancelled);
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Loads the purchase-request lines sourcing a requisition.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn request_lines_for_requisition(
        &self,
        requisition_id: Uuid,
    ) -> Result<Vec<RequestLine>, PurchaseError> {
        Ok(load_request_lines(&self.db, requisition_id).await?)
    }

    /// Loads the purchase orders committed against a requisition's
    /// request lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn orders_for_requisition(
        &self,
        requisition_id: Uuid,
    ) -> Result<Vec<PurchaseOrder>, PurchaseError> {
        let request_lines = load_request_lines(&self.db, requisition_id).await?;
        let ids: Vec<Uuid> = request_lines.iter().map(|rl| rl.id.into_inner()).collect();
        Ok(load_orders_for_request_lines(&self.db, &ids).await?)
    }

    /// Loads an order together with its allocation context: peer orders
    /// over the same request lines, those request lines, and the
    /// movements of the requisitions involved.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or a query fails.
    pub async fn order_snapshot(&self, order_id: Uuid) -> Result<OrderSnapshot, PurchaseError> {
        let order_model = purchase_orders::Entity::find_by_id(order_id)
            .one(&self.db)
            .await?
            .ok_or(PurchaseError::OrderNotFound(order_id))?;

        let own_lines = purchase_order_lines::Entity::find()
            .filter(purchase_order_lines::Column::PurchaseOrderId.eq(order_id))
            .order_by_asc(purchase_order_lines::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let request_line_ids: Vec<Uuid> = {
            let mut ids: Vec<Uuid> = own_lines
                .iter()
                .map(|l| l.purchase_request_line_id)
                .collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        };

        let request_line_models = purchase_request_lines::Entity::find()
            .filter(purchase_request_lines::Column::Id.is_in(request_line_ids.clone()))
            .all(&self.db)
            .await?;

        let mut requisition_ids: Vec<Uuid> = request_line_models
            .iter()
            .map(|model| model.requisition_id)
            .collect();
        requisition_ids.sort_unstable();
        requisition_ids.dedup();

        let mut request_lines = Vec::new();
        let mut movements = Vec::new();
        for requisition_id in &requisition_ids {
            request_lines.extend(
                load_request_lines(&self.db, *requisition_id)
                    .await?
                    .into_iter()
                    .filter(|rl| request_line_ids.contains(&rl.id.into_inner())),
            );
            movements.extend(load_movements(&self.db, *requisition_id, None).await?);
        }

        let orders = load_orders_for_request_lines(&self.db, &request_line_ids).await?;
        let order = orders
            .iter()
            .find(|o| o.id == PurchaseOrderId::from_uuid(order_id))
            .cloned()
            .unwrap_or(PurchaseOrder {
                id: PurchaseOrderId::from_uuid(order_id),
                status: order_status_to_core(order_model.status),
                order_date: order_model.order_date,
                lines: Vec::new(),
            });

        Ok(OrderSnapshot {
            order,
            orders,
            request_lines,
            movements,
        })
    }
}
