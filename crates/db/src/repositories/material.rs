//! Material catalog repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use acopio_core::item::{CatalogEntry, ItemKind, ItemRef};
use acopio_shared::types::{EquipmentId, MaterialId, PpeId};

use crate::entities::materials;
use crate::repositories::{item_kind_from_core, item_kind_to_core};

/// Error types for material catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum MaterialError {
    /// Material not found.
    #[error("Material not found: {0}")]
    NotFound(Uuid),

    /// A material with this name and kind already exists.
    #[error("Material already exists: {0}")]
    DuplicateName(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a catalog material.
#[derive(Debug, Clone)]
pub struct CreateMaterialInput {
    /// Material name.
    pub name: String,
    /// Item kind (material, equipment, ppe).
    pub kind: ItemKind,
    /// Default unit of measure.
    pub unit: String,
}

/// Material catalog repository.
#[derive(Debug, Clone)]
pub struct MaterialRepository {
    db: DatabaseConnection,
}

impl MaterialRepository {
    /// Creates a new material repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a catalog material.
    ///
    /// # Errors
    ///
    /// Returns an error if a material with the same name and kind exists
    /// or the database operation fails.
    pub async fn create(&self, input: CreateMaterialInput) -> Result<materials::Model, MaterialError> {
        let existing = materials::Entity::find()
            .filter(materials::Column::Name.eq(&input.name))
            .filter(materials::Column::Kind.eq(item_kind_from_core(input.kind)))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(MaterialError::DuplicateName(input.name));
        }

        let now = Utc::now().into();
        let material = materials::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            kind: Set(item_kind_from_core(input.kind)),
            unit: Set(input.unit),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(material.insert(&self.db).await?)
    }

    /// Gets a material by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the material is not found or the query fails.
    pub async fn get(&self, id: Uuid) -> Result<materials::Model, MaterialError> {
        materials::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(MaterialError::NotFound(id))
    }

    /// Lists the whole catalog, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self) -> Result<Vec<materials::Model>, MaterialError> {
        Ok(materials::Entity::find()
            .order_by_asc(materials::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Loads the catalog as matcher entries for legacy item resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn catalog_entries(&self) -> Result<Vec<CatalogEntry>, MaterialError> {
        let models = self.list().await?;
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
                    // Services have no catalog rows; anything else is a
                    // material.
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
}
