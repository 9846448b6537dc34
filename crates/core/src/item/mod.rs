//! Item identity and legacy description matching.
//!
//! Requisition lines, purchase-request lines, and warehouse movements all
//! reference catalog items. Modern rows carry a foreign key; legacy rows
//! imported from spreadsheets carry only a free-text description and a
//! category. `ItemRef` models both, and the matcher functions here are the
//! single place where identity is decided.

use serde::{Deserialize, Serialize};

use acopio_shared::types::{EquipmentId, MaterialId, PpeId};

/// Category of a requisition or catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Construction material (cement, rebar, aggregate).
    Material,
    /// Contracted service (no catalog id).
    Service,
    /// Machinery or tools.
    Equipment,
    /// Personal protective equipment.
    Ppe,
}

/// Identity of an item, by catalog id or by legacy description.
///
/// Legacy rows match by normalized description within the same kind; id
/// variants match by exact id. An id variant and a legacy variant never
/// match each other directly - legacy references are resolved to canonical
/// ids at ingestion where the catalog allows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ItemRef {
    /// Catalog material.
    Material {
        /// Material id.
        id: MaterialId,
    },
    /// Catalog equipment.
    Equipment {
        /// Equipment id.
        id: EquipmentId,
    },
    /// Catalog PPE item.
    Ppe {
        /// PPE id.
        id: PpeId,
    },
    /// Legacy row without a foreign key.
    Legacy {
        /// Free-text item description.
        description: String,
        /// Item category the description belongs to.
        kind: ItemKind,
    },
}

impl ItemRef {
    /// Returns the kind of the referenced item.
    #[must_use]
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Material { .. } => ItemKind::Material,
            Self::Equipment { .. } => ItemKind::Equipment,
            Self::Ppe { .. } => ItemKind::Ppe,
            Self::Legacy { kind, .. } => *kind,
        }
    }

    /// Decides whether two item references denote the same item.
    ///
    /// Id variants match by exact id. Legacy variants match by normalized
    /// description and identical kind. Mixed id/legacy pairs never match;
    /// resolution against the catalog happens at ingestion, not here.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Material { id: a }, Self::Material { id: b }) => a == b,
            (Self::Equipment { id: a }, Self::Equipment { id: b }) => a == b,
            (Self::Ppe { id: a }, Self::Ppe { id: b }) => a == b,
            (
                Self::Legacy {
                    description: a,
                    kind: ka,
                },
                Self::Legacy {
                    description: b,
                    kind: kb,
                },
            ) => ka == kb && normalize(a) == normalize(b),
            _ => false,
        }
    }

    /// Returns the material id, if this reference is a catalog material.
    #[must_use]
    pub fn material_id(&self) -> Option<MaterialId> {
        match self {
            Self::Material { id } => Some(*id),
            _ => None,
        }
    }
}

/// A catalog entry used to resolve legacy descriptions to canonical ids.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Canonical item reference (always an id variant).
    pub item: ItemRef,
    /// Catalog description for matching.
    pub description: String,
}

/// Resolves a legacy description to a canonical catalog reference.
///
/// Returns the first catalog entry of the same kind whose normalized
/// description equals the normalized input. Returns `None` when the catalog
/// has no match; callers keep the legacy reference in that case.
#[must_use]
pub fn resolve_legacy(catalog: &[CatalogEntry], description: &str, kind: ItemKind) -> Option<ItemRef> {
    let wanted = normalize(description);
    catalog
        .iter()
        .find(|entry| entry.item.kind() == kind && normalize(&entry.description) == wanted)
        .map(|entry| entry.item.clone())
}

/// Normalizes a description for matching: trim, lowercase, collapse
/// internal whitespace.
fn normalize(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
