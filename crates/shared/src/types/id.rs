//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `PurchaseOrderId` where a
//! `PurchaseRequestId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a user.");
typed_id!(RequisitionId, "Unique identifier for a requisition header.");
typed_id!(RequisitionLineId, "Unique identifier for a requisition line.");
typed_id!(
    PurchaseRequestId,
    "Unique identifier for a purchase request (SC) header."
);
typed_id!(
    PurchaseRequestLineId,
    "Unique identifier for a purchase request (SC) line."
);
typed_id!(
    PurchaseOrderId,
    "Unique identifier for a purchase order (OC) header."
);
typed_id!(
    PurchaseOrderLineId,
    "Unique identifier for a purchase order (OC) line."
);
typed_id!(MovementId, "Unique identifier for a warehouse movement.");
typed_id!(BudgetLineId, "Unique identifier for a budget line.");
typed_id!(MaterialId, "Unique identifier for a catalog material.");
typed_id!(EquipmentId, "Unique identifier for a piece of equipment.");
typed_id!(PpeId, "Unique identifier for a PPE catalog item.");
typed_id!(
    FrontSpecialtyId,
    "Unique identifier for a work-front/specialty pairing."
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_new_ids_are_unique() {
        let a = RequisitionId::new();
        let b = RequisitionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_v7_ids_are_time_ordered() {
        // UUID v7 embeds a timestamp, so creation sequence sorts ascending.
        let earlier = PurchaseOrderLineId::new();
        let later = PurchaseOrderLineId::new();
        assert!(earlier <= later);
    }

    #[test]
    fn test_round_trip_through_string() {
        let id = MovementId::new();
        let parsed = MovementId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_from_uuid_preserves_value() {
        let uuid = Uuid::now_v7();
        let id = MaterialId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
    }

    #[test]
    fn test_invalid_string_rejected() {
        assert!(RequisitionLineId::from_str("not-a-uuid").is_err());
    }
}
