//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `UserId` where an `OrgId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
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
typed_id!(OrganizationId, "Unique identifier for an organization.");
typed_id!(AssociationId, "Unique identifier for an association.");
typed_id!(DocumentId, "Unique identifier for a document.");
typed_id!(WorkOrderId, "Unique identifier for a work order.");
typed_id!(AuditEventId, "Unique identifier for an audit event.");
typed_id!(SessionId, "Unique identifier for a user session.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_ids_are_distinct_types() {
        let user_id = UserId::new();
        let org_id = OrganizationId::from_uuid(user_id.into_inner());

        // Same underlying UUID, but different types
        assert_eq!(user_id.into_inner(), org_id.into_inner());
    }

    #[test]
    fn test_display_and_parse_round_trip() {
        let id = AssociationId::new();
        let parsed = AssociationId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!(DocumentId::from_str("not-a-uuid").is_err());
    }
}
