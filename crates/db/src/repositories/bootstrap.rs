//! Bootstrap lookup: opaque item id to owning organization.
//!
//! Determining WHICH organization a staff member may act on for a given
//! item id requires a read that RLS itself would block (no context exists
//! yet). The `find_owning_organization` SQL function is the deliberate,
//! narrow escape hatch for that: SECURITY DEFINER, projecting exactly
//! `(item_type, item_id, organization_id)`. This module is its only Rust
//! caller, and [`BootstrapRef`] is the only shape its result takes, so
//! "exempt from tenant predicates" and "exposes only id-mapping columns"
//! are both enforced by construction.

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use uuid::Uuid;

/// Item kinds the bootstrap lookup resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    /// An association.
    Association,
    /// A document.
    Document,
    /// A work order.
    WorkOrder,
}

impl ItemType {
    /// Stable string form used by the SQL function.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Association => "association",
            Self::Document => "document",
            Self::WorkOrder => "work_order",
        }
    }
}

/// The complete projection of the bootstrap lookup. Nothing else comes
/// through here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapRef {
    /// The item kind that was resolved.
    pub item_type: ItemType,
    /// The item id that was resolved.
    pub item_id: Uuid,
    /// The organization that owns the item.
    pub organization_id: Uuid,
}

/// Resolves the owning organization for an opaque item id.
///
/// Returns `None` when no item of that type and id exists. Used solely to
/// decide which organization to assert context for; every subsequent read
/// of the item goes through a tenant session like any other query.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn find_owning_organization(
    db: &DatabaseConnection,
    item_type: ItemType,
    item_id: Uuid,
) -> Result<Option<BootstrapRef>, DbErr> {
    let row = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT find_owning_organization($1, $2) AS organization_id",
            [item_type.as_str().into(), item_id.into()],
        ))
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let organization_id: Option<Uuid> = row.try_get("", "organization_id")?;

    Ok(organization_id.map(|organization_id| BootstrapRef {
        item_type,
        item_id,
        organization_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_type_strings_match_sql_contract() {
        assert_eq!(ItemType::Association.as_str(), "association");
        assert_eq!(ItemType::Document.as_str(), "document");
        assert_eq!(ItemType::WorkOrder.as_str(), "work_order");
    }
}
