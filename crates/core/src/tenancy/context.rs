//! Transaction-scoped tenant context.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The active tenant context for one database transaction.
///
/// Exactly one context is active per transaction, and it must be asserted
/// at the start of EVERY transaction that touches tenant-scoped data.
/// Asserting only "when it changed" is forbidden: pooled connections carry
/// the previous request's session state, and a skipped assertion silently
/// reuses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    /// The active organization.
    pub organization_id: Uuid,
    /// The active association, if the request is scoped to one.
    pub association_id: Option<Uuid>,
    /// Whether the principal is staff of the active organization.
    ///
    /// Staff see every association of their organization; `association_id`
    /// then only narrows a focused view and is never a security boundary.
    pub is_org_staff: bool,
}

impl TenantContext {
    /// Context for organization staff with no association focus.
    #[must_use]
    pub const fn staff(organization_id: Uuid) -> Self {
        Self {
            organization_id,
            association_id: None,
            is_org_staff: true,
        }
    }

    /// Context for organization staff focused on one association.
    #[must_use]
    pub const fn staff_focused(organization_id: Uuid, association_id: Uuid) -> Self {
        Self {
            organization_id,
            association_id: Some(association_id),
            is_org_staff: true,
        }
    }

    /// Context for an external association member (board, owner, resident).
    #[must_use]
    pub const fn member(organization_id: Uuid, association_id: Uuid) -> Self {
        Self {
            organization_id,
            association_id: Some(association_id),
            is_org_staff: false,
        }
    }
}

impl std::fmt::Display for TenantContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.association_id {
            Some(assoc) => write!(
                f,
                "org={} assoc={} staff={}",
                self.organization_id, assoc, self.is_org_staff
            ),
            None => write!(
                f,
                "org={} assoc=- staff={}",
                self.organization_id, self.is_org_staff
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let org = Uuid::new_v4();
        let assoc = Uuid::new_v4();

        let staff = TenantContext::staff(org);
        assert!(staff.is_org_staff);
        assert_eq!(staff.association_id, None);

        let focused = TenantContext::staff_focused(org, assoc);
        assert!(focused.is_org_staff);
        assert_eq!(focused.association_id, Some(assoc));

        let member = TenantContext::member(org, assoc);
        assert!(!member.is_org_staff);
        assert_eq!(member.association_id, Some(assoc));
    }

    #[test]
    fn test_display_includes_staff_flag() {
        let ctx = TenantContext::staff(Uuid::nil());
        assert!(ctx.to_string().contains("staff=true"));
    }
}
