//! Context resolution: request identity to validated tenant context.
//!
//! The propagation pipeline runs in strict order: principal, organization,
//! association, validation. Any failure aborts the request before a single
//! tenant-scoped statement executes; a partially resolved context is never
//! used.

use uuid::Uuid;

use super::context::TenantContext;
use super::error::TenancyError;
use super::principal::{AssociationRole, OrgRole, Principal};

/// What the resolved context is based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextBasis {
    /// Principal is staff of the organization; the association (if any)
    /// only narrows a focused view.
    Staff {
        /// Staff role held, when the principal has an explicit membership.
        /// `None` for platform staff acting without one.
        role: Option<OrgRole>,
    },
    /// Principal is an external association member; the association was
    /// verified against their membership.
    Member {
        /// The membership role that validated the association.
        role: AssociationRole,
    },
}

/// A fully validated tenant context, ready to be asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedContext {
    /// The context to assert on the transaction.
    pub context: TenantContext,
    /// Why the principal may hold it.
    pub basis: ContextBasis,
}

/// Resolves a tenant context for `principal`.
///
/// - `org_hint`: explicit organization from the request (header or token
///   claim). Client-supplied and therefore re-validated here; falls back to
///   the principal's default membership when absent.
/// - `assoc_header`: the `X-Assoc-Id` header value. Absent means "no
///   association override", not "no organization".
/// - `assoc_owner`: the organization owning `assoc_header`, looked up by
///   the caller (None when the header is absent or names no known
///   association).
///
/// # Errors
///
/// [`TenancyError::ContextValidation`] when no organization can be
/// determined, when the association header is missing for an external
/// member, or when any hinted id fails membership verification. Absence or
/// mismatch is a hard failure, never a fallback to an unfiltered view.
pub fn resolve_context(
    principal: &Principal,
    org_hint: Option<Uuid>,
    assoc_header: Option<Uuid>,
    assoc_owner: Option<Uuid>,
) -> Result<ResolvedContext, TenancyError> {
    let organization_id = org_hint
        .or_else(|| principal.default_organization())
        .ok_or_else(|| {
            TenancyError::ContextValidation("no organization membership for principal".to_string())
        })?;

    if principal.is_org_staff(organization_id) {
        // Staff: association is optional and only scopes a focused view.
        // A header naming an association of another organization is a
        // client error, not a wider grant.
        if let Some(assoc) = assoc_header {
            if assoc_owner != Some(organization_id) {
                return Err(TenancyError::ContextValidation(format!(
                    "association {assoc} does not belong to organization {organization_id}"
                )));
            }
        }

        return Ok(ResolvedContext {
            context: TenantContext {
                organization_id,
                association_id: assoc_header,
                is_org_staff: true,
            },
            basis: ContextBasis::Staff {
                role: principal.org_role(organization_id),
            },
        });
    }

    // External member: the association header is mandatory and must match a
    // verified membership in that exact association.
    let assoc = assoc_header.ok_or_else(|| {
        TenancyError::ContextValidation(
            "association scope is required for association members".to_string(),
        )
    })?;

    let membership = principal.association_membership(assoc).ok_or_else(|| {
        TenancyError::ContextValidation(format!("principal is not a member of association {assoc}"))
    })?;

    if membership.organization_id != organization_id {
        return Err(TenancyError::ContextValidation(format!(
            "association {assoc} does not belong to organization {organization_id}"
        )));
    }

    Ok(ResolvedContext {
        context: TenantContext::member(organization_id, assoc),
        basis: ContextBasis::Member {
            role: membership.role,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenancy::principal::{AssociationMembership, OrgMembership};

    fn staff_principal(org: Uuid) -> Principal {
        Principal {
            org_memberships: vec![OrgMembership {
                organization_id: org,
                role: OrgRole::Manager,
            }],
            ..Principal::new(Uuid::new_v4())
        }
    }

    fn board_member(org: Uuid, assoc: Uuid) -> Principal {
        Principal {
            association_memberships: vec![AssociationMembership {
                association_id: assoc,
                organization_id: org,
                role: AssociationRole::Board,
            }],
            ..Principal::new(Uuid::new_v4())
        }
    }

    #[test]
    fn test_staff_without_header_gets_org_wide_context() {
        let org = Uuid::new_v4();
        let resolved = resolve_context(&staff_principal(org), None, None, None).unwrap();

        assert_eq!(resolved.context, TenantContext::staff(org));
        assert!(matches!(
            resolved.basis,
            ContextBasis::Staff {
                role: Some(OrgRole::Manager)
            }
        ));
    }

    #[test]
    fn test_staff_focused_view_verified_against_owner() {
        let org = Uuid::new_v4();
        let assoc = Uuid::new_v4();

        let resolved =
            resolve_context(&staff_principal(org), None, Some(assoc), Some(org)).unwrap();
        assert_eq!(resolved.context, TenantContext::staff_focused(org, assoc));

        // Header naming a foreign association is rejected, not ignored.
        let err = resolve_context(&staff_principal(org), None, Some(assoc), Some(Uuid::new_v4()))
            .unwrap_err();
        assert!(matches!(err, TenancyError::ContextValidation(_)));
    }

    #[test]
    fn test_member_without_header_fails_closed() {
        // An external board member of "Maple Grove" whose request omits the
        // association header: hard failure before any context exists.
        let org = Uuid::new_v4();
        let assoc = Uuid::new_v4();
        let principal = board_member(org, assoc);

        let err = resolve_context(&principal, None, None, None).unwrap_err();
        assert!(matches!(err, TenancyError::ContextValidation(_)));
    }

    #[test]
    fn test_member_with_verified_header_resolves() {
        let org = Uuid::new_v4();
        let assoc = Uuid::new_v4();
        let principal = board_member(org, assoc);

        let resolved = resolve_context(&principal, None, Some(assoc), Some(org)).unwrap();
        assert_eq!(resolved.context, TenantContext::member(org, assoc));
        assert!(matches!(
            resolved.basis,
            ContextBasis::Member {
                role: AssociationRole::Board
            }
        ));
    }

    #[test]
    fn test_member_header_mismatch_rejected() {
        let org = Uuid::new_v4();
        let assoc = Uuid::new_v4();
        let principal = board_member(org, assoc);

        // A header naming an association the principal has no membership in.
        let err = resolve_context(&principal, None, Some(Uuid::new_v4()), Some(org)).unwrap_err();
        assert!(matches!(err, TenancyError::ContextValidation(_)));
    }

    #[test]
    fn test_member_association_in_wrong_org_rejected() {
        let org = Uuid::new_v4();
        let assoc = Uuid::new_v4();
        let principal = board_member(org, assoc);

        // Explicit org hint that does not own the membership's association.
        let other_org = Uuid::new_v4();
        let err = resolve_context(&principal, Some(other_org), Some(assoc), Some(org)).unwrap_err();
        assert!(matches!(err, TenancyError::ContextValidation(_)));
    }

    #[test]
    fn test_no_membership_at_all_fails() {
        let principal = Principal::new(Uuid::new_v4());
        let err = resolve_context(&principal, None, None, None).unwrap_err();
        assert!(matches!(err, TenancyError::ContextValidation(_)));
    }

    #[test]
    fn test_platform_staff_resolves_any_org() {
        let mut principal = Principal::new(Uuid::new_v4());
        principal.is_platform_staff = true;

        let org = Uuid::new_v4();
        let resolved = resolve_context(&principal, Some(org), None, None).unwrap();
        assert_eq!(resolved.context, TenantContext::staff(org));
        assert!(matches!(
            resolved.basis,
            ContextBasis::Staff { role: None }
        ));
    }
}
