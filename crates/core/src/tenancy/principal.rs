//! The acting identity for a request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Staff roles within an organization.
///
/// Any of these makes the holder organization staff: they see every
/// association of the organization. Finer capability differences (who may
/// manage staff, who may only read) sit on top of tenancy, not inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
    /// Full access, can transfer ownership.
    Owner,
    /// Full access except ownership transfer.
    Admin,
    /// Day-to-day community management.
    Manager,
    /// Concierge/dispatch desk.
    Concierge,
    /// Read-only staff access.
    Viewer,
}

impl OrgRole {
    /// Returns true if this role can manage organization staff.
    #[must_use]
    pub const fn can_manage_staff(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Returns true if this role can modify organization settings.
    #[must_use]
    pub const fn can_modify_settings(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Returns true if this role can mutate tenant data at all.
    #[must_use]
    pub const fn can_write(&self) -> bool {
        !matches!(self, Self::Viewer)
    }
}

impl std::fmt::Display for OrgRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Admin => write!(f, "admin"),
            Self::Manager => write!(f, "manager"),
            Self::Concierge => write!(f, "concierge"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for OrgRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "concierge" => Ok(Self::Concierge),
            "viewer" => Ok(Self::Viewer),
            other => Err(format!("unknown org role: {other}")),
        }
    }
}

/// External member roles within an association.
///
/// These never imply the staff bypass; an association member sees exactly
/// one association (plus organization-wide records).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationRole {
    /// Elected board member.
    Board,
    /// Unit owner.
    Owner,
    /// Resident (tenant of an owner).
    Resident,
}

impl std::fmt::Display for AssociationRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Board => write!(f, "board"),
            Self::Owner => write!(f, "owner"),
            Self::Resident => write!(f, "resident"),
        }
    }
}

/// Product pillars a staff member may access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    /// Community-association management.
    Cam,
    /// Concierge services.
    Concierge,
    /// Service-provider dispatch.
    Dispatch,
}

/// A staff membership in one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgMembership {
    /// The organization.
    pub organization_id: Uuid,
    /// The staff role held there.
    pub role: OrgRole,
}

/// An external membership in one association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationMembership {
    /// The association.
    pub association_id: Uuid,
    /// The organization that owns the association.
    pub organization_id: Uuid,
    /// The member's role.
    pub role: AssociationRole,
}

/// Staff profile for platform employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    /// Pillars this staff member may access.
    pub pillars: Vec<Pillar>,
}

/// The acting identity for a request.
///
/// Resolved once per request from the session token and membership tables;
/// immutable for the request's duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The user behind the request.
    pub user_id: Uuid,
    /// Organizations where the user is staff.
    pub org_memberships: Vec<OrgMembership>,
    /// Associations where the user is an external member.
    pub association_memberships: Vec<AssociationMembership>,
    /// Staff profile, present for platform employees.
    pub staff: Option<StaffProfile>,
    /// Derived fact: platform staff act across organizations.
    pub is_platform_staff: bool,
}

impl Principal {
    /// Creates a principal with no memberships.
    #[must_use]
    pub const fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            org_memberships: Vec::new(),
            association_memberships: Vec::new(),
            staff: None,
            is_platform_staff: false,
        }
    }

    /// Returns the staff role the principal holds in `organization_id`, if any.
    #[must_use]
    pub fn org_role(&self, organization_id: Uuid) -> Option<OrgRole> {
        self.org_memberships
            .iter()
            .find(|m| m.organization_id == organization_id)
            .map(|m| m.role)
    }

    /// Returns true if the principal is staff of `organization_id`.
    ///
    /// Platform staff count as staff of every organization.
    #[must_use]
    pub fn is_org_staff(&self, organization_id: Uuid) -> bool {
        self.is_platform_staff || self.org_role(organization_id).is_some()
    }

    /// Returns the membership for `association_id`, if any.
    #[must_use]
    pub fn association_membership(&self, association_id: Uuid) -> Option<&AssociationMembership> {
        self.association_memberships
            .iter()
            .find(|m| m.association_id == association_id)
    }

    /// Returns the principal's default organization, if one is unambiguous.
    ///
    /// Staff default to their first organization membership; external
    /// members default to the organization owning their association
    /// memberships when all memberships agree.
    #[must_use]
    pub fn default_organization(&self) -> Option<Uuid> {
        if let Some(m) = self.org_memberships.first() {
            return Some(m.organization_id);
        }

        let mut orgs = self
            .association_memberships
            .iter()
            .map(|m| m.organization_id);
        let first = orgs.next()?;
        if orgs.all(|o| o == first) {
            Some(first)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal_with_org(org: Uuid, role: OrgRole) -> Principal {
        Principal {
            org_memberships: vec![OrgMembership {
                organization_id: org,
                role,
            }],
            ..Principal::new(Uuid::new_v4())
        }
    }

    #[test]
    fn test_org_staff_requires_membership() {
        let org = Uuid::new_v4();
        let other = Uuid::new_v4();
        let p = principal_with_org(org, OrgRole::Manager);

        assert!(p.is_org_staff(org));
        assert!(!p.is_org_staff(other));
    }

    #[test]
    fn test_platform_staff_is_staff_everywhere() {
        let mut p = Principal::new(Uuid::new_v4());
        p.is_platform_staff = true;

        assert!(p.is_org_staff(Uuid::new_v4()));
    }

    #[test]
    fn test_default_organization_prefers_staff_membership() {
        let org = Uuid::new_v4();
        let p = principal_with_org(org, OrgRole::Viewer);
        assert_eq!(p.default_organization(), Some(org));
    }

    #[test]
    fn test_default_organization_from_agreeing_association_memberships() {
        let org = Uuid::new_v4();
        let mut p = Principal::new(Uuid::new_v4());
        p.association_memberships = vec![
            AssociationMembership {
                association_id: Uuid::new_v4(),
                organization_id: org,
                role: AssociationRole::Board,
            },
            AssociationMembership {
                association_id: Uuid::new_v4(),
                organization_id: org,
                role: AssociationRole::Owner,
            },
        ];
        assert_eq!(p.default_organization(), Some(org));
    }

    #[test]
    fn test_default_organization_ambiguous_when_orgs_differ() {
        let mut p = Principal::new(Uuid::new_v4());
        p.association_memberships = vec![
            AssociationMembership {
                association_id: Uuid::new_v4(),
                organization_id: Uuid::new_v4(),
                role: AssociationRole::Owner,
            },
            AssociationMembership {
                association_id: Uuid::new_v4(),
                organization_id: Uuid::new_v4(),
                role: AssociationRole::Owner,
            },
        ];
        assert_eq!(p.default_organization(), None);
    }

    #[test]
    fn test_role_capabilities() {
        assert!(OrgRole::Owner.can_manage_staff());
        assert!(OrgRole::Admin.can_manage_staff());
        assert!(!OrgRole::Manager.can_manage_staff());
        assert!(!OrgRole::Viewer.can_write());
        assert!(OrgRole::Concierge.can_write());
    }
}
