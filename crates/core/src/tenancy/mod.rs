//! Tenant-isolation model: context, policy predicates, resolution, audit.
//!
//! Strata isolates tenants on two tiers: an Organization (a management
//! company) owns Associations (individual communities). Every tenant-scoped
//! row carries `organization_id` and, on association-tier tables, a nullable
//! `association_id` where NULL means "organization-wide", never "matches
//! nothing".
//!
//! This module is the single source of truth for access decisions. The SQL
//! row-level-security policies in `strata-db` mirror these predicates
//! expression-for-expression; anything the database would deny, the types
//! here deny too, so every invariant is testable without a database.

pub mod audit;
pub mod context;
pub mod error;
pub mod policy;
pub mod principal;
pub mod resolve;

#[cfg(test)]
mod policy_props;

pub use audit::{Actor, ActorType, AuditAction, AuditFilter, NewAuditEvent};
pub use context::TenantContext;
pub use error::TenancyError;
pub use policy::{AssignmentGrant, GrantReason, PolicyEngine, RowScope, Statement, TableScope};
pub use principal::{
    AssociationMembership, AssociationRole, OrgMembership, OrgRole, Pillar, Principal,
    StaffProfile,
};
pub use resolve::{ContextBasis, ResolvedContext, resolve_context};
