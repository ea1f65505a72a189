//! Policy predicate engine.
//!
//! For every tenant-scoped table there are four predicates (select, insert,
//! update, delete), each a boolean function of the row's scope and the
//! active [`TenantContext`]. Two shapes exist:
//!
//! - **Direct-scoped**: `row.organization_id == ctx.organization_id`.
//! - **Tiered-scoped**: the direct predicate AND (staff bypass OR
//!   association match OR NULL-is-global OR, for reads only, an assignment
//!   grant).
//!
//! The SQL row-level-security policies in `strata-db` are generated from
//! the same expressions; this module is the reference semantics and the
//! place where they are unit-tested.

use uuid::Uuid;

use super::context::TenantContext;
use super::error::TenancyError;

/// The statement kind a predicate guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    /// Row reads.
    Select,
    /// New rows.
    Insert,
    /// In-place mutation.
    Update,
    /// Row removal.
    Delete,
}

impl Statement {
    /// Returns true for insert/update/delete.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        !matches!(self, Self::Select)
    }
}

/// Which predicate shape a table uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableScope {
    /// Organization equality only (organizations, staff, audit log).
    Direct,
    /// Organization equality plus the association tier (documents, work
    /// orders, association members).
    Tiered,
}

/// The tenant-relevant columns of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowScope {
    /// Owning organization; immutable after insert.
    pub organization_id: Uuid,
    /// Owning association. NULL means organization-wide: visible to every
    /// member of the organization, never "matches nothing".
    pub association_id: Option<Uuid>,
}

impl RowScope {
    /// A direct-scoped row.
    #[must_use]
    pub const fn org(organization_id: Uuid) -> Self {
        Self {
            organization_id,
            association_id: None,
        }
    }

    /// An association-scoped row.
    #[must_use]
    pub const fn assoc(organization_id: Uuid, association_id: Uuid) -> Self {
        Self {
            organization_id,
            association_id: Some(association_id),
        }
    }
}

/// Why an assignment grants access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantReason {
    /// An active work-order assignment links a service provider to the row.
    WorkOrderAssignment,
    /// A unit/case membership links a property owner to the row.
    UnitMembership,
}

/// A materialized assignment fact.
///
/// Grants READ access to one resource to one principal without an exact
/// context match. Assignment facts are an OR-branch of the tiered read
/// predicate; they never replace the organization check and never widen
/// writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentGrant {
    /// The principal the grant applies to.
    pub grantee: Uuid,
    /// The resource the grant covers.
    pub resource_id: Uuid,
    /// Why the grant exists.
    pub reason: GrantReason,
}

/// Outcome of a predicate evaluation.
///
/// Callers map `Denied` by statement kind: reads report the row as absent
/// (not-found, never "forbidden"); writes reject with an authorization
/// error distinguishable from a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Predicate passed.
    Granted,
    /// Predicate failed.
    Denied,
}

/// Select predicate: is `row` visible under `ctx`?
///
/// `assignment` is whether an assignment fact links the acting principal to
/// this specific resource. No context means deny-all.
#[must_use]
pub fn read_predicate(
    scope: TableScope,
    ctx: Option<&TenantContext>,
    row: &RowScope,
    assignment: bool,
) -> bool {
    let Some(ctx) = ctx else {
        return false;
    };

    if row.organization_id != ctx.organization_id {
        return false;
    }

    match scope {
        TableScope::Direct => true,
        TableScope::Tiered => {
            ctx.is_org_staff
                || row.association_id.is_none()
                || row.association_id == ctx.association_id
                || assignment
        }
    }
}

/// Write predicate: may `row` be inserted/updated/deleted under `ctx`?
///
/// Mirrors the read predicate minus the assignment branch.
#[must_use]
pub fn write_predicate(scope: TableScope, ctx: Option<&TenantContext>, row: &RowScope) -> bool {
    read_predicate(scope, ctx, row, false)
}

/// Insert/update stamping check: a row naming an `association_id` may only
/// be stamped with an association of the context's organization.
///
/// `association_owner` is the organization that owns the row's association
/// (None when the association is unknown). Rejects before the base
/// predicate runs, so a tenant cannot even probe foreign association ids.
pub fn check_association_stamp(
    ctx: &TenantContext,
    row: &RowScope,
    association_owner: Option<Uuid>,
) -> Result<(), TenancyError> {
    let Some(association_id) = row.association_id else {
        return Ok(());
    };

    if association_owner == Some(ctx.organization_id) {
        Ok(())
    } else {
        Err(TenancyError::CrossTenantWrite { association_id })
    }
}

/// Stateful predicate engine holding materialized facts.
///
/// The facts mirror what the database materializes: assignment edges (the
/// `work_order_assignments` join table) and the association → organization
/// directory. Useful anywhere decisions must be made without a round trip,
/// and as the reference model the SQL policies are tested against.
#[derive(Debug, Default, Clone)]
pub struct PolicyEngine {
    assignments: Vec<AssignmentGrant>,
    association_owners: Vec<(Uuid, Uuid)>,
}

impl PolicyEngine {
    /// Creates an engine with no facts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `association_id` belongs to `organization_id`.
    pub fn register_association(&mut self, association_id: Uuid, organization_id: Uuid) {
        self.association_owners
            .push((association_id, organization_id));
    }

    /// Records an assignment fact.
    pub fn grant(&mut self, grant: AssignmentGrant) {
        self.assignments.push(grant);
    }

    /// Removes assignment facts for a resource (e.g. work order closed).
    pub fn revoke(&mut self, grantee: Uuid, resource_id: Uuid) {
        self.assignments
            .retain(|g| !(g.grantee == grantee && g.resource_id == resource_id));
    }

    /// Returns the owning organization of an association, if known.
    #[must_use]
    pub fn association_owner(&self, association_id: Uuid) -> Option<Uuid> {
        self.association_owners
            .iter()
            .find(|(a, _)| *a == association_id)
            .map(|(_, o)| *o)
    }

    fn has_assignment(&self, grantee: Uuid, resource_id: Uuid) -> bool {
        self.assignments
            .iter()
            .any(|g| g.grantee == grantee && g.resource_id == resource_id)
    }

    /// Evaluates one predicate.
    ///
    /// # Errors
    ///
    /// - [`TenancyError::NoContext`] when `ctx` is `None`, for every
    ///   statement kind: a transaction without an asserted context has no
    ///   tenant-scoped access at all.
    /// - [`TenancyError::CrossTenantWrite`] when an insert/update stamps the
    ///   row with an association not owned by the context's organization.
    pub fn evaluate(
        &self,
        scope: TableScope,
        statement: Statement,
        ctx: Option<&TenantContext>,
        actor: Uuid,
        resource_id: Uuid,
        row: &RowScope,
    ) -> Result<Access, TenancyError> {
        let Some(ctx) = ctx else {
            return Err(TenancyError::NoContext);
        };

        if matches!(statement, Statement::Insert | Statement::Update) {
            let owner = row.association_id.and_then(|a| self.association_owner(a));
            check_association_stamp(ctx, row, owner)?;
        }

        let granted = match statement {
            Statement::Select => {
                let assignment = scope == TableScope::Tiered
                    && self.has_assignment(actor, resource_id);
                read_predicate(scope, Some(ctx), row, assignment)
            }
            Statement::Insert | Statement::Update | Statement::Delete => {
                write_predicate(scope, Some(ctx), row)
            }
        };

        Ok(if granted { Access::Granted } else { Access::Denied })
    }

    /// Read convenience: true only when the row is visible.
    ///
    /// Any failure (including a missing context) reads as "row does not
    /// exist".
    #[must_use]
    pub fn visible(
        &self,
        scope: TableScope,
        ctx: Option<&TenantContext>,
        actor: Uuid,
        resource_id: Uuid,
        row: &RowScope,
    ) -> bool {
        matches!(
            self.evaluate(scope, Statement::Select, ctx, actor, resource_id, row),
            Ok(Access::Granted)
        )
    }

    /// Write convenience: maps `Denied` to [`TenancyError::WriteDenied`].
    pub fn authorize_write(
        &self,
        scope: TableScope,
        statement: Statement,
        ctx: Option<&TenantContext>,
        actor: Uuid,
        resource_id: Uuid,
        row: &RowScope,
    ) -> Result<(), TenancyError> {
        debug_assert!(statement.is_write());
        match self.evaluate(scope, statement, ctx, actor, resource_id, row)? {
            Access::Granted => Ok(()),
            Access::Denied => Err(TenancyError::WriteDenied),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (Uuid, Uuid, Uuid, Uuid) {
        (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn test_no_context_denies_every_statement() {
        let engine = PolicyEngine::new();
        let (org, _, actor, resource) = ids();
        let row = RowScope::org(org);

        for statement in [
            Statement::Select,
            Statement::Insert,
            Statement::Update,
            Statement::Delete,
        ] {
            for scope in [TableScope::Direct, TableScope::Tiered] {
                let result = engine.evaluate(scope, statement, None, actor, resource, &row);
                assert!(
                    matches!(result, Err(TenancyError::NoContext)),
                    "{scope:?}/{statement:?} must fail without context"
                );
            }
        }
        assert!(!engine.visible(TableScope::Tiered, None, actor, resource, &row));
    }

    #[test]
    fn test_direct_scope_is_org_equality() {
        let engine = PolicyEngine::new();
        let (org, other_org, actor, resource) = ids();
        let ctx = TenantContext::member(org, Uuid::new_v4());

        assert!(engine.visible(
            TableScope::Direct,
            Some(&ctx),
            actor,
            resource,
            &RowScope::org(org)
        ));
        assert!(!engine.visible(
            TableScope::Direct,
            Some(&ctx),
            actor,
            resource,
            &RowScope::org(other_org)
        ));
    }

    #[test]
    fn test_null_association_is_global() {
        let engine = PolicyEngine::new();
        let (org, _, actor, resource) = ids();
        let row = RowScope::org(org); // association_id = NULL

        let assoc_y = TenantContext::member(org, Uuid::new_v4());
        let assoc_z = TenantContext::member(org, Uuid::new_v4());
        let no_assoc = TenantContext {
            organization_id: org,
            association_id: None,
            is_org_staff: false,
        };

        for ctx in [assoc_y, assoc_z, no_assoc] {
            assert!(
                engine.visible(TableScope::Tiered, Some(&ctx), actor, resource, &row),
                "NULL association must always match, ctx={ctx}"
            );
        }
    }

    #[test]
    fn test_staff_bypass_sees_all_associations() {
        let engine = PolicyEngine::new();
        let (org, _, actor, resource) = ids();
        let ctx = TenantContext::staff(org);

        let scoped = RowScope::assoc(org, Uuid::new_v4());
        assert!(engine.visible(TableScope::Tiered, Some(&ctx), actor, resource, &scoped));

        // Staff bypass never crosses the organization boundary.
        let foreign = RowScope::assoc(Uuid::new_v4(), Uuid::new_v4());
        assert!(!engine.visible(TableScope::Tiered, Some(&ctx), actor, resource, &foreign));
    }

    #[test]
    fn test_member_sees_only_own_association() {
        let engine = PolicyEngine::new();
        let (org, _, actor, resource) = ids();
        let assoc = Uuid::new_v4();
        let ctx = TenantContext::member(org, assoc);

        assert!(engine.visible(
            TableScope::Tiered,
            Some(&ctx),
            actor,
            resource,
            &RowScope::assoc(org, assoc)
        ));
        assert!(!engine.visible(
            TableScope::Tiered,
            Some(&ctx),
            actor,
            resource,
            &RowScope::assoc(org, Uuid::new_v4())
        ));
    }

    #[test]
    fn test_assignment_grants_read_across_associations() {
        let mut engine = PolicyEngine::new();
        let (org, _, provider, document) = ids();
        let home_assoc = Uuid::new_v4();
        let other_assoc = Uuid::new_v4();
        let ctx = TenantContext::member(org, home_assoc);

        let row = RowScope::assoc(org, other_assoc);
        assert!(!engine.visible(TableScope::Tiered, Some(&ctx), provider, document, &row));

        engine.grant(AssignmentGrant {
            grantee: provider,
            resource_id: document,
            reason: GrantReason::WorkOrderAssignment,
        });
        assert!(engine.visible(TableScope::Tiered, Some(&ctx), provider, document, &row));

        // The grant is per-resource and per-principal.
        assert!(!engine.visible(
            TableScope::Tiered,
            Some(&ctx),
            provider,
            Uuid::new_v4(),
            &row
        ));
        assert!(!engine.visible(
            TableScope::Tiered,
            Some(&ctx),
            Uuid::new_v4(),
            document,
            &row
        ));
    }

    #[test]
    fn test_assignment_does_not_widen_writes() {
        let mut engine = PolicyEngine::new();
        let (org, _, provider, document) = ids();
        let other_assoc = Uuid::new_v4();
        engine.register_association(other_assoc, org);
        engine.grant(AssignmentGrant {
            grantee: provider,
            resource_id: document,
            reason: GrantReason::WorkOrderAssignment,
        });

        let ctx = TenantContext::member(org, Uuid::new_v4());
        let row = RowScope::assoc(org, other_assoc);

        // Read passes via the assignment branch...
        assert!(engine.visible(TableScope::Tiered, Some(&ctx), provider, document, &row));

        // ...but every write against the same row is denied.
        for statement in [Statement::Insert, Statement::Update, Statement::Delete] {
            let result = engine.authorize_write(
                TableScope::Tiered,
                statement,
                Some(&ctx),
                provider,
                document,
                &row,
            );
            assert!(
                matches!(result, Err(TenancyError::WriteDenied)),
                "{statement:?} must ignore assignment grants"
            );
        }
    }

    #[test]
    fn test_cross_org_insert_rejected() {
        let mut engine = PolicyEngine::new();
        let (org_x, org_y, actor, resource) = ids();
        let assoc_of_y = Uuid::new_v4();
        engine.register_association(assoc_of_y, org_y);

        // Row stamped org=X but with an association belonging to org Y.
        let row = RowScope::assoc(org_x, assoc_of_y);
        let ctx = TenantContext::staff(org_x);

        let result = engine.evaluate(
            TableScope::Tiered,
            Statement::Insert,
            Some(&ctx),
            actor,
            resource,
            &row,
        );
        assert!(matches!(
            result,
            Err(TenancyError::CrossTenantWrite { association_id }) if association_id == assoc_of_y
        ));
    }

    #[test]
    fn test_unknown_association_stamp_rejected() {
        let engine = PolicyEngine::new();
        let (org, _, actor, resource) = ids();
        let ctx = TenantContext::staff(org);
        let row = RowScope::assoc(org, Uuid::new_v4());

        let result = engine.evaluate(
            TableScope::Tiered,
            Statement::Insert,
            Some(&ctx),
            actor,
            resource,
            &row,
        );
        assert!(matches!(result, Err(TenancyError::CrossTenantWrite { .. })));
    }

    #[test]
    fn test_org_wide_insert_needs_no_stamp_check() {
        let engine = PolicyEngine::new();
        let (org, _, actor, resource) = ids();
        let ctx = TenantContext::member(org, Uuid::new_v4());
        let row = RowScope::org(org);

        assert!(engine
            .authorize_write(
                TableScope::Tiered,
                Statement::Insert,
                Some(&ctx),
                actor,
                resource,
                &row,
            )
            .is_ok());
    }

    #[test]
    fn test_update_stamp_check_applies() {
        let mut engine = PolicyEngine::new();
        let (org_x, org_y, actor, resource) = ids();
        let assoc_of_y = Uuid::new_v4();
        engine.register_association(assoc_of_y, org_y);

        let ctx = TenantContext::staff(org_x);
        let row = RowScope::assoc(org_x, assoc_of_y);

        let result = engine.evaluate(
            TableScope::Tiered,
            Statement::Update,
            Some(&ctx),
            actor,
            resource,
            &row,
        );
        assert!(matches!(result, Err(TenancyError::CrossTenantWrite { .. })));
    }
}
