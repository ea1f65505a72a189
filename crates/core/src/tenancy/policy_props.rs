//! Property-based tests for the policy predicate engine.
//!
//! - Null association always matches within the organization
//! - Staff bypass never crosses the organization boundary
//! - Writes are never wider than reads
//! - Missing context denies everything

use proptest::prelude::*;
use uuid::Uuid;

use super::context::TenantContext;
use super::policy::{
    AssignmentGrant, GrantReason, PolicyEngine, RowScope, Statement, TableScope, read_predicate,
    write_predicate,
};

/// Strategy for UUIDs drawn from a small pool, so collisions (same org,
/// same association) actually happen.
fn pooled_uuid() -> impl Strategy<Value = Uuid> {
    (0u8..8).prop_map(|n| Uuid::from_u128(u128::from(n) + 1))
}

fn arb_row() -> impl Strategy<Value = RowScope> {
    (pooled_uuid(), proptest::option::of(pooled_uuid())).prop_map(|(org, assoc)| RowScope {
        organization_id: org,
        association_id: assoc,
    })
}

fn arb_context() -> impl Strategy<Value = TenantContext> {
    (pooled_uuid(), proptest::option::of(pooled_uuid()), any::<bool>()).prop_map(
        |(org, assoc, staff)| TenantContext {
            organization_id: org,
            association_id: assoc,
            is_org_staff: staff,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A row with NULL association is visible under ANY context of its
    /// organization, whatever the association focus or staff flag.
    #[test]
    fn prop_null_association_always_matches(
        org in pooled_uuid(),
        assoc in proptest::option::of(pooled_uuid()),
        staff in any::<bool>(),
    ) {
        let ctx = TenantContext { organization_id: org, association_id: assoc, is_org_staff: staff };
        let row = RowScope { organization_id: org, association_id: None };
        prop_assert!(read_predicate(TableScope::Tiered, Some(&ctx), &row, false));
        prop_assert!(write_predicate(TableScope::Tiered, Some(&ctx), &row));
    }

    /// No predicate ever passes across an organization boundary, for any
    /// combination of staff flag, association focus, and assignment facts.
    #[test]
    fn prop_org_boundary_is_absolute(
        ctx in arb_context(),
        row in arb_row(),
        assignment in any::<bool>(),
    ) {
        prop_assume!(ctx.organization_id != row.organization_id);
        for scope in [TableScope::Direct, TableScope::Tiered] {
            prop_assert!(!read_predicate(scope, Some(&ctx), &row, assignment));
            prop_assert!(!write_predicate(scope, Some(&ctx), &row));
        }
    }

    /// Whatever is writable is also readable: the write predicate is never
    /// wider than the read predicate.
    #[test]
    fn prop_writes_never_wider_than_reads(
        ctx in arb_context(),
        row in arb_row(),
    ) {
        for scope in [TableScope::Direct, TableScope::Tiered] {
            if write_predicate(scope, Some(&ctx), &row) {
                prop_assert!(read_predicate(scope, Some(&ctx), &row, false));
            }
        }
    }

    /// Staff of the row's organization see every association-scoped row of
    /// that organization.
    #[test]
    fn prop_staff_bypass_within_org(
        org in pooled_uuid(),
        row_assoc in proptest::option::of(pooled_uuid()),
        focus in proptest::option::of(pooled_uuid()),
    ) {
        let ctx = TenantContext { organization_id: org, association_id: focus, is_org_staff: true };
        let row = RowScope { organization_id: org, association_id: row_assoc };
        prop_assert!(read_predicate(TableScope::Tiered, Some(&ctx), &row, false));
    }

    /// Without a context, nothing is readable or writable.
    #[test]
    fn prop_no_context_denies_all(row in arb_row(), assignment in any::<bool>()) {
        for scope in [TableScope::Direct, TableScope::Tiered] {
            prop_assert!(!read_predicate(scope, None, &row, assignment));
            prop_assert!(!write_predicate(scope, None, &row));
        }
    }

    /// Assignment grants extend reads only; the write decision for any row
    /// is identical with and without the grant.
    #[test]
    fn prop_assignment_never_changes_write_decision(
        ctx in arb_context(),
        row in arb_row(),
        actor in pooled_uuid(),
        resource in pooled_uuid(),
    ) {
        let mut with_grant = PolicyEngine::new();
        if let Some(assoc) = row.association_id {
            with_grant.register_association(assoc, ctx.organization_id);
        }
        let without_grant = with_grant.clone();
        with_grant.grant(AssignmentGrant {
            grantee: actor,
            resource_id: resource,
            reason: GrantReason::WorkOrderAssignment,
        });

        for statement in [Statement::Insert, Statement::Update, Statement::Delete] {
            let a = with_grant
                .authorize_write(TableScope::Tiered, statement, Some(&ctx), actor, resource, &row)
                .is_ok();
            let b = without_grant
                .authorize_write(TableScope::Tiered, statement, Some(&ctx), actor, resource, &row)
                .is_ok();
            prop_assert_eq!(a, b, "assignment fact changed a {:?} decision", statement);
        }
    }
}
