//! Row-Level Security (RLS) context management.
//!
//! This module is the context store: it maps a validated [`TenantContext`]
//! onto `PostgreSQL` session variables with `SET LOCAL`, scoped to one
//! transaction. The RLS policies installed by the migrations read those
//! variables on every row access.
//!
//! The assertion is UNCONDITIONAL: it runs at the start of every
//! transaction that touches tenant-scoped data, whether or not the values
//! match the previous transaction on the same physical connection. Pooled
//! connections retain session state across logical requests; skipping the
//! assertion "because nothing changed" would let the previous request's
//! context leak into this one.
//!
//! # Usage
//!
//! ```ignore
//! use strata_db::rls::TenantSession;
//!
//! // In your handler or middleware:
//! let session = TenantSession::begin(&db, &ctx, actor).await?;
//!
//! // Use session.transaction() for all queries
//! let docs = documents::Entity::find().all(session.transaction()).await?;
//!
//! // Commit when done
//! session.commit().await?;
//! ```

use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, Set,
    TransactionTrait,
};
use tracing::error;
use uuid::Uuid;

use crate::entities::{audit_events, sea_orm_active_enums};
use strata_core::tenancy::{Actor, ActorType, NewAuditEvent, TenantContext};

/// A database transaction with an asserted tenant context.
///
/// Construction order is the correctness invariant: the context is set
/// before the struct exists, so no tenant-scoped statement can run through
/// a `TenantSession` ahead of its assertion. Without a `TenantSession` (or
/// an explicit [`set_tenant_context`] call) the session variables are
/// unset and every tenant policy evaluates to deny-all.
pub struct TenantSession {
    txn: DatabaseTransaction,
    context: TenantContext,
}

impl TenantSession {
    /// Begins a transaction and asserts `ctx` on it.
    ///
    /// Also appends one context-switch audit event, every time, including
    /// when `ctx` repeats the previous transaction's values.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the
    /// context cannot be set.
    pub async fn begin(
        db: &DatabaseConnection,
        ctx: &TenantContext,
        actor: Actor,
    ) -> Result<Self, DbErr> {
        Self::begin_with_reason(db, ctx, actor, None, None).await
    }

    /// Like [`Self::begin`], tagging the context-switch audit event with a
    /// reason and the work item that motivated the switch.
    pub async fn begin_with_reason(
        db: &DatabaseConnection,
        ctx: &TenantContext,
        actor: Actor,
        reason: Option<&str>,
        item: Option<(&str, Uuid)>,
    ) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        set_tenant_context(&txn, ctx, actor, reason, item).await?;

        Ok(Self { txn, context: *ctx })
    }

    /// Returns a reference to the underlying transaction for executing queries.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Returns the asserted context.
    #[must_use]
    pub fn context(&self) -> &TenantContext {
        &self.context
    }

    /// Commits the transaction, persisting all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction, discarding all changes.
    ///
    /// `SET LOCAL` state dies with the transaction either way; the next
    /// transaction on this physical connection starts context-less until
    /// its own assertion.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Extension trait for `DatabaseConnection` to easily open tenant sessions.
#[async_trait::async_trait]
pub trait TenantSessionExt {
    /// Begins a transaction with `ctx` asserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant session cannot be created.
    async fn with_tenant(&self, ctx: &TenantContext, actor: Actor)
    -> Result<TenantSession, DbErr>;
}

#[async_trait::async_trait]
impl TenantSessionExt for DatabaseConnection {
    async fn with_tenant(
        &self,
        ctx: &TenantContext,
        actor: Actor,
    ) -> Result<TenantSession, DbErr> {
        TenantSession::begin(self, ctx, actor).await
    }
}

/// Asserts the tenant context on an existing transaction.
///
/// Must be the first statement of any transaction that touches
/// tenant-scoped data. Executes `SET LOCAL` for the organization,
/// association, acting user, and staff flag, then appends one
/// context-switch audit event.
///
/// The audit append runs inside a savepoint: if it fails, the failure is
/// escalated to the error log but the business transaction proceeds. The
/// switch log is evidence, not a gate.
///
/// # Errors
///
/// Returns an error if the context cannot be set.
pub async fn set_tenant_context(
    txn: &DatabaseTransaction,
    ctx: &TenantContext,
    actor: Actor,
    reason: Option<&str>,
    item: Option<(&str, Uuid)>,
) -> Result<(), DbErr> {
    // SET LOCAL cannot be parameterized; all interpolated values are typed
    // (Uuid, bool), not raw client input.
    let org = ctx.organization_id;
    let assoc = ctx
        .association_id
        .map(|a| a.to_string())
        .unwrap_or_default();
    let user = actor.id.map(|u| u.to_string()).unwrap_or_default();
    let staff = ctx.is_org_staff;

    txn.execute_unprepared(&format!("SET LOCAL app.current_organization_id = '{org}'"))
        .await?;
    txn.execute_unprepared(&format!("SET LOCAL app.current_association_id = '{assoc}'"))
        .await?;
    txn.execute_unprepared(&format!("SET LOCAL app.current_user_id = '{user}'"))
        .await?;
    txn.execute_unprepared(&format!("SET LOCAL app.is_org_staff = '{staff}'"))
        .await?;

    record_context_switch(txn, ctx, actor, reason, item).await;

    Ok(())
}

/// Appends the context-switch audit event for one assertion.
///
/// Failure is contained in a savepoint and logged; it never aborts the
/// surrounding transaction.
async fn record_context_switch(
    txn: &DatabaseTransaction,
    ctx: &TenantContext,
    actor: Actor,
    reason: Option<&str>,
    item: Option<(&str, Uuid)>,
) {
    let event = NewAuditEvent::context_switch(ctx, actor, reason, item);

    let savepoint = match txn.begin().await {
        Ok(sp) => sp,
        Err(e) => {
            error!(error = %e, context = %ctx, "failed to open savepoint for context-switch audit");
            return;
        }
    };

    let row = audit_events::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(event.organization_id),
        association_id: Set(event.association_id),
        performed_by: Set(event.actor.id),
        actor_type: Set(actor_type_to_db(event.actor.actor_type)),
        action: Set(event.action.as_str().to_string()),
        previous_state: Set(event.previous_state),
        new_state: Set(event.new_state),
        performed_at: Set(chrono::Utc::now().into()),
    };

    match row.insert(&savepoint).await {
        Ok(_) => {
            if let Err(e) = savepoint.commit().await {
                error!(error = %e, context = %ctx, "failed to commit context-switch audit event");
            }
        }
        Err(e) => {
            error!(error = %e, context = %ctx, "failed to record context-switch audit event");
            if let Err(e) = savepoint.rollback().await {
                error!(error = %e, "failed to roll back audit savepoint");
            }
        }
    }
}

pub(crate) fn actor_type_to_db(actor_type: ActorType) -> sea_orm_active_enums::ActorType {
    match actor_type {
        ActorType::User => sea_orm_active_enums::ActorType::User,
        ActorType::Provider => sea_orm_active_enums::ActorType::Provider,
        ActorType::System => sea_orm_active_enums::ActorType::System,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Full behavior needs a real PostgreSQL database with the policies
    // installed; see tests/rls_isolation_test.rs.

    #[test]
    fn test_set_local_sql_format() {
        let org = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let sql = format!("SET LOCAL app.current_organization_id = '{org}'");
        assert_eq!(
            sql,
            "SET LOCAL app.current_organization_id = '550e8400-e29b-41d4-a716-446655440000'"
        );
    }

    #[test]
    fn test_absent_association_serializes_to_empty_setting() {
        let ctx = TenantContext::staff(Uuid::new_v4());
        let assoc = ctx
            .association_id
            .map(|a| a.to_string())
            .unwrap_or_default();
        // Empty string parses to NULL in the app_current_association_id()
        // helper, which every policy treats as "no association focus".
        assert_eq!(assoc, "");
    }

    #[test]
    fn test_actor_type_mapping() {
        assert_eq!(
            actor_type_to_db(ActorType::System),
            sea_orm_active_enums::ActorType::System
        );
        assert_eq!(
            actor_type_to_db(ActorType::Provider),
            sea_orm_active_enums::ActorType::Provider
        );
    }
}
