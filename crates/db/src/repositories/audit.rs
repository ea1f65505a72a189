//! Audit trail repository.
//!
//! One append path, one query path. No update or delete methods exist,
//! and the schema backs that up: the audit table has no UPDATE/DELETE
//! policies and an append-only trigger.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::audit_events;
use crate::rls::actor_type_to_db;
use strata_core::tenancy::{AuditFilter, NewAuditEvent};
use strata_shared::types::PageResponse;

/// Audit repository: append and query.
#[derive(Debug, Clone)]
pub struct AuditRepository;

impl AuditRepository {
    /// Appends one audit event in the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails. Callers recording
    /// business state changes propagate the error with their transaction;
    /// the context store is the one caller that instead contains the
    /// failure in a savepoint.
    pub async fn record(
        txn: &DatabaseTransaction,
        event: NewAuditEvent,
    ) -> Result<audit_events::Model, DbErr> {
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

        row.insert(txn).await
    }

    /// Lists events for the organization in context, newest first.
    ///
    /// The organization boundary comes from the tenant policies, not from
    /// the filter; this query is as tenant-scoped as any other read.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_events(
        txn: &DatabaseTransaction,
        filter: AuditFilter,
    ) -> Result<PageResponse<audit_events::Model>, DbErr> {
        let page = filter.page.clamped();

        let mut query = audit_events::Entity::find();
        if let Some(assoc) = filter.association_id {
            query = query.filter(audit_events::Column::AssociationId.eq(assoc));
        }
        if let Some(actor) = filter.actor_id {
            query = query.filter(audit_events::Column::PerformedBy.eq(actor));
        }
        if let Some(action) = filter.action {
            query = query.filter(audit_events::Column::Action.eq(action.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(audit_events::Column::PerformedAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(audit_events::Column::PerformedAt.lte(to));
        }

        let query = query.order_by_desc(audit_events::Column::PerformedAt);
        let total = query.clone().count(txn).await?;
        let data = query
            .paginate(txn, page.limit())
            .fetch_page(u64::from(page.page - 1))
            .await?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }
}
