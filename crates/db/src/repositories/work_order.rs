//! Work order repository for database operations.
//!
//! Work orders carry the assignment lifecycle: assigning a provider
//! materializes assignment grants (the facts the document and work-order
//! read policies probe), and completion revokes them.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{
    assignment_grants, associations,
    sea_orm_active_enums::{GrantReason, GrantStatus, WorkOrderStatus},
    work_orders,
};
use crate::repositories::audit::AuditRepository;
use strata_core::tenancy::{
    Actor, AuditAction, NewAuditEvent, RowScope, TenantContext, TenancyError, policy,
};

/// Work-order-related errors.
#[derive(Debug, Error)]
pub enum WorkOrderError {
    /// Tenant policy rejected the operation.
    #[error(transparent)]
    Tenancy(#[from] TenancyError),

    /// Work order not found (or not visible under the active context).
    #[error("work order not found: {0}")]
    NotFound(Uuid),

    /// Work order is not in a state that allows the operation.
    #[error("work order {0} is not open for assignment")]
    NotAssignable(Uuid),

    /// Database error.
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Input for creating a work order.
#[derive(Debug, Clone)]
pub struct CreateWorkOrderInput {
    /// Association scope; `None` creates an organization-wide work order.
    pub association_id: Option<Uuid>,
    /// Work order title.
    pub title: String,
    /// Description of the work.
    pub description: Option<String>,
}

/// Work order repository for CRUD and assignment operations.
#[derive(Debug, Clone)]
pub struct WorkOrderRepository;

impl WorkOrderRepository {
    /// Creates a work order under the active context.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyError::CrossTenantWrite`] when the association
    /// stamp does not belong to the context's organization; database errors
    /// otherwise.
    pub async fn create(
        txn: &DatabaseTransaction,
        ctx: &TenantContext,
        created_by: Uuid,
        input: CreateWorkOrderInput,
    ) -> Result<work_orders::Model, WorkOrderError> {
        let row = RowScope {
            organization_id: ctx.organization_id,
            association_id: input.association_id,
        };
        let owner = match input.association_id {
            Some(assoc) => associations::Entity::find_by_id(assoc)
                .one(txn)
                .await?
                .map(|a| a.organization_id),
            None => None,
        };
        policy::check_association_stamp(ctx, &row, owner)?;

        let now = chrono::Utc::now().into();
        let order = work_orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(ctx.organization_id),
            association_id: Set(input.association_id),
            title: Set(input.title),
            description: Set(input.description),
            status: Set(WorkOrderStatus::Open),
            assigned_to: Set(None),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let order = order.insert(txn).await?;

        AuditRepository::record(
            txn,
            NewAuditEvent::state_change(
                ctx.organization_id,
                order.association_id,
                Actor::user(created_by),
                AuditAction::WorkOrderCreated,
                None,
                Some(json!({ "id": order.id, "title": order.title, "status": "open" })),
            ),
        )
        .await?;

        Ok(order)
    }

    /// Finds a work order by ID under the active context.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<work_orders::Model>, DbErr> {
        work_orders::Entity::find_by_id(id).one(txn).await
    }

    /// Lists work orders visible under the active context.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        txn: &DatabaseTransaction,
        status: Option<WorkOrderStatus>,
    ) -> Result<Vec<work_orders::Model>, DbErr> {
        let mut query = work_orders::Entity::find();
        if let Some(status) = status {
            query = query.filter(work_orders::Column::Status.eq(status));
        }
        query
            .order_by_desc(work_orders::Column::CreatedAt)
            .all(txn)
            .await
    }

    /// Assigns a provider to an open work order.
    ///
    /// Materializes an assignment grant for the work order itself plus one
    /// per linked document, all in the same transaction as the status
    /// change; the provider's read bypass appears exactly when the
    /// assignment does.
    ///
    /// # Errors
    ///
    /// Returns [`WorkOrderError::NotFound`] when the order is not visible,
    /// [`WorkOrderError::NotAssignable`] when it is not open.
    pub async fn assign(
        txn: &DatabaseTransaction,
        ctx: &TenantContext,
        actor: Actor,
        work_order_id: Uuid,
        provider_id: Uuid,
        document_ids: &[Uuid],
    ) -> Result<work_orders::Model, WorkOrderError> {
        let order = Self::find_by_id(txn, work_order_id)
            .await?
            .ok_or(WorkOrderError::NotFound(work_order_id))?;

        if order.status != WorkOrderStatus::Open {
            return Err(WorkOrderError::NotAssignable(work_order_id));
        }

        let previous_status = order.status;
        let association_id = order.association_id;

        let mut model: work_orders::ActiveModel = order.into();
        model.status = Set(WorkOrderStatus::Assigned);
        model.assigned_to = Set(Some(provider_id));
        model.updated_at = Set(chrono::Utc::now().into());
        let order = model.update(txn).await?;

        // One grant for the order, one per document the provider needs.
        let mut resources = vec![work_order_id];
        resources.extend_from_slice(document_ids);
        let now = chrono::Utc::now().into();
        for resource_id in resources {
            let grant = assignment_grants::ActiveModel {
                id: Set(Uuid::new_v4()),
                organization_id: Set(ctx.organization_id),
                grantee_id: Set(provider_id),
                resource_id: Set(resource_id),
                work_order_id: Set(work_order_id),
                reason: Set(GrantReason::WorkOrderAssignment),
                status: Set(GrantStatus::Active),
                created_at: Set(now),
                updated_at: Set(now),
            };
            grant.insert(txn).await?;
        }

        AuditRepository::record(
            txn,
            NewAuditEvent::state_change(
                ctx.organization_id,
                association_id,
                actor,
                AuditAction::WorkOrderAssigned,
                Some(json!({ "status": status_str(previous_status) })),
                Some(json!({ "status": "assigned", "assigned_to": provider_id })),
            ),
        )
        .await?;

        Ok(order)
    }

    /// Completes a work order and revokes its assignment grants.
    ///
    /// # Errors
    ///
    /// Returns [`WorkOrderError::NotFound`] when the order is not visible.
    pub async fn complete(
        txn: &DatabaseTransaction,
        ctx: &TenantContext,
        actor: Actor,
        work_order_id: Uuid,
    ) -> Result<work_orders::Model, WorkOrderError> {
        let order = Self::find_by_id(txn, work_order_id)
            .await?
            .ok_or(WorkOrderError::NotFound(work_order_id))?;

        let previous_status = order.status;
        let association_id = order.association_id;

        let mut model: work_orders::ActiveModel = order.into();
        model.status = Set(WorkOrderStatus::Completed);
        model.updated_at = Set(chrono::Utc::now().into());
        let order = model.update(txn).await?;

        use sea_orm::sea_query::Expr;
        assignment_grants::Entity::update_many()
            .col_expr(
                assignment_grants::Column::Status,
                Expr::value(GrantStatus::Revoked),
            )
            .filter(assignment_grants::Column::WorkOrderId.eq(work_order_id))
            .filter(assignment_grants::Column::Status.eq(GrantStatus::Active))
            .exec(txn)
            .await?;

        AuditRepository::record(
            txn,
            NewAuditEvent::state_change(
                ctx.organization_id,
                association_id,
                actor,
                AuditAction::WorkOrderCompleted,
                Some(json!({ "status": status_str(previous_status) })),
                Some(json!({ "status": "completed" })),
            ),
        )
        .await?;

        Ok(order)
    }
}

const fn status_str(status: WorkOrderStatus) -> &'static str {
    match status {
        WorkOrderStatus::Open => "open",
        WorkOrderStatus::Assigned => "assigned",
        WorkOrderStatus::InProgress => "in_progress",
        WorkOrderStatus::Completed => "completed",
        WorkOrderStatus::Cancelled => "cancelled",
    }
}
