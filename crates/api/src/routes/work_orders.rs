//! Work order routes, including provider assignment.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::TenantScope};
use strata_db::repositories::work_order::{
    CreateWorkOrderInput, WorkOrderError, WorkOrderRepository,
};

/// Creates the work order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/work-orders", get(list_work_orders))
        .route("/work-orders", post(create_work_order))
        .route("/work-orders/{wo_id}", get(get_work_order))
        .route("/work-orders/{wo_id}/assign", post(assign_work_order))
        .route("/work-orders/{wo_id}/complete", post(complete_work_order))
}

/// Request body for creating a work order.
#[derive(Debug, Deserialize)]
pub struct CreateWorkOrderRequest {
    /// Association scope; omit for an organization-wide work order.
    pub association_id: Option<Uuid>,
    /// Work order title.
    pub title: String,
    /// Description of the work.
    pub description: Option<String>,
}

/// Request body for assigning a work order.
#[derive(Debug, Deserialize)]
pub struct AssignWorkOrderRequest {
    /// The service provider to assign.
    pub provider_id: Uuid,
    /// Documents the provider needs read access to for this job.
    #[serde(default)]
    pub document_ids: Vec<Uuid>,
}

fn wo_json(wo: &strata_db::entities::work_orders::Model) -> serde_json::Value {
    json!({
        "id": wo.id,
        "organization_id": wo.organization_id,
        "association_id": wo.association_id,
        "title": wo.title,
        "description": wo.description,
        "status": wo.status,
        "assigned_to": wo.assigned_to,
        "created_at": wo.created_at
    })
}

/// GET /work-orders - List work orders visible under the active context.
async fn list_work_orders(State(state): State<AppState>, scope: TenantScope) -> impl IntoResponse {
    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let result = WorkOrderRepository::list(session.transaction(), None).await;
    let _ = session.rollback().await;

    match result {
        Ok(orders) => {
            let data: Vec<_> = orders.iter().map(wo_json).collect();
            (StatusCode::OK, Json(json!({ "work_orders": data }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list work orders");
            internal_error()
        }
    }
}

/// POST /work-orders - Create a work order.
async fn create_work_order(
    State(state): State<AppState>,
    scope: TenantScope,
    Json(payload): Json<CreateWorkOrderRequest>,
) -> impl IntoResponse {
    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let ctx = *session.context();
    let result = WorkOrderRepository::create(
        session.transaction(),
        &ctx,
        scope.principal.user_id,
        CreateWorkOrderInput {
            association_id: payload.association_id,
            title: payload.title,
            description: payload.description,
        },
    )
    .await;

    match result {
        Ok(order) => {
            if let Err(e) = session.commit().await {
                error!(error = %e, "Failed to commit");
                return internal_error();
            }
            (StatusCode::CREATED, Json(wo_json(&order))).into_response()
        }
        Err(e) => {
            let _ = session.rollback().await;
            work_order_error(&e)
        }
    }
}

/// GET /work-orders/{wo_id} - Fetch one work order.
async fn get_work_order(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(wo_id): Path<Uuid>,
) -> impl IntoResponse {
    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let result = WorkOrderRepository::find_by_id(session.transaction(), wo_id).await;
    let _ = session.rollback().await;

    match result {
        Ok(Some(order)) => (StatusCode::OK, Json(wo_json(&order))).into_response(),
        Ok(None) => not_found(),
        Err(e) => {
            error!(error = %e, "Failed to fetch work order");
            internal_error()
        }
    }
}

/// POST /work-orders/{wo_id}/assign - Assign a provider.
async fn assign_work_order(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(wo_id): Path<Uuid>,
    Json(payload): Json<AssignWorkOrderRequest>,
) -> impl IntoResponse {
    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let ctx = *session.context();
    let result = WorkOrderRepository::assign(
        session.transaction(),
        &ctx,
        scope.actor(),
        wo_id,
        payload.provider_id,
        &payload.document_ids,
    )
    .await;

    match result {
        Ok(order) => {
            if let Err(e) = session.commit().await {
                error!(error = %e, "Failed to commit");
                return internal_error();
            }
            (StatusCode::OK, Json(wo_json(&order))).into_response()
        }
        Err(e) => {
            let _ = session.rollback().await;
            work_order_error(&e)
        }
    }
}

/// POST /work-orders/{wo_id}/complete - Complete a work order.
async fn complete_work_order(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(wo_id): Path<Uuid>,
) -> impl IntoResponse {
    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let ctx = *session.context();
    let result =
        WorkOrderRepository::complete(session.transaction(), &ctx, scope.actor(), wo_id).await;

    match result {
        Ok(order) => {
            if let Err(e) = session.commit().await {
                error!(error = %e, "Failed to commit");
                return internal_error();
            }
            (StatusCode::OK, Json(wo_json(&order))).into_response()
        }
        Err(e) => {
            let _ = session.rollback().await;
            work_order_error(&e)
        }
    }
}

fn work_order_error(e: &WorkOrderError) -> axum::response::Response {
    match e {
        // Invisible and nonexistent orders get the same answer.
        WorkOrderError::NotFound(_) => not_found(),
        WorkOrderError::NotAssignable(id) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "not_assignable",
                "message": format!("work order {id} is not open for assignment")
            })),
        )
            .into_response(),
        WorkOrderError::Tenancy(e) => (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": e.to_string()
            })),
        )
            .into_response(),
        WorkOrderError::Db(e) => {
            error!(error = %e, "Work order operation failed");
            internal_error()
        }
    }
}

fn not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": "Resource not found"
        })),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}
