//! Association management routes.

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
use strata_core::tenancy::{AuditAction, NewAuditEvent};
use strata_db::{
    AssociationRepository,
    entities::sea_orm_active_enums::AssociationRole,
    repositories::audit::AuditRepository,
};

/// Creates the association routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/associations", get(list_associations))
        .route("/associations", post(create_association))
        .route("/associations/{assoc_id}/members", get(list_members))
        .route("/associations/{assoc_id}/members", post(add_member))
}

/// Request body for creating an association.
#[derive(Debug, Deserialize)]
pub struct CreateAssociationRequest {
    /// Association name.
    pub name: String,
    /// URL-friendly slug, unique within the organization.
    pub slug: String,
}

/// Request body for adding a member.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// User to add.
    pub user_id: Uuid,
    /// Member role: board, owner, resident.
    pub role: String,
    /// Optional unit label.
    pub unit_label: Option<String>,
}

/// GET /associations - List associations of the organization in context.
async fn list_associations(State(state): State<AppState>, scope: TenantScope) -> impl IntoResponse {
    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let result = AssociationRepository::list(session.transaction()).await;
    let _ = session.rollback().await;

    match result {
        Ok(associations) => {
            let response: Vec<_> = associations
                .into_iter()
                .map(|a| {
                    json!({
                        "id": a.id,
                        "name": a.name,
                        "slug": a.slug,
                        "is_active": a.is_active
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "associations": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list associations");
            internal_error()
        }
    }
}

/// POST /associations - Create an association in the organization in context.
async fn create_association(
    State(state): State<AppState>,
    scope: TenantScope,
    Json(payload): Json<CreateAssociationRequest>,
) -> impl IntoResponse {
    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let org_id = session.context().organization_id;
    match AssociationRepository::create(session.transaction(), org_id, &payload.name, &payload.slug)
        .await
    {
        Ok(assoc) => {
            if let Err(e) = session.commit().await {
                error!(error = %e, "Failed to commit");
                return internal_error();
            }
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": assoc.id,
                    "name": assoc.name,
                    "slug": assoc.slug
                })),
            )
                .into_response()
        }
        Err(e) => {
            let _ = session.rollback().await;
            error!(error = %e, "Failed to create association");
            internal_error()
        }
    }
}

/// GET /associations/{assoc_id}/members - List members of an association.
async fn list_members(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(assoc_id): Path<Uuid>,
) -> impl IntoResponse {
    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let result = AssociationRepository::list_members(session.transaction(), assoc_id).await;
    let _ = session.rollback().await;

    match result {
        Ok(members) => {
            let response: Vec<_> = members
                .into_iter()
                .map(|m| {
                    json!({
                        "user_id": m.user_id,
                        "role": m.role,
                        "unit_label": m.unit_label
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "members": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list members");
            internal_error()
        }
    }
}

/// POST /associations/{assoc_id}/members - Add a member to an association.
async fn add_member(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(assoc_id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> impl IntoResponse {
    let role = match payload.role.as_str() {
        "board" => AssociationRole::Board,
        "owner" => AssociationRole::Owner,
        "resident" => AssociationRole::Resident,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_role",
                    "message": "Unknown association role"
                })),
            )
                .into_response();
        }
    };

    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let org_id = session.context().organization_id;
    let result = AssociationRepository::add_member(
        session.transaction(),
        org_id,
        assoc_id,
        payload.user_id,
        role,
        payload.unit_label.as_deref(),
    )
    .await;

    match result {
        Ok(member) => {
            let audit = AuditRepository::record(
                session.transaction(),
                NewAuditEvent::state_change(
                    org_id,
                    Some(assoc_id),
                    scope.actor(),
                    AuditAction::MemberAdded,
                    None,
                    Some(json!({ "user_id": member.user_id, "role": payload.role })),
                ),
            )
            .await;
            if let Err(e) = audit {
                error!(error = %e, "Failed to record member-added audit event");
            }

            if let Err(e) = session.commit().await {
                error!(error = %e, "Failed to commit");
                return internal_error();
            }
            (
                StatusCode::CREATED,
                Json(json!({
                    "user_id": member.user_id,
                    "association_id": member.association_id,
                    "role": member.role
                })),
            )
                .into_response()
        }
        Err(e) => {
            let _ = session.rollback().await;
            error!(error = %e, "Failed to add member");
            internal_error()
        }
    }
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
