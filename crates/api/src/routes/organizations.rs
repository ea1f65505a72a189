//! Organization management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, middleware::TenantScope, middleware::auth::AuthUser};
use strata_db::{
    OrganizationRepository,
    entities::sea_orm_active_enums::OrgRole,
};
use strata_shared::auth::{AddStaffRequest, CreateOrganizationRequest};

/// Creates the organization routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations", post(create_organization))
        .route("/organizations/{org_id}", get(get_organization))
        .route("/organizations/{org_id}/staff", get(list_staff))
        .route("/organizations/{org_id}/staff", post(add_staff))
}

/// POST /organizations - Create an organization with the caller as owner.
async fn create_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateOrganizationRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_failed",
                "message": e.to_string()
            })),
        )
            .into_response();
    }

    match OrganizationRepository::create_with_owner(
        &state.db,
        &payload.name,
        &payload.slug,
        &payload.timezone,
        auth.user_id(),
    )
    .await
    {
        Ok(org) => {
            info!(org_id = %org.id, "Organization created");
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": org.id,
                    "name": org.name,
                    "slug": org.slug,
                    "timezone": org.timezone
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create organization");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// GET /organizations/{org_id} - Fetch the organization in context.
async fn get_organization(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let result = OrganizationRepository::find_by_id(session.transaction(), org_id).await;
    let _ = session.rollback().await;

    match result {
        // An organization outside the active context is absent, not
        // forbidden.
        Ok(Some(org)) => (
            StatusCode::OK,
            Json(json!({
                "id": org.id,
                "name": org.name,
                "slug": org.slug,
                "timezone": org.timezone,
                "is_active": org.is_active
            })),
        )
            .into_response(),
        Ok(None) => not_found(),
        Err(e) => {
            error!(error = %e, "Failed to fetch organization");
            internal_error()
        }
    }
}

/// GET /organizations/{org_id}/staff - List staff memberships.
async fn list_staff(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let result = OrganizationRepository::get_staff(session.transaction(), org_id).await;
    let _ = session.rollback().await;

    match result {
        Ok(staff) => {
            let response: Vec<_> = staff
                .into_iter()
                .map(|(user, membership)| {
                    json!({
                        "user_id": user.id,
                        "email": user.email,
                        "full_name": user.full_name,
                        "role": membership.role
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "staff": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list staff");
            internal_error()
        }
    }
}

/// POST /organizations/{org_id}/staff - Add a staff member.
async fn add_staff(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<AddStaffRequest>,
) -> impl IntoResponse {
    let Ok(role) = parse_org_role(&payload.role) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_role",
                "message": "Unknown staff role"
            })),
        )
            .into_response();
    };

    let user_repo = strata_db::UserRepository::new((*state.db).clone());
    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => return not_found(),
        Err(e) => {
            error!(error = %e, "Failed to look up user");
            return internal_error();
        }
    };

    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    match OrganizationRepository::add_staff(session.transaction(), org_id, user.id, role).await {
        Ok(membership) => {
            if let Err(e) = session.commit().await {
                error!(error = %e, "Failed to commit");
                return internal_error();
            }
            (
                StatusCode::CREATED,
                Json(json!({
                    "user_id": membership.user_id,
                    "organization_id": membership.organization_id,
                    "role": membership.role
                })),
            )
                .into_response()
        }
        Err(e) => {
            let _ = session.rollback().await;
            error!(error = %e, "Failed to add staff member");
            internal_error()
        }
    }
}

fn parse_org_role(s: &str) -> Result<OrgRole, ()> {
    // Reuse the core role vocabulary for validation, then map to the
    // database enum.
    let role = strata_core::tenancy::OrgRole::from_str(s).map_err(|_| ())?;
    Ok(match role {
        strata_core::tenancy::OrgRole::Owner => OrgRole::Owner,
        strata_core::tenancy::OrgRole::Admin => OrgRole::Admin,
        strata_core::tenancy::OrgRole::Manager => OrgRole::Manager,
        strata_core::tenancy::OrgRole::Concierge => OrgRole::Concierge,
        strata_core::tenancy::OrgRole::Viewer => OrgRole::Viewer,
    })
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
