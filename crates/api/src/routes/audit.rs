//! Audit trail query routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::TenantScope};
use strata_core::tenancy::{AuditAction, AuditFilter};
use strata_db::repositories::audit::AuditRepository;
use strata_shared::types::PageRequest;

/// Creates the audit routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/audit", get(list_events))
}

/// Query parameters for listing audit events.
#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    /// Restrict to one association.
    pub association_id: Option<Uuid>,
    /// Restrict to one actor.
    pub actor_id: Option<Uuid>,
    /// Restrict to one action (stable string form).
    pub action: Option<String>,
    /// Inclusive lower bound on event time.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on event time.
    pub to: Option<DateTime<Utc>>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// GET /audit - List events for the organization in context, newest first.
///
/// The organization boundary comes from the tenant session, not from a
/// query parameter; this read is as tenant-scoped as any other.
async fn list_events(
    State(state): State<AppState>,
    scope: TenantScope,
    Query(query): Query<ListEventsQuery>,
) -> impl IntoResponse {
    let action = match query.action.as_deref() {
        Some(s) => match AuditAction::from_str(s) {
            Ok(a) => Some(a),
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_action",
                        "message": "Unknown audit action"
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let mut page = PageRequest::default();
    if let Some(p) = query.page {
        page.page = p;
    }
    if let Some(pp) = query.per_page {
        page.per_page = pp;
    }

    let filter = AuditFilter {
        association_id: query.association_id,
        actor_id: query.actor_id,
        action,
        from: query.from,
        to: query.to,
        page,
    };

    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let result = AuditRepository::list_events(session.transaction(), filter).await;
    let _ = session.rollback().await;

    match result {
        Ok(page) => {
            let events: Vec<_> = page
                .data
                .iter()
                .map(|e| {
                    json!({
                        "id": e.id,
                        "organization_id": e.organization_id,
                        "association_id": e.association_id,
                        "performed_by": e.performed_by,
                        "actor_type": e.actor_type,
                        "action": e.action,
                        "previous_state": e.previous_state,
                        "new_state": e.new_state,
                        "performed_at": e.performed_at
                    })
                })
                .collect();
            (
                StatusCode::OK,
                Json(json!({ "events": events, "meta": page.meta })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list audit events");
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
