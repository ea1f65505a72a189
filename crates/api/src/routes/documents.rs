//! Document routes.
//!
//! Every handler runs inside a tenant session; rows outside the active
//! context read as absent, and cross-tenant writes surface as
//! authorization failures before commit.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::TenantScope};
use strata_core::tenancy::{AuditAction, NewAuditEvent, TenancyError};
use strata_db::repositories::audit::AuditRepository;
use strata_db::repositories::document::{
    CreateDocumentInput, DocumentError, DocumentFilter, DocumentRepository, UpdateDocumentInput,
};
use strata_shared::types::PageRequest;

/// Creates the document routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/documents", get(list_documents))
        .route("/documents", post(create_document))
        .route("/documents/{doc_id}", get(get_document))
        .route("/documents/{doc_id}", put(update_document))
        .route("/documents/{doc_id}", delete(delete_document))
}

/// Query parameters for listing documents.
#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    /// Filter by association.
    pub association_id: Option<Uuid>,
    /// Filter by category.
    pub category: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Request body for creating a document.
#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    /// Association scope; omit for an organization-wide document.
    pub association_id: Option<Uuid>,
    /// Document title.
    pub title: String,
    /// Category label.
    pub category: String,
    /// Document body.
    pub body: Option<String>,
}

/// Request body for updating a document.
#[derive(Debug, Deserialize)]
pub struct UpdateDocumentRequest {
    /// New title.
    pub title: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New body.
    pub body: Option<String>,
}

fn doc_json(doc: &strata_db::entities::documents::Model) -> serde_json::Value {
    json!({
        "id": doc.id,
        "organization_id": doc.organization_id,
        "association_id": doc.association_id,
        "title": doc.title,
        "category": doc.category,
        "body": doc.body,
        "created_by": doc.created_by,
        "created_at": doc.created_at,
        "updated_at": doc.updated_at
    })
}

/// GET /documents - List documents visible under the active context.
async fn list_documents(
    State(state): State<AppState>,
    scope: TenantScope,
    Query(query): Query<ListDocumentsQuery>,
) -> impl IntoResponse {
    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let filter = DocumentFilter {
        association_id: query.association_id,
        category: query.category,
    };
    let mut page = PageRequest::default();
    if let Some(p) = query.page {
        page.page = p;
    }
    if let Some(pp) = query.per_page {
        page.per_page = pp;
    }

    let result = DocumentRepository::list(session.transaction(), filter, page).await;
    let _ = session.rollback().await;

    match result {
        Ok(page) => {
            let data: Vec<_> = page.data.iter().map(doc_json).collect();
            (
                StatusCode::OK,
                Json(json!({ "documents": data, "meta": page.meta })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list documents");
            internal_error()
        }
    }
}

/// POST /documents - Create a document.
async fn create_document(
    State(state): State<AppState>,
    scope: TenantScope,
    Json(payload): Json<CreateDocumentRequest>,
) -> impl IntoResponse {
    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let ctx = *session.context();
    let result = DocumentRepository::create(
        session.transaction(),
        &ctx,
        scope.principal.user_id,
        CreateDocumentInput {
            association_id: payload.association_id,
            title: payload.title,
            category: payload.category,
            body: payload.body,
        },
    )
    .await;

    match result {
        Ok(doc) => {
            let audit = AuditRepository::record(
                session.transaction(),
                NewAuditEvent::state_change(
                    ctx.organization_id,
                    doc.association_id,
                    scope.actor(),
                    AuditAction::DocumentCreated,
                    None,
                    Some(doc_json(&doc)),
                ),
            )
            .await;
            if let Err(e) = audit {
                error!(error = %e, "Failed to record document-created audit event");
            }

            if let Err(e) = session.commit().await {
                error!(error = %e, "Failed to commit");
                return internal_error();
            }
            (StatusCode::CREATED, Json(doc_json(&doc))).into_response()
        }
        Err(DocumentError::Tenancy(e)) => {
            let _ = session.rollback().await;
            tenancy_error(&e)
        }
        Err(DocumentError::Db(e)) => {
            let _ = session.rollback().await;
            error!(error = %e, "Failed to create document");
            internal_error()
        }
    }
}

/// GET /documents/{doc_id} - Fetch one document.
async fn get_document(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(doc_id): Path<Uuid>,
) -> impl IntoResponse {
    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let result = DocumentRepository::find_by_id(session.transaction(), doc_id).await;
    let _ = session.rollback().await;

    match result {
        Ok(Some(doc)) => (StatusCode::OK, Json(doc_json(&doc))).into_response(),
        // A document outside the active context is indistinguishable from
        // one that does not exist.
        Ok(None) => not_found(),
        Err(e) => {
            error!(error = %e, "Failed to fetch document");
            internal_error()
        }
    }
}

/// PUT /documents/{doc_id} - Update a document.
async fn update_document(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(doc_id): Path<Uuid>,
    Json(payload): Json<UpdateDocumentRequest>,
) -> impl IntoResponse {
    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let previous = match DocumentRepository::find_by_id(session.transaction(), doc_id).await {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            let _ = session.rollback().await;
            return not_found();
        }
        Err(e) => {
            let _ = session.rollback().await;
            error!(error = %e, "Failed to fetch document");
            return internal_error();
        }
    };

    let result = DocumentRepository::update(
        session.transaction(),
        doc_id,
        UpdateDocumentInput {
            title: payload.title,
            category: payload.category,
            body: payload.body.map(Some),
        },
    )
    .await;

    match result {
        Ok(Some(doc)) => {
            let audit = AuditRepository::record(
                session.transaction(),
                NewAuditEvent::state_change(
                    doc.organization_id,
                    doc.association_id,
                    scope.actor(),
                    AuditAction::DocumentUpdated,
                    Some(doc_json(&previous)),
                    Some(doc_json(&doc)),
                ),
            )
            .await;
            if let Err(e) = audit {
                error!(error = %e, "Failed to record document-updated audit event");
            }

            if let Err(e) = session.commit().await {
                error!(error = %e, "Failed to commit");
                return internal_error();
            }
            (StatusCode::OK, Json(doc_json(&doc))).into_response()
        }
        Ok(None) => {
            let _ = session.rollback().await;
            not_found()
        }
        Err(DocumentError::Tenancy(e)) => {
            let _ = session.rollback().await;
            tenancy_error(&e)
        }
        Err(DocumentError::Db(e)) => {
            let _ = session.rollback().await;
            error!(error = %e, "Failed to update document");
            internal_error()
        }
    }
}

/// DELETE /documents/{doc_id} - Delete a document.
async fn delete_document(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(doc_id): Path<Uuid>,
) -> impl IntoResponse {
    let session = match scope.begin_session(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to open tenant session");
            return internal_error();
        }
    };

    let previous = match DocumentRepository::find_by_id(session.transaction(), doc_id).await {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            let _ = session.rollback().await;
            return not_found();
        }
        Err(e) => {
            let _ = session.rollback().await;
            error!(error = %e, "Failed to fetch document");
            return internal_error();
        }
    };

    match DocumentRepository::delete(session.transaction(), doc_id).await {
        Ok(0) => {
            let _ = session.rollback().await;
            not_found()
        }
        Ok(_) => {
            let audit = AuditRepository::record(
                session.transaction(),
                NewAuditEvent::state_change(
                    previous.organization_id,
                    previous.association_id,
                    scope.actor(),
                    AuditAction::DocumentDeleted,
                    Some(doc_json(&previous)),
                    None,
                ),
            )
            .await;
            if let Err(e) = audit {
                error!(error = %e, "Failed to record document-deleted audit event");
            }

            if let Err(e) = session.commit().await {
                error!(error = %e, "Failed to commit");
                return internal_error();
            }
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(e) => {
            let _ = session.rollback().await;
            error!(error = %e, "Failed to delete document");
            internal_error()
        }
    }
}

fn tenancy_error(e: &TenancyError) -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "forbidden",
            "message": e.to_string()
        })),
    )
        .into_response()
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
