//! Tenant-context middleware: the propagation pipeline.
//!
//! Runs after authentication and before any handler touches tenant data,
//! in strict order:
//!
//! 1. resolve the Principal from the authenticated claims
//! 2. resolve the organization (explicit `X-Org-Id` header, else the
//!    token's default-organization hint)
//! 3. read the `X-Assoc-Id` header, if present
//! 4. validate the combination against the principal's memberships
//!
//! Any failure aborts the request here: no tenant context is ever set, no
//! context-switch audit row is written, and no tenant-scoped statement
//! runs. Handlers receive a [`TenantScope`] and open their transaction
//! through it, which asserts the validated context as the transaction's
//! first statement.
//!
//! All ids arriving in headers or token claims are client-supplied hints;
//! this middleware re-validates every one of them before use.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

use crate::AppState;
use strata_core::tenancy::{
    Actor, Principal, ResolvedContext, TenancyError, resolve_context,
};
use strata_db::UserRepository;
use strata_db::repositories::bootstrap::{ItemType, find_owning_organization};
use strata_db::rls::TenantSession;
use strata_shared::Claims;

/// Header carrying the association scope. Absent means "no association
/// override", not "no organization".
pub const ASSOC_HEADER: &str = "x-assoc-id";

/// Header carrying an explicit organization override.
pub const ORG_HEADER: &str = "x-org-id";

/// A validated tenant scope attached to the request.
#[derive(Debug, Clone)]
pub struct TenantScope {
    /// The acting principal, resolved once for the request.
    pub principal: Principal,
    /// The validated context, ready to assert.
    pub resolved: ResolvedContext,
}

impl TenantScope {
    /// Actor attribution for audit events emitted by this request.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor::user(self.principal.user_id)
    }

    /// Opens a tenant session: a transaction whose first statement asserts
    /// this scope's context.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started.
    pub async fn begin_session(&self, state: &AppState) -> Result<TenantSession, DbErr> {
        TenantSession::begin(&state.db, &self.resolved.context, self.actor()).await
    }
}

fn parse_uuid_header(headers: &HeaderMap, name: &str) -> Result<Option<Uuid>, Response> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|s| Uuid::parse_str(s).ok())
        .map(Some)
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_header",
                    "message": format!("{name} must be a UUID")
                })),
            )
                .into_response()
        })
}

/// Tenant middleware: resolves and validates the context, then stores a
/// [`TenantScope`] in request extensions.
pub async fn tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(claims) = request.extensions().get::<Claims>().cloned() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "unauthorized",
                "message": "Authentication required"
            })),
        )
            .into_response();
    };

    let assoc_header = match parse_uuid_header(request.headers(), ASSOC_HEADER) {
        Ok(v) => v,
        Err(response) => return response,
    };
    let org_header = match parse_uuid_header(request.headers(), ORG_HEADER) {
        Ok(v) => v,
        Err(response) => return response,
    };

    // Step 1: principal.
    let user_repo = UserRepository::new((*state.db).clone());
    let principal = match user_repo.load_principal(claims.user_id()).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "unauthorized",
                    "message": "Unknown user"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to resolve principal");
            return internal_error();
        }
    };

    // Step 2: organization hint. The token's default organization is only
    // a hint; membership is verified by resolve_context below.
    let org_hint = org_header.or(Some(claims.organization_id()));

    // Step 3: association owner lookup, when a header is present. This is
    // the bootstrap escape hatch: id-to-organization mapping only.
    let assoc_owner = match assoc_header {
        Some(assoc) => {
            match find_owning_organization(&state.db, ItemType::Association, assoc).await {
                Ok(r) => r.map(|r| r.organization_id),
                Err(e) => {
                    error!(error = %e, "Bootstrap lookup failed");
                    return internal_error();
                }
            }
        }
        None => None,
    };

    // Step 4: validate. Fails closed before any tenant-scoped statement.
    let resolved = match resolve_context(&principal, org_hint, assoc_header, assoc_owner) {
        Ok(r) => r,
        Err(e @ TenancyError::ContextValidation(_)) => {
            warn!(user_id = %principal.user_id, error = %e, "Tenant context validation failed");
            return (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "context_validation_failed",
                    "message": e.to_string()
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Unexpected tenancy error during resolution");
            return internal_error();
        }
    };

    request
        .extensions_mut()
        .insert(TenantScope { principal, resolved });
    next.run(request).await
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}

impl<S> FromRequestParts<S> for TenantScope
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "no_tenant_scope",
                    "message": "Tenant scope was not resolved for this request"
                })),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;

    #[test]
    fn test_absent_header_is_no_override() {
        let headers = HeaderMap::new();
        assert_eq!(parse_uuid_header(&headers, ASSOC_HEADER).unwrap(), None);
    }

    #[test]
    fn test_valid_header_parses() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(ASSOC_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(
            parse_uuid_header(&headers, ASSOC_HEADER).unwrap(),
            Some(id)
        );
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    #[case("1234")]
    fn test_malformed_header_is_rejected(#[case] value: &str) {
        let mut headers = HeaderMap::new();
        headers.insert(ASSOC_HEADER, HeaderValue::from_str(value).unwrap());
        assert!(parse_uuid_header(&headers, ASSOC_HEADER).is_err());
    }
}
