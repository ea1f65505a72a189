//! Authentication routes for login, register, and token refresh.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde_json::json;
use tracing::{error, info};
use validator::Validate;

use crate::AppState;
use strata_core::auth::{hash_password, verify_password};
use strata_db::{SessionRepository, UserRepository};
use strata_shared::auth::{
    LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, RegisterRequest, UserAssociation,
    UserInfo, UserOrganization,
};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

/// POST /auth/login - Authenticate user and return tokens.
#[allow(clippy::too_many_lines)]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    // Find user by email
    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(email = %payload.email, "Login attempt for non-existent user");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error("An error occurred during login");
        }
    };

    if !user.is_active {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "account_disabled",
                "message": "This account has been disabled"
            })),
        )
            .into_response();
    }

    // Verify password
    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error("An error occurred during login");
        }
    }

    // Resolve memberships for the token's default-organization hint.
    let principal = match user_repo.load_principal(user.id).await {
        Ok(Some(p)) => p,
        Ok(None) | Err(_) => {
            error!(user_id = %user.id, "Failed to resolve principal during login");
            return internal_error("An error occurred during login");
        }
    };

    let Some(default_org) = principal.default_organization() else {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "no_membership",
                "message": "User has no organization or association membership"
            })),
        )
            .into_response();
    };

    let role = principal
        .org_role(default_org)
        .map_or_else(|| "member".to_string(), |r| r.to_string());

    let access_token = match state
        .jwt_service
        .generate_access_token(user.id, default_org, &role)
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error("An error occurred during login");
        }
    };
    let refresh_token = match state
        .jwt_service
        .generate_refresh_token(user.id, default_org, &role)
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate refresh token");
            return internal_error("An error occurred during login");
        }
    };

    // Persist the refresh session
    let session_repo = SessionRepository::new((*state.db).clone());
    let expires_at = chrono::Utc::now()
        + chrono::Duration::days(state.jwt_service.refresh_token_expires_days());
    if let Err(e) = session_repo
        .create(user.id, &refresh_token, expires_at, None, None)
        .await
    {
        error!(error = %e, "Failed to persist session");
        return internal_error("An error occurred during login");
    }

    let organizations = principal
        .org_memberships
        .iter()
        .map(|m| UserOrganization {
            id: m.organization_id,
            role: m.role.to_string(),
        })
        .collect();
    let associations = principal
        .association_memberships
        .iter()
        .map(|m| UserAssociation {
            id: m.association_id,
            organization_id: m.organization_id,
            role: m.role.to_string(),
        })
        .collect();

    let response = LoginResponse {
        user: UserInfo {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            organizations,
            associations,
        },
        access_token,
        refresh_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// POST /auth/register - Create a new user account.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
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

    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.find_by_email(&payload.email).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "email_taken",
                    "message": "An account with this email already exists"
                })),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "Database error during registration");
            return internal_error("An error occurred during registration");
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Password hashing failed");
            return internal_error("An error occurred during registration");
        }
    };

    match user_repo
        .create(&payload.email, &password_hash, &payload.full_name)
        .await
    {
        Ok(user) => {
            info!(user_id = %user.id, "User registered");
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": user.id,
                    "email": user.email,
                    "full_name": user.full_name
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create user");
            internal_error("An error occurred during registration")
        }
    }
}

/// POST /auth/refresh - Exchange a refresh token for a new access token.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    let claims = match state.jwt_service.validate_token(&payload.refresh_token) {
        Ok(c) => c,
        Err(_) => return invalid_refresh(),
    };

    let session_repo = SessionRepository::new((*state.db).clone());
    let session = match session_repo.find_by_token(&payload.refresh_token).await {
        Ok(Some(s)) if s.expires_at > chrono::Utc::now() => s,
        Ok(_) => return invalid_refresh(),
        Err(e) => {
            error!(error = %e, "Database error during token refresh");
            return internal_error("An error occurred during refresh");
        }
    };

    let access_token = match state.jwt_service.generate_access_token(
        session.user_id,
        claims.organization_id(),
        &claims.role,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error("An error occurred during refresh");
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "access_token": access_token,
            "expires_in": state.jwt_service.access_token_expires_in()
        })),
    )
        .into_response()
}

/// POST /auth/logout - Revoke a refresh session.
async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<LogoutRequest>,
) -> impl IntoResponse {
    let session_repo = SessionRepository::new((*state.db).clone());

    match session_repo.find_by_token(&payload.refresh_token).await {
        Ok(Some(session)) => {
            if let Err(e) = session_repo.revoke(session.id).await {
                error!(error = %e, "Failed to revoke session");
                return internal_error("An error occurred during logout");
            }
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Ok(None) => (StatusCode::NO_CONTENT, ()).into_response(),
        Err(e) => {
            error!(error = %e, "Database error during logout");
            internal_error("An error occurred during logout")
        }
    }
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Invalid email or password"
        })),
    )
        .into_response()
}

fn invalid_refresh() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_refresh_token",
            "message": "Refresh token is invalid, expired, or revoked"
        })),
    )
        .into_response()
}

fn internal_error(message: &str) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": message
        })),
    )
        .into_response()
}
