//! Authentication types for JWT and tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// JWT claims for access tokens.
///
/// The `org` claim is the principal's default organization. It is only a
/// hint for context resolution: the tenant middleware re-validates it
/// against the membership table on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Default organization ID.
    pub org: Uuid,
    /// User's role in the default organization.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, org_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            org: org_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the default organization ID from claims.
    #[must_use]
    pub const fn organization_id(&self) -> Uuid {
        self.org
    }
}

/// Token pair returned after successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived).
    pub access_token: String,
    /// Refresh token (long-lived).
    pub refresh_token: String,
    /// Access token expiration in seconds.
    pub expires_in: i64,
}

impl TokenPair {
    /// Creates a new token pair.
    #[must_use]
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in,
        }
    }
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Registration request payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// User email.
    #[validate(email)]
    pub email: String,
    /// User password.
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// User full name.
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Authenticated user info.
    pub user: UserInfo,
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Token expiration in seconds.
    pub expires_in: i64,
}

/// User info returned in auth responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: Uuid,
    /// User email.
    pub email: String,
    /// User full name.
    pub full_name: String,
    /// Organizations the user belongs to as staff.
    pub organizations: Vec<UserOrganization>,
    /// Associations the user belongs to as an external member.
    pub associations: Vec<UserAssociation>,
}

/// Staff membership summary for a user.
///
/// Ids and roles only: at login no tenant context exists yet, so nothing
/// beyond membership facts is readable.
#[derive(Debug, Clone, Serialize)]
pub struct UserOrganization {
    /// Organization ID.
    pub id: Uuid,
    /// User's staff role in this organization.
    pub role: String,
}

/// Association membership summary for a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserAssociation {
    /// Association ID.
    pub id: Uuid,
    /// Owning organization ID.
    pub organization_id: Uuid,
    /// User's role in this association.
    pub role: String,
}

/// Refresh token request.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token.
    pub refresh_token: String,
}

/// Logout request.
#[derive(Debug, Clone, Deserialize)]
pub struct LogoutRequest {
    /// The refresh token to invalidate.
    pub refresh_token: String,
}

/// Create organization request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrganizationRequest {
    /// Organization name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Organization slug (URL-friendly).
    #[validate(length(min = 1, max = 100))]
    pub slug: String,
    /// Timezone (IANA format).
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// Add staff member to organization request.
#[derive(Debug, Clone, Deserialize)]
pub struct AddStaffRequest {
    /// User email to add.
    pub email: String,
    /// Staff role to assign.
    pub role: String,
}

/// Update organization request.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrganizationRequest {
    /// Organization name (optional).
    pub name: Option<String>,
    /// Timezone (optional, IANA format).
    pub timezone: Option<String>,
}
