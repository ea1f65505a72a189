//! User repository for database operations.
//!
//! Users are a global table (not tenant-scoped); principal resolution runs
//! before any tenant context exists and goes through the narrow
//! `resolve_principal_memberships` escape hatch.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, Set, Statement,
};
use std::str::FromStr;
use uuid::Uuid;

use crate::entities::users;
use strata_core::tenancy::{
    AssociationMembership, AssociationRole, OrgMembership, OrgRole, Pillar, Principal,
    StaffProfile,
};

/// User repository for CRUD operations and principal resolution.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
    ) -> Result<users::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            full_name: Set(full_name.to_string()),
            is_platform_staff: Set(false),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        user.insert(&self.db).await
    }

    /// Resolves the full [`Principal`] for a user.
    ///
    /// Runs before any tenant context exists, so memberships are read
    /// through the RLS-exempt `resolve_principal_memberships` function.
    /// That function projects membership facts only; nothing else is
    /// reachable through it.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or a query fails.
    pub async fn load_principal(&self, user_id: Uuid) -> Result<Option<Principal>, DbErr> {
        let Some(user) = self.find_by_id(user_id).await? else {
            return Ok(None);
        };

        let rows = self
            .db
            .query_all(Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                "SELECT kind, target_id, organization_id, role \
                 FROM resolve_principal_memberships($1)",
                [user_id.into()],
            ))
            .await?;

        let mut principal = Principal::new(user_id);
        principal.is_platform_staff = user.is_platform_staff;
        if user.is_platform_staff {
            principal.staff = Some(StaffProfile {
                pillars: vec![Pillar::Cam, Pillar::Concierge, Pillar::Dispatch],
            });
        }

        for row in rows {
            let kind: String = row.try_get("", "kind")?;
            let target_id: Uuid = row.try_get("", "target_id")?;
            let organization_id: Uuid = row.try_get("", "organization_id")?;
            let role: String = row.try_get("", "role")?;

            match kind.as_str() {
                "organization" => {
                    let role = OrgRole::from_str(&role).map_err(DbErr::Custom)?;
                    principal.org_memberships.push(OrgMembership {
                        organization_id,
                        role,
                    });
                }
                "association" => {
                    let role = parse_association_role(&role).map_err(DbErr::Custom)?;
                    principal.association_memberships.push(AssociationMembership {
                        association_id: target_id,
                        organization_id,
                        role,
                    });
                }
                other => {
                    return Err(DbErr::Custom(format!("unknown membership kind: {other}")));
                }
            }
        }

        Ok(Some(principal))
    }
}

fn parse_association_role(s: &str) -> Result<AssociationRole, String> {
    match s {
        "board" => Ok(AssociationRole::Board),
        "owner" => Ok(AssociationRole::Owner),
        "resident" => Ok(AssociationRole::Resident),
        other => Err(format!("unknown association role: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_association_role() {
        assert_eq!(
            parse_association_role("board").unwrap(),
            AssociationRole::Board
        );
        assert!(parse_association_role("janitor").is_err());
    }
}
