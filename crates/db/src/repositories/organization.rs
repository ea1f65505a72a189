//! Organization repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use serde_json::json;
use uuid::Uuid;

use crate::entities::{organization_users, organizations, sea_orm_active_enums::OrgRole, users};
use crate::rls::TenantSession;
use strata_core::tenancy::{Actor, TenantContext};

/// Organization repository for CRUD operations.
///
/// Reads and membership mutations run under an open tenant session;
/// creation bootstraps its own session for the organization being born.
#[derive(Debug, Clone)]
pub struct OrganizationRepository;

impl OrganizationRepository {
    /// Finds an organization by ID under the active context.
    ///
    /// An organization outside the context is reported as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find_by_id(id).one(txn).await
    }

    /// Finds an organization by slug under the active context.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_slug(
        txn: &DatabaseTransaction,
        slug: &str,
    ) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug))
            .one(txn)
            .await
    }

    /// Creates a new organization with the creator as owner.
    ///
    /// Bootstraps the tenant session for the organization being created:
    /// the new id is asserted as context before the insert, which both
    /// satisfies the insert policy and writes the first context-switch
    /// audit row of the new tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_with_owner(
        db: &DatabaseConnection,
        name: &str,
        slug: &str,
        timezone: &str,
        owner_id: Uuid,
    ) -> Result<organizations::Model, DbErr> {
        let org_id = Uuid::new_v4();
        let ctx = TenantContext::staff(org_id);
        let session = TenantSession::begin_with_reason(
            db,
            &ctx,
            Actor::user(owner_id),
            Some("organization-onboarding"),
            None,
        )
        .await?;

        let now = chrono::Utc::now().into();

        let org = organizations::ActiveModel {
            id: Set(org_id),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            timezone: Set(timezone.to_string()),
            settings: Set(json!({})),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let org = org.insert(session.transaction()).await?;

        let org_user = organization_users::ActiveModel {
            user_id: Set(owner_id),
            organization_id: Set(org_id),
            role: Set(OrgRole::Owner),
            created_at: Set(now),
            updated_at: Set(now),
        };

        org_user.insert(session.transaction()).await?;

        session.commit().await?;

        Ok(org)
    }

    /// Adds a staff member to the organization in context.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails (including a policy
    /// rejection when the caller is not staff).
    pub async fn add_staff(
        txn: &DatabaseTransaction,
        organization_id: Uuid,
        user_id: Uuid,
        role: OrgRole,
    ) -> Result<organization_users::Model, DbErr> {
        let now = chrono::Utc::now().into();

        let org_user = organization_users::ActiveModel {
            user_id: Set(user_id),
            organization_id: Set(organization_id),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
        };

        org_user.insert(txn).await
    }

    /// Gets all staff of the organization in context.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_staff(
        txn: &DatabaseTransaction,
        organization_id: Uuid,
    ) -> Result<Vec<(users::Model, organization_users::Model)>, DbErr> {
        organization_users::Entity::find()
            .filter(organization_users::Column::OrganizationId.eq(organization_id))
            .find_also_related(users::Entity)
            .all(txn)
            .await
            .map(|results| {
                results
                    .into_iter()
                    .filter_map(|(ou, user)| user.map(|u| (u, ou)))
                    .collect()
            })
    }

    /// Gets a user's staff membership in the organization in context.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_staff_membership(
        txn: &DatabaseTransaction,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<organization_users::Model>, DbErr> {
        organization_users::Entity::find()
            .filter(organization_users::Column::OrganizationId.eq(organization_id))
            .filter(organization_users::Column::UserId.eq(user_id))
            .one(txn)
            .await
    }

    /// Checks if a user is staff of the organization in context.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_staff(
        txn: &DatabaseTransaction,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, DbErr> {
        let count = organization_users::Entity::find()
            .filter(organization_users::Column::OrganizationId.eq(organization_id))
            .filter(organization_users::Column::UserId.eq(user_id))
            .count(txn)
            .await?;

        Ok(count > 0)
    }
}
