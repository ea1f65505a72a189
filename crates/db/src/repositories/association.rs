//! Association repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{
    association_members, associations, sea_orm_active_enums::AssociationRole,
};

/// Association repository for CRUD operations.
///
/// All methods run under an open tenant session; the policies scope every
/// query to the organization in context.
#[derive(Debug, Clone)]
pub struct AssociationRepository;

impl AssociationRepository {
    /// Finds an association by ID under the active context.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<associations::Model>, DbErr> {
        associations::Entity::find_by_id(id).one(txn).await
    }

    /// Lists the real (non-pseudo) associations of the organization in
    /// context.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(txn: &DatabaseTransaction) -> Result<Vec<associations::Model>, DbErr> {
        associations::Entity::find()
            .filter(associations::Column::IsPseudo.eq(false))
            .order_by_asc(associations::Column::Name)
            .all(txn)
            .await
    }

    /// Creates an association in the organization in context.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails (including a policy
    /// rejection when the caller is not staff).
    pub async fn create(
        txn: &DatabaseTransaction,
        organization_id: Uuid,
        name: &str,
        slug: &str,
    ) -> Result<associations::Model, DbErr> {
        let now = chrono::Utc::now().into();

        let assoc = associations::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            is_pseudo: Set(false),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        assoc.insert(txn).await
    }

    /// Returns the organization's pseudo-association, creating it on first
    /// use.
    ///
    /// The pseudo-association is the sentinel row that gives
    /// organization-wide resources a non-null association id where a schema
    /// requires one. A partial unique index guarantees at most one per
    /// organization, so a concurrent first use surfaces as a unique
    /// violation rather than a duplicate.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or insert fails.
    pub async fn ensure_pseudo(
        txn: &DatabaseTransaction,
        organization_id: Uuid,
    ) -> Result<associations::Model, DbErr> {
        if let Some(existing) = associations::Entity::find()
            .filter(associations::Column::OrganizationId.eq(organization_id))
            .filter(associations::Column::IsPseudo.eq(true))
            .one(txn)
            .await?
        {
            return Ok(existing);
        }

        let now = chrono::Utc::now().into();
        let pseudo = associations::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            name: Set("Organization-wide".to_string()),
            slug: Set("org-wide".to_string()),
            is_pseudo: Set(true),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        pseudo.insert(txn).await
    }

    /// Adds an external member to an association.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn add_member(
        txn: &DatabaseTransaction,
        organization_id: Uuid,
        association_id: Uuid,
        user_id: Uuid,
        role: AssociationRole,
        unit_label: Option<&str>,
    ) -> Result<association_members::Model, DbErr> {
        let now = chrono::Utc::now().into();

        let member = association_members::ActiveModel {
            user_id: Set(user_id),
            association_id: Set(association_id),
            organization_id: Set(organization_id),
            role: Set(role),
            unit_label: Set(unit_label.map(String::from)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        member.insert(txn).await
    }

    /// Removes an external member from an association.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn remove_member(
        txn: &DatabaseTransaction,
        association_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, DbErr> {
        let result = association_members::Entity::delete_many()
            .filter(association_members::Column::AssociationId.eq(association_id))
            .filter(association_members::Column::UserId.eq(user_id))
            .exec(txn)
            .await?;

        Ok(result.rows_affected)
    }

    /// Lists members of one association under the active context.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_members(
        txn: &DatabaseTransaction,
        association_id: Uuid,
    ) -> Result<Vec<association_members::Model>, DbErr> {
        association_members::Entity::find()
            .filter(association_members::Column::AssociationId.eq(association_id))
            .all(txn)
            .await
    }
}
