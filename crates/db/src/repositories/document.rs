//! Document repository for database operations.
//!
//! Documents are the canonical association-tier resource. The RLS policies
//! scope every statement; on top of that, writes run the pure stamping
//! check from `strata-core` first, so a cross-tenant association stamp
//! surfaces as a typed [`TenancyError::CrossTenantWrite`] instead of an
//! opaque policy violation.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{associations, documents};
use strata_core::tenancy::{RowScope, TenantContext, TenancyError, policy};
use strata_shared::types::{PageRequest, PageResponse};

/// Document-related errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Tenant policy rejected the operation.
    #[error(transparent)]
    Tenancy(#[from] TenancyError),

    /// Database error.
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Input for creating a document.
#[derive(Debug, Clone)]
pub struct CreateDocumentInput {
    /// Association scope; `None` creates an organization-wide document.
    pub association_id: Option<Uuid>,
    /// Document title.
    pub title: String,
    /// Category label (governing-docs, minutes, financial, ...).
    pub category: String,
    /// Document body.
    pub body: Option<String>,
}

/// Input for updating a document.
#[derive(Debug, Clone, Default)]
pub struct UpdateDocumentInput {
    /// New title.
    pub title: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New body (outer `None` leaves it unchanged).
    pub body: Option<Option<String>>,
}

/// Filters for listing documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    /// Restrict to one association.
    pub association_id: Option<Uuid>,
    /// Restrict to one category.
    pub category: Option<String>,
}

/// Document repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct DocumentRepository;

impl DocumentRepository {
    /// Creates a document under the active context.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyError::CrossTenantWrite`] when the association
    /// stamp does not belong to the context's organization; database errors
    /// otherwise.
    pub async fn create(
        txn: &DatabaseTransaction,
        ctx: &TenantContext,
        created_by: Uuid,
        input: CreateDocumentInput,
    ) -> Result<documents::Model, DocumentError> {
        let row = RowScope {
            organization_id: ctx.organization_id,
            association_id: input.association_id,
        };
        let owner = match input.association_id {
            Some(assoc) => associations::Entity::find_by_id(assoc)
                .one(txn)
                .await?
                .map(|a| a.organization_id),
            None => None,
        };
        policy::check_association_stamp(ctx, &row, owner)?;

        let now = chrono::Utc::now().into();
        let doc = documents::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(ctx.organization_id),
            association_id: Set(input.association_id),
            title: Set(input.title),
            category: Set(input.category),
            body: Set(input.body),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(doc.insert(txn).await?)
    }

    /// Finds a document by ID under the active context.
    ///
    /// A document outside the context is reported as absent, exactly like
    /// a document that does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<documents::Model>, DbErr> {
        documents::Entity::find_by_id(id).one(txn).await
    }

    /// Lists documents visible under the active context, paginated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        txn: &DatabaseTransaction,
        filter: DocumentFilter,
        page: PageRequest,
    ) -> Result<PageResponse<documents::Model>, DbErr> {
        let page = page.clamped();

        let mut query = documents::Entity::find();
        if let Some(assoc) = filter.association_id {
            query = query.filter(documents::Column::AssociationId.eq(assoc));
        }
        if let Some(category) = filter.category {
            query = query.filter(documents::Column::Category.eq(category));
        }

        let query = query.order_by_desc(documents::Column::CreatedAt);
        let total = query.clone().count(txn).await?;
        let data = query
            .paginate(txn, page.limit())
            .fetch_page(u64::from(page.page - 1))
            .await?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Updates a document under the active context.
    ///
    /// Returns `Ok(None)` when the document is not visible, which callers
    /// surface as not-found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update(
        txn: &DatabaseTransaction,
        id: Uuid,
        input: UpdateDocumentInput,
    ) -> Result<Option<documents::Model>, DocumentError> {
        let Some(existing) = Self::find_by_id(txn, id).await? else {
            return Ok(None);
        };

        let mut model: documents::ActiveModel = existing.into();
        if let Some(title) = input.title {
            model.title = Set(title);
        }
        if let Some(category) = input.category {
            model.category = Set(category);
        }
        if let Some(body) = input.body {
            model.body = Set(body);
        }
        model.updated_at = Set(chrono::Utc::now().into());

        Ok(Some(model.update(txn).await?))
    }

    /// Deletes a document under the active context.
    ///
    /// Returns the number of rows removed (0 when the document is not
    /// visible).
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(txn: &DatabaseTransaction, id: Uuid) -> Result<u64, DbErr> {
        let result = documents::Entity::delete_by_id(id).exec(txn).await?;
        Ok(result.rows_affected)
    }
}
