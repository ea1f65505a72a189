//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Database migrations, including the row-level-security policies
//! - The transaction-scoped tenant context store ([`rls`])
//! - Repository abstractions for data access

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod rls;

pub use repositories::{
    AssociationRepository, AuditRepository, DocumentRepository, OrganizationRepository,
    SessionRepository, UserRepository, WorkOrderRepository,
};
pub use rls::{TenantSession, set_tenant_context};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
