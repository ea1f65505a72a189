//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application.
//!
//! Tenant-scoped repositories take the transaction of an open
//! [`crate::rls::TenantSession`]: the context is asserted before the
//! repository can run a single statement, and the RLS policies scope
//! every query transparently. Repositories over global tables (users,
//! sessions) and the pre-context escape hatches take the plain
//! connection.

pub mod association;
pub mod audit;
pub mod bootstrap;
pub mod document;
pub mod organization;
pub mod session;
pub mod user;
pub mod work_order;

pub use association::AssociationRepository;
pub use audit::AuditRepository;
pub use bootstrap::{BootstrapRef, ItemType, find_owning_organization};
pub use document::{
    CreateDocumentInput, DocumentError, DocumentFilter, DocumentRepository, UpdateDocumentInput,
};
pub use organization::OrganizationRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
pub use work_order::{CreateWorkOrderInput, WorkOrderError, WorkOrderRepository};
