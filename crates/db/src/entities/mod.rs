//! `SeaORM` entity definitions.

pub mod sea_orm_active_enums;

pub mod assignment_grants;
pub mod association_members;
pub mod associations;
pub mod audit_events;
pub mod documents;
pub mod organization_users;
pub mod organizations;
pub mod sessions;
pub mod users;
pub mod work_orders;
