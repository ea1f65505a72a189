//! Migration to enable FORCE ROW LEVEL SECURITY on all tenant tables.
//!
//! With FORCE, the policies apply to the table owner as well, so a
//! misconfigured application role cannot sidestep tenant isolation.
//! Superusers still bypass RLS entirely; that is what keeps the
//! SECURITY DEFINER bootstrap lookup working.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(FORCE_RLS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(DISABLE_FORCE_RLS_SQL).await?;

        Ok(())
    }
}

const FORCE_RLS_SQL: &str = r"
-- ============================================================
-- FORCE ROW LEVEL SECURITY
-- Ensures RLS policies apply to table owners as well
-- ============================================================

ALTER TABLE organizations FORCE ROW LEVEL SECURITY;
ALTER TABLE organization_users FORCE ROW LEVEL SECURITY;
ALTER TABLE associations FORCE ROW LEVEL SECURITY;
ALTER TABLE association_members FORCE ROW LEVEL SECURITY;
ALTER TABLE documents FORCE ROW LEVEL SECURITY;
ALTER TABLE work_orders FORCE ROW LEVEL SECURITY;
ALTER TABLE assignment_grants FORCE ROW LEVEL SECURITY;
ALTER TABLE audit_events FORCE ROW LEVEL SECURITY;
";

const DISABLE_FORCE_RLS_SQL: &str = r"
-- ============================================================
-- DISABLE FORCE ROW LEVEL SECURITY (Rollback)
-- ============================================================

ALTER TABLE organizations NO FORCE ROW LEVEL SECURITY;
ALTER TABLE organization_users NO FORCE ROW LEVEL SECURITY;
ALTER TABLE associations NO FORCE ROW LEVEL SECURITY;
ALTER TABLE association_members NO FORCE ROW LEVEL SECURITY;
ALTER TABLE documents NO FORCE ROW LEVEL SECURITY;
ALTER TABLE work_orders NO FORCE ROW LEVEL SECURITY;
ALTER TABLE assignment_grants NO FORCE ROW LEVEL SECURITY;
ALTER TABLE audit_events NO FORCE ROW LEVEL SECURITY;
";
