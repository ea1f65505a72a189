//! Initial database migration.
//!
//! Creates all core tables, enums, triggers, context functions, the
//! bootstrap lookup, and the row-level-security policies.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: GLOBAL TABLES (not tenant-scoped)
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(SESSIONS_SQL).await?;

        // ============================================================
        // PART 3: ORGANIZATION TIER
        // ============================================================
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(ORGANIZATION_USERS_SQL).await?;
        db.execute_unprepared(ASSOCIATIONS_SQL).await?;

        // ============================================================
        // PART 4: ASSOCIATION TIER
        // ============================================================
        db.execute_unprepared(ASSOCIATION_MEMBERS_SQL).await?;
        db.execute_unprepared(DOCUMENTS_SQL).await?;
        db.execute_unprepared(WORK_ORDERS_SQL).await?;
        db.execute_unprepared(ASSIGNMENT_GRANTS_SQL).await?;

        // ============================================================
        // PART 5: AUDIT TRAIL
        // ============================================================
        db.execute_unprepared(AUDIT_EVENTS_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        // ============================================================
        // PART 7: TENANT CONTEXT FUNCTIONS
        // ============================================================
        db.execute_unprepared(CONTEXT_FUNCTIONS_SQL).await?;

        // ============================================================
        // PART 8: BOOTSTRAP LOOKUP
        // ============================================================
        db.execute_unprepared(BOOTSTRAP_LOOKUP_SQL).await?;

        // ============================================================
        // PART 9: ROW-LEVEL SECURITY
        // ============================================================
        db.execute_unprepared(RLS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Staff roles within an organization
CREATE TYPE org_role AS ENUM (
    'owner',
    'admin',
    'manager',
    'concierge',
    'viewer'
);

-- External member roles within an association
CREATE TYPE association_role AS ENUM ('board', 'owner', 'resident');

-- Work order lifecycle
CREATE TYPE work_order_status AS ENUM (
    'open',
    'assigned',
    'in_progress',
    'completed',
    'cancelled'
);

-- Assignment grant lifecycle
CREATE TYPE grant_status AS ENUM ('active', 'revoked');

-- Why an assignment grant exists
CREATE TYPE grant_reason AS ENUM ('work_order_assignment', 'unit_membership');

-- Audit actor families
CREATE TYPE actor_type AS ENUM ('user', 'provider', 'system');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    full_name VARCHAR(255) NOT NULL,
    is_platform_staff BOOLEAN NOT NULL DEFAULT FALSE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const SESSIONS_SQL: &str = r"
CREATE TABLE sessions (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    refresh_token_hash VARCHAR(64) NOT NULL,
    user_agent TEXT,
    ip_address VARCHAR(45),
    expires_at TIMESTAMPTZ NOT NULL,
    revoked_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_sessions_user_id ON sessions(user_id);
CREATE INDEX idx_sessions_token_hash ON sessions(refresh_token_hash);
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    slug VARCHAR(100) NOT NULL UNIQUE,
    timezone VARCHAR(50) NOT NULL DEFAULT 'UTC',
    settings JSONB NOT NULL DEFAULT '{}',
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ORGANIZATION_USERS_SQL: &str = r"
CREATE TABLE organization_users (
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    role org_role NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (user_id, organization_id)
);

CREATE INDEX idx_organization_users_org ON organization_users(organization_id);
";

const ASSOCIATIONS_SQL: &str = r"
CREATE TABLE associations (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    slug VARCHAR(100) NOT NULL,
    is_pseudo BOOLEAN NOT NULL DEFAULT FALSE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (organization_id, slug)
);

CREATE INDEX idx_associations_org ON associations(organization_id);

-- At most one pseudo-association per organization
CREATE UNIQUE INDEX idx_associations_one_pseudo
    ON associations(organization_id) WHERE is_pseudo;
";

const ASSOCIATION_MEMBERS_SQL: &str = r"
CREATE TABLE association_members (
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    association_id UUID NOT NULL REFERENCES associations(id) ON DELETE CASCADE,
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    role association_role NOT NULL,
    unit_label VARCHAR(50),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (user_id, association_id)
);

CREATE INDEX idx_association_members_scope
    ON association_members(organization_id, association_id);
CREATE INDEX idx_association_members_user ON association_members(user_id);
";

const DOCUMENTS_SQL: &str = r"
CREATE TABLE documents (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    -- NULL marks an organization-wide document
    association_id UUID REFERENCES associations(id) ON DELETE CASCADE,
    title VARCHAR(255) NOT NULL,
    category VARCHAR(100) NOT NULL,
    body TEXT,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_documents_scope ON documents(organization_id, association_id);
CREATE INDEX idx_documents_category ON documents(organization_id, category);
";

const WORK_ORDERS_SQL: &str = r"
CREATE TABLE work_orders (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    -- NULL marks an organization-wide work order
    association_id UUID REFERENCES associations(id) ON DELETE CASCADE,
    title VARCHAR(255) NOT NULL,
    description TEXT,
    status work_order_status NOT NULL DEFAULT 'open',
    assigned_to UUID REFERENCES users(id),
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_work_orders_scope ON work_orders(organization_id, association_id);
CREATE INDEX idx_work_orders_status ON work_orders(organization_id, status);
";

const ASSIGNMENT_GRANTS_SQL: &str = r"
-- Materialized assignment facts. The tiered read policies probe this table
-- with an indexed EXISTS instead of recomputing assignment state per row.
CREATE TABLE assignment_grants (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    grantee_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    resource_id UUID NOT NULL,
    work_order_id UUID NOT NULL REFERENCES work_orders(id) ON DELETE CASCADE,
    reason grant_reason NOT NULL,
    status grant_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_assignment_grants_probe
    ON assignment_grants(grantee_id, resource_id, status);
CREATE INDEX idx_assignment_grants_work_order ON assignment_grants(work_order_id);
";

const AUDIT_EVENTS_SQL: &str = r"
-- Deliberately no foreign keys: the log must accept the first
-- context-switch row of an organization being created in the same
-- transaction, and must outlive anything it references.
CREATE TABLE audit_events (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    association_id UUID,
    -- NULL only for actor_type = 'system'
    performed_by UUID,
    actor_type actor_type NOT NULL,
    action VARCHAR(100) NOT NULL,
    previous_state JSONB,
    new_state JSONB,
    performed_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT audit_events_actor_attribution
        CHECK (performed_by IS NOT NULL OR actor_type = 'system')
);

CREATE INDEX idx_audit_events_org_time
    ON audit_events(organization_id, performed_at DESC);
CREATE INDEX idx_audit_events_actor ON audit_events(organization_id, performed_by);
CREATE INDEX idx_audit_events_action ON audit_events(organization_id, action);
";

const TRIGGERS_SQL: &str = r"
-- updated_at maintenance
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = NOW();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_users_updated_at
    BEFORE UPDATE ON users FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_sessions_updated_at
    BEFORE UPDATE ON sessions FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_organizations_updated_at
    BEFORE UPDATE ON organizations FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_organization_users_updated_at
    BEFORE UPDATE ON organization_users FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_associations_updated_at
    BEFORE UPDATE ON associations FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_association_members_updated_at
    BEFORE UPDATE ON association_members FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_documents_updated_at
    BEFORE UPDATE ON documents FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_work_orders_updated_at
    BEFORE UPDATE ON work_orders FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_assignment_grants_updated_at
    BEFORE UPDATE ON assignment_grants FOR EACH ROW EXECUTE FUNCTION set_updated_at();

-- A row's organization never changes after creation
CREATE OR REPLACE FUNCTION prevent_org_reparenting()
RETURNS TRIGGER AS $$
BEGIN
    IF NEW.organization_id IS DISTINCT FROM OLD.organization_id THEN
        RAISE EXCEPTION 'organization_id is immutable';
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_associations_org_immutable
    BEFORE UPDATE ON associations FOR EACH ROW EXECUTE FUNCTION prevent_org_reparenting();
CREATE TRIGGER trg_association_members_org_immutable
    BEFORE UPDATE ON association_members FOR EACH ROW EXECUTE FUNCTION prevent_org_reparenting();
CREATE TRIGGER trg_documents_org_immutable
    BEFORE UPDATE ON documents FOR EACH ROW EXECUTE FUNCTION prevent_org_reparenting();
CREATE TRIGGER trg_work_orders_org_immutable
    BEFORE UPDATE ON work_orders FOR EACH ROW EXECUTE FUNCTION prevent_org_reparenting();
CREATE TRIGGER trg_assignment_grants_org_immutable
    BEFORE UPDATE ON assignment_grants FOR EACH ROW EXECUTE FUNCTION prevent_org_reparenting();

-- The audit log is append-only
CREATE OR REPLACE FUNCTION reject_audit_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'audit_events is append-only';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_audit_events_immutable
    BEFORE UPDATE OR DELETE ON audit_events
    FOR EACH ROW EXECUTE FUNCTION reject_audit_mutation();
";

const CONTEXT_FUNCTIONS_SQL: &str = r"
-- Transaction-scoped tenant context, read by every policy below. The
-- application asserts these with SET LOCAL at the start of each
-- transaction. An unset or empty setting parses to NULL, and NULL fails
-- every comparison: no context means deny-all, never a wider default.

CREATE FUNCTION app_current_org_id() RETURNS UUID
LANGUAGE sql STABLE AS $$
    SELECT NULLIF(current_setting('app.current_organization_id', true), '')::UUID
$$;

CREATE FUNCTION app_current_association_id() RETURNS UUID
LANGUAGE sql STABLE AS $$
    SELECT NULLIF(current_setting('app.current_association_id', true), '')::UUID
$$;

CREATE FUNCTION app_current_user_id() RETURNS UUID
LANGUAGE sql STABLE AS $$
    SELECT NULLIF(current_setting('app.current_user_id', true), '')::UUID
$$;

CREATE FUNCTION app_is_org_staff() RETURNS BOOLEAN
LANGUAGE sql STABLE AS $$
    SELECT COALESCE(NULLIF(current_setting('app.is_org_staff', true), '')::BOOLEAN, FALSE)
$$;
";

const BOOTSTRAP_LOOKUP_SQL: &str = r"
-- RLS-exempt bootstrap lookup: resolves which organization owns an opaque
-- item id BEFORE any tenant context exists (the lookup a context assertion
-- itself would need). SECURITY DEFINER runs as the migration role, which
-- bypasses the tenant policies. The projection is the entire contract:
-- item type, item id, owning organization - no business columns are
-- reachable through here by construction.
CREATE FUNCTION find_owning_organization(p_item_type TEXT, p_item_id UUID)
RETURNS UUID
LANGUAGE sql STABLE SECURITY DEFINER
SET search_path = public
AS $$
    SELECT organization_id FROM (
        SELECT 'association' AS item_type, id, organization_id FROM associations
        UNION ALL
        SELECT 'document', id, organization_id FROM documents
        UNION ALL
        SELECT 'work_order', id, organization_id FROM work_orders
    ) items
    WHERE items.item_type = p_item_type AND items.id = p_item_id
$$;

-- Same escape hatch, same constraints, for principal resolution: the
-- memberships of a user must be readable before any context exists,
-- because they are what context validation checks against. Projection is
-- membership facts only (ids and role), nothing else.
CREATE FUNCTION resolve_principal_memberships(p_user_id UUID)
RETURNS TABLE(kind TEXT, target_id UUID, organization_id UUID, role TEXT)
LANGUAGE sql STABLE SECURITY DEFINER
SET search_path = public
AS $$
    SELECT 'organization'::TEXT, ou.organization_id, ou.organization_id, ou.role::TEXT
    FROM organization_users ou
    WHERE ou.user_id = p_user_id
    UNION ALL
    SELECT 'association'::TEXT, am.association_id, am.organization_id, am.role::TEXT
    FROM association_members am
    WHERE am.user_id = p_user_id
$$;
";

const RLS_SQL: &str = r"
-- ============================================================
-- ROW-LEVEL SECURITY
-- Two predicate shapes:
--   direct: organization_id = app_current_org_id()
--   tiered: direct AND (staff bypass OR association match OR
--           NULL-is-global OR, for SELECT only, an assignment grant)
-- Write policies mirror the read shape minus the assignment branch;
-- INSERT/UPDATE additionally verify that any association stamp belongs
-- to the active organization.
-- ============================================================

ALTER TABLE organizations ENABLE ROW LEVEL SECURITY;
ALTER TABLE organization_users ENABLE ROW LEVEL SECURITY;
ALTER TABLE associations ENABLE ROW LEVEL SECURITY;
ALTER TABLE association_members ENABLE ROW LEVEL SECURITY;
ALTER TABLE documents ENABLE ROW LEVEL SECURITY;
ALTER TABLE work_orders ENABLE ROW LEVEL SECURITY;
ALTER TABLE assignment_grants ENABLE ROW LEVEL SECURITY;
ALTER TABLE audit_events ENABLE ROW LEVEL SECURITY;

-- ------------------------------------------------------------
-- organizations (direct; the row IS the organization)
-- ------------------------------------------------------------
CREATE POLICY tenant_select ON organizations FOR SELECT
    USING (id = app_current_org_id());
CREATE POLICY tenant_insert ON organizations FOR INSERT
    WITH CHECK (id = app_current_org_id());
CREATE POLICY tenant_update ON organizations FOR UPDATE
    USING (id = app_current_org_id())
    WITH CHECK (id = app_current_org_id());
CREATE POLICY tenant_delete ON organizations FOR DELETE
    USING (id = app_current_org_id() AND app_is_org_staff());

-- ------------------------------------------------------------
-- organization_users (direct)
-- ------------------------------------------------------------
CREATE POLICY tenant_select ON organization_users FOR SELECT
    USING (organization_id = app_current_org_id());
CREATE POLICY tenant_insert ON organization_users FOR INSERT
    WITH CHECK (organization_id = app_current_org_id() AND app_is_org_staff());
CREATE POLICY tenant_update ON organization_users FOR UPDATE
    USING (organization_id = app_current_org_id() AND app_is_org_staff())
    WITH CHECK (organization_id = app_current_org_id());
CREATE POLICY tenant_delete ON organization_users FOR DELETE
    USING (organization_id = app_current_org_id() AND app_is_org_staff());

-- ------------------------------------------------------------
-- associations (direct: every member of the org may read the
-- association directory; only staff mutate it)
-- ------------------------------------------------------------
CREATE POLICY tenant_select ON associations FOR SELECT
    USING (organization_id = app_current_org_id());
CREATE POLICY tenant_insert ON associations FOR INSERT
    WITH CHECK (organization_id = app_current_org_id() AND app_is_org_staff());
CREATE POLICY tenant_update ON associations FOR UPDATE
    USING (organization_id = app_current_org_id() AND app_is_org_staff())
    WITH CHECK (organization_id = app_current_org_id());
CREATE POLICY tenant_delete ON associations FOR DELETE
    USING (organization_id = app_current_org_id() AND app_is_org_staff());

-- ------------------------------------------------------------
-- association_members (tiered, association_id is NOT NULL here)
-- ------------------------------------------------------------
CREATE POLICY tenant_select ON association_members FOR SELECT
    USING (
        organization_id = app_current_org_id()
        AND (app_is_org_staff() OR association_id = app_current_association_id())
    );
CREATE POLICY tenant_insert ON association_members FOR INSERT
    WITH CHECK (
        organization_id = app_current_org_id()
        AND app_is_org_staff()
        AND EXISTS (
            SELECT 1 FROM associations a
            WHERE a.id = association_id
              AND a.organization_id = app_current_org_id()
        )
    );
CREATE POLICY tenant_update ON association_members FOR UPDATE
    USING (organization_id = app_current_org_id() AND app_is_org_staff())
    WITH CHECK (organization_id = app_current_org_id());
CREATE POLICY tenant_delete ON association_members FOR DELETE
    USING (organization_id = app_current_org_id() AND app_is_org_staff());

-- ------------------------------------------------------------
-- documents (tiered with assignment bypass on SELECT)
-- ------------------------------------------------------------
CREATE POLICY tenant_select ON documents FOR SELECT
    USING (
        organization_id = app_current_org_id()
        AND (
            app_is_org_staff()
            OR association_id IS NULL
            OR association_id = app_current_association_id()
            OR EXISTS (
                SELECT 1 FROM assignment_grants g
                WHERE g.grantee_id = app_current_user_id()
                  AND g.resource_id = documents.id
                  AND g.status = 'active'
            )
        )
    );
CREATE POLICY tenant_insert ON documents FOR INSERT
    WITH CHECK (
        organization_id = app_current_org_id()
        AND (
            app_is_org_staff()
            OR association_id IS NULL
            OR association_id = app_current_association_id()
        )
        AND (
            association_id IS NULL
            OR EXISTS (
                SELECT 1 FROM associations a
                WHERE a.id = association_id
                  AND a.organization_id = app_current_org_id()
            )
        )
    );
CREATE POLICY tenant_update ON documents FOR UPDATE
    USING (
        organization_id = app_current_org_id()
        AND (
            app_is_org_staff()
            OR association_id IS NULL
            OR association_id = app_current_association_id()
        )
    )
    WITH CHECK (
        organization_id = app_current_org_id()
        AND (
            association_id IS NULL
            OR EXISTS (
                SELECT 1 FROM associations a
                WHERE a.id = association_id
                  AND a.organization_id = app_current_org_id()
            )
        )
    );
CREATE POLICY tenant_delete ON documents FOR DELETE
    USING (
        organization_id = app_current_org_id()
        AND (
            app_is_org_staff()
            OR association_id IS NULL
            OR association_id = app_current_association_id()
        )
    );

-- ------------------------------------------------------------
-- work_orders (tiered with assignment bypass on SELECT)
-- ------------------------------------------------------------
CREATE POLICY tenant_select ON work_orders FOR SELECT
    USING (
        organization_id = app_current_org_id()
        AND (
            app_is_org_staff()
            OR association_id IS NULL
            OR association_id = app_current_association_id()
            OR EXISTS (
                SELECT 1 FROM assignment_grants g
                WHERE g.grantee_id = app_current_user_id()
                  AND g.resource_id = work_orders.id
                  AND g.status = 'active'
            )
        )
    );
CREATE POLICY tenant_insert ON work_orders FOR INSERT
    WITH CHECK (
        organization_id = app_current_org_id()
        AND (
            app_is_org_staff()
            OR association_id IS NULL
            OR association_id = app_current_association_id()
        )
        AND (
            association_id IS NULL
            OR EXISTS (
                SELECT 1 FROM associations a
                WHERE a.id = association_id
                  AND a.organization_id = app_current_org_id()
            )
        )
    );
CREATE POLICY tenant_update ON work_orders FOR UPDATE
    USING (
        organization_id = app_current_org_id()
        AND (
            app_is_org_staff()
            OR association_id IS NULL
            OR association_id = app_current_association_id()
        )
    )
    WITH CHECK (
        organization_id = app_current_org_id()
        AND (
            association_id IS NULL
            OR EXISTS (
                SELECT 1 FROM associations a
                WHERE a.id = association_id
                  AND a.organization_id = app_current_org_id()
            )
        )
    );
CREATE POLICY tenant_delete ON work_orders FOR DELETE
    USING (organization_id = app_current_org_id() AND app_is_org_staff());

-- ------------------------------------------------------------
-- assignment_grants (direct; grantees read their own grants,
-- staff manage the rest)
-- ------------------------------------------------------------
CREATE POLICY tenant_select ON assignment_grants FOR SELECT
    USING (
        organization_id = app_current_org_id()
        AND (app_is_org_staff() OR grantee_id = app_current_user_id())
    );
CREATE POLICY tenant_insert ON assignment_grants FOR INSERT
    WITH CHECK (organization_id = app_current_org_id() AND app_is_org_staff());
CREATE POLICY tenant_update ON assignment_grants FOR UPDATE
    USING (organization_id = app_current_org_id() AND app_is_org_staff())
    WITH CHECK (organization_id = app_current_org_id());
CREATE POLICY tenant_delete ON assignment_grants FOR DELETE
    USING (organization_id = app_current_org_id() AND app_is_org_staff());

-- ------------------------------------------------------------
-- audit_events (append-only: SELECT and INSERT policies only;
-- UPDATE/DELETE have no policy and are denied outright)
-- ------------------------------------------------------------
CREATE POLICY tenant_select ON audit_events FOR SELECT
    USING (organization_id = app_current_org_id());
CREATE POLICY tenant_insert ON audit_events FOR INSERT
    WITH CHECK (organization_id = app_current_org_id());
";

const DROP_ALL_SQL: &str = r"
DROP FUNCTION IF EXISTS resolve_principal_memberships(UUID);
DROP FUNCTION IF EXISTS find_owning_organization(TEXT, UUID);
DROP FUNCTION IF EXISTS app_current_org_id();
DROP FUNCTION IF EXISTS app_current_association_id();
DROP FUNCTION IF EXISTS app_current_user_id();
DROP FUNCTION IF EXISTS app_is_org_staff();

DROP TABLE IF EXISTS audit_events;
DROP TABLE IF EXISTS assignment_grants;
DROP TABLE IF EXISTS work_orders;
DROP TABLE IF EXISTS documents;
DROP TABLE IF EXISTS association_members;
DROP TABLE IF EXISTS associations;
DROP TABLE IF EXISTS organization_users;
DROP TABLE IF EXISTS organizations;
DROP TABLE IF EXISTS sessions;
DROP TABLE IF EXISTS users;

DROP FUNCTION IF EXISTS set_updated_at();
DROP FUNCTION IF EXISTS prevent_org_reparenting();
DROP FUNCTION IF EXISTS reject_audit_mutation();

DROP TYPE IF EXISTS actor_type;
DROP TYPE IF EXISTS grant_reason;
DROP TYPE IF EXISTS grant_status;
DROP TYPE IF EXISTS work_order_status;
DROP TYPE IF EXISTS association_role;
DROP TYPE IF EXISTS org_role;
";
