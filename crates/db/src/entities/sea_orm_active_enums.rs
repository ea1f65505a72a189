//! `SeaORM` active enums mapped to `PostgreSQL` enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staff roles within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "org_role")]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
    /// Full access, can transfer ownership.
    #[sea_orm(string_value = "owner")]
    Owner,
    /// Full access except ownership transfer.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Day-to-day community management.
    #[sea_orm(string_value = "manager")]
    Manager,
    /// Concierge/dispatch desk.
    #[sea_orm(string_value = "concierge")]
    Concierge,
    /// Read-only staff access.
    #[sea_orm(string_value = "viewer")]
    Viewer,
}

/// External member roles within an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "association_role")]
#[serde(rename_all = "snake_case")]
pub enum AssociationRole {
    /// Elected board member.
    #[sea_orm(string_value = "board")]
    Board,
    /// Unit owner.
    #[sea_orm(string_value = "owner")]
    Owner,
    /// Resident.
    #[sea_orm(string_value = "resident")]
    Resident,
}

/// Work order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "work_order_status")]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    /// Created, no provider yet.
    #[sea_orm(string_value = "open")]
    Open,
    /// Assigned to a provider.
    #[sea_orm(string_value = "assigned")]
    Assigned,
    /// Work in progress.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Completed.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Assignment grant status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "grant_status")]
#[serde(rename_all = "snake_case")]
pub enum GrantStatus {
    /// Grant is live; the policy engine honors it.
    #[sea_orm(string_value = "active")]
    Active,
    /// Grant ended with the underlying assignment.
    #[sea_orm(string_value = "revoked")]
    Revoked,
}

/// Why an assignment grant exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "grant_reason")]
#[serde(rename_all = "snake_case")]
pub enum GrantReason {
    /// An active work-order assignment.
    #[sea_orm(string_value = "work_order_assignment")]
    WorkOrderAssignment,
    /// A unit/case membership.
    #[sea_orm(string_value = "unit_membership")]
    UnitMembership,
}

/// What kind of actor performed an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "actor_type")]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    /// A human user.
    #[sea_orm(string_value = "user")]
    User,
    /// A service provider.
    #[sea_orm(string_value = "provider")]
    Provider,
    /// The platform itself.
    #[sea_orm(string_value = "system")]
    System,
}
