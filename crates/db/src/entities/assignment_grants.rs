//! `SeaORM` Entity for assignment_grants table.
//!
//! Materialized assignment facts: one row grants one principal read access
//! to one resource. The document and work-order read policies probe this
//! table with an indexed `EXISTS`, so the per-row cost stays an index hit
//! instead of an inline recomputation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{GrantReason, GrantStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "assignment_grants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    /// The principal the grant applies to.
    pub grantee_id: Uuid,
    /// The resource the grant covers (document or work order id).
    pub resource_id: Uuid,
    /// The work order the grant derives from.
    pub work_order_id: Uuid,
    pub reason: GrantReason,
    pub status: GrantStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::work_orders::Entity",
        from = "Column::WorkOrderId",
        to = "super::work_orders::Column::Id"
    )]
    WorkOrders,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::GranteeId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::work_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkOrders.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
