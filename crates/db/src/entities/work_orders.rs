//! `SeaORM` Entity for work_orders table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::WorkOrderStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "work_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub association_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub status: WorkOrderStatus,
    /// Service provider currently assigned, if any.
    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
    #[sea_orm(
        belongs_to = "super::associations::Entity",
        from = "Column::AssociationId",
        to = "super::associations::Column::Id"
    )]
    Associations,
    #[sea_orm(has_many = "super::assignment_grants::Entity")]
    AssignmentGrants,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::associations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Associations.def()
    }
}

impl Related<super::assignment_grants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignmentGrants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
