//! `SeaORM` Entity for documents table.
//!
//! The canonical association-tier resource. `association_id` is nullable:
//! NULL marks an organization-wide document visible to every member of the
//! organization.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub association_id: Option<Uuid>,
    pub title: String,
    pub category: String,
    pub body: Option<String>,
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

impl ActiveModelBehavior for ActiveModel {}
