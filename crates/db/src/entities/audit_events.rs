//! `SeaORM` Entity for audit_events table.
//!
//! Append-only. No update or delete path exists in application code, and
//! the schema defines no UPDATE/DELETE policies, so the database denies
//! both outright.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ActorType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub association_id: Option<Uuid>,
    /// Null only when `actor_type` is `System`.
    pub performed_by: Option<Uuid>,
    pub actor_type: ActorType,
    pub action: String,
    pub previous_state: Option<Json>,
    pub new_state: Option<Json>,
    pub performed_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
