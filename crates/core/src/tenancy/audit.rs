//! Audit trail event types.
//!
//! Two event families share one append-only log: context switches (emitted
//! by the context store on every assertion) and business state changes
//! (emitted by whatever workflow made the change). Events are never updated
//! or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::context::TenantContext;
use strata_shared::types::PageRequest;

/// What kind of actor performed an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    /// A human user (staff or member).
    User,
    /// A service provider acting through an assignment.
    Provider,
    /// The platform itself (scheduled jobs, migrations).
    System,
}

/// Actor attribution for an audit event.
///
/// `id` is `None` only for [`ActorType::System`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The acting user, when one exists.
    pub id: Option<Uuid>,
    /// The actor family.
    pub actor_type: ActorType,
}

impl Actor {
    /// A human user actor.
    #[must_use]
    pub const fn user(id: Uuid) -> Self {
        Self {
            id: Some(id),
            actor_type: ActorType::User,
        }
    }

    /// A service-provider actor.
    #[must_use]
    pub const fn provider(id: Uuid) -> Self {
        Self {
            id: Some(id),
            actor_type: ActorType::Provider,
        }
    }

    /// The system actor (no user attribution).
    #[must_use]
    pub const fn system() -> Self {
        Self {
            id: None,
            actor_type: ActorType::System,
        }
    }
}

/// Audited actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A tenant context was asserted on a transaction.
    ContextSwitch,
    /// A document was created.
    DocumentCreated,
    /// A document was updated.
    DocumentUpdated,
    /// A document was deleted.
    DocumentDeleted,
    /// A work order was created.
    WorkOrderCreated,
    /// A work order was assigned to a provider.
    WorkOrderAssigned,
    /// A work order was completed.
    WorkOrderCompleted,
    /// An association member was added.
    MemberAdded,
    /// An association member was removed.
    MemberRemoved,
}

impl AuditAction {
    /// Stable string form stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ContextSwitch => "context_switch",
            Self::DocumentCreated => "document_created",
            Self::DocumentUpdated => "document_updated",
            Self::DocumentDeleted => "document_deleted",
            Self::WorkOrderCreated => "work_order_created",
            Self::WorkOrderAssigned => "work_order_assigned",
            Self::WorkOrderCompleted => "work_order_completed",
            Self::MemberAdded => "member_added",
            Self::MemberRemoved => "member_removed",
        }
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "context_switch" => Ok(Self::ContextSwitch),
            "document_created" => Ok(Self::DocumentCreated),
            "document_updated" => Ok(Self::DocumentUpdated),
            "document_deleted" => Ok(Self::DocumentDeleted),
            "work_order_created" => Ok(Self::WorkOrderCreated),
            "work_order_assigned" => Ok(Self::WorkOrderAssigned),
            "work_order_completed" => Ok(Self::WorkOrderCompleted),
            "member_added" => Ok(Self::MemberAdded),
            "member_removed" => Ok(Self::MemberRemoved),
            other => Err(format!("unknown audit action: {other}")),
        }
    }
}

/// A new audit event, ready to append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAuditEvent {
    /// Organization the event belongs to.
    pub organization_id: Uuid,
    /// Association scope, when the event has one.
    pub association_id: Option<Uuid>,
    /// Who performed the action.
    pub actor: Actor,
    /// What happened.
    pub action: AuditAction,
    /// State before the change, when applicable.
    pub previous_state: Option<Value>,
    /// State after the change, when applicable.
    pub new_state: Option<Value>,
}

impl NewAuditEvent {
    /// Builds a business state-change event.
    #[must_use]
    pub const fn state_change(
        organization_id: Uuid,
        association_id: Option<Uuid>,
        actor: Actor,
        action: AuditAction,
        previous_state: Option<Value>,
        new_state: Option<Value>,
    ) -> Self {
        Self {
            organization_id,
            association_id,
            actor,
            action,
            previous_state,
            new_state,
        }
    }

    /// Builds a context-switch event for one assertion of `ctx`.
    ///
    /// Built unconditionally: the caller records every assertion, including
    /// ones that repeat the previous values, so the switch log replays
    /// "who acted as which tenant, when" completely.
    #[must_use]
    pub fn context_switch(
        ctx: &TenantContext,
        actor: Actor,
        reason: Option<&str>,
        item: Option<(&str, Uuid)>,
    ) -> Self {
        let mut state = serde_json::Map::new();
        state.insert(
            "organization_id".to_string(),
            Value::String(ctx.organization_id.to_string()),
        );
        state.insert(
            "association_id".to_string(),
            ctx.association_id
                .map_or(Value::Null, |a| Value::String(a.to_string())),
        );
        state.insert("is_org_staff".to_string(), Value::Bool(ctx.is_org_staff));
        if let Some(reason) = reason {
            state.insert("reason".to_string(), Value::String(reason.to_string()));
        }
        if let Some((item_type, item_id)) = item {
            state.insert("item_type".to_string(), Value::String(item_type.to_string()));
            state.insert("item_id".to_string(), Value::String(item_id.to_string()));
        }

        Self {
            organization_id: ctx.organization_id,
            association_id: ctx.association_id,
            actor,
            action: AuditAction::ContextSwitch,
            previous_state: None,
            new_state: Some(Value::Object(state)),
        }
    }
}

/// Filters for the audit query surface.
///
/// Events are always listed newest-first for one organization; the
/// organization itself comes from the active tenant context, not from the
/// filter.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Restrict to one association.
    pub association_id: Option<Uuid>,
    /// Restrict to one actor.
    pub actor_id: Option<Uuid>,
    /// Restrict to one action.
    pub action: Option<AuditAction>,
    /// Inclusive lower bound on `performed_at`.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `performed_at`.
    pub to: Option<DateTime<Utc>>,
    /// Pagination.
    pub page: PageRequest,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_actor_constructors() {
        let id = Uuid::new_v4();
        assert_eq!(Actor::user(id).id, Some(id));
        assert_eq!(Actor::system().id, None);
        assert_eq!(Actor::system().actor_type, ActorType::System);
    }

    #[test]
    fn test_action_round_trip() {
        for action in [
            AuditAction::ContextSwitch,
            AuditAction::DocumentCreated,
            AuditAction::WorkOrderAssigned,
            AuditAction::MemberRemoved,
        ] {
            assert_eq!(AuditAction::from_str(action.as_str()).unwrap(), action);
        }
        assert!(AuditAction::from_str("nonsense").is_err());
    }

    #[test]
    fn test_context_switch_event_carries_full_context() {
        let org = Uuid::new_v4();
        let assoc = Uuid::new_v4();
        let ctx = TenantContext::staff_focused(org, assoc);
        let actor = Actor::user(Uuid::new_v4());

        let event =
            NewAuditEvent::context_switch(&ctx, actor, Some("work-queue"), Some(("case", assoc)));

        assert_eq!(event.organization_id, org);
        assert_eq!(event.association_id, Some(assoc));
        assert_eq!(event.action, AuditAction::ContextSwitch);

        let state = event.new_state.unwrap();
        assert_eq!(state["organization_id"], org.to_string());
        assert_eq!(state["is_org_staff"], Value::Bool(true));
        assert_eq!(state["reason"], "work-queue");
        assert_eq!(state["item_type"], "case");
    }

    #[test]
    fn test_context_switch_event_null_association() {
        let ctx = TenantContext::staff(Uuid::new_v4());
        let event = NewAuditEvent::context_switch(&ctx, Actor::system(), None, None);

        assert_eq!(event.association_id, None);
        let state = event.new_state.unwrap();
        assert_eq!(state["association_id"], Value::Null);
    }
}
