//! Typed domain events and their dispatch.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::{LinkSharing, List, Namespace, Task, Team, User};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "name", content = "payload", rename_all = "snake_case")]
pub enum Event {
    ListSharedWithUser { list: List, user: User, doer_id: i64 },
    ListSharedWithTeam { list: List, team: Team, doer_id: i64 },
    NamespaceSharedWithUser { namespace: Namespace, user: User, doer_id: i64 },
    NamespaceSharedWithTeam { namespace: Namespace, team: Team, doer_id: i64 },
    TaskCreated { task: Task, doer_id: i64 },
    LinkShareCreated { share: LinkSharing, doer_id: i64 },
}

impl Event {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Event::ListSharedWithUser { .. } => "list.shared.user",
            Event::ListSharedWithTeam { .. } => "list.shared.team",
            Event::NamespaceSharedWithUser { .. } => "namespace.shared.user",
            Event::NamespaceSharedWithTeam { .. } => "namespace.shared.team",
            Event::TaskCreated { .. } => "task.created",
            Event::LinkShareCreated { .. } => "link_share.created",
        }
    }
}

/// Publishes events. A failed dispatch aborts the surrounding transaction.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, event: Event) -> Result<()>;
}

/// Writes every event to the log as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDispatcher;

impl Dispatcher for TracingDispatcher {
    fn dispatch(&self, event: Event) -> Result<()> {
        let payload =
            serde_json::to_string(&event).map_err(|e| Error::EventDispatch(e.to_string()))?;
        tracing::info!(event = event.name(), "{payload}");
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = Event::TaskCreated {
            task: Task {
                id: 3,
                title: "Buy milk".to_string(),
                ..Default::default()
            },
            doer_id: 1,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["name"], "task_created");
        assert_eq!(json["payload"]["task"]["title"], "Buy milk");
        assert!(TracingDispatcher.dispatch(event).is_ok());
    }
}
