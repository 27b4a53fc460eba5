//! Wizard sessions and the per-user session store.

use crate::wizard::state::WizardState;
use group_config::GroupConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::debug;

/// Draft data accumulated across a wizard run.
#[derive(Debug, Clone)]
pub struct SessionData {
    /// Group listing shown at entry, for numeric selection.
    pub groups: Vec<String>,
    /// Target group when creating a new configuration.
    pub group_name: Option<String>,
    /// Target group when editing; its presence defines the edit flow.
    pub selected_group: Option<String>,
    /// The configuration draft.
    pub config: GroupConfig,
    /// Description given for prompt drafting.
    pub group_info: Option<String>,
    /// Prompt drafted by the model, pending approval.
    pub generated_prompt: Option<String>,
}

impl SessionData {
    pub fn new(groups: Vec<String>, defaults: GroupConfig) -> Self {
        Self {
            groups,
            group_name: None,
            selected_group: None,
            config: defaults,
            group_info: None,
            generated_prompt: None,
        }
    }

    /// Whether this run edits a pre-existing group.
    pub fn editing(&self) -> bool {
        self.selected_group.is_some()
    }

    /// The group this run configures.
    pub fn target_group(&self) -> Option<&str> {
        self.selected_group.as_deref().or(self.group_name.as_deref())
    }
}

/// One user's in-progress wizard run.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub state: WizardState,
    pub data: SessionData,
    pub last_activity: Instant,
}

impl Session {
    pub fn new(user_id: impl Into<String>, groups: Vec<String>, defaults: GroupConfig) -> Self {
        Self {
            user_id: user_id.into(),
            state: WizardState::Initial,
            data: SessionData::new(groups, defaults),
            last_activity: Instant::now(),
        }
    }
}

/// In-memory session store, keyed strictly by user id.
///
/// Expiry is lazy: the engine checks `last_activity` on the next message
/// from the user, so no background sweep is needed here.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: &str) -> Option<Session> {
        self.sessions.read().await.get(user_id).cloned()
    }

    pub async fn set(&self, session: Session) {
        self.sessions
            .write()
            .await
            .insert(session.user_id.clone(), session);
    }

    pub async fn delete(&self, user_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(user_id).is_some();
        if removed {
            debug!("Session removed for {}", user_id);
        }
        removed
    }

    pub async fn contains(&self, user_id: &str) -> bool {
        self.sessions.read().await.contains_key(user_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_one_session_per_user() {
        let store = SessionStore::new();

        store
            .set(Session::new("u1", vec![], GroupConfig::default()))
            .await;
        let mut replacement = Session::new("u1", vec![], GroupConfig::default());
        replacement.state = WizardState::AwaitingInterval;
        store.set(replacement).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(
            store.get("u1").await.unwrap().state,
            WizardState::AwaitingInterval
        );
    }

    #[tokio::test]
    async fn test_sessions_are_isolated_per_user() {
        let store = SessionStore::new();

        store
            .set(Session::new("u1", vec!["Estudo".into()], GroupConfig::default()))
            .await;

        assert!(store.get("u2").await.is_none());
        assert!(!store.delete("u2").await);
        assert!(store.contains("u1").await);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = SessionStore::new();

        store
            .set(Session::new("u1", vec![], GroupConfig::default()))
            .await;

        assert!(store.delete("u1").await);
        assert!(!store.delete("u1").await);
    }
}
