//! The configuration dialog state machine.
//!
//! One user reply advances the session by at most one transition. Invalid
//! input re-asks the same question; `cancelar` and `voltar` are recognized
//! everywhere; an idle session expires lazily on its next message.

use crate::wizard::input;
use crate::wizard::prompts;
use crate::wizard::session::{Session, SessionData, SessionStore};
use crate::wizard::state::WizardState;
use async_trait::async_trait;
use group_config::ConfigStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

/// Reply of one wizard step.
#[derive(Debug, Clone)]
pub struct WizardReply {
    pub text: String,
    /// Whether this step persisted (or removed) a configuration record.
    pub committed: bool,
}

impl WizardReply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            committed: false,
        }
    }

    fn committed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            committed: true,
        }
    }
}

/// Drafts a summary prompt from a free-text group description.
#[async_trait]
pub trait PromptDrafter: Send + Sync {
    async fn draft(&self, description: &str) -> anyhow::Result<String>;
}

/// The wizard engine. Owns the session store; reads and writes group
/// configuration through the injected store.
pub struct WizardEngine {
    sessions: SessionStore,
    store: Arc<dyn ConfigStore>,
    drafter: Arc<dyn PromptDrafter>,
    idle_timeout: Duration,
}

impl WizardEngine {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        drafter: Arc<dyn PromptDrafter>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            sessions: SessionStore::new(),
            store,
            drafter,
            idle_timeout,
        }
    }

    /// Whether the user owns an active session. Expired sessions still
    /// count here; `advance` evicts and reports them on the next message.
    pub async fn is_active(&self, user_id: &str) -> bool {
        self.sessions.contains(user_id).await
    }

    /// Enter the wizard: list configured groups and open a fresh session.
    /// Replaces any previous session of the same user.
    #[instrument(skip(self))]
    pub async fn start(&self, user_id: &str) -> WizardReply {
        match self.start_inner(user_id).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Failed to start wizard for {}: {}", user_id, e);
                self.sessions.delete(user_id).await;
                WizardReply::text(prompts::generic_failure())
            }
        }
    }

    async fn start_inner(&self, user_id: &str) -> anyhow::Result<WizardReply> {
        let groups: Vec<String> = self.store.load_all().await?.into_keys().collect();
        let session = Session::new(user_id, groups, self.store.defaults());
        let text = prompts::initial(&session.data.groups);
        self.sessions.set(session).await;
        info!("Wizard session opened for {}", user_id);
        Ok(WizardReply::text(text))
    }

    /// Consume one user reply. Any unexpected failure clears the session
    /// and yields a single generic error message.
    #[instrument(skip(self, text))]
    pub async fn advance(&self, user_id: &str, text: &str) -> WizardReply {
        match self.advance_inner(user_id, text).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Wizard failure for {}: {}", user_id, e);
                self.sessions.delete(user_id).await;
                WizardReply::text(prompts::generic_failure())
            }
        }
    }

    async fn advance_inner(&self, user_id: &str, text: &str) -> anyhow::Result<WizardReply> {
        let Some(mut session) = self.sessions.get(user_id).await else {
            return Ok(WizardReply::text(prompts::no_active_session()));
        };

        // Expiry is enforced before any other processing.
        if session.last_activity.elapsed() > self.idle_timeout {
            self.sessions.delete(user_id).await;
            info!("Wizard session of {} expired", user_id);
            return Ok(WizardReply::text(prompts::session_expired()));
        }

        // Even an invalid reply keeps the session alive.
        session.last_activity = Instant::now();
        let input_text = text.trim().to_string();

        if input::is_cancel(&input_text) {
            self.sessions.delete(user_id).await;
            return Ok(WizardReply::text(prompts::cancelled()));
        }

        if session.state != WizardState::Initial && input::is_back(&input_text) {
            return self.go_back(session).await;
        }

        match session.state {
            WizardState::Initial => self.on_initial(session, &input_text).await,
            WizardState::AwaitingConfigChoice => self.on_config_choice(session, &input_text).await,
            WizardState::AwaitingEditOption => self.on_edit_option(session, &input_text).await,
            WizardState::AwaitingInterval => self.on_interval(session, &input_text).await,
            WizardState::AwaitingQuietStart => self.on_quiet_start(session, &input_text).await,
            WizardState::AwaitingQuietEnd => self.on_quiet_end(session, &input_text).await,
            WizardState::AwaitingAutoDeleteChoice => {
                self.on_auto_delete_choice(session, &input_text).await
            }
            WizardState::AwaitingAutoDeleteTime => {
                self.on_auto_delete_time(session, &input_text).await
            }
            WizardState::AwaitingGroupInfo => self.on_group_info(session, &input_text).await,
            WizardState::AwaitingPromptApproval => {
                self.on_prompt_approval(session, &input_text).await
            }
            WizardState::AwaitingCustomPrompt => self.on_custom_prompt(session, &input_text).await,
            WizardState::AwaitingDeleteConfirm => {
                self.on_delete_confirm(session, &input_text).await
            }
        }
    }

    // Shared steps

    /// The question belonging to the session's current state.
    fn prompt_for(&self, session: &Session) -> String {
        let group = session.data.target_group().unwrap_or("?");

        match session.state {
            WizardState::Initial => prompts::initial(&session.data.groups),
            WizardState::AwaitingConfigChoice => prompts::config_choice(group),
            WizardState::AwaitingEditOption => prompts::edit_menu(group, &session.data.config),
            WizardState::AwaitingInterval => prompts::interval(),
            WizardState::AwaitingQuietStart => prompts::quiet_start(),
            WizardState::AwaitingQuietEnd => prompts::quiet_end(),
            WizardState::AwaitingAutoDeleteChoice => prompts::auto_delete_choice(),
            WizardState::AwaitingAutoDeleteTime => prompts::auto_delete_time(),
            WizardState::AwaitingGroupInfo => {
                if session.data.group_info.is_some() {
                    prompts::draft_failed()
                } else {
                    prompts::group_info()
                }
            }
            WizardState::AwaitingPromptApproval => prompts::prompt_approval(
                session.data.generated_prompt.as_deref().unwrap_or_default(),
            ),
            WizardState::AwaitingCustomPrompt => prompts::custom_prompt(),
            WizardState::AwaitingDeleteConfirm => prompts::delete_confirm(group),
        }
    }

    /// Invalid input: same question again, no transition.
    async fn reprompt(&self, session: Session, note: &str) -> anyhow::Result<WizardReply> {
        let text = format!("⚠️ {}\n\n{}", note, self.prompt_for(&session));
        self.sessions.set(session).await;
        Ok(WizardReply::text(text))
    }

    /// Move to another state and ask its question.
    async fn transition(
        &self,
        mut session: Session,
        to: WizardState,
    ) -> anyhow::Result<WizardReply> {
        session.state = to;
        let text = self.prompt_for(&session);
        self.sessions.set(session).await;
        Ok(WizardReply::text(text))
    }

    /// `voltar`: follow the reverse edge of the current state.
    async fn go_back(&self, mut session: Session) -> anyhow::Result<WizardReply> {
        let Some(previous) = session.state.back_edge(session.data.editing()) else {
            return self.reprompt(session, prompts::invalid_option()).await;
        };

        if previous == WizardState::Initial {
            // Fresh entry again: re-list groups, drop the draft.
            let groups = self.store.load_all().await?.into_keys().collect();
            session.data = SessionData::new(groups, self.store.defaults());
        }

        if previous == WizardState::AwaitingGroupInfo {
            // Back to re-describe: the old description and draft are stale.
            session.data.group_info = None;
            session.data.generated_prompt = None;
        }

        self.transition(session, previous).await
    }

    /// Terminal commit: one persistence call, then the session is removed
    /// whether the call succeeded or not.
    async fn commit(&self, session: Session) -> anyhow::Result<WizardReply> {
        let group = session.data.target_group().unwrap_or_default().to_string();
        let config = session.data.config.clone();

        let result = self.store.put(&group, config.clone()).await;
        self.sessions.delete(&session.user_id).await;

        match result {
            Ok(()) => {
                info!("Committed configuration of {}", group);
                Ok(WizardReply::committed(prompts::committed(&group, &config)))
            }
            Err(e) => {
                error!("Failed to persist configuration of {}: {}", group, e);
                Ok(WizardReply::text(prompts::commit_failed()))
            }
        }
    }

    /// Terminal removal of an existing group's configuration.
    async fn commit_removal(&self, session: Session) -> anyhow::Result<WizardReply> {
        let group = session
            .data
            .selected_group
            .clone()
            .unwrap_or_default();

        let result = self.store.remove(&group).await;
        self.sessions.delete(&session.user_id).await;

        match result {
            Ok(_) => {
                info!("Removed configuration of {}", group);
                Ok(WizardReply::committed(prompts::removed(&group)))
            }
            Err(e) => {
                error!("Failed to remove configuration of {}: {}", group, e);
                Ok(WizardReply::text(prompts::commit_failed()))
            }
        }
    }

    /// Edit-flow commit: persist the whole record and return to the menu.
    /// A persistence failure ends the session, never a partial write.
    async fn commit_in_place<F>(
        &self,
        mut session: Session,
        confirmation: F,
    ) -> anyhow::Result<WizardReply>
    where
        F: FnOnce(&str) -> String,
    {
        let group = session
            .data
            .selected_group
            .clone()
            .unwrap_or_default();

        match self.store.put(&group, session.data.config.clone()).await {
            Ok(()) => {
                session.state = WizardState::AwaitingEditOption;
                let text = format!("{}\n\n{}", confirmation(&group), self.prompt_for(&session));
                self.sessions.set(session).await;
                Ok(WizardReply::committed(text))
            }
            Err(e) => {
                error!("Failed to persist configuration of {}: {}", group, e);
                self.sessions.delete(&session.user_id).await;
                Ok(WizardReply::text(prompts::commit_failed()))
            }
        }
    }

    /// Ask the drafter for a prompt. On failure the state is kept and the
    /// retry menu is offered.
    async fn attempt_draft(
        &self,
        mut session: Session,
        description: String,
    ) -> anyhow::Result<WizardReply> {
        match self.drafter.draft(&description).await {
            Ok(draft) => {
                session.data.generated_prompt = Some(draft);
                self.transition(session, WizardState::AwaitingPromptApproval)
                    .await
            }
            Err(e) => {
                warn!("Prompt drafting failed: {}", e);
                self.sessions.set(session).await;
                Ok(WizardReply::text(prompts::draft_failed()))
            }
        }
    }

    // Per-state handlers

    async fn on_initial(&self, mut session: Session, input: &str) -> anyhow::Result<WizardReply> {
        if input.is_empty() {
            return self.reprompt(session, prompts::empty_text()).await;
        }

        if let Ok(n) = input.parse::<usize>() {
            if n >= 1 && n <= session.data.groups.len() {
                let name = session.data.groups[n - 1].clone();
                return self.select_group(session, name).await;
            }
            // A bare number that selects nothing is a mistake, not a name.
            return self.reprompt(session, prompts::invalid_option()).await;
        }

        if let Some(existing) = session
            .data
            .groups
            .iter()
            .find(|g| g.eq_ignore_ascii_case(input))
            .cloned()
        {
            return self.select_group(session, existing).await;
        }

        session.data.group_name = Some(input.to_string());
        session.data.config = self.store.defaults();
        self.transition(session, WizardState::AwaitingConfigChoice)
            .await
    }

    async fn select_group(&self, mut session: Session, name: String) -> anyhow::Result<WizardReply> {
        let config = self
            .store
            .get(&name)
            .await?
            .unwrap_or_else(|| self.store.defaults());

        session.data.selected_group = Some(name);
        session.data.config = config;
        self.transition(session, WizardState::AwaitingEditOption)
            .await
    }

    async fn on_config_choice(
        &self,
        mut session: Session,
        input: &str,
    ) -> anyhow::Result<WizardReply> {
        match input::parse_choice(input, 2) {
            Some(1) => {
                session.data.config = self.store.defaults();
                self.commit(session).await
            }
            Some(2) => self.transition(session, WizardState::AwaitingInterval).await,
            _ => self.reprompt(session, prompts::invalid_option()).await,
        }
    }

    async fn on_edit_option(
        &self,
        mut session: Session,
        input: &str,
    ) -> anyhow::Result<WizardReply> {
        match input::parse_choice(input, 6) {
            Some(1) => {
                session.data.config.enabled = !session.data.config.enabled;
                let enabled = session.data.config.enabled;
                self.commit_in_place(session, |group| prompts::toggled(group, enabled))
                    .await
            }
            Some(2) => self.transition(session, WizardState::AwaitingInterval).await,
            Some(3) => {
                self.transition(session, WizardState::AwaitingQuietStart)
                    .await
            }
            Some(4) => {
                self.transition(session, WizardState::AwaitingAutoDeleteChoice)
                    .await
            }
            Some(5) => self.transition(session, WizardState::AwaitingGroupInfo).await,
            Some(6) => {
                self.transition(session, WizardState::AwaitingDeleteConfirm)
                    .await
            }
            _ => self.reprompt(session, prompts::invalid_option()).await,
        }
    }

    async fn on_interval(&self, mut session: Session, input: &str) -> anyhow::Result<WizardReply> {
        let Some(hours) = input::parse_interval(input) else {
            return self.reprompt(session, prompts::invalid_interval()).await;
        };

        session.data.config.interval_hours = hours;

        if session.data.editing() {
            self.commit_in_place(session, prompts::updated).await
        } else {
            self.transition(session, WizardState::AwaitingQuietStart)
                .await
        }
    }

    async fn on_quiet_start(
        &self,
        mut session: Session,
        input: &str,
    ) -> anyhow::Result<WizardReply> {
        let Some(start) = input::parse_time(input) else {
            return self.reprompt(session, prompts::invalid_time()).await;
        };

        session.data.config.quiet.start = start;
        self.transition(session, WizardState::AwaitingQuietEnd).await
    }

    async fn on_quiet_end(&self, mut session: Session, input: &str) -> anyhow::Result<WizardReply> {
        let Some(end) = input::parse_time(input) else {
            return self.reprompt(session, prompts::invalid_time()).await;
        };

        session.data.config.quiet.end = end;

        if session.data.editing() {
            self.commit_in_place(session, prompts::updated).await
        } else {
            self.transition(session, WizardState::AwaitingAutoDeleteChoice)
                .await
        }
    }

    async fn on_auto_delete_choice(
        &self,
        mut session: Session,
        input: &str,
    ) -> anyhow::Result<WizardReply> {
        match input::parse_choice(input, 2) {
            Some(1) => {
                self.transition(session, WizardState::AwaitingAutoDeleteTime)
                    .await
            }
            Some(2) => {
                session.data.config.delete_after_minutes = None;
                if session.data.editing() {
                    self.commit_in_place(session, prompts::updated).await
                } else {
                    self.transition(session, WizardState::AwaitingGroupInfo)
                        .await
                }
            }
            _ => self.reprompt(session, prompts::invalid_option()).await,
        }
    }

    async fn on_auto_delete_time(
        &self,
        mut session: Session,
        input: &str,
    ) -> anyhow::Result<WizardReply> {
        let Some(minutes) = input::parse_delete_after(input) else {
            return self.reprompt(session, prompts::invalid_duration()).await;
        };

        session.data.config.delete_after_minutes = Some(minutes);

        if session.data.editing() {
            self.commit_in_place(session, prompts::updated).await
        } else {
            self.transition(session, WizardState::AwaitingGroupInfo)
                .await
        }
    }

    async fn on_group_info(
        &self,
        mut session: Session,
        input: &str,
    ) -> anyhow::Result<WizardReply> {
        // A stored description means the last draft attempt failed and the
        // retry menu is on screen; only then are bare digits menu choices.
        if session.data.group_info.is_some() {
            match input {
                "1" => {
                    let description = session
                        .data
                        .group_info
                        .clone()
                        .unwrap_or_default();
                    return self.attempt_draft(session, description).await;
                }
                "2" => {
                    return self
                        .transition(session, WizardState::AwaitingCustomPrompt)
                        .await;
                }
                "3" => {
                    session.data.config.prompt = None;
                    return self.commit(session).await;
                }
                _ => {}
            }
        }

        if input.is_empty() {
            return self.reprompt(session, prompts::empty_text()).await;
        }

        session.data.group_info = Some(input.to_string());
        self.attempt_draft(session, input.to_string()).await
    }

    async fn on_prompt_approval(
        &self,
        mut session: Session,
        input: &str,
    ) -> anyhow::Result<WizardReply> {
        match input::parse_choice(input, 3) {
            Some(1) => {
                session.data.config.prompt = session.data.generated_prompt.clone();
                self.commit(session).await
            }
            Some(2) => {
                self.transition(session, WizardState::AwaitingCustomPrompt)
                    .await
            }
            Some(3) => {
                session.data.config.prompt = None;
                self.commit(session).await
            }
            _ => self.reprompt(session, prompts::invalid_option()).await,
        }
    }

    async fn on_custom_prompt(
        &self,
        mut session: Session,
        input: &str,
    ) -> anyhow::Result<WizardReply> {
        if input.is_empty() {
            return self.reprompt(session, prompts::empty_text()).await;
        }

        session.data.config.prompt = Some(input.to_string());
        self.commit(session).await
    }

    async fn on_delete_confirm(
        &self,
        mut session: Session,
        input: &str,
    ) -> anyhow::Result<WizardReply> {
        match input::parse_yes_no(input) {
            Some(true) => self.commit_removal(session).await,
            Some(false) => {
                // Only the deletion is cancelled; the menu stays open.
                let group = session
                    .data
                    .selected_group
                    .clone()
                    .unwrap_or_default();
                session.state = WizardState::AwaitingEditOption;
                let text = format!(
                    "{}\n\n{}",
                    prompts::deletion_kept(&group),
                    self.prompt_for(&session)
                );
                self.sessions.set(session).await;
                Ok(WizardReply::text(text))
            }
            None => self.reprompt(session, prompts::invalid_option()).await,
        }
    }
}
