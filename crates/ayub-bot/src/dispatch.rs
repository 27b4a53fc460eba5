//! Inbound message dispatch.
//!
//! An active wizard session owns every message from its user; only then is
//! the resolver consulted. Exactly one reply is sent per inbound message.

use crate::commands::{ids, CommandHandler, CommandMatch, PermissionOutcome, Resolver};
use crate::wizard::WizardEngine;
use chat_log::{ChatLog, LoggedMessage};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use wa_client::{BotMessage, WaClient};

pub struct Dispatcher {
    wa: Arc<WaClient>,
    resolver: Resolver,
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
    wizard: Arc<WizardEngine>,
    chat_log: ChatLog,
    command_sigil: String,
    tag_sigil: String,
}

impl Dispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        wa: Arc<WaClient>,
        resolver: Resolver,
        handlers: Vec<Box<dyn CommandHandler>>,
        wizard: Arc<WizardEngine>,
        chat_log: ChatLog,
        command_sigil: String,
        tag_sigil: String,
    ) -> Self {
        let handlers = handlers.into_iter().map(|h| (h.id(), h)).collect();

        Self {
            wa,
            resolver,
            handlers,
            wizard,
            chat_log,
            command_sigil,
            tag_sigil,
        }
    }

    /// Process one inbound message to completion.
    pub async fn handle(&self, message: &BotMessage) {
        self.record_history(message).await;

        // An active session owns all of the user's messages, sigils or not.
        if self.wizard.is_active(&message.source).await {
            let reply = self.wizard.advance(&message.source, &message.text).await;
            self.send(message, &reply.text).await;
            return;
        }

        let Some(command) = self.resolver.resolve(message).await else {
            return;
        };

        if command.permission == PermissionOutcome::NotAllowed {
            info!(
                "Denied `{}` for {} in {}",
                command.descriptor.id,
                message.source,
                message.reply_target()
            );
            self.send(message, &command.descriptor.errors.not_allowed)
                .await;
            return;
        }

        if command.descriptor.id == ids::CONFIG {
            let reply = self.wizard.start(&message.source).await;
            self.send(message, &reply.text).await;
            return;
        }

        self.execute(message, &command).await;
    }

    async fn execute(&self, message: &BotMessage, command: &CommandMatch) {
        let Some(handler) = self.handlers.get(command.descriptor.id) else {
            warn!("No handler registered for `{}`", command.descriptor.id);
            return;
        };

        let policy = &command.descriptor.auto_delete;

        match handler.execute(message, &command.args).await {
            Ok(reply) => {
                let sent = self.send(message, &reply).await;
                if policy.on_success {
                    self.schedule_delete(message.reply_target(), sent, policy.timeout_ms);
                }
            }
            Err(e) => {
                error!("Command `{}` failed: {}", command.descriptor.id, e);
                let sent = self.send(message, &command.descriptor.errors.failure).await;
                if policy.on_error {
                    self.schedule_delete(message.reply_target(), sent, policy.timeout_ms);
                }
            }
        }
    }

    async fn send(&self, message: &BotMessage, text: &str) -> Option<String> {
        match self.wa.reply(message, text).await {
            Ok(id) => id,
            Err(e) => {
                error!("Failed to send reply: {}", e);
                None
            }
        }
    }

    fn schedule_delete(&self, chat_id: &str, message_id: Option<String>, timeout_ms: u64) {
        let Some(message_id) = message_id else {
            return;
        };

        let wa = self.wa.clone();
        let chat_id = chat_id.to_string();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(timeout_ms)).await;
            if let Err(e) = wa.delete_message(&chat_id, &message_id).await {
                warn!("Auto-delete of {} failed: {}", message_id, e);
            }
        });
    }

    /// Keep group conversation (not commands) for summaries and digests.
    async fn record_history(&self, message: &BotMessage) {
        if !message.is_group || message.text.is_empty() {
            return;
        }
        if message.text.starts_with(&self.command_sigil)
            || message.text.starts_with(&self.tag_sigil)
        {
            return;
        }

        self.chat_log
            .record(
                message.reply_target(),
                LoggedMessage::new(&message.source, message.sender_name.clone(), &message.text),
            )
            .await;
    }
}
