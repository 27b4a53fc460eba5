//! Summary command - condenses recent chat history via the LLM.

use crate::commands::{ids, CommandHandler};
use crate::error::AppResult;
use ai_client::{AiClient, Message};
use async_trait::async_trait;
use chat_log::ChatLog;
use std::sync::Arc;
use tracing::{info, instrument};
use wa_client::BotMessage;

pub struct SummaryHandler {
    ai: Arc<AiClient>,
    chat_log: ChatLog,
    system_prompt: String,
    history_limit: usize,
}

impl SummaryHandler {
    pub fn new(
        ai: Arc<AiClient>,
        chat_log: ChatLog,
        system_prompt: String,
        history_limit: usize,
    ) -> Self {
        Self {
            ai,
            chat_log,
            system_prompt,
            history_limit,
        }
    }
}

#[async_trait]
impl CommandHandler for SummaryHandler {
    fn id(&self) -> &'static str {
        ids::RESUMO
    }

    #[instrument(skip(self, message, _args), fields(chat = %message.reply_target()))]
    async fn execute(&self, message: &BotMessage, _args: &str) -> AppResult<String> {
        let chat_id = message.reply_target();
        let recent = self.chat_log.recent(chat_id, self.history_limit).await;

        if recent.is_empty() {
            return Ok("Ainda não vi mensagens nessa conversa para resumir.".into());
        }

        let transcript = recent
            .iter()
            .map(|m| m.render_line())
            .collect::<Vec<_>>()
            .join("\n");

        info!("Summarizing {} messages for {}", recent.len(), chat_id);

        let messages = vec![
            Message::system(self.system_prompt.clone()),
            Message::user(transcript),
        ];

        let summary = self.ai.chat_with_retry(messages, Some(0.5), None, None).await?;
        Ok(format!("📋 Resumo da conversa:\n\n{}", summary))
    }
}
