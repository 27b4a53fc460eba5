//! Free-form question command - proxies to the completion API.

use crate::commands::{ids, CommandHandler};
use crate::error::AppResult;
use ai_client::{AiClient, AiError, Message};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument};
use wa_client::BotMessage;

pub struct ChatHandler {
    ai: Arc<AiClient>,
    system_prompt: String,
}

impl ChatHandler {
    pub fn new(ai: Arc<AiClient>, system_prompt: String) -> Self {
        Self { ai, system_prompt }
    }
}

#[async_trait]
impl CommandHandler for ChatHandler {
    fn id(&self) -> &'static str {
        ids::CHAT
    }

    #[instrument(skip(self, message, args), fields(user = %message.source))]
    async fn execute(&self, message: &BotMessage, args: &str) -> AppResult<String> {
        let question = args.trim();
        if question.is_empty() {
            return Ok("Manda a pergunta junto com o comando.".into());
        }

        info!(
            "Question from {}: {}...",
            &message.source[..message.source.len().min(8)],
            question.chars().take(50).collect::<String>()
        );

        let messages = vec![
            Message::system(self.system_prompt.clone()),
            Message::user(question),
        ];

        match self.ai.chat_with_retry(messages, Some(0.7), None, None).await {
            Ok(answer) => Ok(answer),
            Err(AiError::RateLimit) => {
                Ok("Estou recebendo muitas perguntas agora. Espera um pouco e tenta de novo.".into())
            }
            Err(e) => {
                error!("Completion error: {}", e);
                Err(e.into())
            }
        }
    }
}
