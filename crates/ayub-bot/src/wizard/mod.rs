//! Multi-turn configuration dialog (the wizard).

mod engine;
mod input;
mod prompts;
mod session;
mod state;

pub use engine::{PromptDrafter, WizardEngine, WizardReply};
pub use session::{Session, SessionData, SessionStore};
pub use state::WizardState;

use ai_client::{AiClient, Message};
use async_trait::async_trait;
use std::sync::Arc;

/// Prompt drafting backed by the completion API.
pub struct AiPromptDrafter {
    ai: Arc<AiClient>,
}

impl AiPromptDrafter {
    pub fn new(ai: Arc<AiClient>) -> Self {
        Self { ai }
    }
}

#[async_trait]
impl PromptDrafter for AiPromptDrafter {
    async fn draft(&self, description: &str) -> anyhow::Result<String> {
        let messages = vec![
            Message::system(
                "Você escreve prompts de sistema para um bot que resume conversas \
                 de grupos de WhatsApp. Dado o tema do grupo, escreva um prompt curto \
                 (até 4 frases) instruindo o modelo a resumir a conversa com o tom e o \
                 vocabulário adequados ao grupo. Responda só com o prompt.",
            ),
            Message::user(description),
        ];

        let draft = self.ai.chat_with_retry(messages, Some(0.7), None, None).await?;
        Ok(draft.trim().to_string())
    }
}
