//! Transcription command - turns voice notes into text.

use crate::commands::{ids, CommandHandler};
use crate::error::AppResult;
use ai_client::AiClient;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};
use wa_client::{BotMessage, WaClient};

pub struct TranscribeHandler {
    wa: Arc<WaClient>,
    ai: Arc<AiClient>,
}

impl TranscribeHandler {
    pub fn new(wa: Arc<WaClient>, ai: Arc<AiClient>) -> Self {
        Self { wa, ai }
    }
}

#[async_trait]
impl CommandHandler for TranscribeHandler {
    fn id(&self) -> &'static str {
        ids::TRANSCRIBE
    }

    #[instrument(skip(self, message, _args), fields(user = %message.source))]
    async fn execute(&self, message: &BotMessage, _args: &str) -> AppResult<String> {
        let Some(audio) = &message.audio else {
            return Ok("Manda (ou responde) um áudio junto com o comando.".into());
        };

        let bytes = self.wa.download_attachment(&audio.id).await?;
        info!("Transcribing {} bytes of {}", bytes.len(), audio.content_type);

        let text = self
            .ai
            .transcribe(bytes, "voice.ogg", &audio.content_type)
            .await?;

        Ok(format!("🎙️ Transcrição:\n\n{}", text))
    }
}
