//! Help command - displays available commands.

use crate::commands::{ids, CommandHandler};
use crate::error::AppResult;
use async_trait::async_trait;
use wa_client::BotMessage;

pub struct HelpHandler;

impl HelpHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HelpHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for HelpHandler {
    fn id(&self) -> &'static str {
        ids::HELP
    }

    async fn execute(&self, _message: &BotMessage, _args: &str) -> AppResult<String> {
        Ok(r#"*Ayub* — o bot do grupo

Comandos:
- !resumo — resume a conversa recente
- !ayubnews [assunto] — últimas notícias (ou "!ayub news")
- !transcrever — transcreve o áudio enviado
- !config — configura os resumos automáticos (admin)
- !ajuda — mostra esta mensagem
- !<qualquer pergunta> — pergunta livre para o modelo

Nos grupos também funcionam as tags, tipo #resumo."#
            .into())
    }
}
