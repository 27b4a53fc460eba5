//! Application configuration loaded from environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// WhatsApp gateway configuration
    pub gateway: GatewayConfig,

    /// Completion API configuration
    pub ai: AiConfig,

    /// Bot configuration
    #[serde(default)]
    pub bot: BotConfig,

    /// Wizard configuration
    #[serde(default)]
    pub wizard: WizardConfig,

    /// Digest scheduler configuration
    #[serde(default)]
    pub digest: DigestConfig,

    /// Chat history configuration
    #[serde(default)]
    pub chat_log: ChatLogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Gateway REST API endpoint
    #[serde(default = "default_gateway_service")]
    pub service_url: String,

    /// Bot account id at the gateway
    pub account: String,

    /// Poll interval for messages
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API key
    pub api_key: String,

    /// API base URL
    #[serde(default = "default_ai_url")]
    pub base_url: String,

    /// Default model
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Administrator user id; bypasses all permission checks
    #[serde(default)]
    pub admin_id: Option<String>,

    /// Sigil that starts an explicit command
    #[serde(default = "default_command_sigil")]
    pub command_sigil: String,

    /// Sigil that starts a tag command in groups
    #[serde(default = "default_tag_sigil")]
    pub tag_sigil: String,

    /// Hex SHA-256 of a sticker that triggers the summary command
    #[serde(default)]
    pub summary_sticker_hash: Option<String>,

    /// Optional JSON file with per-group tag tables
    #[serde(default)]
    pub tags_file: Option<String>,

    /// System prompt for free-form questions
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// News feed URL
    #[serde(default = "default_news_feed")]
    pub news_feed_url: String,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WizardConfig {
    /// Idle window after which a configuration session expires
    #[serde(default = "default_idle_timeout", with = "humantime_serde")]
    pub idle_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DigestConfig {
    /// Path of the durable per-group configuration file
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// How often the scheduler checks for due digests
    #[serde(default = "default_tick_interval", with = "humantime_serde")]
    pub tick_interval: Duration,

    /// Max chat-log messages considered per digest
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// System prompt used when a group has no custom prompt
    #[serde(default = "default_digest_prompt")]
    pub default_prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatLogConfig {
    /// Chat history TTL (idle chats are dropped afterwards)
    #[serde(default = "default_ttl", with = "humantime_serde")]
    pub ttl: Duration,

    /// Max messages kept per chat
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

// Default implementations
impl Default for BotConfig {
    fn default() -> Self {
        Self {
            admin_id: None,
            command_sigil: default_command_sigil(),
            tag_sigil: default_tag_sigil(),
            summary_sticker_hash: None,
            tags_file: None,
            system_prompt: default_system_prompt(),
            news_feed_url: default_news_feed(),
            log_level: default_log_level(),
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            idle_timeout: default_idle_timeout(),
        }
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            tick_interval: default_tick_interval(),
            history_limit: default_history_limit(),
            default_prompt: default_digest_prompt(),
        }
    }
}

impl Default for ChatLogConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            max_messages: default_max_messages(),
        }
    }
}

// Default value functions
fn default_gateway_service() -> String {
    "http://wa-gateway:8080".into()
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(200)
}

fn default_ai_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_command_sigil() -> String {
    "!".into()
}

fn default_tag_sigil() -> String {
    "#".into()
}

fn default_system_prompt() -> String {
    "Você é o Ayub, um assistente de grupos de WhatsApp. \
     Responda em português, de forma curta e direta; isto é um chat de celular, \
     não uma redação."
        .into()
}

fn default_news_feed() -> String {
    "https://news.google.com/rss?hl=pt-BR&gl=BR&ceid=BR:pt-419".into()
}

fn default_log_level() -> String {
    "info".into()
}

fn default_idle_timeout() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_store_path() -> String {
    "groups.json".into()
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_history_limit() -> usize {
    100
}

fn default_digest_prompt() -> String {
    "Você resume conversas de um grupo de WhatsApp. Produza um resumo curto, \
     em tópicos, citando quem falou o quê. Ignore figurinhas e mensagens sem conteúdo."
        .into()
}

fn default_ttl() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn default_max_messages() -> usize {
    500
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    // Keep strings as strings; phone-like ids must not be
                    // parsed as numbers.
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
