//! Ayub group-digest bot - main entry point.

use anyhow::Context;
use ayub_bot::commands::{
    self, ChatHandler, CommandHandler, CommandRegistry, GatewayMembership, HelpHandler,
    NewsHandler, Resolver, SummaryHandler, TagTable, TranscribeHandler,
};
use ayub_bot::config::Config;
use ayub_bot::digest::DigestScheduler;
use ayub_bot::dispatch::Dispatcher;
use ayub_bot::error::AppResult;
use ayub_bot::wizard::{AiPromptDrafter, WizardEngine};
use ai_client::AiClient;
use chat_log::ChatLog;
use group_config::{ConfigStore, FileConfigStore};
use std::sync::Arc;
use tokio::signal;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wa_client::{MessageReceiver, WaClient};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.bot.log_level);

    info!("Starting Ayub bot...");

    // Initialize clients
    let ai = Arc::new(
        AiClient::new(
            &config.ai.api_key,
            &config.ai.base_url,
            &config.ai.model,
            config.ai.timeout,
        )
        .context("Failed to create completion client")?,
    );

    let wa = Arc::new(
        WaClient::new(&config.gateway.service_url, &config.gateway.account)
            .context("Failed to create gateway client")?,
    );

    let chat_log = ChatLog::new(config.chat_log.max_messages, config.chat_log.ttl);

    let store: Arc<dyn ConfigStore> = Arc::new(
        FileConfigStore::open(&config.digest.store_path)
            .await
            .context("Failed to open group config store")?,
    );

    // Health checks
    if ai.health_check().await {
        info!("Completion API healthy - Model: {}", config.ai.model);
    } else {
        warn!("Completion API health check failed - will retry on requests");
    }

    if !wa.health_check().await {
        error!(
            "Gateway not reachable at {}",
            config.gateway.service_url
        );
        return Err(anyhow::anyhow!("Gateway not reachable").into());
    }
    info!("Gateway healthy");

    // Command registry
    let tags = match &config.bot.tags_file {
        Some(path) => TagTable::load(path).unwrap_or_else(|e| {
            warn!("Failed to load tags from {}: {}", path, e);
            TagTable::builtin()
        }),
        None => TagTable::builtin(),
    };

    let mut registry = CommandRegistry::new(
        config.bot.command_sigil.clone(),
        config.bot.tag_sigil.clone(),
        tags,
    );
    registry.register_all(commands::default_descriptors(
        config.bot.summary_sticker_hash.as_deref(),
    ));
    info!("Registered {} commands", registry.len());
    let registry = Arc::new(registry);

    let resolver = Resolver::new(
        registry,
        Arc::new(GatewayMembership::new(wa.clone())),
        config.bot.admin_id.clone(),
    );

    // Command handlers
    let handlers: Vec<Box<dyn CommandHandler>> = vec![
        Box::new(ChatHandler::new(ai.clone(), config.bot.system_prompt.clone())),
        Box::new(SummaryHandler::new(
            ai.clone(),
            chat_log.clone(),
            config.digest.default_prompt.clone(),
            config.digest.history_limit,
        )),
        Box::new(NewsHandler::new(config.bot.news_feed_url.clone())?),
        Box::new(TranscribeHandler::new(wa.clone(), ai.clone())),
        Box::new(HelpHandler::new()),
    ];

    // Wizard engine
    let wizard = Arc::new(WizardEngine::new(
        store.clone(),
        Arc::new(AiPromptDrafter::new(ai.clone())),
        config.wizard.idle_timeout,
    ));

    let dispatcher = Dispatcher::new(
        wa.clone(),
        resolver,
        handlers,
        wizard,
        chat_log.clone(),
        config.bot.command_sigil.clone(),
        config.bot.tag_sigil.clone(),
    );

    // Digest scheduler
    let scheduler = Arc::new(DigestScheduler::new(
        wa.clone(),
        ai.clone(),
        chat_log.clone(),
        store.clone(),
        config.digest.default_prompt.clone(),
        config.digest.tick_interval,
        config.digest.history_limit,
    ));
    tokio::spawn(scheduler.run());

    info!("Listening for messages...");

    // Start message receiver
    let receiver = MessageReceiver::new((*wa).clone(), config.gateway.poll_interval);
    let mut stream = Box::pin(receiver.stream());

    // Main message loop. One message at a time: a user's next message never
    // starts before the previous one updated the session store.
    loop {
        tokio::select! {
            Some(message) = stream.next() => {
                dispatcher.handle(&message).await;
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("Shutting down...");
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
