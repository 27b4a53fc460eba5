//! Scheduled digest delivery.
//!
//! Periodically checks every enabled group; when its interval has elapsed
//! and it is outside the quiet window, a digest of recent chat history is
//! generated and sent. Cadence is tracked in memory, so a restart restarts
//! the clock.

use ai_client::{AiClient, Message};
use chat_log::ChatLog;
use group_config::{ConfigStore, GroupConfig};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use wa_client::WaClient;

pub struct DigestScheduler {
    wa: Arc<WaClient>,
    ai: Arc<AiClient>,
    chat_log: ChatLog,
    store: Arc<dyn ConfigStore>,
    default_prompt: String,
    tick_interval: Duration,
    history_limit: usize,
    last_sent: Mutex<HashMap<String, Instant>>,
}

impl DigestScheduler {
    pub fn new(
        wa: Arc<WaClient>,
        ai: Arc<AiClient>,
        chat_log: ChatLog,
        store: Arc<dyn ConfigStore>,
        default_prompt: String,
        tick_interval: Duration,
        history_limit: usize,
    ) -> Self {
        Self {
            wa,
            ai,
            chat_log,
            store,
            default_prompt,
            tick_interval,
            history_limit,
            last_sent: Mutex::new(HashMap::new()),
        }
    }

    /// Run the scheduler loop. Never returns.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        info!("Digest scheduler running (tick: {:?})", self.tick_interval);

        loop {
            ticker.tick().await;
            if let Err(e) = self.tick_once().await {
                error!("Digest tick failed: {}", e);
            }
        }
    }

    async fn tick_once(&self) -> anyhow::Result<()> {
        let groups = self.store.load_all().await?;
        let now = chrono::Local::now().time();

        for (name, config) in groups {
            if !config.enabled {
                continue;
            }
            if config.quiet.contains(now) {
                debug!("{} inside quiet window, skipping", name);
                continue;
            }
            if !self.due(&name, config.interval_hours).await {
                continue;
            }

            if let Err(e) = self.send_digest(&name, &config).await {
                warn!("Digest for {} failed: {}", name, e);
            }
        }

        Ok(())
    }

    /// Whether the group's interval has elapsed. A group seen for the
    /// first time starts its cadence now instead of firing immediately.
    async fn due(&self, name: &str, interval_hours: u32) -> bool {
        let mut last_sent = self.last_sent.lock().await;

        match last_sent.get(name) {
            None => {
                last_sent.insert(name.to_string(), Instant::now());
                false
            }
            Some(at) => at.elapsed() >= Duration::from_secs(u64::from(interval_hours) * 3600),
        }
    }

    async fn mark_sent(&self, name: &str) {
        self.last_sent
            .lock()
            .await
            .insert(name.to_string(), Instant::now());
    }

    #[instrument(skip(self, config))]
    async fn send_digest(&self, name: &str, config: &GroupConfig) -> anyhow::Result<()> {
        let Some(group) = self.wa.group_by_name(name).await? else {
            warn!("Group {} not found at the gateway", name);
            self.mark_sent(name).await;
            return Ok(());
        };

        let recent = self.chat_log.recent(&group.id, self.history_limit).await;
        if recent.is_empty() {
            debug!("No recent messages in {}, skipping digest", name);
            self.mark_sent(name).await;
            return Ok(());
        }

        let transcript = recent
            .iter()
            .map(|m| m.render_line())
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = config
            .prompt
            .clone()
            .unwrap_or_else(|| self.default_prompt.clone());

        let summary = self
            .ai
            .chat_with_retry(
                vec![Message::system(prompt), Message::user(transcript)],
                Some(0.5),
                None,
                None,
            )
            .await?;

        let sent = self
            .wa
            .send(&group.id, &format!("📋 Resumo automático:\n\n{}", summary))
            .await?;

        self.mark_sent(name).await;
        info!("Digest sent to {} ({} messages)", name, recent.len());

        if let (Some(minutes), Some(message_id)) = (config.delete_after_minutes, sent) {
            let wa = self.wa.clone();
            let chat_id = group.id.clone();

            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(u64::from(minutes) * 60)).await;
                if let Err(e) = wa.delete_message(&chat_id, &message_id).await {
                    warn!("Auto-delete of digest {} failed: {}", message_id, e);
                }
            });
        }

        Ok(())
    }
}
