//! In-memory chat history with TTL expiration.

use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Entry in the chat log with expiration tracking.
struct HistoryEntry {
    history: ChatHistory,
    expires_at: std::time::Instant,
}

/// In-memory chat log with automatic TTL expiration.
///
/// Keeps a bounded window of recent messages per chat for summaries and
/// scheduled digests. Idle chats are cleaned up after the configured TTL.
#[derive(Clone)]
pub struct ChatLog {
    chats: Arc<RwLock<HashMap<String, HistoryEntry>>>,
    max_messages: usize,
    ttl: Duration,
}

impl ChatLog {
    /// Create a new in-memory chat log.
    ///
    /// Spawns a background task to periodically clean up expired chats.
    pub fn new(max_messages: usize, ttl: Duration) -> Self {
        let log = Self {
            chats: Arc::new(RwLock::new(HashMap::new())),
            max_messages,
            ttl,
        };

        let cleanup_log = log.clone();
        tokio::spawn(async move {
            cleanup_log.cleanup_loop().await;
        });

        info!(
            "In-memory chat log initialized (max_messages={}, ttl={:?})",
            max_messages, ttl
        );

        log
    }

    /// Background task that periodically removes expired chats.
    async fn cleanup_loop(&self) {
        let cleanup_interval = Duration::from_secs(60);

        loop {
            tokio::time::sleep(cleanup_interval).await;

            let now = std::time::Instant::now();
            let mut chats = self.chats.write().await;
            let before_count = chats.len();

            chats.retain(|_, entry| entry.expires_at > now);

            let removed = before_count - chats.len();
            if removed > 0 {
                debug!("Cleaned up {} expired chats", removed);
            }
        }
    }

    /// Get the history of a chat.
    #[instrument(skip(self))]
    pub async fn get(&self, chat_id: &str) -> Option<ChatHistory> {
        let chats = self.chats.read().await;
        let now = std::time::Instant::now();

        chats
            .get(chat_id)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.history.clone())
    }

    /// Record a message in a chat, creating the history if needed.
    #[instrument(skip(self, message))]
    pub async fn record(&self, chat_id: &str, message: LoggedMessage) {
        let mut chats = self.chats.write().await;
        let now = std::time::Instant::now();
        let expires_at = now + self.ttl;

        let entry = chats
            .entry(chat_id.to_string())
            .or_insert_with(|| HistoryEntry {
                history: ChatHistory::new(chat_id),
                expires_at,
            });

        // Refresh expiration on activity
        entry.expires_at = expires_at;
        entry.history.push(message);
        entry.history.trim(self.max_messages);

        debug!(
            "Recorded message for {} (total: {})",
            chat_id,
            entry.history.messages.len()
        );
    }

    /// Get the most recent messages of a chat, oldest first.
    pub async fn recent(&self, chat_id: &str, limit: usize) -> Vec<LoggedMessage> {
        match self.get(chat_id).await {
            Some(history) => {
                let skip = history.messages.len().saturating_sub(limit);
                history.messages[skip..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Clear a chat's history.
    #[instrument(skip(self))]
    pub async fn clear(&self, chat_id: &str) -> bool {
        let mut chats = self.chats.write().await;
        let removed = chats.remove(chat_id).is_some();

        if removed {
            info!("Cleared history for {}", chat_id);
        }

        removed
    }

    /// Number of messages recorded for a chat.
    pub async fn message_count(&self, chat_id: &str) -> usize {
        self.get(chat_id)
            .await
            .map(|h| h.messages.len())
            .unwrap_or(0)
    }

    /// Total number of active chats.
    pub async fn chat_count(&self) -> usize {
        let chats = self.chats.read().await;
        let now = std::time::Instant::now();
        chats.values().filter(|entry| entry.expires_at > now).count()
    }
}
