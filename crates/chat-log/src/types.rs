//! Chat history types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single logged chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedMessage {
    pub sender: String,
    pub sender_name: Option<String>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl LoggedMessage {
    pub fn new(sender: impl Into<String>, sender_name: Option<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            sender_name,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Render a single transcript line.
    pub fn render_line(&self) -> String {
        let who = self.sender_name.as_deref().unwrap_or(&self.sender);
        format!("[{}] {}: {}", self.timestamp.format("%H:%M"), who, self.text)
    }
}

/// Message history of one chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistory {
    pub chat_id: String,
    pub messages: Vec<LoggedMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatHistory {
    pub fn new(chat_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            chat_id: chat_id.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message to the history.
    pub fn push(&mut self, message: LoggedMessage) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Trim to max messages, keeping most recent.
    pub fn trim(&mut self, max_messages: usize) {
        if self.messages.len() > max_messages {
            let start = self.messages.len() - max_messages;
            self.messages = self.messages[start..].to_vec();
        }
    }

    /// Render the history as a plain-text transcript.
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(LoggedMessage::render_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
