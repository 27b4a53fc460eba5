//! WhatsApp gateway API types.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Incoming message from the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub envelope: Envelope,
    pub account: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub source: String,
    #[serde(rename = "sourceName")]
    pub source_name: Option<String>,
    pub timestamp: i64,
    #[serde(rename = "dataMessage")]
    pub data_message: Option<DataMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataMessage {
    pub message: Option<String>,
    pub timestamp: i64,
    #[serde(rename = "groupInfo")]
    pub group_info: Option<GroupInfo>,
    #[serde(default)]
    pub attachments: Vec<AttachmentInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupInfo {
    #[serde(rename = "groupId")]
    pub group_id: String,
    #[serde(rename = "groupName")]
    pub group_name: Option<String>,
}

/// Attachment metadata. Small media (stickers) may arrive inline as base64.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentInfo {
    pub id: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
    #[serde(default)]
    pub sticker: bool,
    #[serde(rename = "voiceNote", default)]
    pub voice_note: bool,
    #[serde(default)]
    pub data: Option<String>,
}

/// Outgoing message request.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub message: String,
    pub account: String,
    pub recipient: String,
}

/// Send message response.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageResponse {
    pub id: Option<String>,
}

/// Message deletion request.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteMessageRequest {
    pub account: String,
    #[serde(rename = "chatId")]
    pub chat_id: String,
    #[serde(rename = "messageId")]
    pub message_id: String,
}

/// A group the account participates in.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
}

/// Reference to a downloadable attachment.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub id: String,
    pub content_type: String,
}

/// Parsed message for bot processing.
#[derive(Debug, Clone)]
pub struct BotMessage {
    /// Platform id of the sender.
    pub source: String,
    /// Display name of the sender, when the gateway knows it.
    pub sender_name: Option<String>,
    /// Message text (empty for media-only messages).
    pub text: String,
    /// Message timestamp.
    pub timestamp: i64,
    /// Whether this arrived in a group chat.
    pub is_group: bool,
    /// Group id if this is a group message.
    pub group_id: Option<String>,
    /// Group display name if this is a group message.
    pub group_name: Option<String>,
    /// Hex SHA-256 of the sticker content, when the message carries one.
    pub sticker_hash: Option<String>,
    /// Audio/voice attachment, when present.
    pub audio: Option<Attachment>,
    /// The bot account that received this message.
    pub receiving_account: String,
}

impl BotMessage {
    /// Extract bot message from an incoming envelope.
    ///
    /// Media-only messages (sticker, voice note) are kept with empty text.
    pub fn from_incoming(msg: &IncomingMessage) -> Option<Self> {
        let data = msg.envelope.data_message.as_ref()?;
        let text = data.message.clone().unwrap_or_default();

        let sticker_hash = data
            .attachments
            .iter()
            .find(|a| a.sticker)
            .and_then(|a| a.data.as_deref())
            .and_then(sticker_content_hash);

        let audio = data
            .attachments
            .iter()
            .find(|a| a.voice_note || a.content_type.starts_with("audio/"))
            .map(|a| Attachment {
                id: a.id.clone(),
                content_type: a.content_type.clone(),
            });

        if text.is_empty() && sticker_hash.is_none() && audio.is_none() {
            return None;
        }

        Some(Self {
            source: msg.envelope.source.clone(),
            sender_name: msg.envelope.source_name.clone(),
            text,
            timestamp: msg.envelope.timestamp,
            is_group: data.group_info.is_some(),
            group_id: data.group_info.as_ref().map(|g| g.group_id.clone()),
            group_name: data.group_info.as_ref().and_then(|g| g.group_name.clone()),
            sticker_hash,
            audio,
            receiving_account: msg.account.clone(),
        })
    }

    /// Get the reply target (group id or sender).
    pub fn reply_target(&self) -> &str {
        self.group_id.as_deref().unwrap_or(&self.source)
    }
}

/// Hash inline sticker bytes; gateways ship stickers base64-inline.
fn sticker_content_hash(data: &str) -> Option<String> {
    let bytes = BASE64.decode(data).ok()?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Some(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_with(data: DataMessage) -> IncomingMessage {
        IncomingMessage {
            envelope: Envelope {
                source: "5511999990000".into(),
                source_name: Some("Alice".into()),
                timestamp: 1700000000000,
                data_message: Some(data),
            },
            account: "bot-account".into(),
        }
    }

    #[test]
    fn test_text_message() {
        let msg = envelope_with(DataMessage {
            message: Some("!ajuda".into()),
            timestamp: 1700000000000,
            group_info: None,
            attachments: vec![],
        });

        let bot_msg = BotMessage::from_incoming(&msg).unwrap();
        assert_eq!(bot_msg.text, "!ajuda");
        assert!(!bot_msg.is_group);
        assert_eq!(bot_msg.reply_target(), "5511999990000");
    }

    #[test]
    fn test_group_message() {
        let msg = envelope_with(DataMessage {
            message: Some("oi".into()),
            timestamp: 1700000000000,
            group_info: Some(GroupInfo {
                group_id: "g-123".into(),
                group_name: Some("Estudo".into()),
            }),
            attachments: vec![],
        });

        let bot_msg = BotMessage::from_incoming(&msg).unwrap();
        assert!(bot_msg.is_group);
        assert_eq!(bot_msg.group_name.as_deref(), Some("Estudo"));
        assert_eq!(bot_msg.reply_target(), "g-123");
    }

    #[test]
    fn test_sticker_hash_is_content_hash() {
        let payload = BASE64.encode(b"sticker-bytes");
        let msg = envelope_with(DataMessage {
            message: None,
            timestamp: 1700000000000,
            group_info: None,
            attachments: vec![AttachmentInfo {
                id: "att-1".into(),
                content_type: "image/webp".into(),
                sticker: true,
                voice_note: false,
                data: Some(payload),
            }],
        });

        let bot_msg = BotMessage::from_incoming(&msg).unwrap();
        let hash = bot_msg.sticker_hash.unwrap();
        assert_eq!(hash.len(), 64);

        let mut hasher = Sha256::new();
        hasher.update(b"sticker-bytes");
        assert_eq!(hash, hex::encode(hasher.finalize()));
    }

    #[test]
    fn test_voice_note_kept_without_text() {
        let msg = envelope_with(DataMessage {
            message: None,
            timestamp: 1700000000000,
            group_info: None,
            attachments: vec![AttachmentInfo {
                id: "att-2".into(),
                content_type: "audio/ogg".into(),
                sticker: false,
                voice_note: true,
                data: None,
            }],
        });

        let bot_msg = BotMessage::from_incoming(&msg).unwrap();
        assert!(bot_msg.text.is_empty());
        assert_eq!(bot_msg.audio.unwrap().id, "att-2");
    }

    #[test]
    fn test_empty_envelope_dropped() {
        let msg = envelope_with(DataMessage {
            message: None,
            timestamp: 1700000000000,
            group_info: None,
            attachments: vec![],
        });

        assert!(BotMessage::from_incoming(&msg).is_none());
    }
}
