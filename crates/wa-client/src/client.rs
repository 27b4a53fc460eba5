//! WhatsApp gateway HTTP client.

use crate::error::WaError;
use crate::types::*;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// WhatsApp gateway REST API client.
#[derive(Clone)]
pub struct WaClient {
    client: Client,
    base_url: String,
    account: String,
}

impl WaClient {
    /// Create a new gateway client.
    pub fn new(base_url: impl Into<String>, account: impl Into<String>) -> Result<Self, WaError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            account: account.into(),
        })
    }

    /// Get the configured bot account id.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Check if the gateway is healthy.
    pub async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/v1/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Receive pending messages.
    #[instrument(skip(self))]
    pub async fn receive(&self) -> Result<Vec<IncomingMessage>, WaError> {
        let response = self
            .client
            .get(format!("{}/v1/receive/{}", self.base_url, self.account))
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            return Err(WaError::Api(msg));
        }

        let messages: Vec<IncomingMessage> = response.json().await?;
        debug!("Received {} messages", messages.len());
        Ok(messages)
    }

    /// Send a message to a recipient (user or group id).
    ///
    /// Returns the gateway id of the sent message when the gateway reports
    /// one, which is needed for later deletion.
    #[instrument(skip(self, message))]
    pub async fn send(&self, recipient: &str, message: &str) -> Result<Option<String>, WaError> {
        let request = SendMessageRequest {
            message: message.to_string(),
            account: self.account.clone(),
            recipient: recipient.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/v2/send", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            warn!("Send failed: {}", msg);
            return Err(WaError::SendFailed(msg));
        }

        let sent: SendMessageResponse = response.json().await.unwrap_or(SendMessageResponse { id: None });
        debug!("Sent message to {}", recipient);
        Ok(sent.id)
    }

    /// Reply to a message (handles both direct and group messages).
    pub async fn reply(&self, original: &BotMessage, message: &str) -> Result<Option<String>, WaError> {
        self.send(original.reply_target(), message).await
    }

    /// Delete a previously sent message.
    #[instrument(skip(self))]
    pub async fn delete_message(&self, chat_id: &str, message_id: &str) -> Result<(), WaError> {
        let request = DeleteMessageRequest {
            account: self.account.clone(),
            chat_id: chat_id.to_string(),
            message_id: message_id.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/v1/delete", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            return Err(WaError::Api(msg));
        }

        Ok(())
    }

    /// List groups the bot account participates in.
    #[instrument(skip(self))]
    pub async fn list_groups(&self) -> Result<Vec<GroupEntry>, WaError> {
        let response = self
            .client
            .get(format!("{}/v1/groups/{}", self.base_url, self.account))
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            return Err(WaError::Api(msg));
        }

        Ok(response.json().await?)
    }

    /// Find a group by display name.
    pub async fn group_by_name(&self, name: &str) -> Result<Option<GroupEntry>, WaError> {
        let groups = self.list_groups().await?;
        Ok(groups.into_iter().find(|g| g.name == name))
    }

    /// Check whether a user is a member of a named group.
    pub async fn is_member(&self, user: &str, group_name: &str) -> Result<bool, WaError> {
        Ok(self
            .group_by_name(group_name)
            .await?
            .map(|g| g.members.iter().any(|m| m == user))
            .unwrap_or(false))
    }

    /// Download an attachment by id.
    #[instrument(skip(self))]
    pub async fn download_attachment(&self, id: &str) -> Result<Vec<u8>, WaError> {
        let response = self
            .client
            .get(format!(
                "{}/v1/attachments/{}/{}",
                self.base_url, self.account, id
            ))
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            return Err(WaError::Attachment(msg));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
