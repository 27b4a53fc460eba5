//! Common test utilities for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use ayub_bot::wizard::{PromptDrafter, WizardEngine};
use group_config::{ConfigStore, ConfigStoreError, GroupConfig, MemoryConfigStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Drafter with a canned reply, or a failure when `response` is `None`.
pub struct FakeDrafter {
    pub response: Option<String>,
}

impl FakeDrafter {
    pub fn ok(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { response: None }
    }
}

#[async_trait]
impl PromptDrafter for FakeDrafter {
    async fn draft(&self, _description: &str) -> anyhow::Result<String> {
        self.response
            .clone()
            .ok_or_else(|| anyhow::anyhow!("drafting unavailable"))
    }
}

/// Store whose writes always fail, for commit-failure paths.
pub struct FailingStore;

#[async_trait]
impl ConfigStore for FailingStore {
    fn defaults(&self) -> GroupConfig {
        GroupConfig::default()
    }

    async fn load_all(&self) -> Result<BTreeMap<String, GroupConfig>, ConfigStoreError> {
        Ok(BTreeMap::new())
    }

    async fn get(&self, _name: &str) -> Result<Option<GroupConfig>, ConfigStoreError> {
        Ok(None)
    }

    async fn put(&self, _name: &str, _config: GroupConfig) -> Result<(), ConfigStoreError> {
        Err(ConfigStoreError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk on fire",
        )))
    }

    async fn remove(&self, _name: &str) -> Result<bool, ConfigStoreError> {
        Err(ConfigStoreError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk on fire",
        )))
    }
}

/// Engine over an in-memory store with a generous idle timeout.
pub fn test_engine(store: Arc<MemoryConfigStore>, drafter: FakeDrafter) -> WizardEngine {
    WizardEngine::new(store, Arc::new(drafter), Duration::from_secs(60))
}
