//! Durable and in-memory configuration stores.

use crate::error::ConfigStoreError;
use crate::types::GroupConfig;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Durable per-group configuration, keyed by group name.
///
/// Every write replaces the whole record for a group; callers never observe
/// a partially written record.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Defaults applied to newly created groups.
    fn defaults(&self) -> GroupConfig;

    /// All configured groups, sorted by name.
    async fn load_all(&self) -> Result<BTreeMap<String, GroupConfig>, ConfigStoreError>;

    /// Configuration of one group.
    async fn get(&self, name: &str) -> Result<Option<GroupConfig>, ConfigStoreError>;

    /// Insert or replace a group's configuration.
    async fn put(&self, name: &str, config: GroupConfig) -> Result<(), ConfigStoreError>;

    /// Remove a group's configuration. Returns whether it existed.
    async fn remove(&self, name: &str) -> Result<bool, ConfigStoreError>;
}

/// JSON-file backed store.
///
/// The whole map is held in memory; each mutation rewrites the file through
/// a temp-file + rename so a crash never leaves a torn file behind.
pub struct FileConfigStore {
    path: PathBuf,
    cache: Arc<RwLock<BTreeMap<String, GroupConfig>>>,
    defaults: GroupConfig,
}

impl FileConfigStore {
    /// Open (or create) a store at the given path.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigStoreError> {
        Self::open_with_defaults(path, GroupConfig::default()).await
    }

    /// Open a store with explicit new-group defaults.
    pub async fn open_with_defaults(
        path: impl Into<PathBuf>,
        defaults: GroupConfig,
    ) -> Result<Self, ConfigStoreError> {
        let path = path.into();

        let cache = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!("Group config store loaded from {:?}", path);

        Ok(Self {
            path,
            cache: Arc::new(RwLock::new(cache)),
            defaults,
        })
    }

    /// Rewrite the backing file from a snapshot of the map.
    async fn persist(&self, snapshot: &BTreeMap<String, GroupConfig>) -> Result<(), ConfigStoreError> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!("Persisted {} group configs to {:?}", snapshot.len(), self.path);
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    fn defaults(&self) -> GroupConfig {
        self.defaults.clone()
    }

    async fn load_all(&self) -> Result<BTreeMap<String, GroupConfig>, ConfigStoreError> {
        Ok(self.cache.read().await.clone())
    }

    async fn get(&self, name: &str) -> Result<Option<GroupConfig>, ConfigStoreError> {
        Ok(self.cache.read().await.get(name).cloned())
    }

    #[instrument(skip(self, config))]
    async fn put(&self, name: &str, config: GroupConfig) -> Result<(), ConfigStoreError> {
        let mut cache = self.cache.write().await;
        cache.insert(name.to_string(), config);
        self.persist(&cache).await
    }

    #[instrument(skip(self))]
    async fn remove(&self, name: &str) -> Result<bool, ConfigStoreError> {
        let mut cache = self.cache.write().await;
        let removed = cache.remove(name).is_some();
        if removed {
            self.persist(&cache).await?;
        }
        Ok(removed)
    }
}

/// In-memory store. Not durable; useful for tests and dry runs.
#[derive(Default)]
pub struct MemoryConfigStore {
    map: RwLock<BTreeMap<String, GroupConfig>>,
    defaults: GroupConfig,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: GroupConfig) -> Self {
        Self {
            map: RwLock::new(BTreeMap::new()),
            defaults,
        }
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    fn defaults(&self) -> GroupConfig {
        self.defaults.clone()
    }

    async fn load_all(&self) -> Result<BTreeMap<String, GroupConfig>, ConfigStoreError> {
        Ok(self.map.read().await.clone())
    }

    async fn get(&self, name: &str) -> Result<Option<GroupConfig>, ConfigStoreError> {
        Ok(self.map.read().await.get(name).cloned())
    }

    async fn put(&self, name: &str, config: GroupConfig) -> Result<(), ConfigStoreError> {
        self.map.write().await.insert(name.to_string(), config);
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<bool, ConfigStoreError> {
        Ok(self.map.write().await.remove(name).is_some())
    }
}
