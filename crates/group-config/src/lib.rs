//! Durable per-group digest configuration.
//!
//! One record per group name, always replaced as a whole. The file store
//! persists atomically (temp file + rename); the memory store backs tests.

mod error;
mod store;
mod types;

pub use error::ConfigStoreError;
pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore};
pub use types::{GroupConfig, QuietWindow};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn custom_config() -> GroupConfig {
        GroupConfig {
            enabled: true,
            interval_hours: 6,
            quiet: QuietWindow::new(time(22, 0), time(7, 0)),
            delete_after_minutes: Some(30),
            prompt: Some("resuma as discussões".into()),
        }
    }

    #[tokio::test]
    async fn test_memory_store_put_get_remove() {
        let store = MemoryConfigStore::new();

        assert!(store.get("Estudo").await.unwrap().is_none());

        store.put("Estudo", custom_config()).await.unwrap();
        assert_eq!(store.get("Estudo").await.unwrap().unwrap(), custom_config());

        assert!(store.remove("Estudo").await.unwrap());
        assert!(!store.remove("Estudo").await.unwrap());
        assert!(store.get("Estudo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.json");

        {
            let store = FileConfigStore::open(&path).await.unwrap();
            store.put("Estudo", custom_config()).await.unwrap();
            store.put("Trabalho", GroupConfig::default()).await.unwrap();
        }

        // Reopen from disk
        let store = FileConfigStore::open(&path).await.unwrap();
        let all = store.load_all().await.unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(all["Estudo"], custom_config());
        assert_eq!(all["Trabalho"], GroupConfig::default());
    }

    #[tokio::test]
    async fn test_file_store_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.json");

        {
            let store = FileConfigStore::open(&path).await.unwrap();
            store.put("Estudo", custom_config()).await.unwrap();
            assert!(store.remove("Estudo").await.unwrap());
        }

        let store = FileConfigStore::open(&path).await.unwrap();
        assert!(store.get("Estudo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::open(dir.path().join("nope.json"))
            .await
            .unwrap();

        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.json");

        let store = FileConfigStore::open(&path).await.unwrap();
        store.put("Estudo", custom_config()).await.unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("groups.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_defaults_are_configurable() {
        let mut defaults = GroupConfig::default();
        defaults.interval_hours = 4;

        let store = MemoryConfigStore::with_defaults(defaults.clone());
        assert_eq!(store.defaults(), defaults);
    }
}
