//! JSON file storage implementation.
//!
//! Layout under the root directory:
//!
//! ```text
//! catalog.json              static content
//! state.json                latest learner state
//! config.json               engine configuration (optional)
//! meta/state.meta.json      revision + updated_at
//! archives/state.<rev>.json every saved revision
//! ```

use std::path::{Path, PathBuf};

use roadmap_core::{Catalog, EngineConfig, PersistedState};
use tokio::fs;
use tracing::debug;

use super::{Result, Storage, StorageError};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Open storage rooted at `root`, creating the directory layout.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("meta")).await?;
        fs::create_dir_all(root.join("archives")).await?;

        Ok(Self { root })
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn catalog_path(&self) -> PathBuf {
        self.root.join("catalog.json")
    }
    fn state_path(&self) -> PathBuf {
        self.root.join("state.json")
    }
    fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }
    fn meta_path(&self) -> PathBuf {
        self.root.join("meta").join("state.meta.json")
    }
    fn archive_path(&self, revision: u64) -> PathBuf {
        self.root.join("archives").join(format!("state.{}.json", revision))
    }

    /// Read and increment the state revision, return the new one.
    async fn bump_revision(&self) -> Result<u64> {
        let revision = self.revision().await? + 1;
        let meta = serde_json::json!({"version": revision, "updated_at": chrono::Utc::now()});
        fs::write(self.meta_path(), serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(revision)
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn load_catalog(&self) -> Result<Option<Catalog>> {
        let Some(catalog) = read_json::<Catalog>(&self.catalog_path()).await? else {
            return Ok(None);
        };
        catalog.validate()?;
        Ok(Some(catalog))
    }

    async fn save_catalog(&mut self, catalog: &Catalog) -> Result<()> {
        let json = serde_json::to_string_pretty(catalog)?;
        fs::write(self.catalog_path(), json.as_bytes()).await?;
        debug!(nodes = catalog.len(), "catalog saved");
        Ok(())
    }

    async fn load_state(&self) -> Result<Option<PersistedState>> {
        read_json(&self.state_path()).await
    }

    async fn save_state(&mut self, state: &PersistedState) -> Result<u64> {
        let json = serde_json::to_string_pretty(state)?;
        fs::write(self.state_path(), json.as_bytes()).await?;

        let revision = self.bump_revision().await?;
        fs::write(self.archive_path(revision), json.as_bytes()).await?;

        debug!(revision, records = state.records.len(), sessions = state.sessions.len(), "state saved");
        Ok(revision)
    }

    async fn load_state_revision(&self, revision: u64) -> Result<Option<PersistedState>> {
        read_json(&self.archive_path(revision)).await
    }

    async fn revision(&self) -> Result<u64> {
        let meta: Option<serde_json::Value> = read_json(&self.meta_path()).await?;
        Ok(meta
            .and_then(|m| m.get("version").and_then(|v| v.as_u64()))
            .unwrap_or(0))
    }

    async fn load_config(&self) -> Result<EngineConfig> {
        Ok(read_json(&self.config_path()).await?.unwrap_or_default())
    }

    async fn save_config(&mut self, config: &EngineConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        fs::write(self.config_path(), json.as_bytes()).await?;
        Ok(())
    }
}

/// Read a catalog from an arbitrary file and validate it.
pub async fn read_catalog_file(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    let catalog: Catalog = read_json(path)
        .await?
        .ok_or_else(|| StorageError::NotFound(path.display().to_string()))?;
    catalog.validate()?;
    Ok(catalog)
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use roadmap_core::{
        CatalogError, FocusType, LearningNode, NodeId, NodeStatus, ProgressRecord, StudySession,
    };

    fn catalog() -> Catalog {
        Catalog::new(vec![
            LearningNode::new("a", "A", "phase1"),
            LearningNode::new("b", "B", "phase1").requires("a"),
        ])
    }

    fn state(minutes: u32) -> PersistedState {
        PersistedState {
            records: vec![ProgressRecord::new(NodeId::new("a"), NodeStatus::InProgress)],
            sessions: vec![StudySession::new(
                "a",
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                minutes,
                FocusType::DeepWork,
                5,
            )],
        }
    }

    #[tokio::test]
    async fn test_empty_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();

        assert!(storage.load_catalog().await.unwrap().is_none());
        assert!(storage.load_state().await.unwrap().is_none());
        assert_eq!(storage.revision().await.unwrap(), 0);
        assert_eq!(storage.load_config().await.unwrap(), EngineConfig::default());
    }

    #[tokio::test]
    async fn test_state_revisions_are_archived() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        assert_eq!(storage.save_state(&state(30)).await.unwrap(), 1);
        assert_eq!(storage.save_state(&state(45)).await.unwrap(), 2);

        assert_eq!(storage.revision().await.unwrap(), 2);
        assert_eq!(storage.load_state().await.unwrap(), Some(state(45)));
        assert_eq!(storage.load_state_revision(1).await.unwrap(), Some(state(30)));
        assert!(storage.load_state_revision(7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_state_file_has_no_analytics() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        storage.save_state(&state(30)).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("state.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["records".to_string(), "sessions".to_string()]);
        assert_eq!(value["sessions"][0]["focusType"], "deep-work");
    }

    #[tokio::test]
    async fn test_catalog_roundtrip_and_validation() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        storage.save_catalog(&catalog()).await.unwrap();
        let loaded = storage.load_catalog().await.unwrap().unwrap();
        assert_eq!(loaded.nodes(), catalog().nodes());

        let cyclic = Catalog::new(vec![
            LearningNode::new("a", "A", "p").requires("b"),
            LearningNode::new("b", "B", "p").requires("a"),
        ]);
        storage.save_catalog(&cyclic).await.unwrap();
        match storage.load_catalog().await {
            Err(StorageError::Catalog(CatalogError::Cycle(ids))) => assert_eq!(ids.len(), 2),
            other => panic!("expected cycle error, got {:?}", other.map(|c| c.map(|c| c.len()))),
        }
    }

    #[tokio::test]
    async fn test_read_catalog_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_catalog_file(dir.path().join("nope.json")).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let config = EngineConfig {
            weekly_target_minutes: 240,
            ..Default::default()
        };
        storage.save_config(&config).await.unwrap();
        assert_eq!(storage.load_config().await.unwrap(), config);
    }
}
