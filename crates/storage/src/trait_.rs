//! Storage trait abstraction.

use async_trait::async_trait;
use roadmap_core::{Catalog, CatalogError, EngineConfig, PersistedState};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catalog content failed validation
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Storage adapter for roadmap data.
///
/// The progress engine never touches storage itself; callers load the catalog
/// and persisted state through this trait, run engine actions, then save the
/// resulting [`PersistedState`].
#[async_trait]
pub trait Storage: Send + Sync {
    // === Catalog ===

    /// Load the catalog. Implementations validate it before returning.
    async fn load_catalog(&self) -> Result<Option<Catalog>>;

    /// Save the catalog.
    async fn save_catalog(&mut self, catalog: &Catalog) -> Result<()>;

    // === Learner state ===

    /// Load the latest persisted state.
    async fn load_state(&self) -> Result<Option<PersistedState>>;

    /// Save state, returning its new revision number.
    async fn save_state(&mut self, state: &PersistedState) -> Result<u64>;

    /// Load the state as it was at a given revision.
    async fn load_state_revision(&self, revision: u64) -> Result<Option<PersistedState>>;

    /// Latest saved revision (0 if nothing saved yet).
    async fn revision(&self) -> Result<u64>;

    // === Configuration ===

    /// Load engine configuration; defaults when none is stored.
    async fn load_config(&self) -> Result<EngineConfig>;

    /// Save engine configuration.
    async fn save_config(&mut self, config: &EngineConfig) -> Result<()>;
}
