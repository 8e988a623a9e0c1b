//! Server state management.

use std::sync::Arc;

use lexis_core::config::LexisConfig;
use lexis_core::error::LexisResult;
use lexis_core::{ReviewEngine, SqliteStore};

use crate::error::{ApiError, ApiResult};

/// Engine type served over HTTP.
pub type Engine = ReviewEngine<SqliteStore>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<Engine>,
}

impl AppState {
    /// Wrap an existing engine.
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Open the configured database and build an engine on it.
    pub fn from_config(config: LexisConfig) -> LexisResult<Self> {
        let store = SqliteStore::new(&config.database_path)?;
        Ok(Self::new(ReviewEngine::new(Arc::new(store), config)))
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Run a blocking engine operation off the async executor.
    pub async fn run<F, T>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&Engine) -> LexisResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || f(&engine))
            .await
            .map_err(|e| ApiError::internal(format!("Engine task failed: {}", e)))?
            .map_err(ApiError::from)
    }
}
