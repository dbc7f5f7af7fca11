use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use todo_core::auth::TokenIssuer;
use todo_core::config::Config;
use todo_core::db;
use todo_core::repo::SqliteRepository;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub tokens: Arc<TokenIssuer>,
    /// Allowed CORS origins; empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(conn: Connection, tokens: TokenIssuer) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            tokens: Arc::new(tokens),
            cors_origins: Vec::new(),
        }
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Open the configured database (or an in-memory one when `ephemeral`)
    /// and build the token issuer from `config`.
    pub fn from_config(root: &Path, config: &Config, ephemeral: bool) -> todo_core::Result<Self> {
        let conn = if ephemeral {
            db::open_db_in_memory()?
        } else {
            db::open_db(&config.database_path(root))?
        };
        Ok(Self::new(conn, config.token_issuer()?)
            .with_cors_origins(config.server.cors_origins.clone()))
    }

    /// Run `f` against the repository on the blocking pool.
    pub async fn with_repo<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteRepository<'_>) -> todo_core::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let value = tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| anyhow::anyhow!("database mutex poisoned"))?;
            let repo = SqliteRepository::new(&conn);
            f(&repo).map_err(anyhow::Error::from)
        })
        .await
        .map_err(|e| anyhow::anyhow!("task join error: {e}"))??;
        Ok(value)
    }
}
