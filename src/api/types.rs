use crate::config::Config;
use crate::db::DbPool;
use crate::error::{ServiceError, ServiceResult};
use rusqlite::Connection;
use std::sync::Arc;

/// Shared per-process state: the connection pool and the parsed configuration.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        AppState {
            pool,
            config: Arc::new(config),
        }
    }

    /// Checks a connection out of the pool and runs `f` on the blocking pool.
    pub async fn with_conn<T, F>(&self, f: F) -> ServiceResult<T>
    where
        F: FnOnce(&mut Connection) -> ServiceResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| ServiceError::Internal(format!("blocking task failed: {}", e)))?
    }
}
