use std::time::Duration;

use boa_supply_domain::storage::{StorageError, StorageResult};
use sea_orm::{ConnectOptions, Database};
use tracing::info;

use crate::SeaOrmStorage;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct StorageBuilder {
    database_url: Option<String>,
    max_connections: u32,
    idle_timeout: Duration,
    acquire_timeout: Duration,
}

impl Default for StorageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBuilder {
    pub fn new() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// How long a caller waits for a pooled connection before failing.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub async fn build(self) -> StorageResult<SeaOrmStorage> {
        let url = self
            .database_url
            .ok_or_else(|| StorageError::Database("missing database url".into()))?;

        let mut options = ConnectOptions::new(url);
        options
            .max_connections(self.max_connections)
            .min_connections(0)
            .idle_timeout(self.idle_timeout)
            .acquire_timeout(self.acquire_timeout)
            .sqlx_logging(false);

        let db = Database::connect(options)
            .await
            .map_err(StorageError::from_source)?;
        info!(
            max_connections = self.max_connections,
            idle_timeout_secs = self.idle_timeout.as_secs(),
            "database pool ready"
        );
        Ok(SeaOrmStorage::from_connection(db))
    }
}
