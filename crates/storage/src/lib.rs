//! SeaORM-backed storage adapters that satisfy the domain storage traits while
//! keeping the database backend swappable (PostgreSQL in production, SQLite
//! for development and tests).

mod builder;
mod entity;
mod reward_store;

use std::sync::Arc;

pub use builder::StorageBuilder;
pub use entity::validators;
use sea_orm::DatabaseConnection;

/// Shared storage handle wrapping the bounded connection pool.
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStorage {
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    pub(crate) fn from_connection(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }
}
