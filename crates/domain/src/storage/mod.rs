use async_trait::async_trait;
use num_bigint::BigInt;
use thiserror::Error;

use crate::model::RewardFormula;

/// Common result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),
    #[error("malformed aggregate value `{0}`")]
    MalformedAggregate(String),
}

impl StorageError {
    pub fn from_source(err: impl std::fmt::Display) -> Self {
        Self::Database(err.to_string())
    }
}

/// Read-only access to the validator reward figure kept by the chain scanner.
#[async_trait]
pub trait RewardStore: Send + Sync {
    /// Runs the aggregate selected by `formula` over the validators table.
    /// `None` means the aggregate was SQL `NULL` (no rows).
    async fn reward_aggregate(&self, formula: RewardFormula) -> StorageResult<Option<BigInt>>;
}
