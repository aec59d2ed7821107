//! Storage seam for transactions
//!
//! The trait mirrors what a relational engine hands back: rows, an insert id and
//! affected-row counts. Deciding what those mean for a request is left to
//! [`crate::domain::handler::TransactionHandler`].

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::transaction::{NewTransaction, Transaction, TransactionId};

pub mod sqlite;

pub use sqlite::SqliteTransactionStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("database connection lock was poisoned")]
    LockPoisoned,
    #[error("blocking database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("inserted row {0} could not be read back")]
    MissingInsertedRow(TransactionId),
    #[error("stored timestamp {0:?} is not valid")]
    InvalidTimestamp(String),
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// All rows, newest `created_at` first.
    async fn list(&self) -> Result<Vec<Transaction>, StoreError>;

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;

    /// Returns the id assigned to the new row.
    async fn insert(&self, transaction: NewTransaction) -> Result<TransactionId, StoreError>;

    /// Returns the number of rows changed.
    async fn update(
        &self,
        id: TransactionId,
        transaction: NewTransaction,
    ) -> Result<usize, StoreError>;

    /// Returns the number of rows removed.
    async fn delete(&self, id: TransactionId) -> Result<usize, StoreError>;
}
