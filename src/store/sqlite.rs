//! SQLite backed transaction store.
//!
//! rusqlite is synchronous, so every statement runs on the tokio blocking pool
//! while holding the connection mutex.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{StoreError, TransactionStore};
use crate::domain::transaction::{NewTransaction, Transaction, TransactionId};

/// Matches the `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')` column default.
const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

const SELECT_COLUMNS: &str = "SELECT id, name, amount, category, created_at FROM transactions";

#[derive(Debug, Clone)]
pub struct SqliteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

#[derive(Debug)]
struct RawTransaction {
    id: TransactionId,
    name: String,
    amount: f64,
    category: Option<String>,
    created_at: String,
}

impl SqliteTransactionStore {
    /// Opens (or creates) the database at `path`. `:memory:` gives a private
    /// in-memory database.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let connection = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };

        Self::from_connection(connection)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(connection: Connection) -> Result<Self, StoreError> {
        create_table(&connection)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    async fn with_connection<F, T>(&self, operation: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let connection = Arc::clone(&self.connection);

        tokio::task::spawn_blocking(move || {
            let connection = connection.lock().map_err(|_| StoreError::LockPoisoned)?;
            operation(&connection)
        })
        .await?
    }
}

fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL CHECK (length(trim(name)) > 0),
            amount REAL NOT NULL CHECK (amount > 0),
            category TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );
        CREATE INDEX IF NOT EXISTS transactions_created_at ON transactions (created_at);",
    )
}

fn map_row(row: &Row) -> Result<RawTransaction, rusqlite::Error> {
    Ok(RawTransaction {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn parse_created_at(value: &str) -> Result<DateTime<Utc>, StoreError> {
    NaiveDateTime::parse_from_str(value, CREATED_AT_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| StoreError::InvalidTimestamp(value.to_string()))
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = StoreError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        Ok(Transaction {
            created_at: parse_created_at(&raw.created_at)?,
            id: raw.id,
            name: raw.name,
            amount: raw.amount,
            category: raw.category,
        })
    }
}

#[async_trait]
impl TransactionStore for SqliteTransactionStore {
    async fn list(&self) -> Result<Vec<Transaction>, StoreError> {
        self.with_connection(|connection| {
            let mut statement = connection.prepare(&format!(
                "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC"
            ))?;

            let rows = statement
                .query_map([], map_row)?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter().map(Transaction::try_from).collect()
        })
        .await
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        self.with_connection(move |connection| {
            connection
                .prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?
                .query_row([id], map_row)
                .optional()?
                .map(Transaction::try_from)
                .transpose()
        })
        .await
    }

    async fn insert(&self, transaction: NewTransaction) -> Result<TransactionId, StoreError> {
        self.with_connection(move |connection| {
            connection.execute(
                "INSERT INTO transactions (name, amount, category) VALUES (?1, ?2, ?3)",
                params![transaction.name, transaction.amount, transaction.category],
            )?;

            Ok(connection.last_insert_rowid())
        })
        .await
    }

    async fn update(
        &self,
        id: TransactionId,
        transaction: NewTransaction,
    ) -> Result<usize, StoreError> {
        self.with_connection(move |connection| {
            let changed = connection.execute(
                "UPDATE transactions SET name = ?1, amount = ?2, category = ?3 WHERE id = ?4",
                params![
                    transaction.name,
                    transaction.amount,
                    transaction.category,
                    id
                ],
            )?;

            Ok(changed)
        })
        .await
    }

    async fn delete(&self, id: TransactionId) -> Result<usize, StoreError> {
        self.with_connection(move |connection| {
            let removed = connection.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
            Ok(removed)
        })
        .await
    }
}
