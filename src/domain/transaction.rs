use chrono::{DateTime, Utc};
use serde::Serialize;

pub type TransactionId = i64;

/// A persisted transaction row.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub name: String,
    pub amount: f64,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The mutable fields of a transaction, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub name: String,
    pub amount: f64,
    pub category: Option<String>,
}
