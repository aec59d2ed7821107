//! The transaction request handler
//!
//! Every operation validates its input completely before the store is touched,
//! and keeps "row does not exist" (404) apart from "store call failed" (500).

use std::sync::Arc;

use tracing::debug;

use crate::{
    domain::{
        transaction::Transaction,
        validation::{parse_id, validate_transaction},
    },
    errors::AppError,
    store::{StoreError, TransactionStore},
};

pub const NOT_FOUND: &str = "Transaction not found";

pub const LIST_FAILED: &str = "Failed to fetch transactions";
pub const GET_FAILED: &str = "Failed to fetch transaction";
pub const CREATE_FAILED: &str = "Failed to add transaction";
pub const UPDATE_FAILED: &str = "Failed to update transaction";
pub const DELETE_FAILED: &str = "Failed to delete transaction";

#[derive(Clone)]
pub struct TransactionHandler {
    store: Arc<dyn TransactionStore>,
}

impl TransactionHandler {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Transaction>, AppError> {
        self.store
            .list()
            .await
            .map_err(|err| AppError::storage(LIST_FAILED, err))
    }

    pub async fn get(&self, raw_id: &str) -> Result<Transaction, AppError> {
        let id = parse_id(raw_id)?;

        self.store
            .get(id)
            .await
            .map_err(|err| AppError::storage(GET_FAILED, err))?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))
    }

    pub async fn create(&self, body: &[u8]) -> Result<Transaction, AppError> {
        let new_transaction = validate_transaction(body)?;

        let id = self
            .store
            .insert(new_transaction)
            .await
            .map_err(|err| AppError::storage(CREATE_FAILED, err))?;
        debug!(id, "transaction inserted");

        self.store
            .get(id)
            .await
            .and_then(|created| created.ok_or(StoreError::MissingInsertedRow(id)))
            .map_err(|err| AppError::storage(CREATE_FAILED, err))
    }

    pub async fn update(&self, raw_id: &str, body: &[u8]) -> Result<Transaction, AppError> {
        let id = parse_id(raw_id)?;
        let changes = validate_transaction(body)?;

        let changed = self
            .store
            .update(id, changes)
            .await
            .map_err(|err| AppError::storage(UPDATE_FAILED, err))?;
        if changed == 0 {
            return Err(AppError::not_found(NOT_FOUND));
        }
        debug!(id, "transaction updated");

        self.store
            .get(id)
            .await
            .map_err(|err| AppError::storage(UPDATE_FAILED, err))?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))
    }

    pub async fn delete(&self, raw_id: &str) -> Result<(), AppError> {
        let id = parse_id(raw_id)?;

        let existing = self
            .store
            .get(id)
            .await
            .map_err(|err| AppError::storage(DELETE_FAILED, err))?;
        if existing.is_none() {
            return Err(AppError::not_found(NOT_FOUND));
        }

        let removed = self
            .store
            .delete(id)
            .await
            .map_err(|err| AppError::storage(DELETE_FAILED, err))?;
        if removed == 0 {
            return Err(AppError::not_found(NOT_FOUND));
        }
        debug!(id, "transaction deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::{
        domain::{
            transaction::{NewTransaction, TransactionId},
            validation::{AMOUNT_NOT_POSITIVE, INVALID_ID, NAME_REQUIRED},
        },
        store::SqliteTransactionStore,
    };

    /// Counts calls and answers as if the table were empty, or fails outright.
    #[derive(Default)]
    struct RecordingStore {
        calls: AtomicUsize,
        fail: bool,
        lose_inserts: bool,
    }

    impl RecordingStore {
        fn record(&self) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StoreError::LockPoisoned);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TransactionStore for RecordingStore {
        async fn list(&self) -> Result<Vec<Transaction>, StoreError> {
            self.record()?;
            Ok(Vec::new())
        }

        async fn get(&self, _id: TransactionId) -> Result<Option<Transaction>, StoreError> {
            self.record()?;
            Ok(None)
        }

        async fn insert(&self, _transaction: NewTransaction) -> Result<TransactionId, StoreError> {
            self.record()?;
            if self.lose_inserts {
                return Ok(7);
            }
            Ok(1)
        }

        async fn update(
            &self,
            _id: TransactionId,
            _transaction: NewTransaction,
        ) -> Result<usize, StoreError> {
            self.record()?;
            Ok(0)
        }

        async fn delete(&self, _id: TransactionId) -> Result<usize, StoreError> {
            self.record()?;
            Ok(0)
        }
    }

    fn recording(store: RecordingStore) -> (Arc<RecordingStore>, TransactionHandler) {
        let store = Arc::new(store);
        let handler = TransactionHandler::new(store.clone());
        (store, handler)
    }

    fn sqlite_handler() -> TransactionHandler {
        TransactionHandler::new(Arc::new(
            SqliteTransactionStore::open_in_memory().expect("in-memory store"),
        ))
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_store() {
        let (store, handler) = recording(RecordingStore::default());

        let err = handler
            .create(br#"{"name":"  ","amount":5}"#)
            .await
            .expect_err("blank name");
        assert_eq!(err.public_message(), NAME_REQUIRED);

        let err = handler
            .create(br#"{"name":"Coffee","amount":0}"#)
            .await
            .expect_err("zero amount");
        assert_eq!(err.public_message(), AMOUNT_NOT_POSITIVE);

        let err = handler
            .update("abc", br#"{"name":"Coffee","amount":1}"#)
            .await
            .expect_err("bad id");
        assert_eq!(err.public_message(), INVALID_ID);

        let err = handler
            .update("3", br#"{"name":"Coffee","amount":"1"}"#)
            .await
            .expect_err("string amount");
        assert_eq!(err.public_message(), AMOUNT_NOT_POSITIVE);

        let err = handler.delete("0").await.expect_err("zero id");
        assert_eq!(err.public_message(), INVALID_ID);

        let err = handler.get("-1").await.expect_err("negative id");
        assert_eq!(err.public_message(), INVALID_ID);

        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn update_validates_id_before_body() {
        let (_, handler) = recording(RecordingStore::default());

        let err = handler
            .update("x1", b"not json")
            .await
            .expect_err("bad id and body");

        assert_eq!(err.public_message(), INVALID_ID);
    }

    #[tokio::test]
    async fn zero_rows_updated_is_not_found() {
        let (store, handler) = recording(RecordingStore::default());

        let err = handler
            .update("5", br#"{"name":"Coffee","amount":1}"#)
            .await
            .expect_err("missing row");

        assert!(matches!(err, AppError::NotFound(NOT_FOUND)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn delete_checks_existence_before_deleting() {
        let (store, handler) = recording(RecordingStore::default());

        let err = handler.delete("9999").await.expect_err("missing row");

        assert!(matches!(err, AppError::NotFound(NOT_FOUND)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn store_failures_are_storage_errors() {
        let (_, handler) = recording(RecordingStore {
            fail: true,
            ..Default::default()
        });

        let err = handler.list().await.expect_err("store down");
        assert!(matches!(err, AppError::Storage { context: LIST_FAILED, .. }));

        let err = handler
            .create(br#"{"name":"Coffee","amount":1}"#)
            .await
            .expect_err("store down");
        assert!(matches!(err, AppError::Storage { context: CREATE_FAILED, .. }));

        let err = handler
            .update("1", br#"{"name":"Coffee","amount":1}"#)
            .await
            .expect_err("store down");
        assert!(matches!(err, AppError::Storage { context: UPDATE_FAILED, .. }));

        let err = handler.delete("1").await.expect_err("store down");
        assert!(matches!(err, AppError::Storage { context: DELETE_FAILED, .. }));

        let err = handler.get("1").await.expect_err("store down");
        assert!(matches!(err, AppError::Storage { context: GET_FAILED, .. }));
    }

    #[tokio::test]
    async fn unreadable_insert_is_storage_error() {
        let (_, handler) = recording(RecordingStore {
            lose_inserts: true,
            ..Default::default()
        });

        let err = handler
            .create(br#"{"name":"Coffee","amount":1}"#)
            .await
            .expect_err("row vanished");

        assert!(matches!(
            err,
            AppError::Storage {
                context: CREATE_FAILED,
                source: StoreError::MissingInsertedRow(7),
            }
        ));
    }

    #[tokio::test]
    async fn create_returns_stored_row() {
        let handler = sqlite_handler();

        let created = handler
            .create(br#"{"name":"Coffee","amount":4.5}"#)
            .await
            .expect("create");

        assert_eq!(created.id, 1);
        assert_eq!(created.name, "Coffee");
        assert_eq!(created.amount, 4.5);
        assert_eq!(created.category, None);
        assert!(created.created_at <= Utc::now());
        assert_eq!(handler.get("1").await.expect("get"), created);
    }

    #[tokio::test]
    async fn update_keeps_id_and_created_at() {
        let handler = sqlite_handler();
        let created = handler
            .create(br#"{"name":"Coffee","amount":4.5,"category":"Food"}"#)
            .await
            .expect("create");

        let updated = handler
            .update("1", br#"{"name":"Tea","amount":3}"#)
            .await
            .expect("update");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "Tea");
        assert_eq!(updated.amount, 3.0);
        assert_eq!(updated.category, None);
    }

    #[tokio::test]
    async fn delete_removes_permanently() {
        let handler = sqlite_handler();
        handler
            .create(br#"{"name":"Coffee","amount":4.5}"#)
            .await
            .expect("create");

        handler.delete("1").await.expect("delete");

        assert!(matches!(
            handler.get("1").await,
            Err(AppError::NotFound(NOT_FOUND))
        ));
        assert!(matches!(
            handler.delete("1").await,
            Err(AppError::NotFound(NOT_FOUND))
        ));
        assert!(handler.list().await.expect("list").is_empty());
    }
}
