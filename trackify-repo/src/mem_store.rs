use crate::record_store::{Filters, Record, RecordStore, RecordStoreError};
use crate::store_repo::{StoreTransactionRepo, StoreUserRepo};
use crate::transaction_repo::TransactionRepo;
use crate::user_repo::UserRepo;
use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub fn create_repos() -> (Arc<dyn TransactionRepo>, Arc<dyn UserRepo>) {
    let store: Arc<dyn RecordStore> = Arc::new(MemStore::new());

    let transaction_repo = StoreTransactionRepo::new(store.clone());
    let user_repo = StoreUserRepo::new(store);
    (Arc::new(transaction_repo), Arc::new(user_repo))
}

#[derive(Default)]
struct Table {
    rows: Vec<Record>,
    next_id: i64,
}

/// Keeps every table in process memory. Rows keep insertion order and an
/// `id` is generated for rows inserted without one.
pub struct MemStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemStore {
    pub fn new() -> MemStore {
        MemStore {
            tables: RwLock::new(HashMap::new()),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<HashMap<String, Table>>, anyhow::Error> {
        self.tables
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<HashMap<String, Table>>, anyhow::Error> {
        self.tables
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

impl Default for MemStore {
    fn default() -> Self {
        MemStore::new()
    }
}

#[async_trait]
impl RecordStore for MemStore {
    async fn select(&self, table: &str, filters: &Filters) -> Result<Vec<Record>, RecordStoreError> {
        let read_guard = self.read_lock()?;

        let Some(table) = read_guard.get(table) else {
            return Ok(Vec::new());
        };
        Ok(table
            .rows
            .iter()
            .filter(|row| filters.matches(row))
            .cloned()
            .collect())
    }

    async fn insert(&self, table: &str, mut record: Record) -> Result<Record, RecordStoreError> {
        let mut write_guard = self.write_lock()?;
        let table = write_guard.entry(table.to_owned()).or_default();

        match record.get("id").and_then(Value::as_i64) {
            Some(id) => table.next_id = table.next_id.max(id),
            None => {
                table.next_id = table
                    .next_id
                    .checked_add(1)
                    .ok_or_else(|| anyhow!("No ids left in table"))?;
                record.insert("id".to_owned(), Value::from(table.next_id));
            }
        }

        table.rows.push(record.clone());
        Ok(record)
    }

    async fn delete(&self, table: &str, filters: &Filters) -> Result<Vec<Record>, RecordStoreError> {
        let mut write_guard = self.write_lock()?;

        let Some(table) = write_guard.get_mut(table) else {
            return Ok(Vec::new());
        };
        let (deleted, kept): (Vec<Record>, Vec<Record>) = table
            .rows
            .drain(..)
            .partition(|row| filters.matches(row));
        table.rows = kept;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::MemStore;
    use crate::record_store::{Filters, Record, RecordStore};
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[actix_rt::test]
    async fn insert_generates_ids() {
        let store = MemStore::new();

        let first = store
            .insert("users", record(json!({"email": "a@x.com"})))
            .await
            .unwrap();
        let second = store
            .insert("users", record(json!({"email": "b@x.com"})))
            .await
            .unwrap();

        assert_eq!(first.get("id"), Some(&json!(1)));
        assert_eq!(second.get("id"), Some(&json!(2)));
    }

    #[actix_rt::test]
    async fn explicit_ids_are_kept_and_skipped() {
        let store = MemStore::new();

        store
            .insert("users", record(json!({"id": 10, "email": "a@x.com"})))
            .await
            .unwrap();
        store
            .insert("users", record(json!({"id": 3, "email": "c@x.com"})))
            .await
            .unwrap();
        let next = store
            .insert("users", record(json!({"email": "b@x.com"})))
            .await
            .unwrap();

        assert_eq!(next.get("id"), Some(&json!(11)));
    }

    #[actix_rt::test]
    async fn exhausted_ids_are_an_error() {
        let store = MemStore::new();

        store
            .insert("users", record(json!({"id": i64::MAX, "email": "a@x.com"})))
            .await
            .unwrap();
        let result = store
            .insert("users", record(json!({"email": "b@x.com"})))
            .await;

        assert!(result.is_err());
    }

    #[actix_rt::test]
    async fn select_keeps_insertion_order() {
        let store = MemStore::new();
        for category in ["food", "rent", "food"] {
            store
                .insert("transactions", record(json!({"category": category})))
                .await
                .unwrap();
        }

        let rows = store
            .select("transactions", &Filters::new().eq("category", "food"))
            .await
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.get("id").cloned().unwrap()).collect();
        assert_eq!(ids, vec![json!(1), json!(3)]);

        let missing = store.select("missing", &Filters::new()).await.unwrap();
        assert!(missing.is_empty());
    }

    #[actix_rt::test]
    async fn delete_returns_removed_rows() {
        let store = MemStore::new();
        for user_id in [1, 2] {
            store
                .insert("transactions", record(json!({"user_id": user_id})))
                .await
                .unwrap();
        }

        let deleted = store
            .delete("transactions", &Filters::new().eq("user_id", 2))
            .await
            .unwrap();
        assert_eq!(deleted.len(), 1);

        let remaining = store.select("transactions", &Filters::new()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].get("user_id"), Some(&json!(1)));
    }
}
