use crate::record_store::{from_record, to_record, Filters, RecordStore};
use crate::transaction_repo::TransactionRepoError::TransactionNotFound;
use crate::transaction_repo::{
    NewTransaction, Transaction, TransactionEntry, TransactionRepo, TransactionRepoError,
    TypeFilter, TRANSACTIONS_TABLE,
};
use crate::user_repo::{NewUser, User, UserRepo, UserRepoError, USERS_TABLE};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub struct StoreUserRepo {
    store: Arc<dyn RecordStore>,
}

impl StoreUserRepo {
    pub fn new(store: Arc<dyn RecordStore>) -> StoreUserRepo {
        StoreUserRepo { store }
    }
}

#[async_trait]
impl UserRepo for StoreUserRepo {
    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, UserRepoError> {
        let rows = self
            .store
            .select(USERS_TABLE, &Filters::new().eq("email", email))
            .await?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(from_record(USERS_TABLE, row)?)),
            None => Ok(None),
        }
    }

    // The existence check and the insert are separate store calls; a unique
    // constraint on users.email is the only guard against a concurrent signup.
    #[instrument(skip_all, fields(email = %new_user.email))]
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError> {
        let existing = self
            .store
            .select(USERS_TABLE, &Filters::new().eq("email", &new_user.email))
            .await?;
        if !existing.is_empty() {
            return Err(UserRepoError::DuplicateEmail(new_user.email));
        }

        let row = self
            .store
            .insert(USERS_TABLE, to_record(USERS_TABLE, &new_user)?)
            .await?;
        let user: User = from_record(USERS_TABLE, row)?;
        debug!(user_id = user.id, "Created user");
        Ok(user)
    }
}

pub struct StoreTransactionRepo {
    store: Arc<dyn RecordStore>,
}

impl StoreTransactionRepo {
    pub fn new(store: Arc<dyn RecordStore>) -> StoreTransactionRepo {
        StoreTransactionRepo { store }
    }
}

#[async_trait]
impl TransactionRepo for StoreTransactionRepo {
    #[instrument(skip(self, new_transaction))]
    async fn create_transaction(
        &self,
        user_id: i64,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let entry = TransactionEntry {
            user_id,
            transaction: &new_transaction,
        };
        let row = self
            .store
            .insert(TRANSACTIONS_TABLE, to_record(TRANSACTIONS_TABLE, &entry)?)
            .await?;
        Ok(from_record(TRANSACTIONS_TABLE, row)?)
    }

    #[instrument(skip(self))]
    async fn get_transactions(
        &self,
        user_id: i64,
        filter: TypeFilter,
    ) -> Result<Vec<Transaction>, TransactionRepoError> {
        let mut filters = Filters::new().eq("user_id", user_id);
        if let Some(transaction_type) = filter.transaction_type() {
            filters = filters.eq("type", transaction_type);
        }

        let rows = self.store.select(TRANSACTIONS_TABLE, &filters).await?;
        let transactions = rows
            .into_iter()
            .map(|row| from_record(TRANSACTIONS_TABLE, row))
            .collect::<Result<Vec<Transaction>, _>>()?;
        Ok(transactions)
    }

    #[instrument(skip(self))]
    async fn delete_transaction(
        &self,
        user_id: i64,
        transaction_id: i64,
    ) -> Result<Transaction, TransactionRepoError> {
        let filters = Filters::new()
            .eq("id", transaction_id)
            .eq("user_id", user_id);
        let mut deleted = self.store.delete(TRANSACTIONS_TABLE, &filters).await?;
        if deleted.len() > 1 {
            warn!(count = deleted.len(), "Deleted more than one transaction");
        }
        match deleted.pop() {
            Some(row) => Ok(from_record(TRANSACTIONS_TABLE, row)?),
            None => Err(TransactionNotFound(transaction_id)),
        }
    }
}
