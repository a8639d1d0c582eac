use crate::record_store::RecordStoreError;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

pub const TRANSACTIONS_TABLE: &str = "transactions";

#[async_trait]
pub trait TransactionRepo: Sync + Send {
    async fn create_transaction(
        &self,
        user_id: i64,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError>;

    /// Transactions owned by `user_id`, in store order.
    async fn get_transactions(
        &self,
        user_id: i64,
        filter: TypeFilter,
    ) -> Result<Vec<Transaction>, TransactionRepoError>;

    /// Only deletes the transaction if it is owned by `user_id`.
    async fn delete_transaction(
        &self,
        user_id: i64,
        transaction_id: i64,
    ) -> Result<Transaction, TransactionRepoError>;
}

#[derive(Error, Debug)]
pub enum TransactionRepoError {
    #[error("Transaction with id {0} not found")]
    TransactionNotFound(i64),
    #[error(transparent)]
    Store(#[from] RecordStoreError),
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Income, TransactionType::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Unknown transaction type: {0}")]
pub struct UnknownTransactionType(pub String);

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(UnknownTransactionType(other.to_owned())),
        }
    }
}

/// Narrows a transaction listing by type. Anything other than the literal
/// `income` or `expense` lists everything.
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl TypeFilter {
    pub fn parse(value: &str) -> TypeFilter {
        match value.parse() {
            Ok(TransactionType::Income) => TypeFilter::Income,
            Ok(TransactionType::Expense) => TypeFilter::Expense,
            Err(_) => TypeFilter::All,
        }
    }

    pub fn transaction_type(&self) -> Option<TransactionType> {
        match self {
            TypeFilter::All => None,
            TypeFilter::Income => Some(TransactionType::Income),
            TypeFilter::Expense => Some(TransactionType::Expense),
        }
    }
}

impl<'de> Deserialize<'de> for TypeFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(TypeFilter::parse(&value))
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    pub description: Option<String>,
    pub date: NaiveDate,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct NewTransaction {
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl NewTransaction {
    pub fn new(
        amount: Decimal,
        transaction_type: TransactionType,
        category: String,
        description: Option<String>,
        date: NaiveDate,
    ) -> NewTransaction {
        NewTransaction {
            amount,
            transaction_type,
            category,
            description,
            date,
        }
    }
}

/// Row shape written to the store: a new transaction plus its owner.
#[derive(Serialize)]
pub(crate) struct TransactionEntry<'a> {
    pub user_id: i64,
    #[serde(flatten)]
    pub transaction: &'a NewTransaction,
}

#[cfg(test)]
mod tests {
    use super::{TransactionType, TypeFilter};
    use rstest::rstest;

    #[rstest]
    #[case("income", TypeFilter::Income)]
    #[case("expense", TypeFilter::Expense)]
    #[case("all", TypeFilter::All)]
    #[case("", TypeFilter::All)]
    #[case("Expense", TypeFilter::All)]
    #[case("transfer", TypeFilter::All)]
    fn parse_filter(#[case] value: &str, #[case] expected: TypeFilter) {
        assert_eq!(TypeFilter::parse(value), expected);
    }

    #[test]
    fn filter_deserializes_unknown_values_as_all() {
        let filter: TypeFilter = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(filter, TypeFilter::All);
        assert_eq!(filter.transaction_type(), None);
    }

    #[test]
    fn transaction_type_round_trips_through_text() {
        for t in TransactionType::ALL {
            assert_eq!(t.as_str().parse::<TransactionType>(), Ok(t));
        }
        assert!("refund".parse::<TransactionType>().is_err());
    }
}
