use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// A single row as returned by the store.
pub type Record = serde_json::Map<String, Value>;

/// Table oriented store reached over a remote API. Every call is a single
/// request/response; implementations own their timeouts and never retry.
#[async_trait]
pub trait RecordStore: Sync + Send {
    /// Returns the rows of `table` matching every filter, in store order.
    async fn select(&self, table: &str, filters: &Filters) -> Result<Vec<Record>, RecordStoreError>;

    /// Inserts `record` into `table` and returns the stored row, including any
    /// generated columns.
    async fn insert(&self, table: &str, record: Record) -> Result<Record, RecordStoreError>;

    /// Deletes the rows of `table` matching every filter and returns them.
    async fn delete(&self, table: &str, filters: &Filters) -> Result<Vec<Record>, RecordStoreError>;
}

#[derive(Error, Debug)]
pub enum RecordStoreError {
    #[error("Record store unavailable: {0}")]
    Unavailable(String),
    #[error("Record store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Unexpected record shape in table {table}: {source}")]
    Deserialization {
        table: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid record store configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Equality predicates, all of which must hold for a row to match.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filters {
    predicates: Vec<(String, String)>,
}

impl Filters {
    pub fn new() -> Filters {
        Filters::default()
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Filters {
        self.predicates.push((column.to_owned(), value.to_string()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.predicates
            .iter()
            .map(|(column, value)| (column.as_str(), value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Values are compared by their textual form, so `"7"` matches both the
    /// number `7` and the string `"7"`.
    pub fn matches(&self, record: &Record) -> bool {
        self.iter().all(|(column, expected)| match record.get(column) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == expected,
        })
    }
}

pub fn from_record<T: DeserializeOwned>(table: &str, record: Record) -> Result<T, RecordStoreError> {
    serde_json::from_value(Value::Object(record)).map_err(|source| {
        RecordStoreError::Deserialization {
            table: table.to_owned(),
            source,
        }
    })
}

pub fn to_record<T: Serialize>(table: &str, value: &T) -> Result<Record, RecordStoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(other) => Err(RecordStoreError::Other(anyhow::anyhow!(
            "Expected an object for table {}, got {}",
            table,
            other
        ))),
        Err(source) => Err(RecordStoreError::Deserialization {
            table: table.to_owned(),
            source,
        }),
    }
}
