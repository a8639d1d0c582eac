//! [RecordStore] backed by a PostgREST endpoint, such as the one a hosted
//! Supabase project exposes under `/rest/v1`.

use crate::record_store::{Filters, Record, RecordStore, RecordStoreError};
use crate::store_repo::{StoreTransactionRepo, StoreUserRepo};
use crate::transaction_repo::TransactionRepo;
use crate::user_repo::UserRepo;
use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub fn create_repos(
    url: &str,
    api_key: &str,
) -> Result<(Arc<dyn TransactionRepo>, Arc<dyn UserRepo>), RecordStoreError> {
    let store: Arc<dyn RecordStore> = Arc::new(RestStore::new(url, api_key)?);

    let transaction_repo = StoreTransactionRepo::new(store.clone());
    let user_repo = StoreUserRepo::new(store);
    Ok((Arc::new(transaction_repo), Arc::new(user_repo)))
}

pub struct RestStore {
    http: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(url: &str, api_key: &str) -> Result<RestStore, RecordStoreError> {
        let base_url = url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            return Err(RecordStoreError::InvalidConfig(
                "Store URL cannot be empty".into(),
            ));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(RecordStoreError::InvalidConfig(
                "Store URL must start with http:// or https://".into(),
            ));
        }
        if api_key.trim().is_empty() {
            return Err(RecordStoreError::InvalidConfig(
                "Store access key cannot be empty".into(),
            ));
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(format!("trackify/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RecordStoreError::InvalidConfig(e.to_string()))?;

        Ok(RestStore {
            http,
            base_url,
            api_key: api_key.trim().to_owned(),
        })
    }

    fn request(&self, method: Method, table: &str, filters: &Filters) -> RequestBuilder {
        let predicates: Vec<(&str, String)> = filters
            .iter()
            .map(|(column, value)| (column, format!("eq.{}", value)))
            .collect();

        self.http
            .request(method, format!("{}/rest/v1/{}", self.base_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&predicates)
    }

    async fn execute(
        &self,
        table: &str,
        request: RequestBuilder,
    ) -> Result<Vec<Record>, RecordStoreError> {
        let response = request.send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(table, status = status.as_u16(), %message, "Record store rejected request");
            return Err(RecordStoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await.map_err(request_error)?;
        let rows: Vec<Record> =
            serde_json::from_slice(&body).map_err(|source| RecordStoreError::Deserialization {
                table: table.to_owned(),
                source,
            })?;
        debug!(table, rows = rows.len(), "Record store responded");
        Ok(rows)
    }
}

fn request_error(e: reqwest::Error) -> RecordStoreError {
    if e.is_connect() || e.is_timeout() {
        RecordStoreError::Unavailable(e.to_string())
    } else {
        RecordStoreError::Other(anyhow::Error::new(e).context("Request to record store failed"))
    }
}

#[async_trait]
impl RecordStore for RestStore {
    #[instrument(skip(self))]
    async fn select(&self, table: &str, filters: &Filters) -> Result<Vec<Record>, RecordStoreError> {
        let request = self
            .request(Method::GET, table, filters)
            .query(&[("select", "*")]);
        self.execute(table, request).await
    }

    #[instrument(skip(self, record))]
    async fn insert(&self, table: &str, record: Record) -> Result<Record, RecordStoreError> {
        let request = self
            .request(Method::POST, table, &Filters::new())
            .header("Prefer", "return=representation")
            .json(&Value::Object(record));
        self.execute(table, request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Record store returned no row for insert into {}", table).into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, table: &str, filters: &Filters) -> Result<Vec<Record>, RecordStoreError> {
        if filters.is_empty() {
            return Err(anyhow!("Refusing to delete every row of {}", table).into());
        }
        let request = self
            .request(Method::DELETE, table, filters)
            .header("Prefer", "return=representation");
        self.execute(table, request).await
    }
}
