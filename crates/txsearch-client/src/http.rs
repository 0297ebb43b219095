//! OpenSearch-compatible REST implementation of the document store

use crate::error::StoreError;
use crate::types::{DeleteOutcome, DocResponse, SearchResponse, WriteOutcome};
use crate::DocumentStore;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use txsearch_config::Config;

/// Document store backed by an OpenSearch-compatible REST API
///
/// Holds a shared `reqwest::Client`; the handle is cheap to clone and safe
/// to use from any number of tasks concurrently.
pub struct OpenSearchStore {
    client: reqwest::Client,
    base_url: String,
    index: String,
    credentials: Option<(String, String)>,
}

impl OpenSearchStore {
    /// Build a store client from configuration
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.store.timeout_secs))
            .build()?;

        // Auth is only applied when both credentials are present
        let credentials = if config.has_credentials() {
            Some((config.store.username.clone(), config.store.password.clone()))
        } else {
            None
        };

        Ok(Self {
            client,
            base_url: config.store_url(),
            index: config.store.index.clone(),
            credentials,
        })
    }

    fn search_url(&self) -> String {
        format!("{}/{}/_search", self.base_url, self.index)
    }

    fn doc_url(&self, id: &str) -> String {
        format!(
            "{}/{}/_doc/{}",
            self.base_url,
            self.index,
            urlencoding::encode(id)
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some((username, password)) => request.basic_auth(username, Some(password)),
            None => request,
        }
    }

    async fn read_body(response: reqwest::Response) -> Result<Value, StoreError> {
        let body = response.json::<Value>().await?;
        Ok(body)
    }

    async fn http_error(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        StoreError::Http { status, body }
    }
}

#[async_trait]
impl DocumentStore for OpenSearchStore {
    async fn search(&self, body: &Value) -> Result<SearchResponse, StoreError> {
        let url = self.search_url();
        log::debug!("POST {}", url);

        let response = self
            .authorized(self.client.post(&url))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::http_error(response).await);
        }

        SearchResponse::from_body(&Self::read_body(response).await?)
    }

    async fn fetch(&self, id: &str) -> Result<DocResponse, StoreError> {
        let response = self
            .authorized(self.client.get(self.doc_url(id)))
            .send()
            .await?;

        // A missing document and a missing index both answer 404
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(DocResponse::missing());
        }
        if !response.status().is_success() {
            return Err(Self::http_error(response).await);
        }

        DocResponse::from_body(&Self::read_body(response).await?)
    }

    async fn put(&self, id: &str, document: &Value) -> Result<WriteOutcome, StoreError> {
        let response = self
            .authorized(self.client.put(self.doc_url(id)))
            .json(document)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::http_error(response).await);
        }

        WriteOutcome::from_body(&Self::read_body(response).await?)
    }

    async fn delete(&self, id: &str) -> Result<DeleteOutcome, StoreError> {
        let response = self
            .authorized(self.client.delete(self.doc_url(id)))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(DeleteOutcome::NotFound);
        }
        if !response.status().is_success() {
            return Err(Self::http_error(response).await);
        }

        DeleteOutcome::from_body(&Self::read_body(response).await?)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn store_from(yaml: &str) -> OpenSearchStore {
        OpenSearchStore::new(&Config::parse(yaml).unwrap()).unwrap()
    }

    #[test]
    fn test_search_url() {
        let store = store_from("{}");
        assert_eq!(store.search_url(), "http://localhost:9200/transactions/_search");
    }

    #[test]
    fn test_doc_url() {
        let store = store_from("store:\n  host: search.internal\n  port: 9201\n  index: tx\n");
        assert_eq!(
            store.doc_url("abc-123"),
            "http://search.internal:9201/tx/_doc/abc-123"
        );
    }

    #[test]
    fn test_doc_url_encodes_id() {
        let store = store_from("{}");
        assert_eq!(
            store.doc_url("a/b c"),
            "http://localhost:9200/transactions/_doc/a%2Fb%20c"
        );
    }

    #[test]
    fn test_credentials_skipped_when_password_empty() {
        // Default config has a username but an empty password
        let store = store_from("{}");
        assert!(store.credentials.is_none());
    }

    #[test]
    fn test_credentials_applied_when_both_set() {
        let store = store_from("store:\n  username: svc\n  password: secret\n");
        assert_eq!(
            store.credentials,
            Some(("svc".to_string(), "secret".to_string()))
        );
    }
}
