//! Core transaction persistence and query engine
//!
//! Turns filter parameters or a caller-supplied DSL fragment into a search
//! request, executes it against the document store, and maps the
//! loosely-typed result documents into typed transaction records. Point
//! lookups and mutations go through a read-merge-write protocol against the
//! same store.

pub mod codec;
pub mod error;
pub mod model;
pub mod query;

use chrono::NaiveDate;
use serde_json::Value;
use txsearch_client::{DeleteOutcome, StoreError, StoreRef, WriteOutcome};
use txsearch_config::Config;
use uuid::Uuid;

pub use error::{ErrorCode, ErrorSeverity, TransactionError, TransactionResult};
pub use model::{Merchant, Transaction};

// ==================== Transaction Service ====================

/// Transaction persistence and query engine over a shared document store.
///
/// The store handle is stateless and thread-safe, so any number of
/// operations may run concurrently without client-side locking. The update
/// protocol is read-merge-write without an optimistic-concurrency token: a
/// concurrent writer can interleave between the read and the write, and
/// callers needing strict consistency must sequence externally. The store is
/// the sole source of truth; nothing is cached between calls.
pub struct TransactionService {
    store: StoreRef,
    default_page_size: usize,
}

impl TransactionService {
    /// Create a service over a shared store handle
    pub fn new(store: StoreRef, config: &Config) -> Self {
        Self {
            store,
            default_page_size: config.pagination.records_per_page,
        }
    }

    // ==================== Search ====================

    /// Find transactions within optional inclusive date bounds, newest first.
    ///
    /// An empty page is a valid result, not an error.
    pub async fn find_by_filters(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        limit: usize,
        offset: usize,
    ) -> TransactionResult<Vec<Transaction>> {
        let query = query::date_range_query(start_date, end_date);
        self.execute_search(&query, limit, offset).await
    }

    /// Run a caller-supplied DSL fragment, newest first, one default page.
    ///
    /// The fragment is validated before any store call; upstream producers
    /// of DSL text are not trusted to emit valid JSON.
    pub async fn search_by_dsl(&self, fragment: &str) -> TransactionResult<Vec<Transaction>> {
        let query = query::dsl_query(fragment)?;
        self.execute_search(&query, self.default_page_size, 0).await
    }

    async fn execute_search(
        &self,
        query: &Value,
        limit: usize,
        offset: usize,
    ) -> TransactionResult<Vec<Transaction>> {
        let body = query::search_body(query, limit, offset);

        let response = self
            .store
            .search(&body)
            .await
            .map_err(|source| TransactionError::Search { source })?;

        log::debug!(
            "search returned {} hits of {} total",
            response.hits.len(),
            response.total
        );

        let mut transactions = Vec::with_capacity(response.hits.len());
        for hit in &response.hits {
            if let Some(transaction) = codec::decode(hit.source.as_ref())? {
                transactions.push(transaction);
            }
        }

        Ok(transactions)
    }

    // ==================== Record Store ====================

    /// Fetch a transaction by id.
    ///
    /// A record the store does not hold is `None`, not an error; a missing
    /// index surfaces the same way.
    pub async fn get_by_id(&self, id: &str) -> TransactionResult<Option<Transaction>> {
        let response = self.store.fetch(id).await.map_err(|source| {
            TransactionError::Get {
                id: id.to_string(),
                source,
            }
        })?;

        if !response.found {
            log::warn!("transaction {} not found", id);
            return Ok(None);
        }

        codec::decode(response.source.as_ref())
    }

    /// Persist a transaction, generating an id when the caller supplied none.
    ///
    /// Writing under an existing id is an upsert, so a retried create with a
    /// client-chosen id succeeds. Returns the stored record with the
    /// resolved id.
    pub async fn create(&self, transaction: Transaction) -> TransactionResult<Transaction> {
        let id = transaction
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let stored = Transaction {
            id: Some(id.clone()),
            ..transaction
        };
        let document = codec::encode(&stored);

        let outcome = self
            .store
            .put(&id, &document)
            .await
            .map_err(|source| TransactionError::Create { source })?;

        match outcome {
            WriteOutcome::Created | WriteOutcome::Updated => {
                log::info!("transaction created/updated with id {}", id);
                Ok(stored)
            }
            WriteOutcome::Other(result) => Err(TransactionError::Create {
                source: unexpected_outcome(&result),
            }),
        }
    }

    /// Merge a patch into the stored record and persist the result.
    ///
    /// Patch fields that are `None` leave the stored values unchanged; the
    /// merchant is replaced wholesale when present. A missing record yields
    /// `None` rather than an error, and whatever id the patch carries is
    /// ignored in favor of `id`.
    pub async fn update(
        &self,
        id: &str,
        patch: Transaction,
    ) -> TransactionResult<Option<Transaction>> {
        let response = self.store.fetch(id).await.map_err(|source| {
            TransactionError::Update {
                id: id.to_string(),
                source,
            }
        })?;

        if !response.found {
            log::warn!("transaction {} not found for update", id);
            return Ok(None);
        }

        let existing = match codec::decode(response.source.as_ref())? {
            Some(existing) => existing,
            None => {
                log::warn!("transaction {} has no stored source, treating as missing", id);
                return Ok(None);
            }
        };

        let merged = Transaction::merge(&existing, &patch, id);
        let document = codec::encode(&merged);

        let outcome = self.store.put(id, &document).await.map_err(|source| {
            TransactionError::Update {
                id: id.to_string(),
                source,
            }
        })?;

        match outcome {
            WriteOutcome::Created | WriteOutcome::Updated => {
                log::info!("transaction updated with id {}", id);
                Ok(Some(merged))
            }
            WriteOutcome::Other(result) => Err(TransactionError::Update {
                id: id.to_string(),
                source: unexpected_outcome(&result),
            }),
        }
    }

    /// Delete a transaction by id.
    ///
    /// Deleting an already-missing record is success, so the operation is
    /// idempotent.
    pub async fn delete(&self, id: &str) -> TransactionResult<()> {
        let outcome = self.store.delete(id).await.map_err(|source| {
            TransactionError::Delete {
                id: id.to_string(),
                source,
            }
        })?;

        match outcome {
            DeleteOutcome::Deleted => {
                log::info!("transaction deleted with id {}", id);
                Ok(())
            }
            DeleteOutcome::NotFound => {
                log::warn!("transaction {} not found for deletion", id);
                Ok(())
            }
            DeleteOutcome::Other(result) => Err(TransactionError::Delete {
                id: id.to_string(),
                source: unexpected_outcome(&result),
            }),
        }
    }
}

fn unexpected_outcome(result: &str) -> StoreError {
    StoreError::InvalidResponse {
        message: format!("unexpected store result: {}", result),
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};
    use txsearch_client::{DocResponse, DocumentStore, SearchHit, SearchResponse};

    /// In-memory store double. Documents live in a map; searches return the
    /// canned hit sources and record the last executed body.
    #[derive(Default)]
    struct MemoryStore {
        documents: Mutex<HashMap<String, Value>>,
        canned_hits: Vec<Value>,
        last_search_body: Mutex<Option<Value>>,
        fail: bool,
    }

    impl MemoryStore {
        fn with_hits(canned_hits: Vec<Value>) -> Self {
            MemoryStore {
                canned_hits,
                ..MemoryStore::default()
            }
        }

        fn failing() -> Self {
            MemoryStore {
                fail: true,
                ..MemoryStore::default()
            }
        }

        fn down() -> StoreError {
            StoreError::InvalidResponse {
                message: "store down".to_string(),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for MemoryStore {
        async fn search(&self, body: &Value) -> Result<SearchResponse, StoreError> {
            if self.fail {
                return Err(Self::down());
            }
            *self.last_search_body.lock().unwrap() = Some(body.clone());
            let hits: Vec<SearchHit> = self
                .canned_hits
                .iter()
                .map(|source| SearchHit {
                    source: Some(source.clone()),
                })
                .collect();
            let total = hits.len() as u64;
            Ok(SearchResponse { hits, total })
        }

        async fn fetch(&self, id: &str) -> Result<DocResponse, StoreError> {
            if self.fail {
                return Err(Self::down());
            }
            Ok(match self.documents.lock().unwrap().get(id) {
                Some(document) => DocResponse {
                    found: true,
                    source: Some(document.clone()),
                },
                None => DocResponse::missing(),
            })
        }

        async fn put(&self, id: &str, document: &Value) -> Result<WriteOutcome, StoreError> {
            if self.fail {
                return Err(Self::down());
            }
            let previous = self
                .documents
                .lock()
                .unwrap()
                .insert(id.to_string(), document.clone());
            Ok(if previous.is_some() {
                WriteOutcome::Updated
            } else {
                WriteOutcome::Created
            })
        }

        async fn delete(&self, id: &str) -> Result<DeleteOutcome, StoreError> {
            if self.fail {
                return Err(Self::down());
            }
            Ok(match self.documents.lock().unwrap().remove(id) {
                Some(_) => DeleteOutcome::Deleted,
                None => DeleteOutcome::NotFound,
            })
        }
    }

    fn service(store: &Arc<MemoryStore>) -> TransactionService {
        TransactionService::new(store.clone(), &Config::parse("{}").unwrap())
    }

    fn sample() -> Transaction {
        Transaction {
            id: None,
            date: codec::parse_datetime("2024-01-15T10:00:00"),
            amount: Decimal::from_str("42.50").ok(),
            description: Some("groceries".to_string()),
            merchant: Some(Merchant {
                name: Some("Corner Market".to_string()),
                category: Some("food".to_string()),
            }),
        }
    }

    // ==================== Record store ====================

    #[tokio::test]
    async fn test_create_generates_id_when_absent() {
        let store = Arc::new(MemoryStore::default());
        let created = service(&store).create(sample()).await.unwrap();

        let id = created.id.expect("resolved id");
        assert_eq!(id.len(), 36);
        assert!(store.documents.lock().unwrap().contains_key(&id));
    }

    #[tokio::test]
    async fn test_create_keeps_caller_chosen_id_and_is_idempotent() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);
        let transaction = Transaction {
            id: Some("client-id".to_string()),
            ..sample()
        };

        let first = service.create(transaction.clone()).await.unwrap();
        // A retried create with the same id is an upsert, not a failure
        let second = service.create(transaction).await.unwrap();

        assert_eq!(first.id, Some("client-id".to_string()));
        assert_eq!(second.id, Some("client-id".to_string()));
        assert_eq!(store.documents.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_round_trips_created_record() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);

        let created = service.create(sample()).await.unwrap();
        let fetched = service
            .get_by_id(created.id.as_deref().unwrap())
            .await
            .unwrap();

        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_get_missing_record_is_none() {
        let store = Arc::new(MemoryStore::default());
        let fetched = service(&store).get_by_id("does-not-exist").await.unwrap();
        assert_eq!(fetched, None);
    }

    #[tokio::test]
    async fn test_get_store_failure_is_typed() {
        let store = Arc::new(MemoryStore::failing());
        let error = service(&store).get_by_id("any").await.unwrap_err();
        assert!(matches!(error, TransactionError::Get { .. }));
    }

    #[tokio::test]
    async fn test_update_merges_patch_over_existing() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);

        let created = service
            .create(Transaction {
                id: Some("tx-1".to_string()),
                ..sample()
            })
            .await
            .unwrap();

        let patch = Transaction {
            amount: Decimal::from_str("99.99").ok(),
            ..Transaction::default()
        };
        let updated = service.update("tx-1", patch).await.unwrap().unwrap();

        assert_eq!(updated.amount, Decimal::from_str("99.99").ok());
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.merchant, created.merchant);
        assert_eq!(service.get_by_id("tx-1").await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_with_own_values_changes_nothing() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);

        let created = service
            .create(Transaction {
                id: Some("tx-1".to_string()),
                ..sample()
            })
            .await
            .unwrap();

        let updated = service
            .update("tx-1", created.clone())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated, created);
        assert_eq!(service.get_by_id("tx-1").await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_update_ignores_patch_id() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);

        service
            .create(Transaction {
                id: Some("tx-1".to_string()),
                ..sample()
            })
            .await
            .unwrap();

        let patch = Transaction {
            id: Some("someone-elses-id".to_string()),
            description: Some("renamed".to_string()),
            ..Transaction::default()
        };
        let updated = service.update("tx-1", patch).await.unwrap().unwrap();

        assert_eq!(updated.id, Some("tx-1".to_string()));
        let documents = store.documents.lock().unwrap();
        assert!(documents.contains_key("tx-1"));
        assert!(!documents.contains_key("someone-elses-id"));
    }

    #[tokio::test]
    async fn test_update_missing_record_is_none_not_error() {
        let store = Arc::new(MemoryStore::default());
        let updated = service(&store)
            .update("does-not-exist", sample())
            .await
            .unwrap();

        assert_eq!(updated, None);
        assert!(store.documents.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);

        service
            .create(Transaction {
                id: Some("tx-1".to_string()),
                ..sample()
            })
            .await
            .unwrap();

        service.delete("tx-1").await.unwrap();
        // The second delete finds nothing and still succeeds
        service.delete("tx-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_store_failure_is_typed() {
        let store = Arc::new(MemoryStore::failing());
        let error = service(&store).delete("tx-1").await.unwrap_err();
        assert!(matches!(error, TransactionError::Delete { .. }));
    }

    // ==================== Search ====================

    #[tokio::test]
    async fn test_find_by_filters_wires_pagination_and_sort() {
        let store = Arc::new(MemoryStore::default());
        service(&store)
            .find_by_filters(None, None, 10, 5)
            .await
            .unwrap();

        let body = store.last_search_body.lock().unwrap().clone().unwrap();
        assert_eq!(body["query"], json!({"match_all": {}}));
        assert_eq!(body["from"], 5);
        assert_eq!(body["size"], 10);
        assert_eq!(body["sort"], json!([{"date": {"order": "desc"}}]));
    }

    #[tokio::test]
    async fn test_find_by_filters_builds_date_range() {
        let store = Arc::new(MemoryStore::default());
        service(&store)
            .find_by_filters(
                Some("2024-01-01".parse().unwrap()),
                Some("2024-01-31".parse().unwrap()),
                50,
                0,
            )
            .await
            .unwrap();

        let body = store.last_search_body.lock().unwrap().clone().unwrap();
        assert_eq!(body["query"]["range"]["date"]["gte"], "2024-01-01T00:00:00");
        assert_eq!(
            body["query"]["range"]["date"]["lte"],
            "2024-01-31T23:59:59.999999999"
        );
    }

    #[tokio::test]
    async fn test_search_decodes_hits_in_order() {
        let store = Arc::new(MemoryStore::with_hits(vec![
            json!({"id": "b", "description": "second"}),
            json!({"id": "a", "description": "first"}),
        ]));

        let transactions = service(&store)
            .find_by_filters(None, None, 50, 0)
            .await
            .unwrap();

        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].id, Some("b".to_string()));
        assert_eq!(transactions[1].id, Some("a".to_string()));
    }

    #[tokio::test]
    async fn test_search_empty_page_is_ok() {
        let store = Arc::new(MemoryStore::default());
        let transactions = service(&store)
            .find_by_filters(None, None, 50, 0)
            .await
            .unwrap();
        assert!(transactions.is_empty());
    }

    #[tokio::test]
    async fn test_search_undecodable_hit_is_a_decode_error() {
        let store = Arc::new(MemoryStore::with_hits(vec![json!("not a document")]));
        let error = service(&store)
            .find_by_filters(None, None, 50, 0)
            .await
            .unwrap_err();
        assert!(matches!(error, TransactionError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_search_store_failure_is_typed() {
        let store = Arc::new(MemoryStore::failing());
        let error = service(&store)
            .find_by_filters(None, None, 50, 0)
            .await
            .unwrap_err();
        assert!(matches!(error, TransactionError::Search { .. }));
    }

    #[tokio::test]
    async fn test_dsl_envelope_forms_execute_identically() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);

        service
            .search_by_dsl(r#"{"query": {"match_all": {}}}"#)
            .await
            .unwrap();
        let wrapped = store.last_search_body.lock().unwrap().clone().unwrap();

        service.search_by_dsl(r#"{"match_all": {}}"#).await.unwrap();
        let bare = store.last_search_body.lock().unwrap().clone().unwrap();

        assert_eq!(wrapped, bare);
    }

    #[tokio::test]
    async fn test_dsl_uses_default_page_size() {
        let store = Arc::new(MemoryStore::default());
        service(&store)
            .search_by_dsl(r#"{"match_all": {}}"#)
            .await
            .unwrap();

        let body = store.last_search_body.lock().unwrap().clone().unwrap();
        assert_eq!(body["size"], 50);
        assert_eq!(body["from"], 0);
    }

    #[tokio::test]
    async fn test_malformed_dsl_fails_before_any_store_call() {
        let store = Arc::new(MemoryStore::default());
        let error = service(&store).search_by_dsl("{not json").await.unwrap_err();

        assert!(matches!(error, TransactionError::MalformedQuery { .. }));
        assert!(store.last_search_body.lock().unwrap().is_none());
    }
}
