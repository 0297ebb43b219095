//! Document store access for txsearch
//!
//! The store seam is an object-safe async trait over raw JSON documents;
//! `OpenSearchStore` implements it against an OpenSearch-compatible REST API.
//! Everything above this crate works in terms of `StoreRef`, so tests can
//! substitute an in-memory double.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub mod error;
pub mod http;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use http::OpenSearchStore;

// Re-export commonly used types
pub use types::{DeleteOutcome, DocResponse, SearchHit, SearchResponse, WriteOutcome};

/// Shared store handle type
pub type StoreRef = Arc<dyn DocumentStore>;

/// Trait for document stores holding transaction records
///
/// Implementations must be stateless between calls: every method is a
/// self-contained request/response round trip, safe to issue concurrently
/// from any number of tasks without client-side locking.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Execute a search body against the index and return the raw hits
    async fn search(&self, body: &Value) -> Result<SearchResponse, StoreError>;

    /// Fetch a single document by id; a missing document is not an error
    async fn fetch(&self, id: &str) -> Result<DocResponse, StoreError>;

    /// Persist a document under the given id (upsert)
    async fn put(&self, id: &str, document: &Value) -> Result<WriteOutcome, StoreError>;

    /// Delete the document under the given id; deleting a missing document
    /// is not an error
    async fn delete(&self, id: &str) -> Result<DeleteOutcome, StoreError>;
}
