//! Response envelope types for the document store
//!
//! The store answers with loosely-typed JSON; these types pull out the
//! handful of fields the rest of the system relies on and leave document
//! sources as raw values for the codec to interpret.

use crate::error::StoreError;
use serde_json::Value;

/// One matched document, paired with its stored source content
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Raw document source; hits with source disabled carry none
    pub source: Option<Value>,
}

/// Result of a search execution
#[derive(Debug, Clone)]
pub struct SearchResponse {
    /// Matched documents in store order
    pub hits: Vec<SearchHit>,
    /// Best-effort total hit count; zero when the store reports none
    pub total: u64,
}

impl SearchResponse {
    /// Parse a search response body
    pub fn from_body(body: &Value) -> Result<Self, StoreError> {
        let hits_node = body
            .get("hits")
            .and_then(|h| h.get("hits"))
            .and_then(Value::as_array)
            .ok_or_else(|| StoreError::InvalidResponse {
                message: "search response has no hits array".to_string(),
            })?;

        let hits = hits_node
            .iter()
            .map(|hit| SearchHit {
                source: hit.get("_source").cloned(),
            })
            .collect();

        // The total is reported as {"value": n} by current stores and as a
        // bare number by older ones; a missing total counts as zero.
        let total = body
            .get("hits")
            .and_then(|h| h.get("total"))
            .map(|t| match t {
                Value::Number(n) => n.as_u64().unwrap_or(0),
                other => other.get("value").and_then(Value::as_u64).unwrap_or(0),
            })
            .unwrap_or(0);

        Ok(SearchResponse { hits, total })
    }
}

/// Result of a single-document fetch
#[derive(Debug, Clone)]
pub struct DocResponse {
    /// Whether the store holds a document under the requested id
    pub found: bool,
    /// Raw document source when found
    pub source: Option<Value>,
}

impl DocResponse {
    /// Response for a document the store does not hold
    pub fn missing() -> Self {
        DocResponse {
            found: false,
            source: None,
        }
    }

    /// Parse a fetch response body
    pub fn from_body(body: &Value) -> Result<Self, StoreError> {
        let found = body
            .get("found")
            .and_then(Value::as_bool)
            .ok_or_else(|| StoreError::InvalidResponse {
                message: "fetch response has no found flag".to_string(),
            })?;

        Ok(DocResponse {
            found,
            source: body.get("_source").cloned(),
        })
    }
}

/// Store-reported outcome of an index write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A new document was created
    Created,
    /// An existing document was overwritten
    Updated,
    /// Any other store-reported result
    Other(String),
}

impl WriteOutcome {
    /// Parse a write response body
    pub fn from_body(body: &Value) -> Result<Self, StoreError> {
        match result_field(body)? {
            "created" => Ok(WriteOutcome::Created),
            "updated" => Ok(WriteOutcome::Updated),
            other => Ok(WriteOutcome::Other(other.to_string())),
        }
    }
}

/// Store-reported outcome of a delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The document was removed
    Deleted,
    /// No document existed under the id
    NotFound,
    /// Any other store-reported result
    Other(String),
}

impl DeleteOutcome {
    /// Parse a delete response body
    pub fn from_body(body: &Value) -> Result<Self, StoreError> {
        match result_field(body)? {
            "deleted" => Ok(DeleteOutcome::Deleted),
            "not_found" => Ok(DeleteOutcome::NotFound),
            other => Ok(DeleteOutcome::Other(other.to_string())),
        }
    }
}

fn result_field(body: &Value) -> Result<&str, StoreError> {
    body.get("result")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::InvalidResponse {
            message: "write response has no result field".to_string(),
        })
}

// ==================== Tests ====================
