//! Error types for txsearch-core
//!
//! Every operation surfaces a typed error wrapping the underlying cause;
//! the core never recovers locally and performs no retries.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use txsearch_client::StoreError;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unrecognized document shape
    DecodeError,
    /// DSL fragment is not valid JSON
    MalformedQuery,
    /// Search execution failed
    SearchFailed,
    /// Point lookup failed
    GetFailed,
    /// Create failed
    CreateFailed,
    /// Update failed
    UpdateFailed,
    /// Delete failed
    DeleteFailed,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::DecodeError => write!(f, "DECODE_ERROR"),
            ErrorCode::MalformedQuery => write!(f, "MALFORMED_QUERY"),
            ErrorCode::SearchFailed => write!(f, "SEARCH_FAILED"),
            ErrorCode::GetFailed => write!(f, "GET_FAILED"),
            ErrorCode::CreateFailed => write!(f, "CREATE_FAILED"),
            ErrorCode::UpdateFailed => write!(f, "UPDATE_FAILED"),
            ErrorCode::DeleteFailed => write!(f, "DELETE_FAILED"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Warning - the request was rejected before reaching the store
    Warning,
    /// Error - the operation failed
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for txsearch-core
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Cannot decode document: {reason}")]
    Decode { reason: String },

    #[error("Malformed query fragment: {message}")]
    MalformedQuery { message: String },

    #[error("Failed to execute search")]
    Search {
        #[source]
        source: StoreError,
    },

    #[error("Failed to retrieve transaction {id}")]
    Get {
        id: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to create transaction")]
    Create {
        #[source]
        source: StoreError,
    },

    #[error("Failed to update transaction {id}")]
    Update {
        id: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to delete transaction {id}")]
    Delete {
        id: String,
        #[source]
        source: StoreError,
    },
}

impl TransactionError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            TransactionError::Decode { .. } => ErrorCode::DecodeError,
            TransactionError::MalformedQuery { .. } => ErrorCode::MalformedQuery,
            TransactionError::Search { .. } => ErrorCode::SearchFailed,
            TransactionError::Get { .. } => ErrorCode::GetFailed,
            TransactionError::Create { .. } => ErrorCode::CreateFailed,
            TransactionError::Update { .. } => ErrorCode::UpdateFailed,
            TransactionError::Delete { .. } => ErrorCode::DeleteFailed,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TransactionError::MalformedQuery { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Result type with TransactionError
pub type TransactionResult<T> = Result<T, TransactionError>;

// ==================== Tests ====================
