//! Error types for txsearch-client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Transport error")]
    Transport(#[from] reqwest::Error),

    #[error("Store returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Unintelligible store response: {message}")]
    InvalidResponse { message: String },
}

/// Result type with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
