//! Error types for the Notary.

use notary_core::{ChainError, MineError};
use thiserror::Error;

use crate::source::SourceError;

/// Errors that can occur during Notary operations.
///
/// An empty seal and a verification miss are not errors; they come back as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum NotaryError {
    /// The document source could not produce the document.
    #[error("document source error: {0}")]
    Source(#[from] SourceError),

    /// Mining stopped before a nonce was found.
    #[error("mining error: {0}")]
    Mining(#[from] MineError),

    /// The chain failed self-validation.
    #[error("chain validation error: {0}")]
    Chain(#[from] ChainError),

    /// The blocking mining task panicked or was aborted.
    #[error("mining task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for Notary operations.
pub type Result<T> = std::result::Result<T, NotaryError>;
