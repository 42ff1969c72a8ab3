//! Error types for the Notary Core.

use thiserror::Error;

/// Errors from parsing or constructing core values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid digest length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Errors from the proof-of-work search.
///
/// The search itself cannot fail; it only stops early when asked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MineError {
    #[error("mining cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },
}

/// Chain validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("chain has no genesis block")]
    EmptyChain,

    #[error("invalid genesis block: {0}")]
    InvalidGenesis(String),

    #[error("index mismatch: expected {expected}, found {found}")]
    IndexMismatch { expected: u64, found: u64 },

    #[error("broken link at index {index}: previous link does not match predecessor")]
    BrokenLink { index: u64 },

    #[error("fingerprint mismatch at index {index}: stored value differs from recomputed")]
    FingerprintMismatch { index: u64 },

    #[error("insufficient work at index {index}: need {required} leading zeros, found {found}")]
    InsufficientWork {
        index: u64,
        required: u32,
        found: u32,
    },
}
