//! # Notary Core
//!
//! Pure primitives for the document notary: digests, blocks, proof-of-work,
//! and canonicalization.
//!
//! This crate contains no I/O, no shared state, no networking. It is pure
//! computation over hash-linked records.
//!
//! ## Key Types
//!
//! - [`Block`] - One record in the ledger, carrying a batch of document commitments
//! - [`Fingerprint`] - Blake3 digest of a block's full field set
//! - [`DocumentDigest`] - Blake3 digest of a document's raw bytes
//! - [`Miner`] - Proof-of-work nonce search
//! - [`Clock`] - Injectable time source
//!
//! ## Canonicalization
//!
//! Blocks are hashed over deterministic CBOR. See the [`canonical`] module.

pub mod block;
pub mod canonical;
pub mod clock;
pub mod error;
pub mod miner;
pub mod types;
pub mod validation;

pub use block::{Block, Payload, PreviousLink, GENESIS_PREVIOUS_LINK};
pub use canonical::{canonical_block_bytes, fingerprint_of};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ChainError, CoreError, MineError};
pub use miner::{CancelToken, Miner};
pub use types::{DocumentDigest, Fingerprint, Timestamp};
pub use validation::{validate_block, validate_chain};
