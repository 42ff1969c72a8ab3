//! # Notary Ledger
//!
//! The stateful half of the document notary: an in-memory, append-only chain
//! of mined blocks and the registry that stages documents for the next block.
//!
//! ## Key Types
//!
//! - [`Ledger`] - Owns the chain; seals, verifies, validates
//! - [`PendingRegistry`] - Identifier -> digest staging area
//! - [`BlockView`] - Display-ready block snapshot
//! - [`SealedBlockSummary`] - What a seal produced
//!
//! ## Usage
//!
//! ```rust
//! use notary_core::DocumentDigest;
//! use notary_ledger::{Ledger, PendingRegistry};
//!
//! let ledger = Ledger::new(2);
//! let registry = PendingRegistry::new();
//!
//! let digest = DocumentDigest::of_bytes(b"signed contract");
//! registry.add("contract.txt", digest);
//!
//! let block = ledger.seal_pending(&registry).unwrap();
//! assert_eq!(ledger.verify("contract.txt", &digest), Some(block.timestamp()));
//! ```
//!
//! ## Design Notes
//!
//! - **Last write wins**: staging an identifier twice keeps only the later digest
//! - **Empty seals are no-ops**: nothing is mined for an empty registry
//! - **Earliest match wins**: verification reports the first block that sealed the pair
//! - **No persistence**: the chain lives only as long as the `Ledger`

pub mod ledger;
pub mod registry;
pub mod view;

pub use ledger::Ledger;
pub use registry::PendingRegistry;
pub use view::{BlockView, SealedBlockSummary};
