//! # Notary
//!
//! The unified API for the document notary: prove that a document with given
//! contents existed at a point in time by committing its digest into a
//! proof-of-work, hash-linked chain.
//!
//! ## Overview
//!
//! - **Add**: read a document, digest it, stage it for the next block
//! - **Seal**: mine every staged document into one new block
//! - **Verify**: find the earliest block holding a document's current digest
//!
//! ## Usage
//!
//! ```rust,no_run
//! use notary::{FsDocumentSource, Notary, NotaryConfig};
//!
//! async fn example() -> notary::Result<()> {
//!     let source = FsDocumentSource::new("/srv/documents");
//!     let notary = Notary::new(source, NotaryConfig::default());
//!
//!     notary.add_document("contracts/lease.txt").await?;
//!     if let Some(sealed) = notary.seal_pending().await? {
//!         println!("sealed block {} ({})", sealed.index, sealed.fingerprint);
//!     }
//!
//!     match notary.verify_document("contracts/lease.txt").await? {
//!         Some(at) => println!("sealed at {at}"),
//!         None => println!("not found or modified"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `notary::core` - Pure primitives (Block, Fingerprint, Miner, ...)
//! - `notary::ledger` - The chain and the pending registry

pub mod error;
pub mod notary;
pub mod source;

pub use error::{NotaryError, Result};
pub use notary::{Notary, NotaryConfig, DEFAULT_DIFFICULTY};
pub use source::{DocumentSource, FsDocumentSource, MemoryDocumentSource, SourceError};

// Re-export component crates
pub use notary_core as core;
pub use notary_ledger as ledger;

// Re-export commonly used types
pub use notary_core::{Block, DocumentDigest, Fingerprint, Timestamp};
pub use notary_ledger::{BlockView, SealedBlockSummary};
