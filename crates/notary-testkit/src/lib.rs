//! # Notary Testkit
//!
//! Testing utilities for the document notary.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed block inputs with their canonical bytes and fingerprints
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Deterministic clocks and ready-made ledgers
//!
//! ## Golden Vectors
//!
//! ```rust
//! use notary_testkit::vectors::{all_vectors, generate_block_from_vector};
//!
//! for vector in all_vectors() {
//!     let block = generate_block_from_vector(&vector);
//!     println!("{}: {}", vector.name, block.fingerprint());
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use notary_testkit::generators::{block_from_params, BlockParams};
//!
//! proptest! {
//!     #[test]
//!     fn fingerprint_is_deterministic(params: BlockParams) {
//!         let b1 = block_from_params(&params);
//!         let b2 = block_from_params(&params);
//!         prop_assert_eq!(b1.fingerprint(), b2.fingerprint());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use notary_testkit::fixtures::{TestFixture, SAMPLE_DOCUMENTS};
//!
//! let fixture = TestFixture::new(1);
//! let block = fixture.seal_documents(SAMPLE_DOCUMENTS);
//! assert_eq!(block.index(), 1);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{
    sample_fs_notary, sample_notary, SteppingClock, TestFixture, SAMPLE_DOCUMENTS,
};
pub use generators::{block_from_params, BlockParams};
pub use vectors::{
    all_vectors, generate_block_from_vector, verify_all_vectors, verify_vector, GoldenVector,
};
