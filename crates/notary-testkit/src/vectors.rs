//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the block encoding: any implementation must derive the
//! same canonical bytes and fingerprint from the same fields.

use notary_core::{
    canonical_block_bytes, Block, DocumentDigest, Fingerprint, Payload, PreviousLink, Timestamp,
};
use serde::Serialize;

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Block index.
    pub index: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Documents as (identifier, raw contents); digested on generation.
    pub documents: &'static [(&'static str, &'static [u8])],
    /// Predecessor fingerprint, or `None` for the genesis sentinel.
    pub previous_link: Option<[u8; 32]>,
    /// Nonce.
    pub nonce: u64,
    /// Expected canonical CBOR encoding (hex).
    pub expected_canonical_bytes: &'static str,
    /// Expected fingerprint (hex).
    pub expected_fingerprint: &'static str,
}

/// Derived outputs of a vector, in a form that can be published as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct VectorOutput {
    pub name: String,
    pub canonical_bytes: String,
    pub fingerprint: String,
}

const TWO_DOCUMENTS: &[(&str, &[u8])] = &[
    ("umowa.txt", "contract".as_bytes()),
    ("dyplom.pdf", "diploma".as_bytes()),
];

const EMPTY_NESTED_DOCUMENT: &[(&str, &[u8])] = &[("a/b/c.txt", "".as_bytes())];

const UNSORTED_DOCUMENTS: &[(&str, &[u8])] = &[
    ("z", "z".as_bytes()),
    ("a", "a".as_bytes()),
    ("m", "m".as_bytes()),
];

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "Genesis block with empty payload",
            index: 0,
            timestamp: 1736870400000, // 2025-01-14T16:00:00Z
            documents: &[],
            previous_link: None,
            nonce: 0,
            expected_canonical_bytes: "a50000011b00000194658b100002800361300400",
            expected_fingerprint: "ad65b861048a95fb9b0a89016c334da656f256f3d058ebcf48e20ddac6372361",
        },
        GoldenVector {
            name: "Two documents, unmined",
            index: 1,
            timestamp: 1736870401000,
            documents: TWO_DOCUMENTS,
            previous_link: Some([0xAA; 32]),
            nonce: 0,
            expected_canonical_bytes: "a50001011b00000194658b13e80282826a6479706c6f6d2e70646658204eef1b530d45b1d584e6ee5c7a09c3720bebf66c9d5e85d8f2e5c7e600b5a7cb8269756d6f77612e747874582074d81b36a230742f81a9b968f0a80636c87a9dacabfe5a0a1f868eeca86b8aef035820aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa0400",
            expected_fingerprint: "2586c45221d166224ff9cc688f69842fc622ef3e8e7db1876a56ba2f87c3b903",
        },
        GoldenVector {
            name: "Single document with large nonce",
            index: 2,
            timestamp: 1736870402000,
            documents: EMPTY_NESTED_DOCUMENT,
            previous_link: Some([0x00; 32]),
            nonce: u64::MAX,
            expected_canonical_bytes: "a50002011b00000194658b17d002818269612f622f632e7478745820af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f32620358200000000000000000000000000000000000000000000000000000000000000000041bffffffffffffffff",
            expected_fingerprint: "4962214a4d970ed03f3682420ae1236caf0393e81458e9deef8ee63437b803d9",
        },
        GoldenVector {
            name: "Negative timestamp",
            index: 7,
            timestamp: -1,
            documents: UNSORTED_DOCUMENTS,
            previous_link: Some([0x42; 32]),
            nonce: 24,
            expected_canonical_bytes: "a5000701200283826161582017762fddd969a453925d65717ac3eea21320b66b54342fde15128d6caf21215f82616d582083d9dab06011479163c7c4d5fa735f911bac86729f56aaa115b7eed2eb66e02282617a58201104908ab930e671002c7cd7f3fc921570b1bf64ecfa12fe363585c630eaca6b0358204242424242424242424242424242424242424242424242424242424242424242041818",
            expected_fingerprint: "adf1cc442a399b70511b2b87af0477358b1564fb6e92110a892056ca2ed7afb6",
        },
    ]
}

/// Build the payload a vector describes.
pub fn vector_payload(vector: &GoldenVector) -> Payload {
    vector
        .documents
        .iter()
        .map(|(identifier, contents)| (identifier.to_string(), DocumentDigest::of_bytes(contents)))
        .collect()
}

/// Generate a block from a golden vector, with its fingerprint filled in.
pub fn generate_block_from_vector(vector: &GoldenVector) -> Block {
    let previous_link = match vector.previous_link {
        Some(bytes) => PreviousLink::Block(Fingerprint::from_bytes(bytes)),
        None => PreviousLink::Genesis,
    };
    let unsealed = Block::from_parts(
        vector.index,
        Timestamp(vector.timestamp),
        vector_payload(vector),
        previous_link,
        vector.nonce,
        Fingerprint([0u8; 32]),
    );
    let fingerprint = unsealed.compute_fingerprint();
    Block::from_parts(
        vector.index,
        Timestamp(vector.timestamp),
        vector_payload(vector),
        previous_link,
        vector.nonce,
        fingerprint,
    )
}

/// Compute the published outputs for a vector.
pub fn vector_output(vector: &GoldenVector) -> VectorOutput {
    let block = generate_block_from_vector(vector);
    VectorOutput {
        name: vector.name.to_string(),
        canonical_bytes: hex::encode(canonical_block_bytes(&block)),
        fingerprint: block.fingerprint().to_hex(),
    }
}

/// Whether a vector reproduces its expected encoding and fingerprint.
///
/// A vector whose expectations are missing never matches.
pub fn verify_vector(vector: &GoldenVector) -> bool {
    let output = vector_output(vector);
    !vector.expected_fingerprint.is_empty()
        && !vector.expected_canonical_bytes.is_empty()
        && output.fingerprint == vector.expected_fingerprint
        && output.canonical_bytes == vector.expected_canonical_bytes
}

/// Verify all golden vectors, returning `(name, matches, fingerprint_hex)`.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let hex = generate_block_from_vector(v).fingerprint().to_hex();
            (v.name.to_string(), verify_vector(v), hex)
        })
        .collect()
}

/// All vector outputs as pretty JSON.
pub fn vectors_json() -> serde_json::Result<String> {
    let outputs: Vec<VectorOutput> = all_vectors().iter().map(vector_output).collect();
    serde_json::to_string_pretty(&outputs)
}
