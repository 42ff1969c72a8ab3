//! Proptest generators for property-based testing.

use proptest::prelude::*;

use notary_core::{Block, DocumentDigest, Fingerprint, Payload, PreviousLink, Timestamp};

/// Generate a document identifier shaped like a relative path.
pub fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,15}(/[a-z0-9_-]{1,12}){0,2}(\\.[a-z]{1,4})?".prop_map(String::from)
}

/// Generate a random DocumentDigest.
pub fn document_digest() -> impl Strategy<Value = DocumentDigest> {
    any::<[u8; 32]>().prop_map(DocumentDigest)
}

/// Generate a random Fingerprint.
pub fn fingerprint() -> impl Strategy<Value = Fingerprint> {
    any::<[u8; 32]>().prop_map(Fingerprint::from_bytes)
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    (0i64..=i64::MAX / 2).prop_map(Timestamp)
}

/// Generate a payload with at most `max_len` documents.
pub fn payload(max_len: usize) -> impl Strategy<Value = Payload> {
    prop::collection::btree_map(identifier(), document_digest(), 0..=max_len)
}

/// Generate either the genesis sentinel or a link to some fingerprint.
pub fn previous_link() -> impl Strategy<Value = PreviousLink> {
    prop_oneof![
        1 => Just(PreviousLink::Genesis),
        4 => fingerprint().prop_map(PreviousLink::Block),
    ]
}

/// Parameters for generating a block.
#[derive(Debug, Clone)]
pub struct BlockParams {
    pub index: u64,
    pub timestamp: Timestamp,
    pub payload: Payload,
    pub previous_link: PreviousLink,
    pub nonce: u64,
}

impl Arbitrary for BlockParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            0u64..=1_000_000u64, // index
            timestamp(),
            payload(8),
            previous_link(),
            any::<u64>(), // nonce
        )
            .prop_map(|(index, timestamp, payload, previous_link, nonce)| BlockParams {
                index,
                timestamp,
                payload,
                previous_link,
                nonce,
            })
            .boxed()
    }
}

/// Build a block from parameters, with its fingerprint filled in.
pub fn block_from_params(params: &BlockParams) -> Block {
    let unsealed = Block::from_parts(
        params.index,
        params.timestamp,
        params.payload.clone(),
        params.previous_link,
        params.nonce,
        Fingerprint([0u8; 32]),
    );
    let fingerprint = unsealed.compute_fingerprint();
    Block::from_parts(
        params.index,
        params.timestamp,
        params.payload.clone(),
        params.previous_link,
        params.nonce,
        fingerprint,
    )
}

/// Staging batches for a ledger run: each inner vec is sealed as one block.
pub fn seal_batches(max_batches: usize) -> impl Strategy<Value = Vec<Vec<(String, DocumentDigest)>>> {
    prop::collection::vec(
        prop::collection::vec((identifier(), document_digest()), 0..=4),
        1..=max_batches,
    )
}
