//! Read-only snapshots of blocks for presentation layers.

use std::collections::BTreeMap;

use notary_core::{Block, Fingerprint, Timestamp};
use serde::{Deserialize, Serialize};

/// A display-ready copy of a block, with digests rendered as hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockView {
    pub index: u64,
    pub timestamp: Timestamp,
    /// Block fingerprint (hex).
    pub fingerprint: String,
    /// Predecessor fingerprint (hex), `"0"` for genesis.
    pub previous_link: String,
    /// Document identifier -> document digest (hex), ordered by identifier.
    pub payload: BTreeMap<String, String>,
    pub nonce: u64,
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        Self {
            index: block.index(),
            timestamp: block.timestamp(),
            fingerprint: block.fingerprint().to_hex(),
            previous_link: block.previous_link().to_hex(),
            payload: block
                .payload()
                .iter()
                .map(|(id, digest)| (id.clone(), digest.to_hex()))
                .collect(),
            nonce: block.nonce(),
        }
    }
}

/// What a successful seal produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedBlockSummary {
    pub index: u64,
    pub timestamp: Timestamp,
    pub fingerprint: Fingerprint,
    pub nonce: u64,
    pub document_count: usize,
}

impl From<&Block> for SealedBlockSummary {
    fn from(block: &Block) -> Self {
        Self {
            index: block.index(),
            timestamp: block.timestamp(),
            fingerprint: block.fingerprint(),
            nonce: block.nonce(),
            document_count: block.payload().len(),
        }
    }
}
