//! Block: one record in the ledger.
//!
//! A block carries a batch of document commitments and links to its
//! predecessor by fingerprint. Its own fingerprint always reflects its
//! current fields: the only mutable field, the nonce, can only be changed
//! together with a fingerprint recomputation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::canonical::fingerprint_of;
use crate::clock::Clock;
use crate::types::{DocumentDigest, Fingerprint, Timestamp};

/// Document identifier -> document digest, ordered by identifier.
pub type Payload = BTreeMap<String, DocumentDigest>;

/// Reserved previous-link rendering of the genesis block.
pub const GENESIS_PREVIOUS_LINK: &str = "0";

/// Link from a block to its chain predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreviousLink {
    /// The genesis block has no predecessor.
    Genesis,
    /// Fingerprint of the preceding block.
    Block(Fingerprint),
}

impl PreviousLink {
    /// Hex rendering, or the `"0"` sentinel for genesis.
    pub fn to_hex(&self) -> String {
        match self {
            Self::Genesis => GENESIS_PREVIOUS_LINK.to_string(),
            Self::Block(fp) => fp.to_hex(),
        }
    }

    /// Whether this link points at the given fingerprint.
    pub fn points_to(&self, fingerprint: &Fingerprint) -> bool {
        matches!(self, Self::Block(fp) if fp == fingerprint)
    }
}

/// A block of document commitments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    index: u64,
    timestamp: Timestamp,
    payload: Payload,
    previous_link: PreviousLink,
    nonce: u64,
    fingerprint: Fingerprint,
}

impl Block {
    /// Build an unmined block: reads the clock once, nonce 0.
    pub fn new(
        index: u64,
        payload: Payload,
        previous_link: PreviousLink,
        clock: &dyn Clock,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp: clock.now(),
            payload,
            previous_link,
            nonce: 0,
            fingerprint: Fingerprint([0u8; 32]),
        };
        block.recompute_fingerprint();
        block
    }

    /// The genesis block: index 0, empty payload, sentinel link. Never mined.
    pub fn genesis(clock: &dyn Clock) -> Self {
        Self::new(0, Payload::new(), PreviousLink::Genesis, clock)
    }

    /// Rehydrate a block with a stored fingerprint.
    ///
    /// The fingerprint is taken as given; use
    /// [`validate_chain`](crate::validation::validate_chain) before trusting it.
    pub fn from_parts(
        index: u64,
        timestamp: Timestamp,
        payload: Payload,
        previous_link: PreviousLink,
        nonce: u64,
        fingerprint: Fingerprint,
    ) -> Self {
        Self {
            index,
            timestamp,
            payload,
            previous_link,
            nonce,
            fingerprint,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn previous_link(&self) -> &PreviousLink {
        &self.previous_link
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// The stored fingerprint.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_link == PreviousLink::Genesis
    }

    /// Recompute the fingerprint from the current fields.
    pub fn compute_fingerprint(&self) -> Fingerprint {
        fingerprint_of(self)
    }

    /// Whether the stored fingerprint matches the current fields.
    pub fn is_consistent(&self) -> bool {
        self.compute_fingerprint() == self.fingerprint
    }

    /// Look up the digest recorded for a document identifier.
    pub fn digest_of(&self, identifier: &str) -> Option<&DocumentDigest> {
        self.payload.get(identifier)
    }

    /// Whether this block records exactly `digest` under `identifier`.
    pub fn contains(&self, identifier: &str, digest: &DocumentDigest) -> bool {
        self.digest_of(identifier) == Some(digest)
    }

    pub(crate) fn recompute_fingerprint(&mut self) {
        self.fingerprint = fingerprint_of(self);
    }

    /// Set the nonce and recompute the fingerprint.
    #[cfg(test)]
    pub(crate) fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
        self.recompute_fingerprint();
    }

    /// Set a nonce whose fingerprint the miner already computed.
    pub(crate) fn seal_with(&mut self, nonce: u64, fingerprint: Fingerprint) {
        self.nonce = nonce;
        self.fingerprint = fingerprint;
        debug_assert!(self.is_consistent());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn payload(entries: &[(&str, &[u8])]) -> Payload {
        entries
            .iter()
            .map(|(id, body)| (id.to_string(), DocumentDigest::of_bytes(body)))
            .collect()
    }

    #[test]
    fn test_new_block_reads_clock_and_starts_at_nonce_zero() {
        let clock = FixedClock::at_millis(1_736_870_400_000);
        let block = Block::new(
            1,
            payload(&[("a.txt", b"hello")]),
            PreviousLink::Block(Fingerprint([0xaa; 32])),
            &clock,
        );

        assert_eq!(block.index(), 1);
        assert_eq!(block.timestamp(), Timestamp(1_736_870_400_000));
        assert_eq!(block.nonce(), 0);
        assert!(block.is_consistent());
    }

    #[test]
    fn test_genesis_shape() {
        let genesis = Block::genesis(&FixedClock::at_millis(5));
        assert!(genesis.is_genesis());
        assert!(genesis.payload().is_empty());
        assert_eq!(genesis.previous_link().to_hex(), "0");
        assert!(genesis.is_consistent());
    }

    #[test]
    fn test_nonce_change_recomputes_fingerprint() {
        let mut block = Block::genesis(&FixedClock::at_millis(5));
        let before = block.fingerprint();

        block.set_nonce(1);
        assert_ne!(block.fingerprint(), before);
        assert!(block.is_consistent());

        block.set_nonce(0);
        assert_eq!(block.fingerprint(), before);
    }

    #[test]
    fn test_every_field_feeds_the_fingerprint() {
        let clock = FixedClock::at_millis(100);
        let link = PreviousLink::Block(Fingerprint([0x01; 32]));
        let base = Block::new(1, payload(&[("a", b"1")]), link, &clock);

        let other_index = Block::new(2, payload(&[("a", b"1")]), link, &clock);
        let other_time = Block::new(1, payload(&[("a", b"1")]), link, &FixedClock::at_millis(101));
        let other_payload = Block::new(1, payload(&[("a", b"2")]), link, &clock);
        let other_link = Block::new(
            1,
            payload(&[("a", b"1")]),
            PreviousLink::Block(Fingerprint([0x02; 32])),
            &clock,
        );

        for other in [&other_index, &other_time, &other_payload, &other_link] {
            assert_ne!(base.fingerprint(), other.fingerprint());
        }
    }

    #[test]
    fn test_from_parts_keeps_stored_fingerprint() {
        let block = Block::from_parts(
            1,
            Timestamp(7),
            Payload::new(),
            PreviousLink::Genesis,
            0,
            Fingerprint([0xff; 32]),
        );
        assert_eq!(block.fingerprint(), Fingerprint([0xff; 32]));
        assert!(!block.is_consistent());
    }

    #[test]
    fn test_contains_requires_exact_pair() {
        let block = Block::new(
            1,
            payload(&[("a.txt", b"v1")]),
            PreviousLink::Genesis,
            &FixedClock::at_millis(0),
        );
        assert!(block.contains("a.txt", &DocumentDigest::of_bytes(b"v1")));
        assert!(!block.contains("a.txt", &DocumentDigest::of_bytes(b"v2")));
        assert!(!block.contains("b.txt", &DocumentDigest::of_bytes(b"v1")));
    }

    #[test]
    fn test_previous_link_points_to() {
        let fp = Fingerprint([0x33; 32]);
        assert!(PreviousLink::Block(fp).points_to(&fp));
        assert!(!PreviousLink::Genesis.points_to(&fp));
    }
}
