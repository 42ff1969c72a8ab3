//! Canonical CBOR encoding for block fingerprints.
//!
//! This module implements RFC 8949 Core Deterministic Encoding for blocks:
//! - Integer map keys, emitted in ascending order
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats (timestamps are i64 milliseconds)
//!
//! The payload is encoded as an array of `[identifier, digest]` pairs in
//! lexicographic identifier order rather than as a CBOR map, so the order is
//! plain string order independent of how identifiers encode. Whatever order
//! documents were staged in, the same payload yields identical bytes.
//!
//! The nonce is the last field. Everything before it is the block's
//! "prefix"; the miner hashes the prefix once and only feeds nonce bytes per
//! attempt (see [`FingerprintHasher`]).

use ciborium::value::Value;

use crate::block::{Block, Payload, PreviousLink, GENESIS_PREVIOUS_LINK};
use crate::types::{Fingerprint, Timestamp};

/// Domain tag prepended to the canonical bytes before hashing.
pub const FINGERPRINT_DOMAIN: &[u8] = b"notary-block-v0:";

/// Block field keys (integer keys for compact encoding).
///
/// Keys 0-23 encode as single bytes in CBOR, so ascending key order is also
/// ascending encoded-byte order.
mod keys {
    pub const INDEX: u64 = 0;
    pub const TIMESTAMP: u64 = 1;
    pub const PAYLOAD: u64 = 2;
    pub const PREVIOUS_LINK: u64 = 3;
    pub const NONCE: u64 = 4;

    pub const FIELD_COUNT: u64 = 5;
}

/// Encode a block to canonical CBOR bytes.
pub fn canonical_block_bytes(block: &Block) -> Vec<u8> {
    let mut buf = canonical_prefix(
        block.index(),
        block.timestamp(),
        block.payload(),
        block.previous_link(),
    );
    encode_uint(&mut buf, 0, block.nonce());
    buf
}

/// Compute the fingerprint of a block from its current fields.
pub fn fingerprint_of(block: &Block) -> Fingerprint {
    FingerprintHasher::for_block(block).fingerprint(block.nonce())
}

/// Encode every field except the nonce value, ending with the nonce key.
fn canonical_prefix(
    index: u64,
    timestamp: Timestamp,
    payload: &Payload,
    previous_link: &PreviousLink,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64 + payload.len() * 80);

    encode_uint(&mut buf, 5, keys::FIELD_COUNT);

    // 0: index
    encode_uint(&mut buf, 0, keys::INDEX);
    encode_value_to(&mut buf, &Value::Integer(index.into()));

    // 1: timestamp
    encode_uint(&mut buf, 0, keys::TIMESTAMP);
    encode_value_to(&mut buf, &Value::Integer(timestamp.as_millis().into()));

    // 2: payload
    encode_uint(&mut buf, 0, keys::PAYLOAD);
    encode_value_to(&mut buf, &payload_to_cbor_value(payload));

    // 3: previous_link (sentinel text for genesis, bytes otherwise)
    encode_uint(&mut buf, 0, keys::PREVIOUS_LINK);
    encode_value_to(&mut buf, &previous_link_to_cbor_value(previous_link));

    // 4: nonce key; the value is appended by the caller
    encode_uint(&mut buf, 0, keys::NONCE);

    buf
}

/// Convert a payload to an array of `[identifier, digest]` pairs.
fn payload_to_cbor_value(payload: &Payload) -> Value {
    // BTreeMap iteration is already lexicographic by identifier.
    let pairs = payload
        .iter()
        .map(|(id, digest)| {
            Value::Array(vec![
                Value::Text(id.clone()),
                Value::Bytes(digest.0.to_vec()),
            ])
        })
        .collect();
    Value::Array(pairs)
}

fn previous_link_to_cbor_value(link: &PreviousLink) -> Value {
    match link {
        PreviousLink::Genesis => Value::Text(GENESIS_PREVIOUS_LINK.to_string()),
        PreviousLink::Block(fp) => Value::Bytes(fp.0.to_vec()),
    }
}

/// Incremental fingerprint computation for a fixed block prefix.
///
/// Holds a Blake3 state that has absorbed the domain tag and every field up
/// to the nonce key. Each call clones that state and finishes it with one
/// nonce, which is what the miner does per attempt.
#[derive(Clone)]
pub struct FingerprintHasher {
    prefix_state: blake3::Hasher,
}

impl FingerprintHasher {
    /// Prepare a hasher for the block's non-nonce fields.
    pub fn for_block(block: &Block) -> Self {
        let prefix = canonical_prefix(
            block.index(),
            block.timestamp(),
            block.payload(),
            block.previous_link(),
        );
        let mut prefix_state = blake3::Hasher::new();
        prefix_state.update(FINGERPRINT_DOMAIN);
        prefix_state.update(&prefix);
        Self { prefix_state }
    }

    /// Fingerprint of the prepared block with the given nonce.
    pub fn fingerprint(&self, nonce: u64) -> Fingerprint {
        let mut nonce_buf = Vec::with_capacity(9);
        encode_uint(&mut nonce_buf, 0, nonce);

        let mut state = self.prefix_state.clone();
        state.update(&nonce_buf);
        Fingerprint(*state.finalize().as_bytes())
    }
}

/// Recursively encode a CBOR value.
///
/// Only the value kinds built by this module are accepted.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr),
        _ => unreachable!("block encoding only builds integers, bytes, text and arrays"),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        // Major type 0: unsigned integer
        encode_uint(buf, 0, n as u64);
    } else {
        // Major type 1: CBOR encodes -1 as 0, -2 as 1, etc.
        let abs = (-1 - n) as u64;
        encode_uint(buf, 1, abs);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a byte string (major type 2).
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode an array (major type 4).
fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item);
    }
}
