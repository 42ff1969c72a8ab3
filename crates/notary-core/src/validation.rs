//! Chain validation: recompute every fingerprint and check linkage and work.

use tracing::warn;

use crate::block::{Block, PreviousLink};
use crate::error::ChainError;

/// Validate a single non-genesis block against its predecessor.
///
/// Checks, in order: position, link to `prev`, fingerprint consistency,
/// and work admission.
pub fn validate_block(block: &Block, prev: &Block, difficulty: u32) -> Result<(), ChainError> {
    let expected = prev.index() + 1;
    if block.index() != expected {
        return Err(ChainError::IndexMismatch {
            expected,
            found: block.index(),
        });
    }

    if !block.previous_link().points_to(&prev.fingerprint()) {
        return Err(ChainError::BrokenLink {
            index: block.index(),
        });
    }

    if !block.is_consistent() {
        return Err(ChainError::FingerprintMismatch {
            index: block.index(),
        });
    }

    if !block.fingerprint().meets_difficulty(difficulty) {
        return Err(ChainError::InsufficientWork {
            index: block.index(),
            required: difficulty,
            found: block.fingerprint().leading_zero_nibbles(),
        });
    }

    Ok(())
}

fn validate_genesis(genesis: &Block) -> Result<(), ChainError> {
    if genesis.index() != 0 {
        return Err(ChainError::IndexMismatch {
            expected: 0,
            found: genesis.index(),
        });
    }
    if *genesis.previous_link() != PreviousLink::Genesis {
        return Err(ChainError::InvalidGenesis(
            "previous link is not the sentinel".into(),
        ));
    }
    if !genesis.payload().is_empty() {
        return Err(ChainError::InvalidGenesis("payload is not empty".into()));
    }
    if !genesis.is_consistent() {
        return Err(ChainError::FingerprintMismatch { index: 0 });
    }
    Ok(())
}

/// Validate a whole chain.
///
/// Genesis must be well-formed and self-consistent but is exempt from the
/// work requirement; every later block goes through [`validate_block`].
pub fn validate_chain(blocks: &[Block], difficulty: u32) -> Result<(), ChainError> {
    let result = check_chain(blocks, difficulty);
    if let Err(e) = &result {
        warn!(error = %e, length = blocks.len(), "chain validation failed");
    }
    result
}

fn check_chain(blocks: &[Block], difficulty: u32) -> Result<(), ChainError> {
    let genesis = blocks.first().ok_or(ChainError::EmptyChain)?;
    validate_genesis(genesis)?;

    for pair in blocks.windows(2) {
        validate_block(&pair[1], &pair[0], difficulty)?;
    }

    Ok(())
}
