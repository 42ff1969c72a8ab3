//! The ledger: an append-only chain of mined blocks.
//!
//! The ledger owns the block sequence, creates genesis, turns the pending
//! registry into mined blocks, and answers verification queries.
//!
//! # Concurrency
//!
//! - A seal mutex serializes `seal_pending` end to end (snapshot, mine,
//!   append), so two seals can never build on the same tip.
//! - The block vector sits behind an `RwLock` that is only write-locked for
//!   the final `push`. Mining runs without it, so readers proceed while a
//!   seal is in progress and see either the old chain or the new one.

use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard};

use notary_core::{
    validate_chain, Block, CancelToken, ChainError, Clock, DocumentDigest, MineError, Miner,
    PreviousLink, SystemClock, Timestamp,
};
use tracing::{info, warn};

use crate::registry::PendingRegistry;
use crate::view::BlockView;

/// The chain manager.
pub struct Ledger<C: Clock = SystemClock> {
    miner: Miner,
    clock: C,
    blocks: RwLock<Vec<Block>>,
    seal_lock: Mutex<()>,
}

impl Ledger<SystemClock> {
    /// Create a ledger on the wall clock with a single-threaded miner.
    pub fn new(difficulty: u32) -> Self {
        Self::with_clock(difficulty, SystemClock)
    }
}

impl<C: Clock> Ledger<C> {
    /// Create a ledger reading timestamps from `clock`.
    pub fn with_clock(difficulty: u32, clock: C) -> Self {
        Self::with_miner(Miner::new(difficulty), clock)
    }

    /// Create a ledger with a configured miner.
    ///
    /// The genesis block is stamped from `clock` and never mined.
    pub fn with_miner(miner: Miner, clock: C) -> Self {
        let genesis = Block::genesis(&clock);
        info!(fingerprint = %genesis.fingerprint(), difficulty = miner.difficulty(), "ledger created");
        Self {
            miner,
            clock,
            blocks: RwLock::new(vec![genesis]),
            seal_lock: Mutex::new(()),
        }
    }

    // Blocks are only ever pushed whole, so a poisoned lock still guards a
    // valid chain.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Block>> {
        self.blocks.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Leading zero hex characters required of every mined block.
    pub fn difficulty(&self) -> u32 {
        self.miner.difficulty()
    }

    pub fn miner(&self) -> &Miner {
        &self.miner
    }

    /// The most recently appended block.
    pub fn last_block(&self) -> Block {
        let blocks = self.read();
        blocks
            .last()
            .cloned()
            .expect("ledger always holds a genesis block")
    }

    /// Number of blocks, genesis included.
    pub fn chain_length(&self) -> usize {
        self.read().len()
    }

    /// The block at `index`, if appended.
    pub fn block(&self, index: u64) -> Option<Block> {
        let index = usize::try_from(index).ok()?;
        self.read().get(index).cloned()
    }

    /// A copy of the whole chain.
    pub fn blocks(&self) -> Vec<Block> {
        self.read().clone()
    }

    /// Display snapshots of the whole chain.
    pub fn views(&self) -> Vec<BlockView> {
        self.read().iter().map(BlockView::from).collect()
    }

    /// Seal the registry's entries into a new mined block.
    ///
    /// Returns `None` and leaves everything untouched when the registry is
    /// empty. Otherwise the registry is emptied, its entries become the
    /// payload of a block linked to the current tip, and the block is mined
    /// and appended. Mining has no time bound.
    pub fn seal_pending(&self, registry: &PendingRegistry) -> Option<Block> {
        match self.seal(registry, None, || {}) {
            Ok(sealed) => sealed,
            Err(MineError::Cancelled { .. }) => unreachable!("uncancellable seal was cancelled"),
        }
    }

    /// Like [`seal_pending`](Self::seal_pending), but gives up when `cancel`
    /// fires.
    ///
    /// On cancellation the chain is unchanged and the snapshot goes back into
    /// the registry.
    pub fn seal_pending_cancellable(
        &self,
        registry: &PendingRegistry,
        cancel: &CancelToken,
    ) -> Result<Option<Block>, MineError> {
        self.seal(registry, Some(cancel), || {})
    }

    /// Like [`seal_pending_cancellable`](Self::seal_pending_cancellable),
    /// calling `on_mining` once the seal lock is held and a non-empty
    /// snapshot has been taken, immediately before the nonce search starts.
    ///
    /// Time spent queued behind another seal happens before `on_mining`, so
    /// a deadline armed there bounds mining alone.
    pub fn seal_pending_cancellable_with(
        &self,
        registry: &PendingRegistry,
        cancel: &CancelToken,
        on_mining: impl FnOnce(),
    ) -> Result<Option<Block>, MineError> {
        self.seal(registry, Some(cancel), on_mining)
    }

    fn seal(
        &self,
        registry: &PendingRegistry,
        cancel: Option<&CancelToken>,
        on_mining: impl FnOnce(),
    ) -> Result<Option<Block>, MineError> {
        let _seal = self.seal_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let snapshot = registry.snapshot_and_clear();
        if snapshot.is_empty() {
            return Ok(None);
        }

        // Only this thread appends while the seal lock is held, so the tip
        // read here is still the tip at push time.
        let tip = self.last_block();
        let backup = cancel.map(|_| snapshot.clone());
        let candidate = Block::new(
            tip.index() + 1,
            snapshot,
            PreviousLink::Block(tip.fingerprint()),
            &self.clock,
        );

        on_mining();
        let mined = match cancel {
            None => self.miner.mine(candidate),
            Some(token) => match self.miner.mine_cancellable(candidate, token) {
                Ok(mined) => mined,
                Err(e) => {
                    warn!(index = tip.index() + 1, error = %e, "seal cancelled; entries returned to registry");
                    if let Some(entries) = backup {
                        registry.restore(entries);
                    }
                    return Err(e);
                }
            },
        };

        self.blocks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mined.clone());

        info!(
            index = mined.index(),
            nonce = mined.nonce(),
            documents = mined.payload().len(),
            fingerprint = %mined.fingerprint(),
            "block sealed"
        );

        Ok(Some(mined))
    }

    /// When `identifier` was first sealed with exactly `digest`.
    ///
    /// Scans mined blocks in append order and returns the timestamp of the
    /// earliest block recording that pair. Genesis carries no documents and
    /// is skipped.
    pub fn verify(&self, identifier: &str, digest: &DocumentDigest) -> Option<Timestamp> {
        self.read()
            .iter()
            .skip(1)
            .find(|block| block.contains(identifier, digest))
            .map(Block::timestamp)
    }

    /// Recompute every fingerprint and check linkage and work admission.
    pub fn validate_chain(&self) -> Result<(), ChainError> {
        validate_chain(&self.read(), self.difficulty())
    }
}
