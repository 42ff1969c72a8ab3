//! Proof-of-work nonce search.
//!
//! A block is mined when its fingerprint starts with `difficulty` zero hex
//! characters. The search is a linear scan over nonces with about
//! `16^difficulty` expected attempts. It has no upper bound: a difficulty
//! that is too high for the hardware blocks the caller until a nonce is found
//! or a [`CancelToken`] fires.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::block::Block;
use crate::canonical::FingerprintHasher;
use crate::error::MineError;
use crate::types::Fingerprint;

/// Attempts between cancellation checks.
const CANCEL_POLL_INTERVAL: u64 = 1024;

/// A shared flag that asks a running search to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Proof-of-work miner with a fixed difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Miner {
    difficulty: u32,
    workers: NonZeroUsize,
}

impl Miner {
    /// Create a single-threaded miner.
    pub fn new(difficulty: u32) -> Self {
        Self {
            difficulty,
            workers: NonZeroUsize::MIN,
        }
    }

    /// Spread the nonce search over `workers` threads. Zero means one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = NonZeroUsize::new(workers).unwrap_or(NonZeroUsize::MIN);
        self
    }

    /// Leading zero hex characters required of a mined fingerprint.
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn workers(&self) -> usize {
        self.workers.get()
    }

    /// Mine a block, searching until a satisfying nonce is found.
    ///
    /// The block's current nonce is tried first, so a block that already
    /// meets the difficulty comes back unchanged.
    pub fn mine(&self, block: Block) -> Block {
        match self.search(block, None) {
            Ok(mined) => mined,
            // Without a token nothing can stop the search.
            Err(MineError::Cancelled { .. }) => unreachable!("uncancellable search was cancelled"),
        }
    }

    /// Mine a block unless `cancel` fires first.
    pub fn mine_cancellable(&self, block: Block, cancel: &CancelToken) -> Result<Block, MineError> {
        self.search(block, Some(cancel))
    }

    fn search(&self, mut block: Block, cancel: Option<&CancelToken>) -> Result<Block, MineError> {
        let hasher = FingerprintHasher::for_block(&block);
        let start = block.nonce();

        debug!(
            index = block.index(),
            difficulty = self.difficulty,
            workers = self.workers.get(),
            "mining block"
        );

        let (nonce, fingerprint, attempts) = if self.workers.get() == 1 {
            self.search_stride(&hasher, start, 1, cancel, None)?
        } else {
            self.search_parallel(&hasher, start, cancel)?
        };

        debug!(
            index = block.index(),
            nonce,
            attempts,
            fingerprint = %fingerprint,
            "block mined"
        );

        block.seal_with(nonce, fingerprint);
        Ok(block)
    }

    /// Scan `start, start + stride, ...` until a nonce satisfies the
    /// difficulty, the token fires, or another worker raises `found`.
    ///
    /// Returns `Cancelled` in both stop cases; the caller tells them apart.
    fn search_stride(
        &self,
        hasher: &FingerprintHasher,
        start: u64,
        stride: u64,
        cancel: Option<&CancelToken>,
        found: Option<&AtomicBool>,
    ) -> Result<(u64, Fingerprint, u64), MineError> {
        let mut nonce = start;
        let mut fingerprint = hasher.fingerprint(nonce);
        let mut attempts = 1u64;

        while !fingerprint.meets_difficulty(self.difficulty) {
            if attempts % CANCEL_POLL_INTERVAL == 0 {
                let cancelled = cancel.is_some_and(CancelToken::is_cancelled);
                let beaten = found.is_some_and(|f| f.load(Ordering::Acquire));
                if cancelled || beaten {
                    return Err(MineError::Cancelled { attempts });
                }
            }
            nonce = nonce.wrapping_add(stride);
            fingerprint = hasher.fingerprint(nonce);
            attempts += 1;
        }

        Ok((nonce, fingerprint, attempts))
    }

    /// Partition the nonce space by stride across scoped worker threads.
    ///
    /// Worker `w` scans `start + w, start + w + n, ...`. The first worker to
    /// succeed raises a shared flag; if several succeed in the same window
    /// the smallest nonce wins.
    fn search_parallel(
        &self,
        hasher: &FingerprintHasher,
        start: u64,
        cancel: Option<&CancelToken>,
    ) -> Result<(u64, Fingerprint, u64), MineError> {
        let workers = self.workers.get() as u64;
        let found = AtomicBool::new(false);

        let outcomes: Vec<Result<(u64, Fingerprint, u64), MineError>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|w| {
                    let found = &found;
                    scope.spawn(move || {
                        let outcome = self.search_stride(
                            hasher,
                            start.wrapping_add(w),
                            workers,
                            cancel,
                            Some(found),
                        );
                        if outcome.is_ok() {
                            found.store(true, Ordering::Release);
                        }
                        outcome
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|h| match h.join() {
                    Ok(outcome) => outcome,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });

        let total_attempts: u64 = outcomes
            .iter()
            .map(|o| match o {
                Ok((_, _, attempts)) | Err(MineError::Cancelled { attempts }) => *attempts,
            })
            .sum();

        outcomes
            .into_iter()
            .filter_map(Result::ok)
            .min_by_key(|(nonce, _, _)| *nonce)
            .map(|(nonce, fingerprint, _)| (nonce, fingerprint, total_attempts))
            .ok_or(MineError::Cancelled {
                attempts: total_attempts,
            })
    }
}
