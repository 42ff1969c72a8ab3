//! The main Notary implementation.

use std::sync::Arc;
use std::time::Duration;

use notary_core::{CancelToken, Clock, DocumentDigest, Miner, SystemClock, Timestamp};
use notary_ledger::{BlockView, Ledger, PendingRegistry, SealedBlockSummary};
use tracing::{debug, warn};

use crate::error::{NotaryError, Result};
use crate::source::DocumentSource;

/// Difficulty used when none is configured.
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Configuration for the Notary.
#[derive(Debug, Clone)]
pub struct NotaryConfig {
    /// Leading zero hex digits every sealed block's fingerprint must carry.
    pub difficulty: u32,
    /// Threads used to search for a nonce.
    pub mining_workers: usize,
    /// Give up on a seal after this long. `None` mines until success.
    pub mining_timeout: Option<Duration>,
    /// Re-validate the whole chain after every successful seal.
    pub verify_on_seal: bool,
}

impl Default for NotaryConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            mining_workers: 1,
            mining_timeout: None,
            verify_on_seal: false,
        }
    }
}

impl NotaryConfig {
    pub fn with_difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_mining_workers(mut self, workers: usize) -> Self {
        self.mining_workers = workers;
        self
    }

    pub fn with_mining_timeout(mut self, timeout: Duration) -> Self {
        self.mining_timeout = Some(timeout);
        self
    }

    pub fn with_verify_on_seal(mut self, verify: bool) -> Self {
        self.verify_on_seal = verify;
        self
    }
}

/// The main Notary struct.
///
/// Ties a [`DocumentSource`] to a [`Ledger`] and its [`PendingRegistry`]:
/// - Reading and digesting documents
/// - Staging digests for the next block
/// - Sealing (mining off the async runtime)
/// - Verifying documents against the chain
pub struct Notary<S: DocumentSource, C: Clock + 'static = SystemClock> {
    /// Where document bytes come from.
    source: S,
    /// The chain.
    ledger: Arc<Ledger<C>>,
    /// Documents waiting for the next seal.
    registry: Arc<PendingRegistry>,
    /// Configuration.
    config: NotaryConfig,
}

impl<S: DocumentSource> Notary<S, SystemClock> {
    /// Create a notary stamped by the system clock.
    pub fn new(source: S, config: NotaryConfig) -> Self {
        Self::with_clock(source, config, SystemClock)
    }
}

impl<S: DocumentSource, C: Clock + 'static> Notary<S, C> {
    /// Create a notary with an explicit clock.
    pub fn with_clock(source: S, config: NotaryConfig, clock: C) -> Self {
        let miner = Miner::new(config.difficulty).with_workers(config.mining_workers);
        Self {
            source,
            ledger: Arc::new(Ledger::with_miner(miner, clock)),
            registry: Arc::new(PendingRegistry::new()),
            config,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn ledger(&self) -> &Ledger<C> {
        &self.ledger
    }

    pub fn registry(&self) -> &PendingRegistry {
        &self.registry
    }

    pub fn config(&self) -> &NotaryConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Staging
    // ─────────────────────────────────────────────────────────────────────────

    /// Read a document from the source, digest it, and stage it.
    ///
    /// Nothing is staged if the read fails.
    pub async fn add_document(&self, identifier: &str) -> Result<DocumentDigest> {
        let bytes = self.source.read_bytes(identifier).await?;
        let digest = DocumentDigest::of_bytes(&bytes);
        self.registry.add(identifier, digest);
        Ok(digest)
    }

    /// Stage an already computed digest.
    pub fn add_pending(&self, identifier: impl Into<String>, digest: DocumentDigest) {
        self.registry.add(identifier, digest);
    }

    /// Number of documents waiting for the next seal.
    pub fn pending_count(&self) -> usize {
        self.registry.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sealing
    // ─────────────────────────────────────────────────────────────────────────

    /// Seal every staged document into a new mined block.
    ///
    /// Returns `Ok(None)` when nothing was staged. Mining runs on the blocking
    /// pool. `mining_timeout` is measured from the moment this seal holds the
    /// ledger's seal lock, so waiting behind another seal does not count
    /// against it. If it elapses first the seal is abandoned, the staged
    /// documents are put back, and [`NotaryError::Mining`] is returned.
    pub async fn seal_pending(&self) -> Result<Option<SealedBlockSummary>> {
        let ledger = Arc::clone(&self.ledger);
        let registry = Arc::clone(&self.registry);
        let verify_on_seal = self.config.verify_on_seal;
        let timeout = self.config.mining_timeout;
        let runtime = tokio::runtime::Handle::current();

        let mined = tokio::task::spawn_blocking(move || -> Result<Option<SealedBlockSummary>> {
            let token = CancelToken::new();
            let mut timer = None;
            let sealed = ledger.seal_pending_cancellable_with(&registry, &token, || {
                timer = timeout.map(|timeout| {
                    let token = token.clone();
                    runtime.spawn(async move {
                        tokio::time::sleep(timeout).await;
                        token.cancel();
                    })
                });
            });
            if let Some(timer) = timer {
                timer.abort();
            }

            let Some(block) = sealed? else {
                return Ok(None);
            };
            if verify_on_seal {
                ledger.validate_chain()?;
            }
            Ok(Some(SealedBlockSummary::from(&block)))
        })
        .await;

        match mined? {
            Err(NotaryError::Mining(e)) => {
                warn!(error = %e, timeout = ?self.config.mining_timeout, "seal timed out");
                Err(NotaryError::Mining(e))
            }
            other => other,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Timestamp of the earliest block that sealed this exact pair.
    pub fn verify(&self, identifier: &str, digest: &DocumentDigest) -> Option<Timestamp> {
        self.ledger.verify(identifier, digest)
    }

    /// Read a document's current contents and look them up in the chain.
    ///
    /// A document edited since it was sealed verifies as `None`.
    pub async fn verify_document(&self, identifier: &str) -> Result<Option<Timestamp>> {
        let bytes = self.source.read_bytes(identifier).await?;
        let digest = DocumentDigest::of_bytes(&bytes);
        let sealed_at = self.ledger.verify(identifier, &digest);
        debug!(identifier, %digest, sealed = sealed_at.is_some(), "document verified");
        Ok(sealed_at)
    }

    /// Check every block's integrity, linkage, and proof of work.
    pub fn validate_chain(&self) -> Result<()> {
        self.ledger.validate_chain().map_err(NotaryError::from)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn last_block(&self) -> BlockView {
        BlockView::from(&self.ledger.last_block())
    }

    pub fn chain_length(&self) -> usize {
        self.ledger.chain_length()
    }

    /// Every block, genesis first.
    pub fn chain(&self) -> Vec<BlockView> {
        self.ledger.views()
    }
}
