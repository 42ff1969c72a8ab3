//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use notary::{FsDocumentSource, MemoryDocumentSource, Notary, NotaryConfig};
use notary_core::{Block, Clock, DocumentDigest, Timestamp};
use notary_ledger::{Ledger, PendingRegistry};

/// 2025-01-14T16:00:00Z
pub const FIXTURE_EPOCH_MILLIS: i64 = 1_736_870_400_000;

/// The two documents every walkthrough starts with.
pub const SAMPLE_DOCUMENTS: &[(&str, &[u8])] = &[
    ("umowa.txt", "To jest ważna umowa między stronami.".as_bytes()),
    ("dyplom.pdf", "PDF dokument z dyplomem uczelni".as_bytes()),
];

/// A clock that advances by a fixed step on every read.
///
/// Blocks sealed through it get distinct, predictable timestamps.
#[derive(Debug)]
pub struct SteppingClock {
    next: AtomicI64,
    step: i64,
}

impl SteppingClock {
    pub fn new(start_millis: i64, step_millis: i64) -> Self {
        Self {
            next: AtomicI64::new(start_millis),
            step: step_millis,
        }
    }

    /// The timestamp the next read will return.
    pub fn peek(&self) -> Timestamp {
        Timestamp(self.next.load(Ordering::SeqCst))
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self::new(FIXTURE_EPOCH_MILLIS, 1_000)
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.next.fetch_add(self.step, Ordering::SeqCst))
    }
}

/// A ledger and registry pair on a stepping clock.
pub struct TestFixture {
    pub ledger: Ledger<SteppingClock>,
    pub registry: PendingRegistry,
}

impl TestFixture {
    /// Create a fixture whose genesis block is stamped at [`FIXTURE_EPOCH_MILLIS`].
    pub fn new(difficulty: u32) -> Self {
        Self {
            ledger: Ledger::with_clock(difficulty, SteppingClock::default()),
            registry: PendingRegistry::new(),
        }
    }

    /// Digest `contents` and stage it under `identifier`.
    pub fn stage(&self, identifier: &str, contents: &[u8]) -> DocumentDigest {
        let digest = DocumentDigest::of_bytes(contents);
        self.registry.add(identifier, digest);
        digest
    }

    /// Stage every document and seal them into one block.
    ///
    /// Panics if `documents` is empty.
    pub fn seal_documents(&self, documents: &[(&str, &[u8])]) -> Block {
        for (identifier, contents) in documents {
            self.stage(identifier, contents);
        }
        self.ledger
            .seal_pending(&self.registry)
            .expect("fixture sealed an empty registry")
    }

    /// Seal `rounds` blocks, each holding one generated document.
    pub fn seal_rounds(&self, rounds: usize) -> Vec<Block> {
        (0..rounds)
            .map(|round| {
                let identifier = format!("round-{round}.txt");
                let contents = format!("contents of round {round}");
                self.seal_documents(&[(identifier.as_str(), contents.as_bytes())])
            })
            .collect()
    }
}

/// A notary over an in-memory source preloaded with [`SAMPLE_DOCUMENTS`].
pub fn sample_notary(
    difficulty: u32,
) -> (Arc<MemoryDocumentSource>, Notary<Arc<MemoryDocumentSource>, SteppingClock>) {
    let source = Arc::new(MemoryDocumentSource::new());
    for (identifier, contents) in SAMPLE_DOCUMENTS {
        source.insert(*identifier, contents.to_vec());
    }
    let notary = Notary::with_clock(
        Arc::clone(&source),
        NotaryConfig::default().with_difficulty(difficulty),
        SteppingClock::default(),
    );
    (source, notary)
}

/// A notary rooted at `dir`, with [`SAMPLE_DOCUMENTS`] written into it.
pub fn sample_fs_notary(
    dir: &Path,
    difficulty: u32,
) -> io::Result<Notary<FsDocumentSource, SteppingClock>> {
    for (identifier, contents) in SAMPLE_DOCUMENTS {
        std::fs::write(dir.join(identifier), contents)?;
    }
    Ok(Notary::with_clock(
        FsDocumentSource::new(dir),
        NotaryConfig::default().with_difficulty(difficulty),
        SteppingClock::default(),
    ))
}
