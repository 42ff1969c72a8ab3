//! End-to-end notary scenarios through the public facade.
//!
//! Each test drives a [`Notary`] the way an application would: documents are
//! read from a source, sealed, and verified by their current contents.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use notary::core::{Clock, FixedClock};
use notary::{
    DocumentDigest, FsDocumentSource, MemoryDocumentSource, Notary, NotaryConfig, NotaryError,
    SourceError,
};

const T0: i64 = 1_736_870_400_000;

/// One second later on every read.
struct TickClock(AtomicI64);

impl Clock for TickClock {
    fn now(&self) -> notary::Timestamp {
        notary::Timestamp(self.0.fetch_add(1_000, Ordering::SeqCst))
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn memory_notary(difficulty: u32) -> Notary<Arc<MemoryDocumentSource>, FixedClock> {
    init_tracing();
    Notary::with_clock(
        Arc::new(MemoryDocumentSource::new()),
        NotaryConfig::default().with_difficulty(difficulty),
        FixedClock::at_millis(T0),
    )
}

#[tokio::test]
async fn test_seal_two_documents_at_default_difficulty() {
    let notary = memory_notary(4);
    let h1 = DocumentDigest::of_bytes(b"contract between the parties");
    let h2 = DocumentDigest::of_bytes(b"university diploma");
    let h3 = DocumentDigest::of_bytes(b"something else entirely");

    notary.add_pending("a.txt", h1);
    notary.add_pending("b.pdf", h2);
    let sealed = notary.seal_pending().await.unwrap().expect("block sealed");

    assert_eq!(notary.chain_length(), 2);
    assert_eq!(sealed.document_count, 2);
    assert!(sealed.fingerprint.to_hex().starts_with("0000"));

    assert_eq!(notary.verify("a.txt", &h1), Some(sealed.timestamp));
    assert_eq!(notary.verify("b.pdf", &h2), Some(sealed.timestamp));
    assert_eq!(notary.verify("a.txt", &h3), None);
    notary.validate_chain().unwrap();
}

#[tokio::test]
async fn test_seal_with_nothing_staged() {
    let notary = memory_notary(4);
    let genesis = notary.last_block();

    assert!(notary.seal_pending().await.unwrap().is_none());
    assert_eq!(notary.chain_length(), 1);
    assert_eq!(notary.last_block(), genesis);
}

#[tokio::test]
async fn test_restaging_an_identifier_keeps_the_last_digest() {
    let notary = memory_notary(2);
    let h1 = DocumentDigest::of_bytes(b"first draft");
    let h4 = DocumentDigest::of_bytes(b"final draft");

    notary.add_pending("a.txt", h1);
    notary.add_pending("a.txt", h4);
    notary.seal_pending().await.unwrap().expect("block sealed");

    let last = notary.last_block();
    assert_eq!(last.payload.len(), 1);
    assert_eq!(last.payload["a.txt"], h4.to_hex());
    assert_eq!(notary.verify("a.txt", &h1), None);
    assert!(notary.verify("a.txt", &h4).is_some());
}

#[tokio::test]
async fn test_verify_unknown_identifier() {
    let notary = memory_notary(2);
    notary.add_pending("a.txt", DocumentDigest::of_bytes(b"a"));
    notary.seal_pending().await.unwrap();

    assert_eq!(
        notary.verify("never-added.txt", &DocumentDigest::of_bytes(b"a")),
        None
    );
}

#[tokio::test]
async fn test_modified_document_no_longer_verifies() {
    let source = Arc::new(MemoryDocumentSource::new());
    let notary = Notary::with_clock(
        Arc::clone(&source),
        NotaryConfig::default().with_difficulty(2),
        FixedClock::at_millis(T0),
    );

    source.insert("umowa.txt", &b"the agreed terms"[..]);
    notary.add_document("umowa.txt").await.unwrap();
    let sealed = notary.seal_pending().await.unwrap().unwrap();
    assert_eq!(
        notary.verify_document("umowa.txt").await.unwrap(),
        Some(sealed.timestamp)
    );

    source.insert("umowa.txt", &b"the agreed terms, quietly amended"[..]);
    assert_eq!(notary.verify_document("umowa.txt").await.unwrap(), None);
}

#[tokio::test]
async fn test_resealing_unchanged_document_reports_first_seal() {
    let source = Arc::new(MemoryDocumentSource::new());
    let notary = Notary::with_clock(
        Arc::clone(&source),
        NotaryConfig::default().with_difficulty(2),
        TickClock(AtomicI64::new(T0)),
    );
    source.insert("umowa.txt", &b"terms"[..]);
    source.insert("dyplom.pdf", &b"diploma"[..]);

    notary.add_document("umowa.txt").await.unwrap();
    notary.add_document("dyplom.pdf").await.unwrap();
    let first = notary.seal_pending().await.unwrap().unwrap();

    notary.add_document("umowa.txt").await.unwrap();
    let second = notary.seal_pending().await.unwrap().unwrap();

    assert_eq!(notary.chain_length(), 3);
    assert_eq!(second.index, 2);
    assert_eq!(second.document_count, 1);
    assert!(second.timestamp > first.timestamp);

    let sealed_at = notary.verify_document("umowa.txt").await.unwrap();
    assert_eq!(sealed_at, Some(first.timestamp));

    let chain = notary.chain();
    assert_eq!(chain[2].previous_link, chain[1].fingerprint);
    assert_eq!(chain[1].previous_link, chain[0].fingerprint);
}

#[tokio::test]
async fn test_missing_document_is_a_source_error() {
    let notary = memory_notary(2);

    let err = notary.add_document("nieistnieje.txt").await.unwrap_err();
    assert!(matches!(
        err,
        NotaryError::Source(SourceError::NotFound(ref id)) if id == "nieistnieje.txt"
    ));

    let err = notary.verify_document("nieistnieje.txt").await.unwrap_err();
    assert!(matches!(err, NotaryError::Source(SourceError::NotFound(_))));
    assert_eq!(notary.pending_count(), 0);
}

#[tokio::test]
async fn test_filesystem_documents() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("umowa.txt"), "To jest ważna umowa.").unwrap();
    std::fs::write(dir.path().join("dyplom.pdf"), b"PDF diploma bytes").unwrap();

    let notary = Notary::with_clock(
        FsDocumentSource::new(dir.path()),
        NotaryConfig::default().with_difficulty(2),
        FixedClock::at_millis(T0),
    );

    let digest = notary.add_document("umowa.txt").await.unwrap();
    assert_eq!(digest, DocumentDigest::of_bytes("To jest ważna umowa.".as_bytes()));
    notary.add_document("dyplom.pdf").await.unwrap();
    let sealed = notary.seal_pending().await.unwrap().unwrap();

    for doc in ["umowa.txt", "dyplom.pdf"] {
        assert_eq!(
            notary.verify_document(doc).await.unwrap(),
            Some(sealed.timestamp),
            "{doc} should verify"
        );
    }

    std::fs::write(dir.path().join("umowa.txt"), "To jest zmieniona umowa.").unwrap();
    assert_eq!(notary.verify_document("umowa.txt").await.unwrap(), None);
}

#[tokio::test]
async fn test_mining_timeout_returns_documents_to_the_registry() {
    init_tracing();
    // No fingerprint has 64 leading zero nibbles in practice.
    let notary = Notary::with_clock(
        MemoryDocumentSource::new(),
        NotaryConfig::default()
            .with_difficulty(64)
            .with_mining_timeout(Duration::from_millis(50)),
        FixedClock::at_millis(T0),
    );
    let digest = DocumentDigest::of_bytes(b"slow");
    notary.add_pending("slow.txt", digest);

    let err = notary.seal_pending().await.unwrap_err();
    assert!(matches!(err, NotaryError::Mining(_)));

    assert_eq!(notary.chain_length(), 1);
    assert_eq!(notary.registry().get("slow.txt"), Some(digest));
}

#[tokio::test]
async fn test_parallel_workers_seal_valid_blocks() {
    init_tracing();
    let notary = Notary::with_clock(
        MemoryDocumentSource::new(),
        NotaryConfig::default()
            .with_difficulty(3)
            .with_mining_workers(4)
            .with_verify_on_seal(true),
        FixedClock::at_millis(T0),
    );

    for round in 0..3u8 {
        notary.add_pending(format!("doc-{round}"), DocumentDigest::of_bytes(&[round]));
        let sealed = notary.seal_pending().await.unwrap().unwrap();
        assert!(sealed.fingerprint.meets_difficulty(3));
    }
    assert_eq!(notary.chain_length(), 4);
}

#[tokio::test]
async fn test_chain_views_serialize() {
    let notary = memory_notary(1);
    notary.add_pending("a.txt", DocumentDigest::of_bytes(b"a"));
    notary.seal_pending().await.unwrap();

    let json = serde_json::to_value(notary.chain()).unwrap();
    let blocks = json.as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["previous_link"], "0");
    assert_eq!(blocks[1]["index"], 1);
}
