//! Pending registry: document commitments staged for the next block.
//!
//! Thread-safe via a single mutex, so an `add` racing a seal lands either in
//! the snapshot or in the next batch, never split across both.

use std::sync::{Mutex, MutexGuard, PoisonError};

use notary_core::{DocumentDigest, Payload};
use tracing::debug;

/// Staging area of not-yet-sealed document commitments.
#[derive(Debug, Default)]
pub struct PendingRegistry {
    entries: Mutex<Payload>,
}

impl PendingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // Every critical section leaves the map whole, so a poisoned lock still
    // guards a usable map.
    fn lock(&self) -> MutexGuard<'_, Payload> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stage a digest under an identifier. A repeated identifier replaces the
    /// earlier digest.
    pub fn add(&self, identifier: impl Into<String>, digest: DocumentDigest) {
        let identifier = identifier.into();
        debug!(%identifier, %digest, "document staged");
        self.lock().insert(identifier, digest);
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// The digest currently staged under `identifier`.
    pub fn get(&self, identifier: &str) -> Option<DocumentDigest> {
        self.lock().get(identifier).copied()
    }

    /// Take every staged entry, leaving the registry empty.
    pub fn snapshot_and_clear(&self) -> Payload {
        std::mem::take(&mut *self.lock())
    }

    /// Return a snapshot taken by a seal that did not complete.
    ///
    /// Entries staged after the snapshot are newer and keep their digest.
    pub fn restore(&self, snapshot: Payload) {
        let mut entries = self.lock();
        for (identifier, digest) in snapshot {
            entries.entry(identifier).or_insert(digest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn digest(body: &[u8]) -> DocumentDigest {
        DocumentDigest::of_bytes(body)
    }

    #[test]
    fn test_add_and_get() {
        let registry = PendingRegistry::new();
        assert!(registry.is_empty());

        registry.add("a.txt", digest(b"a"));
        registry.add("b.pdf", digest(b"b"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("a.txt"), Some(digest(b"a")));
        assert_eq!(registry.get("c.txt"), None);
    }

    #[test]
    fn test_last_write_wins() {
        let registry = PendingRegistry::new();
        registry.add("a.txt", digest(b"v1"));
        registry.add("a.txt", digest(b"v2"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a.txt"), Some(digest(b"v2")));
    }

    #[test]
    fn test_snapshot_and_clear() {
        let registry = PendingRegistry::new();
        registry.add("a.txt", digest(b"a"));
        registry.add("b.pdf", digest(b"b"));

        let snapshot = registry.snapshot_and_clear();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["a.txt"], digest(b"a"));
        assert!(registry.is_empty());

        assert!(registry.snapshot_and_clear().is_empty());
    }

    #[test]
    fn test_restore_keeps_newer_entries() {
        let registry = PendingRegistry::new();
        registry.add("a.txt", digest(b"old"));
        registry.add("b.pdf", digest(b"b"));
        let snapshot = registry.snapshot_and_clear();

        registry.add("a.txt", digest(b"new"));
        registry.restore(snapshot);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("a.txt"), Some(digest(b"new")));
        assert_eq!(registry.get("b.pdf"), Some(digest(b"b")));
    }

    #[test]
    fn test_concurrent_adds_are_never_lost() {
        let registry = Arc::new(PendingRegistry::new());
        let writers: Vec<_> = (0..4)
            .map(|w| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for i in 0..250 {
                        registry.add(format!("w{w}-{i}"), digest(&[w as u8, i as u8]));
                    }
                })
            })
            .collect();

        let mut collected = Payload::new();
        while writers.iter().any(|h| !h.is_finished()) {
            collected.extend(registry.snapshot_and_clear());
        }
        for h in writers {
            h.join().unwrap();
        }
        collected.extend(registry.snapshot_and_clear());

        assert_eq!(collected.len(), 1000);
    }

    proptest::proptest! {
        #[test]
        fn test_snapshot_keeps_last_digest_per_identifier(
            adds in proptest::collection::vec(("[a-d]", proptest::prelude::any::<u8>()), 0..32),
        ) {
            let registry = PendingRegistry::new();
            let mut model = Payload::new();
            for (identifier, body) in &adds {
                registry.add(identifier.clone(), digest(&[*body]));
                model.insert(identifier.clone(), digest(&[*body]));
            }

            proptest::prop_assert_eq!(registry.len(), model.len());
            proptest::prop_assert_eq!(registry.snapshot_and_clear(), model);
            proptest::prop_assert!(registry.is_empty());
        }
    }
}
