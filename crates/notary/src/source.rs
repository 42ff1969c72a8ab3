//! Document sources: where document bytes come from.
//!
//! The ledger never reads documents itself. Callers (or the [`Notary`]
//! facade) read bytes through a [`DocumentSource`], digest them, and hand
//! the digest to the ledger.
//!
//! [`Notary`]: crate::Notary

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Errors from reading a document.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No document exists under this identifier.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The identifier cannot name a document in this source.
    #[error("invalid document identifier: {0}")]
    InvalidIdentifier(String),

    /// The document exists but could not be read.
    #[error("I/O error reading {identifier}: {source}")]
    Io {
        identifier: String,
        #[source]
        source: io::Error,
    },
}

/// Async capability for reading a document's raw bytes.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Read the full contents of the document named by `identifier`.
    ///
    /// Fails with [`SourceError::NotFound`] when nothing resolves.
    async fn read_bytes(&self, identifier: &str) -> Result<Bytes, SourceError>;
}

#[async_trait]
impl<S: DocumentSource + ?Sized> DocumentSource for std::sync::Arc<S> {
    async fn read_bytes(&self, identifier: &str) -> Result<Bytes, SourceError> {
        (**self).read_bytes(identifier).await
    }
}

/// Documents as files below a root directory.
///
/// Identifiers are relative paths. Absolute paths and `..` components are
/// rejected so an identifier cannot name a file outside the root.
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    root: PathBuf,
}

impl FsDocumentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, identifier: &str) -> Result<PathBuf, SourceError> {
        let relative = Path::new(identifier);
        let confined = !identifier.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !confined {
            return Err(SourceError::InvalidIdentifier(identifier.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentSource for FsDocumentSource {
    async fn read_bytes(&self, identifier: &str) -> Result<Bytes, SourceError> {
        let path = self.resolve(identifier)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(SourceError::NotFound(identifier.to_string()))
            }
            Err(source) => Err(SourceError::Io {
                identifier: identifier.to_string(),
                source,
            }),
        }
    }
}

/// In-memory documents, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryDocumentSource {
    documents: RwLock<HashMap<String, Bytes>>,
}

impl MemoryDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace a document.
    pub fn insert(&self, identifier: impl Into<String>, contents: impl Into<Bytes>) {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identifier.into(), contents.into());
    }

    /// Remove a document, returning its contents.
    pub fn remove(&self, identifier: &str) -> Option<Bytes> {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(identifier)
    }
}

#[async_trait]
impl DocumentSource for MemoryDocumentSource {
    async fn read_bytes(&self, identifier: &str) -> Result<Bytes, SourceError> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(identifier.to_string()))
    }
}
