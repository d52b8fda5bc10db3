//! Bounded book artifact cache with LRU eviction.
//!
//! Artifacts are immutable once processed, so entries never invalidate;
//! eviction only bounds memory. Failed loads are not cached, which keeps a
//! book readable as soon as its directory appears.
//!
//! Uses `tokio::sync::RwLock` for async-safe access; loaded books are
//! shared as `Arc<Book>` so concurrent readers of the same book hold one
//! copy.

use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::RwLock;

use crate::book::{self, ArtifactError, Book};

/// Fallback capacity when the configured value is zero.
const DEFAULT_CAPACITY: usize = 10;

#[derive(Clone)]
pub struct BookCache {
    books: Arc<RwLock<LruCache<String, Arc<Book>>>>,
}

impl BookCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);

        Self {
            books: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// The artifact stored in `dir`, keyed by the caller's identifier.
    ///
    /// Returns None when the artifact is missing or unreadable; the failure
    /// is logged and not cached.
    pub async fn get_or_load(&self, book_id: &str, dir: &Path) -> Option<Arc<Book>> {
        {
            let mut books = self.books.write().await;
            if let Some(found) = books.get(book_id) {
                return Some(found.clone());
            }
        }

        let loaded = match load_artifact(dir).await {
            Ok(loaded) => Arc::new(loaded),
            Err(err) => {
                tracing::warn!(book_id, dir = %dir.display(), %err, "failed to load book");
                return None;
            }
        };

        {
            let mut books = self.books.write().await;
            books.put(book_id.to_string(), loaded.clone());
        }

        Some(loaded)
    }

    /// Number of cached books.
    pub async fn len(&self) -> usize {
        let books = self.books.read().await;
        books.len()
    }

    pub async fn is_empty(&self) -> bool {
        let books = self.books.read().await;
        books.is_empty()
    }
}

async fn load_artifact(dir: &Path) -> Result<Book, ArtifactError> {
    let data = tokio::fs::read(dir.join(book::ARTIFACT_FILE)).await?;
    Ok(serde_json::from_slice(&data)?)
}
