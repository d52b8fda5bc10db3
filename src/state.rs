//! Application state management

use std::path::PathBuf;
use std::sync::Arc;

use crate::book::Book;
use crate::cache::BookCache;
use crate::config::Config;
use crate::library;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    /// Library roots, in the order given on the command line
    roots: Vec<PathBuf>,
    cache: BookCache,
}

impl AppState {
    pub fn new(config: Config, roots: Vec<PathBuf>) -> Self {
        let cache = BookCache::new(config.cache_size);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                roots,
                cache,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.inner.roots
    }

    pub fn cache(&self) -> &BookCache {
        &self.inner.cache
    }

    /// Resolve an identifier and load its book through the cache.
    pub async fn load_book(&self, book_id: &str) -> Option<Arc<Book>> {
        let dir = library::resolve_book_dir(self.roots(), book_id)?;
        self.cache().get_or_load(book_id, &dir).await
    }

    /// Resolve an identifier to its directory without loading.
    pub fn book_dir(&self, book_id: &str) -> Option<PathBuf> {
        library::resolve_book_dir(self.roots(), book_id)
    }
}
