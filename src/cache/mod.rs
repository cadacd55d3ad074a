//! Path-keyed cache of parsed templates.
//!
//! [`TemplateCache::get_or_load`] returns the parsed template for a path,
//! loading it on a miss. Each entry remembers the [`InvalidationToken`] of the
//! source it was built from; on every access the live token is fetched and
//! compared, and a mismatch triggers a reload.
//!
//! # Load Pipeline
//!
//! 1. Fetch the live token (missing resource: [`ViewError::TemplateNotFound`])
//! 2. Return the stored template if its token matches
//! 3. Otherwise read the source, run the [`SourceTransform`], parse it
//! 4. Insert a new [`CacheEntry`] bound to the token from step 1
//!
//! Fetching the token before reading means an edit racing with a load is
//! picked up by the next access.
//!
//! # Concurrency
//!
//! The cache is shared across request threads. Two threads missing on the
//! same path may both load and insert it; there is no single-flight guard.
//! Parsed templates are immutable, so readers never block on each other.

mod store;

pub use store::{CacheEntry, CacheStore, MemoryCacheStore};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::{Result, ViewError};
use crate::minify::SourceTransform;
use crate::source::{InvalidationToken, TemplatePath, TemplateSource};
use crate::templating::{Template, TemplateEngine};

/// Cache of parsed templates keyed by normalized path.
pub struct TemplateCache {
    store: Arc<dyn CacheStore>,
    source: Arc<dyn TemplateSource>,
    engine: Arc<dyn TemplateEngine>,
    transform: SourceTransform,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl TemplateCache {
    /// Create a cache over the given collaborators.
    pub fn new(
        store: Arc<dyn CacheStore>,
        source: Arc<dyn TemplateSource>,
        engine: Arc<dyn TemplateEngine>,
        transform: SourceTransform,
    ) -> Self {
        Self {
            store,
            source,
            engine,
            transform,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Template source this cache loads from.
    pub fn source(&self) -> &Arc<dyn TemplateSource> {
        &self.source
    }

    /// Return the template at `path`, loading (or reloading) it when absent or stale.
    ///
    /// # Errors
    ///
    /// - [`ViewError::TemplateNotFound`] if the source does not exist
    /// - [`ViewError::TemplateParseError`] if the source does not parse
    /// - [`ViewError::Io`] if the source cannot be read
    pub fn get_or_load(&self, path: &TemplatePath) -> Result<Arc<dyn Template>> {
        let key = path.cache_key();
        let token = self.source.invalidation_token(path).map_err(|e| not_found(path, e))?;

        if let Some(entry) = self.store.get(&key) {
            if entry.token == token {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("Template cache hit for {}", path);
                return Ok(entry.template);
            }
            tracing::debug!("Template {} changed since it was cached, reloading", path);
        } else {
            tracing::debug!("Template cache miss for {}", path);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let template = self.load(path)?;

        self.store.insert(
            key,
            CacheEntry {
                path: path.clone(),
                template: Arc::clone(&template),
                token,
            },
        );

        Ok(template)
    }

    fn load(&self, path: &TemplatePath) -> Result<Arc<dyn Template>> {
        let raw = self.source.read_source(path).map_err(|e| not_found(path, e))?;
        let transformed = self.transform.apply(&raw);

        let template =
            self.engine.parse(&transformed).map_err(|e| ViewError::TemplateParseError {
                path: path.to_string(),
                message: e.message,
                line: e.line,
                column: e.column,
            })?;

        tracing::debug!(
            "Loaded template {} ({} bytes, {} after transform)",
            path,
            raw.len(),
            transformed.len()
        );
        Ok(template)
    }

    /// Token of the cached entry for `path`, if one is stored.
    pub fn cached_token(&self, path: &TemplatePath) -> Option<InvalidationToken> {
        self.store.get(&path.cache_key()).map(|entry| entry.token)
    }

    /// Drop the cached entry for `path`.
    pub fn invalidate(&self, path: &TemplatePath) -> bool {
        self.store.remove(&path.cache_key())
    }

    /// Drop every cached entry and reset statistics.
    pub fn clear(&self) {
        self.store.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Number of cached templates.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// `(hits, misses)` since creation or the last [`TemplateCache::clear`].
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    /// Hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let (hits, misses) = self.stats();
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

impl std::fmt::Debug for TemplateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (hits, misses) = self.stats();
        f.debug_struct("TemplateCache")
            .field("entries", &self.store.len())
            .field("transform", &self.transform)
            .field("hits", &hits)
            .field("misses", &misses)
            .finish()
    }
}

fn not_found(path: &TemplatePath, error: ViewError) -> ViewError {
    match error {
        ViewError::ResourceNotFound { .. } => ViewError::TemplateNotFound {
            path: path.to_string(),
        },
        other => other,
    }
}
