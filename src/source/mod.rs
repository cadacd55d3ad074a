//! Template source access.
//!
//! The view layer never touches storage directly. It asks a [`TemplateSource`]
//! for the raw text of a [`TemplatePath`] and for an [`InvalidationToken`]
//! describing how fresh that text is. The template cache compares tokens on
//! every access, so staleness detection is pull-based: no watchers, no
//! background tasks.
//!
//! Two implementations ship with the crate:
//! - [`FileSystemSource`] maps app-relative paths under a root directory and
//!   derives tokens from file metadata.
//! - [`MemorySource`] keeps sources in memory with a version counter, which
//!   makes invalidation deterministic in tests and embedded hosts.

pub mod path;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use dashmap::DashMap;

use crate::core::{Result, ViewError};

pub use path::{CACHE_KEY_PREFIX, TemplatePath};

/// Opaque freshness marker for a template source.
///
/// Two tokens compare equal only when the underlying source is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InvalidationToken {
    /// File-backed source: modification time and length.
    Modified {
        /// Last modification time, when the platform reports one
        modified: Option<SystemTime>,
        /// Length in bytes
        len: u64,
    },
    /// Versioned source: monotonically increasing write counter.
    Version(u64),
}

/// Read access to template sources.
pub trait TemplateSource: Send + Sync {
    /// Read the raw source text for `path`.
    ///
    /// Fails with [`ViewError::ResourceNotFound`] when the resource is absent.
    fn read_source(&self, path: &TemplatePath) -> Result<String>;

    /// Current freshness token for `path`.
    ///
    /// Fails with [`ViewError::ResourceNotFound`] when the resource is absent.
    fn invalidation_token(&self, path: &TemplatePath) -> Result<InvalidationToken>;

    /// Whether a resource exists at `path`.
    fn exists(&self, path: &TemplatePath) -> bool {
        self.invalidation_token(path).is_ok()
    }
}

/// Template source backed by a directory on disk.
///
/// `~/Views/Home/Index.mustache` maps to `<root>/Views/Home/Index.mustache`.
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Root directory templates are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a template path to its absolute location on disk.
    pub fn map_path(&self, path: &TemplatePath) -> PathBuf {
        path.segments().fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    fn io_error(path: &TemplatePath, error: std::io::Error) -> ViewError {
        if error.kind() == std::io::ErrorKind::NotFound {
            ViewError::ResourceNotFound {
                path: path.to_string(),
            }
        } else {
            ViewError::Io {
                path: path.to_string(),
                source: error,
            }
        }
    }
}

impl TemplateSource for FileSystemSource {
    fn read_source(&self, path: &TemplatePath) -> Result<String> {
        let file = self.map_path(path);
        tracing::debug!("Reading template source {}", file.display());
        std::fs::read_to_string(&file).map_err(|e| Self::io_error(path, e))
    }

    fn invalidation_token(&self, path: &TemplatePath) -> Result<InvalidationToken> {
        let metadata =
            std::fs::metadata(self.map_path(path)).map_err(|e| Self::io_error(path, e))?;

        if !metadata.is_file() {
            return Err(ViewError::ResourceNotFound {
                path: path.to_string(),
            });
        }

        Ok(InvalidationToken::Modified {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

/// In-memory template source with versioned tokens.
///
/// Every write bumps a shared counter, so a rewritten template always carries
/// a token different from any earlier one, even if the text is identical.
#[derive(Debug, Default)]
pub struct MemorySource {
    templates: DashMap<TemplatePath, (String, u64)>,
    version: AtomicU64,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the source text at `path`.
    pub fn insert(&self, path: impl Into<TemplatePath>, source: impl Into<String>) {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        self.templates.insert(path.into(), (source.into(), version));
    }

    /// Builder-style variant of [`MemorySource::insert`].
    pub fn with(self, path: impl Into<TemplatePath>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    /// Remove the source at `path`, returning whether it existed.
    pub fn remove(&self, path: &TemplatePath) -> bool {
        self.templates.remove(path).is_some()
    }

    fn not_found(path: &TemplatePath) -> ViewError {
        ViewError::ResourceNotFound {
            path: path.to_string(),
        }
    }
}

impl TemplateSource for MemorySource {
    fn read_source(&self, path: &TemplatePath) -> Result<String> {
        self.templates
            .get(path)
            .map(|entry| entry.value().0.clone())
            .ok_or_else(|| Self::not_found(path))
    }

    fn invalidation_token(&self, path: &TemplatePath) -> Result<InvalidationToken> {
        self.templates
            .get(path)
            .map(|entry| InvalidationToken::Version(entry.value().1))
            .ok_or_else(|| Self::not_found(path))
    }

    fn exists(&self, path: &TemplatePath) -> bool {
        self.templates.contains_key(path)
    }
}
