//! Common test utilities for stache-view integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::{Context, Result};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use stache_view::source::FileSystemSource;
use stache_view::{EngineConfig, ViewContext, ViewEngine};

/// Site rooted in a temporary directory, served by a [`FileSystemSource`].
pub struct DiskSite {
    _temp: TempDir,
    root: PathBuf,
}

impl DiskSite {
    /// Create an empty site
    pub fn new() -> Result<Self> {
        let temp = TempDir::new()?;
        let root = temp.path().to_path_buf();
        Ok(Self {
            _temp: temp,
            root,
        })
    }

    /// Site root on disk
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a template at an app-relative path such as `Views/Home/Index.mustache`
    pub fn write(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Delete a template
    pub fn delete(&self, relative: &str) -> Result<()> {
        fs::remove_file(self.root.join(relative))?;
        Ok(())
    }

    /// Build an engine over this site with `config`
    pub fn engine(&self, config: EngineConfig) -> Result<ViewEngine> {
        Ok(ViewEngine::builder(Arc::new(FileSystemSource::new(self.root.clone()))).config(config).build()?)
    }
}

/// Context matching the templates of `SiteFixture::standard`
pub fn standard_context() -> ViewContext {
    ViewContext::new()
        .with("title", "Welcome")
        .with("links", json!(["a", "b"]))
        .with("footer", "bye")
}
