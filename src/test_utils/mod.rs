//! Test utilities for stache-view
//!
//! Helpers shared by unit and integration tests: one-time logging setup and a
//! small in-memory site with a layout, views and partials laid out under the
//! default location formats.
//!
//! # Example
//!
//! ```rust,ignore
//! use stache_view::test_utils::{init_test_logging, SiteFixture};
//!
//! init_test_logging(None);
//! let engine = SiteFixture::standard().engine().unwrap();
//! assert!(engine.cache().is_empty());
//! ```

use std::sync::{Arc, Once};

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;
use crate::core::Result;
use crate::source::{MemorySource, TemplatePath};
use crate::view::ViewEngine;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`. With neither, logging stays
/// off. Safe to call from every test.
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Layout used by [`SiteFixture::standard`].
pub const LAYOUT_PATH: &str = "~/Views/Shared/Layout.mustache";
/// Home page used by [`SiteFixture::standard`].
pub const HOME_INDEX_PATH: &str = "~/Views/Home/Index.mustache";

/// In-memory site for exercising the full render pipeline.
#[derive(Debug, Clone)]
pub struct SiteFixture {
    source: Arc<MemorySource>,
    config: EngineConfig,
}

impl SiteFixture {
    /// Empty site with default configuration.
    pub fn new() -> Self {
        Self {
            source: Arc::new(MemorySource::new()),
            config: EngineConfig::default(),
        }
    }

    /// Site with a layout, a home page defining `Sidebar` inline and a shared
    /// `Footer` partial.
    pub fn standard() -> Self {
        Self::new()
            .with_template(
                LAYOUT_PATH,
                "<html>\n  <body>\n    {{>Sidebar}}\n    <main>{{>Body}}</main>\n    {{>Footer}}\n  </body>\n</html>\n",
            )
            .with_template(
                HOME_INDEX_PATH,
                "<h1>{{title}}</h1>\n{{<Sidebar}}<nav>{{#links}}<a>{{.}}</a>{{/links}}</nav>{{/Sidebar}}",
            )
            .with_template("~/Views/Shared/Footer.mustache", "<footer>{{footer}}</footer>")
    }

    /// Add or replace a template.
    pub fn with_template(self, path: &str, source: &str) -> Self {
        self.source.insert(path, source);
        self
    }

    /// Replace the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Disable minification, so rendered output matches template text exactly.
    pub fn unminified(mut self) -> Self {
        self.config.minify = false;
        self
    }

    /// Remove a template.
    pub fn remove(&self, path: &str) -> bool {
        self.source.remove(&TemplatePath::new(path))
    }

    /// Rewrite a template in place; engines built from this fixture see it on
    /// their next lookup.
    pub fn rewrite(&self, path: &str, source: &str) {
        self.source.insert(path, source);
    }

    /// Shared template source.
    pub fn source(&self) -> Arc<MemorySource> {
        Arc::clone(&self.source)
    }

    /// Build a view engine over this site.
    pub fn engine(&self) -> Result<ViewEngine> {
        ViewEngine::builder(self.source()).config(self.config.clone()).build()
    }
}

impl Default for SiteFixture {
    fn default() -> Self {
        Self::new()
    }
}
