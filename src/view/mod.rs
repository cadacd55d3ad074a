//! View resolution and rendering.
//!
//! [`ViewEngine`] is the entry point a hosting layer talks to. It owns the
//! template cache and the location lookup, and renders a primary template
//! (optionally inside a master) against the caller's [`ViewContext`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use stache_view::partials::LookupScope;
//! use stache_view::source::{MemorySource, TemplatePath};
//! use stache_view::view::{ViewContext, ViewEngine};
//!
//! # fn example() -> anyhow::Result<()> {
//! let source = MemorySource::new()
//!     .with("~/Views/Shared/Layout.mustache", "<main>{{>Body}}</main>{{>Footer}}")
//!     .with("~/Views/Home/Index.mustache", "Hi {{name}}")
//!     .with("~/Views/Shared/Footer.mustache", "<footer>bye</footer>");
//!
//! let engine = ViewEngine::builder(Arc::new(source)).build()?;
//! let context = ViewContext::new().with("name", "Ada");
//!
//! let html = engine.render(
//!     &TemplatePath::new("~/Views/Home/Index.mustache"),
//!     Some(&TemplatePath::new("~/Views/Shared/Layout.mustache")),
//!     &LookupScope::controller("Home"),
//!     &context,
//! )?;
//! assert_eq!(html, "<main>Hi Ada</main><footer>bye</footer>");
//! # Ok(())
//! # }
//! ```

mod compose;

pub use compose::{LayoutComposer, LayoutSectionResolver, PartialOnlyResolver};

use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cache::{CacheStore, MemoryCacheStore, TemplateCache};
use crate::config::EngineConfig;
use crate::core::{Result, ViewError};
use crate::minify::SourceTransform;
use crate::partials::{
    LocatedView, LocationFormatLookup, LookupScope, PartialResolver, PartialViewLookup,
    SearchResult,
};
use crate::source::{TemplatePath, TemplateSource};
use crate::templating::TemplateEngine;
use crate::templating::mustache::MustacheEngine;

static NULL: Value = Value::Null;

/// Which part of the caller's state becomes the render root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootContextMode {
    /// The whole view-data bag
    #[default]
    ViewData,
    /// The single bound model
    Model,
}

/// Caller state available to a render.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewContext {
    /// Loose key/value bag, always a JSON object
    view_data: Value,
    /// Bound model, if any
    model: Option<Value>,
}

impl Default for ViewContext {
    fn default() -> Self {
        Self {
            view_data: Value::Object(Map::new()),
            model: None,
        }
    }
}

impl ViewContext {
    /// Empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a view-data entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        if let Value::Object(bag) = &mut self.view_data {
            bag.insert(key.into(), value.into());
        }
    }

    /// Builder-style variant of [`ViewContext::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Bind a model.
    pub fn with_model(mut self, model: impl Into<Value>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// View-data entry under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.view_data.get(key)
    }

    /// Bound model, if any.
    pub fn model(&self) -> Option<&Value> {
        self.model.as_ref()
    }

    /// Root data for `mode`.
    ///
    /// `Model` yields the model, or `null` when none is bound. `ViewData`
    /// yields the bag as an object; a bound model is also reachable under
    /// `Model` unless the bag already has that key. The bag is only copied
    /// when the model has to be added to it.
    pub fn root(&self, mode: RootContextMode) -> Cow<'_, Value> {
        match (mode, &self.model) {
            (RootContextMode::Model, model) => Cow::Borrowed(model.as_ref().unwrap_or(&NULL)),
            (RootContextMode::ViewData, Some(model)) if self.view_data.get("Model").is_none() => {
                let mut bag = self.view_data.clone();
                if let Value::Object(entries) = &mut bag {
                    entries.insert("Model".to_string(), model.clone());
                }
                Cow::Owned(bag)
            }
            (RootContextMode::ViewData, _) => Cow::Borrowed(&self.view_data),
        }
    }
}

/// A resolved view: primary template, optional master, and lookup scope.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    /// Primary template
    pub view_path: TemplatePath,
    /// Master template, if the view renders inside a layout
    pub master_path: Option<TemplatePath>,
    /// Scope used for partial lookup during render
    pub scope: LookupScope,
}

impl View {
    /// Render this view through `engine`.
    pub fn render(&self, engine: &ViewEngine, context: &ViewContext) -> Result<String> {
        engine.render(&self.view_path, self.master_path.as_ref(), &self.scope, context)
    }
}

/// Resolves, caches, composes and renders templates.
pub struct ViewEngine {
    config: EngineConfig,
    cache: Arc<TemplateCache>,
    locations: Arc<LocationFormatLookup>,
    partials: Arc<dyn PartialViewLookup>,
}

impl ViewEngine {
    /// Start building an engine reading templates from `source`.
    pub fn builder(source: Arc<dyn TemplateSource>) -> ViewEngineBuilder {
        ViewEngineBuilder::new(source)
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared template cache.
    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// Render `primary`, inside `master` when given.
    ///
    /// The root data is selected from `context` by the configured
    /// [`RootContextMode`].
    ///
    /// # Errors
    ///
    /// - [`ViewError::TemplateNotFound`] if `primary` or `master` is missing
    /// - [`ViewError::PartialNotFound`] if a referenced name resolves nowhere
    /// - [`ViewError::TemplateParseError`] if any involved template is malformed
    pub fn render(
        &self,
        primary: &TemplatePath,
        master: Option<&TemplatePath>,
        scope: &LookupScope,
        context: &ViewContext,
    ) -> Result<String> {
        let primary_template = self.cache.get_or_load(primary)?;
        let master_template = master.map(|path| self.cache.get_or_load(path)).transpose()?;

        match master {
            Some(master) => tracing::debug!("Rendering {} inside {}", primary, master),
            None => tracing::debug!("Rendering {}", primary),
        }

        let data = context.root(self.config.root_context);
        let partials = PartialResolver::new(self.partials.as_ref(), &self.cache, scope);
        LayoutComposer::new(partials).compose(&primary_template, master_template.as_ref(), &data)
    }

    /// Resolve the partial `name` within `scope`.
    pub fn find_partial(&self, name: &str, scope: &LookupScope) -> Result<SearchResult> {
        PartialResolver::new(self.partials.as_ref(), &self.cache, scope).resolve(name)
    }

    /// Map a view name (and optional master name) to template locations.
    ///
    /// An empty master name means "no master".
    ///
    /// # Errors
    ///
    /// [`ViewError::ViewNotFound`] when the view or the requested master cannot
    /// be located. The error names whichever was missing; a missing view also
    /// carries the locations searched for the master.
    pub fn find_view(
        &self,
        name: &str,
        master_name: Option<&str>,
        scope: &LookupScope,
    ) -> Result<View> {
        let view = self.locations.find_view(name, scope);
        let master = master_name
            .filter(|master| !master.is_empty())
            .map(|master| (master, self.locations.find_master(master, scope)));

        let mut searched = view.searched_locations;
        let Some(view_path) = stache_path(view.view) else {
            if let Some((_, master)) = master {
                searched.extend(master.searched_locations);
            }
            return Err(ViewError::ViewNotFound {
                name: name.to_string(),
                searched_locations: searched,
            });
        };

        let master_path = match master {
            Some((master_name, master)) => match stache_path(master.view) {
                Some(path) => Some(path),
                None => {
                    tracing::debug!("View '{}' found but master '{}' is missing", name, master_name);
                    return Err(ViewError::ViewNotFound {
                        name: master_name.to_string(),
                        searched_locations: master.searched_locations,
                    });
                }
            },
            None => None,
        };

        Ok(View {
            view_path,
            master_path,
            scope: scope.clone(),
        })
    }
}

impl std::fmt::Debug for ViewEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewEngine")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

fn stache_path(view: Option<LocatedView>) -> Option<TemplatePath> {
    match view {
        Some(LocatedView::Stache(path)) => Some(path),
        _ => None,
    }
}

/// Builder for [`ViewEngine`].
///
/// Only the template source is required. Everything else defaults: an
/// in-memory cache store, the built-in Mustache engine, location-format
/// partial lookup, and the transform implied by the configuration.
pub struct ViewEngineBuilder {
    source: Arc<dyn TemplateSource>,
    config: EngineConfig,
    store: Option<Arc<dyn CacheStore>>,
    engine: Option<Arc<dyn TemplateEngine>>,
    lookup: Option<Arc<dyn PartialViewLookup>>,
    transform: Option<SourceTransform>,
}

impl ViewEngineBuilder {
    /// Builder reading templates from `source`.
    pub fn new(source: Arc<dyn TemplateSource>) -> Self {
        Self {
            source,
            config: EngineConfig::default(),
            store: None,
            engine: None,
            lookup: None,
            transform: None,
        }
    }

    /// Use `config` instead of the defaults.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Share `store` as the cache backing store.
    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Parse templates with `engine`.
    pub fn template_engine(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Resolve partials with `lookup` instead of the configured location formats.
    pub fn partial_lookup(mut self, lookup: Arc<dyn PartialViewLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Transform template source with `transform` instead of the configured one.
    pub fn transform(mut self, transform: SourceTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Build the engine.
    ///
    /// # Errors
    ///
    /// [`ViewError::Config`] if `max-partial-depth` is zero.
    pub fn build(self) -> Result<ViewEngine> {
        if self.config.max_partial_depth == 0 {
            return Err(ViewError::Config {
                message: "max-partial-depth must be at least 1".to_string(),
            });
        }

        let transform = self.transform.unwrap_or_else(|| self.config.source_transform());
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryCacheStore::new()) as Arc<dyn CacheStore>);
        let engine = self.engine.unwrap_or_else(|| {
            Arc::new(MustacheEngine::new(self.config.max_partial_depth)) as Arc<dyn TemplateEngine>
        });

        let cache = Arc::new(TemplateCache::new(store, Arc::clone(&self.source), engine, transform));
        let locations =
            Arc::new(LocationFormatLookup::new(Arc::clone(&self.source), self.config.locations.clone()));
        let partials = self
            .lookup
            .unwrap_or_else(|| Arc::clone(&locations) as Arc<dyn PartialViewLookup>);

        tracing::debug!("Built view engine with {:?}", self.config.root_context);

        Ok(ViewEngine {
            config: self.config,
            cache,
            locations,
            partials,
        })
    }
}
