//! Partial resolution across view locations.
//!
//! When a template references a name it cannot satisfy itself, the view layer
//! asks a [`PartialViewLookup`] (the host's view-location collaborator) to find
//! it. The lookup answers with either a located view or the list of locations
//! it tried. [`PartialResolver`] turns that answer into a [`SearchResult`]:
//!
//! - a view backed by this crate ([`LocatedView::Stache`]) is loaded through
//!   the [`TemplateCache`] so its parsed template, not its rendered output, is
//!   embedded in the composition
//! - an already parsed template ([`LocatedView::Template`]) is used as is
//! - a view owned by another engine ([`LocatedView::Foreign`]) counts as found
//!   but contributes no template
//! - nothing found yields `found == false` with every searched location
//!
//! "Not found" is an ordinary [`SearchResult`], never an error. Callers decide
//! whether it is fatal via [`SearchResult::into_template`].

mod locations;

pub use locations::{CompositeLookup, LocationFormatLookup};

use std::fmt;
use std::sync::Arc;

use crate::cache::TemplateCache;
use crate::core::{Result, ViewError};
use crate::source::TemplatePath;
use crate::templating::Template;

/// Rendering scope used to expand location formats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupScope {
    /// Controller name (`{1}` in location formats)
    pub controller: Option<String>,
    /// Area name (`{2}` in location formats)
    pub area: Option<String>,
}

impl LookupScope {
    /// Scope for `controller` with no area.
    pub fn controller(controller: impl Into<String>) -> Self {
        Self {
            controller: Some(controller.into()),
            area: None,
        }
    }

    /// Add an area to the scope.
    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }
}

/// A view located by a [`PartialViewLookup`].
#[derive(Clone)]
pub enum LocatedView {
    /// Template resource served by this crate
    Stache(TemplatePath),
    /// Already parsed template
    Template(Arc<dyn Template>),
    /// View rendered by a different engine
    Foreign {
        /// Name of the owning engine
        engine: String,
    },
}

impl fmt::Debug for LocatedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatedView::Stache(path) => f.debug_tuple("Stache").field(path).finish(),
            LocatedView::Template(_) => f.write_str("Template(..)"),
            LocatedView::Foreign { engine } => {
                f.debug_struct("Foreign").field("engine", engine).finish()
            }
        }
    }
}

/// Raw answer of a [`PartialViewLookup`].
#[derive(Debug, Clone, Default)]
pub struct ViewLookupResult {
    /// Located view, if any
    pub view: Option<LocatedView>,
    /// Locations probed, in order
    pub searched_locations: Vec<String>,
}

impl ViewLookupResult {
    /// A successful lookup.
    pub fn found(view: LocatedView, searched_locations: Vec<String>) -> Self {
        Self {
            view: Some(view),
            searched_locations,
        }
    }

    /// A failed lookup.
    pub fn not_found(searched_locations: Vec<String>) -> Self {
        Self {
            view: None,
            searched_locations,
        }
    }
}

/// Host collaborator that locates partial views by name.
pub trait PartialViewLookup: Send + Sync {
    /// Find the partial `name` within `scope`.
    fn find_partial_view(&self, name: &str, scope: &LookupScope) -> Result<ViewLookupResult>;
}

/// Outcome of resolving a partial name.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Whether any lookup located the name
    pub found: bool,
    /// Template to embed; `None` for views owned by another engine
    pub template: Option<Arc<dyn Template>>,
    /// Locations probed, in order
    pub searched_locations: Vec<String>,
}

impl SearchResult {
    /// Convert into a resolver answer, failing with
    /// [`ViewError::PartialNotFound`] when nothing was found.
    pub fn into_template(self, name: &str) -> Result<Option<Arc<dyn Template>>> {
        if self.found {
            Ok(self.template)
        } else {
            Err(ViewError::PartialNotFound {
                name: name.to_string(),
                searched_locations: self.searched_locations,
            })
        }
    }
}

/// Resolves partial names for one render.
#[derive(Clone, Copy)]
pub struct PartialResolver<'a> {
    lookup: &'a dyn PartialViewLookup,
    cache: &'a TemplateCache,
    scope: &'a LookupScope,
}

impl<'a> PartialResolver<'a> {
    /// Create a resolver over `lookup`, loading located views through `cache`.
    pub fn new(
        lookup: &'a dyn PartialViewLookup,
        cache: &'a TemplateCache,
        scope: &'a LookupScope,
    ) -> Self {
        Self {
            lookup,
            cache,
            scope,
        }
    }

    /// Resolve `name`.
    ///
    /// # Errors
    ///
    /// Not finding `name` is not an error. Errors come from the lookup itself
    /// or from loading a located template (missing source, parse error).
    pub fn resolve(&self, name: &str) -> Result<SearchResult> {
        let lookup = self.lookup.find_partial_view(name, self.scope)?;

        let template = match lookup.view {
            None => {
                tracing::debug!(
                    "Partial '{}' not found after searching {} location(s)",
                    name,
                    lookup.searched_locations.len()
                );
                return Ok(SearchResult {
                    found: false,
                    template: None,
                    searched_locations: lookup.searched_locations,
                });
            }
            Some(LocatedView::Stache(path)) => {
                tracing::debug!("Partial '{}' located at {}", name, path);
                Some(self.cache.get_or_load(&path)?)
            }
            Some(LocatedView::Template(template)) => Some(template),
            Some(LocatedView::Foreign { engine }) => {
                tracing::warn!("Partial '{}' belongs to the {} engine and cannot be embedded", name, engine);
                None
            }
        };

        Ok(SearchResult {
            found: true,
            template,
            searched_locations: lookup.searched_locations,
        })
    }
}

impl fmt::Debug for PartialResolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialResolver").field("scope", self.scope).finish_non_exhaustive()
    }
}
