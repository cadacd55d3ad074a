//! Location-format based view lookup.

use std::sync::Arc;

use super::{LocatedView, LookupScope, PartialViewLookup, ViewLookupResult};
use crate::config::LocationConfig;
use crate::core::Result;
use crate::source::{TemplatePath, TemplateSource};

/// Looks up views by expanding location format strings and probing a
/// [`TemplateSource`].
///
/// Area formats are probed first when the scope names an area. A format that
/// needs a controller (`{1}`) is skipped when the scope has none. Names written
/// as app-relative paths (`~/...` or `/...`) are probed directly.
pub struct LocationFormatLookup {
    source: Arc<dyn TemplateSource>,
    locations: LocationConfig,
}

impl LocationFormatLookup {
    /// Create a lookup over `source` with the given formats.
    pub fn new(source: Arc<dyn TemplateSource>, locations: LocationConfig) -> Self {
        Self {
            source,
            locations,
        }
    }

    /// Find a view by name.
    pub fn find_view(&self, name: &str, scope: &LookupScope) -> ViewLookupResult {
        self.probe(name, scope, &self.locations.area_view_formats, &self.locations.view_formats)
    }

    /// Find a master (layout) template by name.
    pub fn find_master(&self, name: &str, scope: &LookupScope) -> ViewLookupResult {
        self.probe(name, scope, &self.locations.area_master_formats, &self.locations.master_formats)
    }

    fn probe(
        &self,
        name: &str,
        scope: &LookupScope,
        area_formats: &[String],
        formats: &[String],
    ) -> ViewLookupResult {
        let mut searched = Vec::new();

        if TemplatePath::is_app_relative(name) {
            let path = TemplatePath::new(name);
            if self.source.exists(&path) {
                return ViewLookupResult::found(LocatedView::Stache(path), searched);
            }
            searched.push(name.to_string());
            return ViewLookupResult::not_found(searched);
        }

        let area_candidates: &[String] = if scope.area.is_some() { area_formats } else { &[] };
        for format in area_candidates.iter().chain(formats) {
            let Some(location) = expand(format, name, scope) else {
                continue;
            };

            let path = TemplatePath::new(&location);
            if self.source.exists(&path) {
                tracing::trace!("Located '{}' at {}", name, location);
                return ViewLookupResult::found(LocatedView::Stache(path), searched);
            }
            searched.push(location);
        }

        ViewLookupResult::not_found(searched)
    }
}

impl PartialViewLookup for LocationFormatLookup {
    fn find_partial_view(&self, name: &str, scope: &LookupScope) -> Result<ViewLookupResult> {
        Ok(self.probe(
            name,
            scope,
            &self.locations.area_partial_formats,
            &self.locations.partial_formats,
        ))
    }
}

impl std::fmt::Debug for LocationFormatLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationFormatLookup").field("locations", &self.locations).finish()
    }
}

/// Expand `{0}` (name), `{1}` (controller) and `{2}` (area) in `format`.
///
/// Returns `None` when the format needs a scope value that is absent.
fn expand(format: &str, name: &str, scope: &LookupScope) -> Option<String> {
    let mut location = format.replace("{0}", name);

    if location.contains("{1}") {
        location = location.replace("{1}", scope.controller.as_deref()?);
    }
    if location.contains("{2}") {
        location = location.replace("{2}", scope.area.as_deref()?);
    }

    Some(location)
}

/// Chains several lookups, as a host with multiple view engines would.
///
/// The first lookup that locates the name wins. Searched locations accumulate
/// across every lookup consulted.
#[derive(Default)]
pub struct CompositeLookup {
    lookups: Vec<Arc<dyn PartialViewLookup>>,
}

impl CompositeLookup {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lookup to the chain.
    pub fn with(mut self, lookup: Arc<dyn PartialViewLookup>) -> Self {
        self.lookups.push(lookup);
        self
    }
}

impl PartialViewLookup for CompositeLookup {
    fn find_partial_view(&self, name: &str, scope: &LookupScope) -> Result<ViewLookupResult> {
        let mut searched = Vec::new();

        for lookup in &self.lookups {
            let result = lookup.find_partial_view(name, scope)?;
            searched.extend(result.searched_locations);
            if let Some(view) = result.view {
                return Ok(ViewLookupResult::found(view, searched));
            }
        }

        Ok(ViewLookupResult::not_found(searched))
    }
}
