//! Master/body/section composition.
//!
//! A render either runs the primary template directly, or runs a master
//! template that pulls the primary in. In both cases the template being run
//! receives a [`SectionResolver`] built fresh for this render:
//!
//! | Mode | Resolution order |
//! |------|------------------|
//! | with master | `Body` → primary's inline section → partial lookup |
//! | without master | partial lookup |
//!
//! A name no step can satisfy fails the render with
//! [`crate::core::ViewError::PartialNotFound`].

use std::sync::Arc;

use serde_json::Value;

use crate::constants::BODY_SECTION;
use crate::core::Result;
use crate::partials::PartialResolver;
use crate::templating::{SectionResolver, Template};

/// Resolver used when a master template is rendered.
#[derive(Debug)]
pub struct LayoutSectionResolver<'a> {
    primary: Arc<dyn Template>,
    partials: PartialResolver<'a>,
}

impl<'a> LayoutSectionResolver<'a> {
    /// Resolve `Body` to `primary`, then `primary`'s inline sections, then partials.
    pub fn new(primary: Arc<dyn Template>, partials: PartialResolver<'a>) -> Self {
        Self {
            primary,
            partials,
        }
    }
}

impl SectionResolver for LayoutSectionResolver<'_> {
    fn resolve(&self, name: &str) -> Result<Option<Arc<dyn Template>>> {
        if name == BODY_SECTION {
            return Ok(Some(Arc::clone(&self.primary)));
        }

        if let Some(section) = self.primary.named_section(name) {
            tracing::trace!("Section '{}' supplied by the primary template", name);
            return Ok(Some(section));
        }

        self.partials.resolve(name)?.into_template(name)
    }
}

/// Resolver used when the primary template renders without a master.
#[derive(Debug)]
pub struct PartialOnlyResolver<'a> {
    partials: PartialResolver<'a>,
}

impl<'a> PartialOnlyResolver<'a> {
    /// Resolve every name through `partials`.
    pub fn new(partials: PartialResolver<'a>) -> Self {
        Self {
            partials,
        }
    }
}

impl SectionResolver for PartialOnlyResolver<'_> {
    fn resolve(&self, name: &str) -> Result<Option<Arc<dyn Template>>> {
        self.partials.resolve(name)?.into_template(name)
    }
}

/// Renders a primary template, optionally inside a master.
#[derive(Debug)]
pub struct LayoutComposer<'a> {
    partials: PartialResolver<'a>,
}

impl<'a> LayoutComposer<'a> {
    /// Create a composer falling back to `partials` for unresolved names.
    pub fn new(partials: PartialResolver<'a>) -> Self {
        Self {
            partials,
        }
    }

    /// Render `primary` (inside `master` when given) with `data` as root.
    pub fn compose(
        &self,
        primary: &Arc<dyn Template>,
        master: Option<&Arc<dyn Template>>,
        data: &Value,
    ) -> Result<String> {
        match master {
            Some(master) => {
                tracing::debug!("Composing primary template inside master");
                let resolver = LayoutSectionResolver::new(Arc::clone(primary), self.partials);
                master.render(data, &resolver)
            }
            None => {
                tracing::debug!("Rendering primary template without master");
                primary.render(data, &PartialOnlyResolver::new(self.partials))
            }
        }
    }
}
