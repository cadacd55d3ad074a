//! Template parsing and rendering interface.
//!
//! The view layer treats the template language as a black box reached through
//! three seams:
//!
//! - [`TemplateEngine`] turns source text into a parsed [`Template`].
//! - [`Template`] renders against root data and exposes its inline named
//!   sections.
//! - [`SectionResolver`] is handed to every render; the template calls it for
//!   each reference it cannot satisfy itself.
//!
//! Parsed templates are immutable and shared as `Arc<dyn Template>` across
//! concurrent renders.
//!
//! The crate ships one engine, [`mustache::MustacheEngine`], used by default.
//!
//! # Example
//!
//! ```
//! use stache_view::templating::{NoSections, TemplateEngine};
//! use stache_view::templating::mustache::MustacheEngine;
//! use serde_json::json;
//!
//! # fn example() -> anyhow::Result<()> {
//! let template = MustacheEngine::default().parse("Hello {{name}}!")?;
//! let output = template.render(&json!({ "name": "World" }), &NoSections)?;
//! assert_eq!(output, "Hello World!");
//! # Ok(())
//! # }
//! ```

pub mod mustache;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::core::Result;

/// A parsed, immutable template.
pub trait Template: Send + Sync + fmt::Debug {
    /// Render with `data` as the root context, resolving references through
    /// `resolver`.
    fn render(&self, data: &Value, resolver: &dyn SectionResolver) -> Result<String> {
        self.render_in(&[data], resolver)
    }

    /// Render against a context stack, outermost first.
    ///
    /// A referenced template is rendered this way so names from enclosing
    /// sections stay visible to it. The last entry is the current context.
    fn render_in(&self, stack: &[&Value], resolver: &dyn SectionResolver) -> Result<String>;

    /// Inline section defined inside this template, if any.
    fn named_section(&self, name: &str) -> Option<Arc<dyn Template>>;
}

/// Parser collaborator.
pub trait TemplateEngine: Send + Sync {
    /// Parse `source` into a template.
    fn parse(&self, source: &str) -> std::result::Result<Arc<dyn Template>, ParseError>;
}

/// Capability handed to a render for resolving section and partial names.
///
/// `Ok(None)` means "nothing to render here"; an error aborts the render.
pub trait SectionResolver {
    /// Resolve `name` to a template.
    fn resolve(&self, name: &str) -> Result<Option<Arc<dyn Template>>>;

    /// How many template references deep the current render is.
    fn depth(&self) -> usize {
        0
    }
}

/// Resolver that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSections;

impl SectionResolver for NoSections {
    fn resolve(&self, _name: &str) -> Result<Option<Arc<dyn Template>>> {
        Ok(None)
    }
}

/// Resolver wrapper that records one more level of nesting.
pub(crate) struct NestedResolver<'a> {
    pub(crate) inner: &'a dyn SectionResolver,
    pub(crate) depth: usize,
}

impl SectionResolver for NestedResolver<'_> {
    fn resolve(&self, name: &str) -> Result<Option<Arc<dyn Template>>> {
        self.inner.resolve(name)
    }

    fn depth(&self) -> usize {
        self.depth
    }
}

/// Template syntax error reported by a [`TemplateEngine`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (line {line}, column {column})")]
pub struct ParseError {
    /// What went wrong
    pub message: String,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
}

impl ParseError {
    /// Build an error at byte `offset` of `source`.
    pub fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_and_column(source, offset);
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

/// 1-based line and column of byte `offset` in `source`.
fn line_and_column(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |index| index + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
