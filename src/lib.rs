//! stache-view - Mustache-style view rendering with layouts and partials
//!
//! A server-side view layer that resolves template names to template
//! resources, caches parsed templates with staleness detection, minifies
//! template source, and composes a primary template with an optional master
//! (layout) template, inline sections and partials discovered through
//! configurable location formats.
//!
//! # Architecture Overview
//!
//! A render runs through these stages:
//!
//! 1. **Lookup**: view, master and partial names expand into app-relative
//!    paths via location formats ([`partials::LocationFormatLookup`])
//! 2. **Load**: [`cache::TemplateCache`] reads the source, applies the
//!    [`minify::SourceTransform`] and parses it, reusing a cached template
//!    while the source's invalidation token is unchanged
//! 3. **Compose**: [`view::LayoutComposer`] renders the master with the
//!    primary available as `Body`, the primary's inline definitions as named
//!    sections, and everything else through partial lookup
//! 4. **Render**: the template engine ([`templating::mustache`] by default)
//!    interpolates the root data chosen by [`view::RootContextMode`]
//!
//! # Core Modules
//!
//! - [`cache`] - Parsed template cache with pull-based invalidation
//! - [`config`] - Engine options, loadable from TOML
//! - [`core`] - Error types
//! - [`minify`] - Whitespace-collapsing source transform
//! - [`partials`] - Partial and view lookup across location formats
//! - [`source`] - Template sources and path normalization
//! - [`templating`] - Template engine seam and the built-in Mustache engine
//! - [`view`] - View engine, view context and layout composition
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stache_view::partials::LookupScope;
//! use stache_view::source::FileSystemSource;
//! use stache_view::view::{ViewContext, ViewEngine};
//!
//! # fn main() -> anyhow::Result<()> {
//! let engine = ViewEngine::builder(Arc::new(FileSystemSource::new("site"))).build()?;
//! let scope = LookupScope::controller("Home");
//! let view = engine.find_view("Index", Some("Layout"), &scope)?;
//! let html = view.render(&engine, &ViewContext::new().with("title", "Welcome"))?;
//! println!("{html}");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod core;
pub mod minify;
pub mod partials;
pub mod source;
pub mod templating;
pub mod view;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::config::EngineConfig;
pub use crate::core::{Result, ViewError};
pub use crate::view::{RootContextMode, View, ViewContext, ViewEngine, ViewEngineBuilder};
