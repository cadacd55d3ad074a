//! Engine configuration.
//!
//! [`EngineConfig`] gathers every recognised option of the view engine. It is
//! plain data: deserializable from TOML, with every field defaulted, so an
//! empty file is a valid configuration.
//!
//! # File Format
//!
//! ```toml
//! root-context = "model"          # or "view-data" (default)
//! minify = true                   # run the built-in minifier before parsing
//! preserve-leading-whitespace = false
//! max-partial-depth = 16
//!
//! [locations]
//! partial-formats = ["~/Views/{1}/{0}.mustache", "~/Views/Shared/{0}.mustache"]
//! ```
//!
//! Location formats use `{0}` for the view or partial name, `{1}` for the
//! controller and `{2}` for the area.
//!
//! A custom minification transform cannot be expressed in TOML; inject one with
//! [`crate::view::ViewEngineBuilder::transform`].

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_PARTIAL_DEPTH, DEFAULT_TEMPLATE_EXTENSION};
use crate::minify::SourceTransform;
use crate::view::RootContextMode;

/// Recognised view engine options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Which part of the caller's state becomes the render root
    pub root_context: RootContextMode,
    /// Run the built-in minifier over template source before parsing
    pub minify: bool,
    /// Initial value of the minifier's carried boundary flag
    pub preserve_leading_whitespace: bool,
    /// Limit on nested template references within one render
    pub max_partial_depth: usize,
    /// Where views, masters and partials are looked up
    pub locations: LocationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root_context: RootContextMode::default(),
            minify: true,
            preserve_leading_whitespace: false,
            max_partial_depth: DEFAULT_MAX_PARTIAL_DEPTH,
            locations: LocationConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config from {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse engine config from {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        tracing::debug!(
            "Loaded engine config: root_context={:?}, minify={}",
            config.root_context,
            config.minify
        );
        Ok(config)
    }

    /// Source transform implied by `minify` and `preserve-leading-whitespace`.
    pub fn source_transform(&self) -> SourceTransform {
        if self.minify {
            SourceTransform::Minify {
                previous_is_whitespace: self.preserve_leading_whitespace,
            }
        } else {
            SourceTransform::Identity
        }
    }
}

/// Location format strings for view lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LocationConfig {
    /// Formats probed for views
    pub view_formats: Vec<String>,
    /// Formats probed for master (layout) templates
    pub master_formats: Vec<String>,
    /// Formats probed for partials
    pub partial_formats: Vec<String>,
    /// Formats probed for views when an area is in scope
    pub area_view_formats: Vec<String>,
    /// Formats probed for masters when an area is in scope
    pub area_master_formats: Vec<String>,
    /// Formats probed for partials when an area is in scope
    pub area_partial_formats: Vec<String>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        let ext = DEFAULT_TEMPLATE_EXTENSION;
        let controller_and_shared =
            || vec![format!("~/Views/{{1}}/{{0}}.{ext}"), format!("~/Views/Shared/{{0}}.{ext}")];
        let area_controller_and_shared = || {
            vec![
                format!("~/Areas/{{2}}/Views/{{1}}/{{0}}.{ext}"),
                format!("~/Areas/{{2}}/Views/Shared/{{0}}.{ext}"),
            ]
        };

        Self {
            view_formats: controller_and_shared(),
            master_formats: controller_and_shared(),
            partial_formats: controller_and_shared(),
            area_view_formats: area_controller_and_shared(),
            area_master_formats: area_controller_and_shared(),
            area_partial_formats: area_controller_and_shared(),
        }
    }
}
