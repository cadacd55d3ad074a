//! Error handling for stache-view
//!
//! Every failure the view layer can surface is a variant of [`ViewError`]. Hosts
//! match on the variant instead of the message text, so a missing partial, a
//! missing primary template and a malformed template stay distinguishable all
//! the way up to the diagnostic page.
//!
//! # Error Categories
//!
//! - **Missing resources**: [`ViewError::TemplateNotFound`], [`ViewError::ResourceNotFound`],
//!   [`ViewError::ViewNotFound`]
//! - **Composition**: [`ViewError::PartialNotFound`], [`ViewError::PartialDepthExceeded`]
//! - **Parsing**: [`ViewError::TemplateParseError`]
//! - **Plumbing**: [`ViewError::Io`], [`ViewError::Config`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use stache_view::core::ViewError;
//!
//! fn report(error: &ViewError) {
//!     match error {
//!         ViewError::PartialNotFound { name, searched_locations } => {
//!             eprintln!("missing partial {name} ({} locations)", searched_locations.len());
//!         }
//!         other => eprintln!("{}", other.format_with_context()),
//!     }
//! }
//! ```

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = ViewError> = std::result::Result<T, E>;

/// The main error type for view resolution, composition and rendering.
#[derive(Error, Debug)]
pub enum ViewError {
    /// The primary or master template source does not exist.
    #[error("Template '{path}' was not found")]
    TemplateNotFound {
        /// App-relative path of the template
        path: String,
    },

    /// A template source collaborator could not find the requested resource.
    ///
    /// The template cache converts this into [`ViewError::TemplateNotFound`]
    /// before it reaches a render caller.
    #[error("Resource '{path}' does not exist")]
    ResourceNotFound {
        /// App-relative path of the resource
        path: String,
    },

    /// A section or partial reference could not be resolved anywhere.
    #[error(
        "The partial view '{name}' was not found or no view engine supports the searched locations. The following locations were searched:{}",
        format_location_lines(.searched_locations)
    )]
    PartialNotFound {
        /// Name the template asked for
        name: String,
        /// Every location probed, in probe order
        searched_locations: Vec<String>,
    },

    /// A view (or master) name could not be mapped to a template location.
    #[error(
        "The view '{name}' was not found or no view engine supports the searched locations. The following locations were searched:{}",
        format_location_lines(.searched_locations)
    )]
    ViewNotFound {
        /// View or master name that was requested
        name: String,
        /// Every location probed, in probe order
        searched_locations: Vec<String>,
    },

    /// Template source could not be parsed.
    #[error("Template syntax error in '{path}' at {line}:{column}: {message}")]
    TemplateParseError {
        /// App-relative path of the template
        path: String,
        /// Parser message
        message: String,
        /// 1-based line of the offending tag
        line: usize,
        /// 1-based column of the offending tag
        column: usize,
    },

    /// Template references nested deeper than the configured limit.
    #[error("Template reference '{name}' exceeded the maximum nesting depth of {max_depth}")]
    PartialDepthExceeded {
        /// Reference that crossed the limit
        name: String,
        /// Configured limit
        max_depth: usize,
    },

    /// I/O failure while reading a template source.
    #[error("Failed to read template source '{path}'")]
    Io {
        /// Path being read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Engine configuration is incomplete or invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },
}

impl ViewError {
    /// Whether this error means something that was asked for does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ViewError::TemplateNotFound { .. }
                | ViewError::ResourceNotFound { .. }
                | ViewError::PartialNotFound { .. }
                | ViewError::ViewNotFound { .. }
        )
    }

    /// Generate a multi-line operator diagnostic with context and a suggestion.
    pub fn format_with_context(&self) -> String {
        match self {
            ViewError::TemplateNotFound { path } | ViewError::ResourceNotFound { path } => {
                let mut msg = String::new();
                msg.push_str("ERROR: Template Not Found\n\n");
                msg.push_str(&format!("Path: {}\n\n", path));
                msg.push_str("SUGGESTION: Check that the file exists under the application root.\n");
                msg
            }
            ViewError::PartialNotFound { name, searched_locations } => {
                format_searched_error("Partial View Not Found", "Partial", name, searched_locations)
            }
            ViewError::ViewNotFound { name, searched_locations } => {
                format_searched_error("View Not Found", "View", name, searched_locations)
            }
            ViewError::TemplateParseError { path, message, line, column } => {
                let mut msg = String::new();
                msg.push_str("ERROR: Template Syntax Error\n\n");
                msg.push_str(&format!("Error: {}\n", message));
                msg.push_str(&format!("Template: {}\n", path));
                msg.push_str(&format!("Line: {}, Column: {}\n", line, column));
                msg.push_str("\nSUGGESTION: Check template syntax for unclosed tags or sections.\n");
                msg.push_str("Common issues:\n");
                msg.push_str("  - Unclosed {{ }} delimiters\n");
                msg.push_str("  - {{#section}} without a matching {{/section}}\n");
                msg.push_str("  - Closing tag name differs from the opening tag\n");
                msg
            }
            ViewError::PartialDepthExceeded { name, max_depth } => {
                let mut msg = String::new();
                msg.push_str("ERROR: Template Nesting Too Deep\n\n");
                msg.push_str(&format!("Reference: {}\n", name));
                msg.push_str(&format!("Limit: {}\n", max_depth));
                msg.push_str("\nSUGGESTION: A template probably references itself through a chain of partials.\n");
                msg
            }
            other => format!("ERROR: {}\n", other),
        }
    }
}

fn format_searched_error(
    header: &str,
    label: &str,
    name: &str,
    searched_locations: &[String],
) -> String {
    let mut msg = String::new();
    msg.push_str(&format!("ERROR: {}\n\n", header));
    msg.push_str(&format!("{}: {}\n", label, name));

    if searched_locations.is_empty() {
        msg.push_str("No locations were searched.\n");
    } else {
        msg.push_str("Searched locations:\n");
        for location in searched_locations {
            msg.push_str(&format!("  - {}\n", location));
        }
    }

    msg.push_str("\nSUGGESTION: Add the template to one of the searched locations, ");
    msg.push_str("or define it inline with {{<name}}...{{/name}}.\n");
    msg
}

fn format_location_lines(locations: &[String]) -> String {
    let mut out = String::new();
    for location in locations {
        out.push('\n');
        out.push_str(location);
    }
    out
}
