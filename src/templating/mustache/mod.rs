//! Built-in Mustache-style template engine.
//!
//! Supported tags:
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `{{name}}` | HTML-escaped value |
//! | `{{{name}}}`, `{{& name}}` | raw value |
//! | `{{#name}}...{{/name}}` | section: arrays iterate, objects push context, other truthy values render once |
//! | `{{^name}}...{{/name}}` | inverted section |
//! | `{{! text}}` | comment |
//! | `{{> name}}` | template reference |
//! | `{{< name}}...{{/name}}` | inline template definition |
//!
//! Names are dotted paths looked up innermost context first; `.` is the
//! current context. Missing names render empty. `null`, `false`, `[]` and `""`
//! are falsy.
//!
//! A `{{> name}}` reference is satisfied by the executing template's own
//! inline definitions first, then by the [`SectionResolver`] handed to the
//! render. Either way the referenced template sees the whole context stack,
//! so names from enclosing sections resolve inside it. Inline definitions never render where they are written; they are
//! exposed through [`Template::named_section`].

mod parser;
mod renderer;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::constants::DEFAULT_MAX_PARTIAL_DEPTH;
use crate::core::Result;
use crate::templating::{ParseError, SectionResolver, Template, TemplateEngine};

use parser::Node;
use renderer::Renderer;

static NULL: Value = Value::Null;

/// Parser for the Mustache-style syntax.
#[derive(Debug, Clone, Copy)]
pub struct MustacheEngine {
    max_depth: usize,
}

impl MustacheEngine {
    /// Create an engine whose templates allow `max_depth` nested references.
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
        }
    }

    /// Parse `source` into a concrete [`MustacheTemplate`].
    pub fn parse_template(&self, source: &str) -> std::result::Result<MustacheTemplate, ParseError> {
        let parsed = parser::parse(source)?;

        let definitions = parsed
            .definitions
            .into_iter()
            .map(|(name, nodes)| {
                let template = MustacheTemplate {
                    nodes,
                    definitions: HashMap::new(),
                    max_depth: self.max_depth,
                };
                (name, Arc::new(template))
            })
            .collect();

        Ok(MustacheTemplate {
            nodes: parsed.nodes,
            definitions,
            max_depth: self.max_depth,
        })
    }
}

impl Default for MustacheEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PARTIAL_DEPTH)
    }
}

impl TemplateEngine for MustacheEngine {
    fn parse(&self, source: &str) -> std::result::Result<Arc<dyn Template>, ParseError> {
        Ok(Arc::new(self.parse_template(source)?))
    }
}

/// A parsed Mustache template.
#[derive(Debug)]
pub struct MustacheTemplate {
    nodes: Vec<Node>,
    definitions: HashMap<String, Arc<MustacheTemplate>>,
    max_depth: usize,
}

impl MustacheTemplate {
    /// Names of the inline definitions, sorted.
    pub fn section_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Template for MustacheTemplate {
    fn render_in(&self, stack: &[&Value], resolver: &dyn SectionResolver) -> Result<String> {
        let renderer = Renderer {
            definitions: &self.definitions,
            resolver,
            depth: resolver.depth(),
            max_depth: self.max_depth,
        };

        let mut out = String::new();
        let mut stack = stack.to_vec();
        if stack.is_empty() {
            stack.push(&NULL);
        }
        renderer.render_nodes(&self.nodes, &mut stack, &mut out)?;
        Ok(out)
    }

    fn named_section(&self, name: &str) -> Option<Arc<dyn Template>> {
        self.definitions.get(name).map(|definition| Arc::clone(definition) as Arc<dyn Template>)
    }
}
