//! Tree walker that renders parsed Mustache nodes.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::MustacheTemplate;
use super::parser::Node;
use crate::core::{Result, ViewError};
use crate::templating::{NestedResolver, SectionResolver};

pub(crate) struct Renderer<'a> {
    pub(crate) definitions: &'a HashMap<String, Arc<MustacheTemplate>>,
    pub(crate) resolver: &'a dyn SectionResolver,
    pub(crate) depth: usize,
    pub(crate) max_depth: usize,
}

impl Renderer<'_> {
    pub(crate) fn render_nodes<'v>(
        &self,
        nodes: &[Node],
        stack: &mut Vec<&'v Value>,
        out: &mut String,
    ) -> Result<()> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Variable { name, escape } => {
                    if let Some(value) = lookup(stack, name) {
                        let text = stringify(value);
                        if *escape {
                            out.push_str(&tera::escape_html(&text));
                        } else {
                            out.push_str(&text);
                        }
                    }
                }
                Node::Section { name, inverted: true, children } => {
                    if !is_truthy(lookup(stack, name)) {
                        self.render_nodes(children, stack, out)?;
                    }
                }
                Node::Section { name, inverted: false, children } => {
                    match lookup(stack, name) {
                        Some(Value::Array(items)) => {
                            for item in items {
                                self.render_scoped(children, item, stack, out)?;
                            }
                        }
                        Some(value) if is_truthy(Some(value)) => {
                            self.render_scoped(children, value, stack, out)?;
                        }
                        _ => {}
                    }
                }
                Node::Reference { name } => self.render_reference(name, stack, out)?,
            }
        }
        Ok(())
    }

    fn render_scoped<'v>(
        &self,
        nodes: &[Node],
        context: &'v Value,
        stack: &mut Vec<&'v Value>,
        out: &mut String,
    ) -> Result<()> {
        stack.push(context);
        let result = self.render_nodes(nodes, stack, out);
        stack.pop();
        result
    }

    fn render_reference<'v>(
        &self,
        name: &str,
        stack: &mut Vec<&'v Value>,
        out: &mut String,
    ) -> Result<()> {
        let depth = self.depth + 1;
        if depth > self.max_depth {
            return Err(ViewError::PartialDepthExceeded {
                name: name.to_string(),
                max_depth: self.max_depth,
            });
        }

        // Inline definitions of the executing template win over the resolver.
        if let Some(definition) = self.definitions.get(name) {
            let nested = Renderer {
                depth,
                ..*self
            };
            return nested.render_nodes(&definition.nodes, stack, out);
        }

        match self.resolver.resolve(name)? {
            Some(template) => {
                let nested = NestedResolver {
                    inner: self.resolver,
                    depth,
                };
                out.push_str(&template.render_in(stack.as_slice(), &nested)?);
            }
            None => tracing::trace!("Reference '{}' resolved to nothing", name),
        }
        Ok(())
    }
}

fn lookup<'v>(stack: &[&'v Value], name: &str) -> Option<&'v Value> {
    if name == "." {
        return stack.last().copied();
    }

    let mut parts = name.split('.');
    let first = parts.next()?;
    let mut value = stack.iter().rev().copied().find_map(|context| context.get(first))?;
    for part in parts {
        value = value.get(part)?;
    }
    Some(value)
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::String(text)) => !text.is_empty(),
        Some(_) => true,
    }
}

fn stringify(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}
