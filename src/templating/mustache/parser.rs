//! Tag scanner and tree builder for the Mustache-style syntax.

use crate::templating::ParseError;

/// One node of a parsed template body.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Text(String),
    Variable {
        name: String,
        escape: bool,
    },
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
    },
    Reference {
        name: String,
    },
}

/// Parser output: the body plus every hoisted `{{<name}}` definition.
#[derive(Debug, Default)]
pub(crate) struct Parsed {
    pub(crate) nodes: Vec<Node>,
    pub(crate) definitions: Vec<(String, Vec<Node>)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Section { inverted: bool },
    Definition,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    name: String,
    children: Vec<Node>,
    offset: usize,
}

enum Tag<'s> {
    Comment,
    Variable { name: &'s str, escape: bool },
    Open { name: &'s str, kind: FrameKind },
    Close { name: &'s str },
    Reference { name: &'s str },
}

pub(crate) fn parse(source: &str) -> Result<Parsed, ParseError> {
    let mut parsed = Parsed::default();
    let mut stack: Vec<Frame> = Vec::new();
    let mut cursor = 0;

    while let Some(found) = source[cursor..].find("{{") {
        let open = cursor + found;
        if open > cursor {
            container(&mut stack, &mut parsed.nodes).push(Node::Text(source[cursor..open].to_string()));
        }

        let (tag, end) = scan_tag(source, open)?;
        cursor = end;

        match tag {
            Tag::Comment => {}
            Tag::Variable { name, escape } => {
                container(&mut stack, &mut parsed.nodes).push(Node::Variable {
                    name: name.to_string(),
                    escape,
                });
            }
            Tag::Reference { name } => {
                container(&mut stack, &mut parsed.nodes).push(Node::Reference {
                    name: name.to_string(),
                });
            }
            Tag::Open { name, kind } => stack.push(Frame {
                kind,
                name: name.to_string(),
                children: Vec::new(),
                offset: open,
            }),
            Tag::Close { name } => {
                let frame = stack.pop().ok_or_else(|| {
                    ParseError::at(source, open, format!("Unexpected closing tag '{}'", name))
                })?;

                if frame.name != name {
                    return Err(ParseError::at(
                        source,
                        open,
                        format!(
                            "Mismatched closing tag: expected '{}' but found '{}'",
                            frame.name, name
                        ),
                    ));
                }

                match frame.kind {
                    FrameKind::Section { inverted } => {
                        container(&mut stack, &mut parsed.nodes).push(Node::Section {
                            name: frame.name,
                            inverted,
                            children: frame.children,
                        });
                    }
                    FrameKind::Definition => parsed.definitions.push((frame.name, frame.children)),
                }
            }
        }
    }

    if cursor < source.len() {
        container(&mut stack, &mut parsed.nodes).push(Node::Text(source[cursor..].to_string()));
    }

    if let Some(frame) = stack.pop() {
        return Err(ParseError::at(
            source,
            frame.offset,
            format!("Unclosed section '{}'", frame.name),
        ));
    }

    Ok(parsed)
}

fn container<'a>(stack: &'a mut [Frame], root: &'a mut Vec<Node>) -> &'a mut Vec<Node> {
    match stack.last_mut() {
        Some(frame) => &mut frame.children,
        None => root,
    }
}

/// Scan the tag starting at `open` (which points at `{{`), returning the tag
/// and the byte offset just past it.
fn scan_tag(source: &str, open: usize) -> Result<(Tag<'_>, usize), ParseError> {
    if source[open..].starts_with("{{{") {
        let body_start = open + 3;
        let close = source[body_start..]
            .find("}}}")
            .ok_or_else(|| ParseError::at(source, open, "Unclosed tag"))?;
        let name = required_name(source, open, &source[body_start..body_start + close])?;
        return Ok((Tag::Variable { name, escape: false }, body_start + close + 3));
    }

    let body_start = open + 2;
    let close = source[body_start..]
        .find("}}")
        .ok_or_else(|| ParseError::at(source, open, "Unclosed tag"))?;
    let end = body_start + close + 2;
    let body = source[body_start..body_start + close].trim();

    let mut chars = body.chars();
    let tag = match chars.next() {
        Some('!') => Tag::Comment,
        Some('#') => Tag::Open {
            name: required_name(source, open, chars.as_str())?,
            kind: FrameKind::Section { inverted: false },
        },
        Some('^') => Tag::Open {
            name: required_name(source, open, chars.as_str())?,
            kind: FrameKind::Section { inverted: true },
        },
        Some('<') => Tag::Open {
            name: required_name(source, open, chars.as_str())?,
            kind: FrameKind::Definition,
        },
        Some('/') => Tag::Close {
            name: required_name(source, open, chars.as_str())?,
        },
        Some('>') => Tag::Reference {
            name: required_name(source, open, chars.as_str())?,
        },
        Some('&') => Tag::Variable {
            name: required_name(source, open, chars.as_str())?,
            escape: false,
        },
        Some('=') => {
            return Err(ParseError::at(source, open, "Set-delimiter tags are not supported"));
        }
        Some(_) => Tag::Variable {
            name: body,
            escape: true,
        },
        None => return Err(ParseError::at(source, open, "Empty tag")),
    };

    Ok((tag, end))
}

fn required_name<'s>(source: &str, open: usize, raw: &'s str) -> Result<&'s str, ParseError> {
    let name = raw.trim();
    if name.is_empty() {
        Err(ParseError::at(source, open, "Empty tag name"))
    } else {
        Ok(name)
    }
}
