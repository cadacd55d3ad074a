//! Whitespace minification for raw template source.
//!
//! The minifier runs on the source text before it reaches the parser. It is a
//! line-oriented state machine: each non-blank line is trimmed, internal
//! whitespace runs collapse to one space, and every line boundary becomes a
//! single space instead of a newline. Lines that open with markup (`<`) never
//! receive a synthesized leading space, and lines that close markup (`>`) are
//! never treated as ending in whitespace.
//!
//! Minification is total: any input produces a deterministic string.
//!
//! # Examples
//!
//! ```
//! use stache_view::minify::minify;
//!
//! assert_eq!(minify("  Hello\n  <b>World</b>  \n"), " Hello <b>World</b> ");
//! ```
//!
//! Minifying the output a second time is stable, with one exception: a trailing
//! boundary space that follows a closing `>` on the last line is dropped by the
//! second pass (the input no longer ends in a newline). From then on the output
//! is a fixed point.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is a valid regex"));

const LINE_SEPARATORS: [char; 2] = ['\n', '\r'];

/// Minify `source` with the carried boundary flag starting at `false`.
pub fn minify(source: &str) -> String {
    minify_with(source, false)
}

/// Minify `source`, seeding the carried "previous line ended on a boundary"
/// flag with `previous_is_whitespace`.
///
/// With the flag set, a leading space is never synthesized for the first line.
pub fn minify_with(source: &str, previous_is_whitespace: bool) -> String {
    let mut previous_is_whitespace = previous_is_whitespace;
    let mut out = String::with_capacity(source.len());

    let lines: Vec<&str> = source.split(LINE_SEPARATORS).filter(|line| !line.is_empty()).collect();
    let source_ends_with_newline = source.ends_with(LINE_SEPARATORS);

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let starts_with_whitespace = line.chars().next().is_some_and(char::is_whitespace);
        if !previous_is_whitespace && starts_with_whitespace && !trimmed.starts_with('<') {
            out.push(' ');
        }

        out.push_str(&WHITESPACE_RUN.replace_all(trimmed, " "));

        let ends_with_whitespace = line.chars().next_back().is_some_and(char::is_whitespace)
            && !trimmed.ends_with('>');
        let has_end_of_line = index + 1 < lines.len() || source_ends_with_newline;

        // Line boundaries become a single space, never a literal newline.
        if has_end_of_line || ends_with_whitespace {
            out.push(' ');
        }

        previous_is_whitespace = has_end_of_line || ends_with_whitespace;
    }

    out
}

/// Transform applied to template source between reading and parsing.
///
/// The built-in minifier is the default; hosts can disable it or inject any
/// `Fn(&str) -> String`.
#[derive(Clone)]
pub enum SourceTransform {
    /// Pass the source through untouched.
    Identity,
    /// Run the built-in minifier.
    Minify {
        /// Initial value of the carried boundary flag
        previous_is_whitespace: bool,
    },
    /// Run a host-supplied transform.
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl SourceTransform {
    /// Wrap a closure as a custom transform.
    pub fn custom<F>(transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        SourceTransform::Custom(Arc::new(transform))
    }

    /// Apply the transform to `source`.
    pub fn apply(&self, source: &str) -> String {
        match self {
            SourceTransform::Identity => source.to_string(),
            SourceTransform::Minify { previous_is_whitespace } => {
                let minified = minify_with(source, *previous_is_whitespace);
                tracing::trace!("Minified template source {} -> {} bytes", source.len(), minified.len());
                minified
            }
            SourceTransform::Custom(transform) => transform(source),
        }
    }
}

impl Default for SourceTransform {
    fn default() -> Self {
        SourceTransform::Minify { previous_is_whitespace: false }
    }
}

impl fmt::Debug for SourceTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTransform::Identity => f.write_str("Identity"),
            SourceTransform::Minify { previous_is_whitespace } => f
                .debug_struct("Minify")
                .field("previous_is_whitespace", previous_is_whitespace)
                .finish(),
            SourceTransform::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
