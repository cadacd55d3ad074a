//! Normalized, application-relative template paths.
//!
//! A [`TemplatePath`] is both the identity of a template resource and the
//! basis of its cache key, so normalization happens exactly once, here:
//!
//! 1. `\` separators become `/`.
//! 2. A leading `~` (application root marker) and leading `/` are dropped.
//! 3. Empty and `.` segments are dropped; `..` pops the previous segment and
//!    never climbs above the application root.
//! 4. Case is preserved.
//!
//! `~/Views//Home/./Index.mustache`, `/Views/Home/Index.mustache` and
//! `Views\Home\Index.mustache` all normalize to `Views/Home/Index.mustache`.

use std::fmt;

/// Prefix applied to every cache key derived from a template path.
pub const CACHE_KEY_PREFIX: &str = "stache:";

/// A normalized template resource path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplatePath {
    normalized: String,
}

impl TemplatePath {
    /// Normalize `raw` into a template path.
    pub fn new(raw: &str) -> Self {
        let unified = raw.replace('\\', "/");
        let rooted = unified.strip_prefix('~').unwrap_or(&unified);

        let mut segments: Vec<&str> = Vec::new();
        for segment in rooted.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }

        Self {
            normalized: segments.join("/"),
        }
    }

    /// Normalized form without any root marker, e.g. `Views/Home/Index.mustache`.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Key under which the parsed template is cached.
    pub fn cache_key(&self) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, self.normalized)
    }

    /// Iterate over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.normalized.split('/').filter(|segment| !segment.is_empty())
    }

    /// Whether `name` is written as an app-relative path rather than a bare name.
    pub fn is_app_relative(name: &str) -> bool {
        name.starts_with("~/") || name.starts_with('/') || name.starts_with("~\\")
    }
}

impl fmt::Display for TemplatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~/{}", self.normalized)
    }
}

impl From<&str> for TemplatePath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for TemplatePath {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}
