//! Constants shared across the view layer.

/// Section name a master template uses to pull in the primary template.
pub const BODY_SECTION: &str = "Body";

/// Default limit on nested template references within one render.
pub const DEFAULT_MAX_PARTIAL_DEPTH: usize = 16;

/// File extension used by the default location formats.
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "mustache";
