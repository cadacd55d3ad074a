//! Minifier behavior on realistic template markup.

use anyhow::Result;

use stache_view::minify::{SourceTransform, minify, minify_with};
use stache_view::partials::LookupScope;
use stache_view::source::TemplatePath;
use stache_view::test_utils::SiteFixture;
use stache_view::{ViewContext, ViewEngine};

const PAGE: &str = "<!DOCTYPE html>\r\n<html>\r\n  <head>\r\n    <title>{{title}}</title>\r\n  </head>\r\n\r\n  <body>\r\n    Hello,   {{name}}\r\n    and welcome\r\n  </body>\r\n</html>\r\n";

#[test]
fn test_page_collapses_to_single_line() {
    let minified = minify(PAGE);

    assert!(!minified.contains('\n'));
    assert!(!minified.contains('\r'));
    assert!(!minified.contains("  "));
    assert_eq!(
        minified,
        "<!DOCTYPE html> <html> <head> <title>{{title}}</title> </head> <body> Hello, {{name}} and welcome </body> </html> "
    );
}

#[test]
fn test_text_lines_never_glue_together() {
    let minified = minify("first\nsecond\n   third");
    assert_eq!(minified, "first second third");
}

#[test]
fn test_leading_whitespace_flag_suppresses_first_space() {
    assert_eq!(minify_with("   text", false), " text");
    assert_eq!(minify_with("   text", true), "text");
}

#[test]
fn test_minified_page_is_stable() {
    let once = minify(PAGE);
    let twice = minify(&once);
    assert_eq!(minify(&twice), twice);
}

#[test]
fn test_custom_transform_replaces_minifier() -> Result<()> {
    let site = SiteFixture::new().with_template("~/Views/Home/Index.mustache", "  {{name}}  \n");
    let engine = ViewEngine::builder(site.source())
        .transform(SourceTransform::custom(|source| source.trim().to_uppercase()))
        .build()?;

    // The custom transform runs before parsing, so tag names are uppercased too.
    let html = engine.render(
        &TemplatePath::new("~/Views/Home/Index.mustache"),
        None,
        &LookupScope::controller("Home"),
        &ViewContext::new().with("NAME", "ada"),
    )?;
    assert_eq!(html, "ada");
    Ok(())
}
