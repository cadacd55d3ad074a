//! Template cache staleness detection against real and in-memory sources.

use anyhow::Result;

use crate::common::DiskSite;
use stache_view::partials::LookupScope;
use stache_view::source::TemplatePath;
use stache_view::test_utils::SiteFixture;
use stache_view::{EngineConfig, ViewContext, ViewError};

fn unminified() -> EngineConfig {
    EngineConfig {
        minify: false,
        ..EngineConfig::default()
    }
}

#[test]
fn test_file_edit_is_picked_up_on_next_render() -> Result<()> {
    let site = DiskSite::new()?;
    site.write("Views/Home/Index.mustache", "v1 {{name}}")?;
    let engine = site.engine(unminified())?;
    let path = TemplatePath::new("~/Views/Home/Index.mustache");
    let scope = LookupScope::controller("Home");
    let context = ViewContext::new().with("name", "Ada");

    assert_eq!(engine.render(&path, None, &scope, &context)?, "v1 Ada");
    assert_eq!(engine.render(&path, None, &scope, &context)?, "v1 Ada");
    assert_eq!(engine.cache().stats(), (1, 1));

    // A different length guarantees a different token even on coarse mtime clocks.
    site.write("Views/Home/Index.mustache", "version two {{name}}")?;
    assert_eq!(engine.render(&path, None, &scope, &context)?, "version two Ada");
    assert_eq!(engine.cache().stats(), (1, 2));
    assert_eq!(engine.cache().len(), 1);
    Ok(())
}

#[test]
fn test_edited_partial_is_reloaded_inside_master() -> Result<()> {
    let site = DiskSite::new()?;
    site.write("Views/Shared/Layout.mustache", "{{>Body}}+{{>Footer}}")?;
    site.write("Views/Home/Index.mustache", "body")?;
    site.write("Views/Shared/Footer.mustache", "old")?;
    let engine = site.engine(unminified())?;
    let scope = LookupScope::controller("Home");

    let view = engine.find_view("Index", Some("Layout"), &scope)?;
    assert_eq!(view.render(&engine, &ViewContext::new())?, "body+old");

    site.write("Views/Shared/Footer.mustache", "brand new")?;
    assert_eq!(view.render(&engine, &ViewContext::new())?, "body+brand new");
    Ok(())
}

#[test]
fn test_deleted_file_fails_instead_of_serving_stale_template() -> Result<()> {
    let site = DiskSite::new()?;
    site.write("Views/Home/Index.mustache", "here")?;
    let engine = site.engine(unminified())?;
    let path = TemplatePath::new("~/Views/Home/Index.mustache");
    let scope = LookupScope::controller("Home");

    assert_eq!(engine.render(&path, None, &scope, &ViewContext::new())?, "here");
    site.delete("Views/Home/Index.mustache")?;

    let error = engine.render(&path, None, &scope, &ViewContext::new()).unwrap_err();
    assert!(matches!(error, ViewError::TemplateNotFound { .. }));
    assert!(error.is_not_found());
    Ok(())
}

#[test]
fn test_directory_is_not_a_template() -> Result<()> {
    let site = DiskSite::new()?;
    site.write("Views/Home/Folder.mustache/inner.mustache", "x")?;
    let engine = site.engine(unminified())?;

    let error = engine
        .render(
            &TemplatePath::new("~/Views/Home/Folder.mustache"),
            None,
            &LookupScope::controller("Home"),
            &ViewContext::new(),
        )
        .unwrap_err();
    assert!(matches!(error, ViewError::TemplateNotFound { .. }));
    Ok(())
}

#[test]
fn test_memory_rewrite_with_identical_text_still_reloads() -> Result<()> {
    let site = SiteFixture::new().unminified().with_template("~/Views/Home/Index.mustache", "same");
    let engine = site.engine()?;
    let path = TemplatePath::new("~/Views/Home/Index.mustache");
    let scope = LookupScope::controller("Home");

    engine.render(&path, None, &scope, &ViewContext::new())?;
    let before = engine.cache().cached_token(&path);

    site.rewrite("~/Views/Home/Index.mustache", "same");
    engine.render(&path, None, &scope, &ViewContext::new())?;

    assert_ne!(engine.cache().cached_token(&path), before);
    assert_eq!(engine.cache().stats(), (0, 2));
    Ok(())
}

#[test]
fn test_path_spellings_share_one_entry() -> Result<()> {
    let site = SiteFixture::new().unminified().with_template("~/Views/Home/Index.mustache", "x");
    let engine = site.engine()?;
    let scope = LookupScope::controller("Home");

    for spelling in ["~/Views/Home/Index.mustache", "/Views/Home/Index.mustache", "~\\Views\\Home\\Index.mustache"] {
        engine.render(&TemplatePath::new(spelling), None, &scope, &ViewContext::new())?;
    }

    assert_eq!(engine.cache().len(), 1);
    assert_eq!(engine.cache().stats(), (2, 1));
    Ok(())
}
