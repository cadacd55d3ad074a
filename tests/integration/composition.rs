//! Layout composition through the public render API.

use anyhow::Result;
use serde_json::json;

use crate::common::standard_context;
use stache_view::partials::LookupScope;
use stache_view::source::TemplatePath;
use stache_view::test_utils::{HOME_INDEX_PATH, LAYOUT_PATH, SiteFixture, init_test_logging};
use stache_view::{EngineConfig, RootContextMode, ViewContext, ViewError};

fn home() -> LookupScope {
    LookupScope::controller("Home")
}

#[test]
fn test_master_pulls_in_body_inline_section_and_partial() -> Result<()> {
    init_test_logging(None);
    let engine = SiteFixture::standard().engine()?;

    let html = engine.render(
        &TemplatePath::new(HOME_INDEX_PATH),
        Some(&TemplatePath::new(LAYOUT_PATH)),
        &home(),
        &standard_context(),
    )?;

    assert_eq!(
        html,
        "<html> <body> <nav><a>a</a><a>b</a></nav> <main><h1>Welcome</h1> </main> <footer>bye</footer> </body> </html> "
    );
    Ok(())
}

#[test]
fn test_unminified_output_keeps_template_text() -> Result<()> {
    let site = SiteFixture::new()
        .unminified()
        .with_template("~/Views/Shared/Layout.mustache", "[{{>Body}}]\n{{>Footer}}\n")
        .with_template("~/Views/Home/Index.mustache", "  {{title}}  ")
        .with_template("~/Views/Shared/Footer.mustache", "-- {{footer}}");
    let engine = site.engine()?;

    let html = engine.render(
        &TemplatePath::new("~/Views/Home/Index.mustache"),
        Some(&TemplatePath::new("~/Views/Shared/Layout.mustache")),
        &home(),
        &standard_context(),
    )?;

    assert_eq!(html, "[  Welcome  ]\n-- bye\n");
    Ok(())
}

#[test]
fn test_missing_partial_names_the_partial_and_locations() -> Result<()> {
    let site = SiteFixture::standard();
    site.remove("~/Views/Shared/Footer.mustache");
    let engine = site.engine()?;

    let error = engine
        .render(
            &TemplatePath::new(HOME_INDEX_PATH),
            Some(&TemplatePath::new(LAYOUT_PATH)),
            &home(),
            &standard_context(),
        )
        .unwrap_err();

    match &error {
        ViewError::PartialNotFound { name, searched_locations } => {
            assert_eq!(name, "Footer");
            assert_eq!(
                searched_locations,
                &vec!["~/Views/Home/Footer.mustache", "~/Views/Shared/Footer.mustache"]
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let message = error.to_string();
    assert!(message.contains("The partial view 'Footer' was not found"));
    assert!(message.contains("\n~/Views/Shared/Footer.mustache"));
    Ok(())
}

#[test]
fn test_without_master_body_is_not_special() -> Result<()> {
    let site = SiteFixture::new()
        .unminified()
        .with_template("~/Views/Home/Plain.mustache", "{{title}}|{{>Footer}}")
        .with_template("~/Views/Home/Footer.mustache", "home footer")
        .with_template("~/Views/Home/SelfRef.mustache", "{{>Body}}");
    let engine = site.engine()?;
    let context = standard_context();

    let plain = engine.render(&TemplatePath::new("~/Views/Home/Plain.mustache"), None, &home(), &context)?;
    assert_eq!(plain, "Welcome|home footer");

    let error = engine
        .render(&TemplatePath::new("~/Views/Home/SelfRef.mustache"), None, &home(), &context)
        .unwrap_err();
    assert!(matches!(error, ViewError::PartialNotFound { ref name, .. } if name == "Body"));
    Ok(())
}

#[test]
fn test_inline_definition_shadows_partial_of_same_name() -> Result<()> {
    let site = SiteFixture::new()
        .unminified()
        .with_template("~/Views/Shared/Layout.mustache", "{{>Footer}}")
        .with_template("~/Views/Home/Index.mustache", "{{<Footer}}inline{{/Footer}}")
        .with_template("~/Views/Shared/Footer.mustache", "shared");
    let engine = site.engine()?;

    let html = engine.render(
        &TemplatePath::new("~/Views/Home/Index.mustache"),
        Some(&TemplatePath::new("~/Views/Shared/Layout.mustache")),
        &home(),
        &ViewContext::new(),
    )?;
    assert_eq!(html, "inline");
    Ok(())
}

#[test]
fn test_missing_primary_or_master_is_template_not_found() -> Result<()> {
    let engine = SiteFixture::standard().engine()?;
    let context = ViewContext::new();

    let missing_primary = engine
        .render(&TemplatePath::new("~/Views/Home/Nope.mustache"), None, &home(), &context)
        .unwrap_err();
    assert!(matches!(missing_primary, ViewError::TemplateNotFound { .. }));

    let missing_master = engine
        .render(
            &TemplatePath::new(HOME_INDEX_PATH),
            Some(&TemplatePath::new("~/Views/Shared/Missing.mustache")),
            &home(),
            &context,
        )
        .unwrap_err();
    match missing_master {
        ViewError::TemplateNotFound { path } => assert_eq!(path, "~/Views/Shared/Missing.mustache"),
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[test]
fn test_root_context_modes() -> Result<()> {
    let site = SiteFixture::new()
        .unminified()
        .with_template("~/Views/Home/Model.mustache", "{{name}}/{{Model.name}}/{{title}}");
    let context = ViewContext::new().with("title", "T").with_model(json!({ "name": "Ada" }));
    let path = TemplatePath::new("~/Views/Home/Model.mustache");

    let view_data = site.engine()?.render(&path, None, &home(), &context)?;
    assert_eq!(view_data, "/Ada/T");

    let model_engine = site
        .clone()
        .with_config(EngineConfig {
            root_context: RootContextMode::Model,
            minify: false,
            ..EngineConfig::default()
        })
        .engine()?;
    let model = model_engine.render(&path, None, &home(), &context)?;
    assert_eq!(model, "Ada//");
    Ok(())
}

#[test]
fn test_partial_renders_in_section_context() -> Result<()> {
    let site = SiteFixture::new()
        .unminified()
        .with_template("~/Views/Home/List.mustache", "{{#users}}[{{>User}}]{{/users}}")
        .with_template("~/Views/Shared/User.mustache", "{{name}}");
    let engine = site.engine()?;
    let context = ViewContext::new().with("users", json!([{ "name": "a" }, { "name": "b" }]));

    let html = engine.render(&TemplatePath::new("~/Views/Home/List.mustache"), None, &home(), &context)?;
    assert_eq!(html, "[a][b]");
    Ok(())
}

#[test]
fn test_partial_file_sees_enclosing_section_names() -> Result<()> {
    let site = SiteFixture::new()
        .unminified()
        .with_template("~/Views/Home/List.mustache", "{{#users}}[{{>User}}]{{/users}}")
        .with_template(
            "~/Views/Home/Inline.mustache",
            "{{<User}}{{name}}@{{site}}{{/User}}{{#users}}[{{>User}}]{{/users}}",
        )
        .with_template("~/Views/Shared/User.mustache", "{{name}}@{{site}}");
    let engine = site.engine()?;
    let context = ViewContext::new().with("site", "S").with("users", json!([{ "name": "a" }]));

    let from_file = engine.render(&TemplatePath::new("~/Views/Home/List.mustache"), None, &home(), &context)?;
    let inline = engine.render(&TemplatePath::new("~/Views/Home/Inline.mustache"), None, &home(), &context)?;
    assert_eq!(from_file, "[a@S]");
    assert_eq!(inline, from_file);
    Ok(())
}

#[test]
fn test_recursive_partial_hits_depth_limit() -> Result<()> {
    let site = SiteFixture::new()
        .with_config(EngineConfig {
            max_partial_depth: 3,
            ..EngineConfig::default()
        })
        .with_template("~/Views/Home/Loop.mustache", "{{>Loop}}");
    let engine = site.engine()?;

    let error = engine
        .render(&TemplatePath::new("~/Views/Home/Loop.mustache"), None, &home(), &ViewContext::new())
        .unwrap_err();
    assert!(matches!(error, ViewError::PartialDepthExceeded { max_depth: 3, .. }));
    Ok(())
}

#[test]
fn test_parse_error_reports_template_and_position() -> Result<()> {
    let site = SiteFixture::new()
        .unminified()
        .with_template("~/Views/Home/Broken.mustache", "line one\n  {{#open}}never closed");
    let engine = site.engine()?;

    let error = engine
        .render(&TemplatePath::new("~/Views/Home/Broken.mustache"), None, &home(), &ViewContext::new())
        .unwrap_err();
    match error {
        ViewError::TemplateParseError { path, line, .. } => {
            assert_eq!(path, "~/Views/Home/Broken.mustache");
            assert_eq!(line, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}
