//! One engine shared by many request threads.

use anyhow::Result;
use std::sync::Arc;
use std::thread;

use crate::common::standard_context;
use stache_view::partials::LookupScope;
use stache_view::source::TemplatePath;
use stache_view::test_utils::{HOME_INDEX_PATH, SiteFixture};
use stache_view::{ViewContext, ViewEngine};

const THREADS: usize = 8;
const RENDERS_PER_THREAD: usize = 25;

#[test]
fn test_concurrent_renders_share_cache() -> Result<()> {
    let engine: Arc<ViewEngine> = Arc::new(SiteFixture::standard().engine()?);
    let expected = engine
        .find_view("Index", Some("Layout"), &LookupScope::controller("Home"))?
        .render(&engine, &standard_context())?;

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || -> stache_view::Result<Vec<String>> {
                let scope = LookupScope::controller("Home");
                let view = engine.find_view("Index", Some("Layout"), &scope)?;
                (0..RENDERS_PER_THREAD).map(|_| view.render(&engine, &standard_context())).collect()
            })
        })
        .collect();

    for handle in handles {
        let outputs = handle.join().map_err(|_| anyhow::anyhow!("render thread panicked"))??;
        assert!(outputs.iter().all(|html| html == &expected));
    }

    // Layout, Index and Footer. Sidebar is inline and never cached on its own.
    assert_eq!(engine.cache().len(), 3);
    let (hits, misses) = engine.cache().stats();
    assert_eq!(hits + misses, 3 * (THREADS * RENDERS_PER_THREAD + 1));
    assert!(misses >= 3);
    Ok(())
}

#[test]
fn test_rewrites_during_concurrent_renders_settle_on_latest() -> Result<()> {
    let site = SiteFixture::new().unminified().with_template(HOME_INDEX_PATH, "v0");
    let engine = Arc::new(site.engine()?);
    let path = TemplatePath::new(HOME_INDEX_PATH);

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let path = path.clone();
            thread::spawn(move || -> stache_view::Result<()> {
                for _ in 0..50 {
                    let html = engine.render(
                        &path,
                        None,
                        &LookupScope::controller("Home"),
                        &ViewContext::new(),
                    )?;
                    assert!(html.starts_with('v'));
                }
                Ok(())
            })
        })
        .collect();

    for version in 1..=10 {
        site.rewrite(HOME_INDEX_PATH, &format!("v{version}"));
    }

    for reader in readers {
        reader.join().map_err(|_| anyhow::anyhow!("reader thread panicked"))??;
    }

    let html = engine.render(
        &path,
        None,
        &LookupScope::controller("Home"),
        &ViewContext::new(),
    )?;
    assert_eq!(html, "v10");

    Ok(())
}
