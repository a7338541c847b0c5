//! `quire prerender`: serve the built app and snapshot every route.
//!
//! Resource lifetimes, outermost first:
//!
//! - **Server** - [`ServerHandle`](crate::serve::ServerHandle) guard, dropped on every exit path
//! - **Browser** - launched inside the runtime, always closed after the driver returns
//!
//! Any error from either, or from the driver, fails the command.

use anyhow::{Context, Result, bail};
use std::path::Path;

use crate::config::SiteConfig;
use crate::discover::discover_routes;
use crate::page::{PostManifest, Route};
use crate::snapshot::{
    Browser, ChromiumBrowser, DriverOptions, Sitemap, SnapshotError, SnapshotReport,
};
use crate::utils::plural_count;
use crate::{debug, log, serve, snapshot};

/// Runtime threads; the browser connection is the only async work.
const RUNTIME_THREADS: usize = 2;

pub fn prerender(config: &SiteConfig) -> Result<SnapshotReport> {
    let p = &config.prerender;
    let index = p.dist.join("index.html");
    if !index.is_file() {
        bail!(
            "`{}` not found, build the app first",
            config.root_relative(&index).display()
        );
    }

    let routes = discover_routes(config).into_vec();
    log!("snapshot"; "{} to capture", plural_count(routes.len(), "route"));

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(RUNTIME_THREADS)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let server = serve::start(&p.dist, p.interface, p.port).map_err(SnapshotError::from)?;
    let output = p.snapshot_root().to_path_buf();
    let options = DriverOptions::from_config(p, output.clone(), server.base_url());

    let report = rt.block_on(capture(config, &routes, &options))?;
    drop(server);

    if let Some(path) = write_sitemap(config, &report, &output)? {
        debug!("snapshot"; "wrote {}", config.root_relative(&path).display());
    }
    Ok(report)
}

async fn capture(
    config: &SiteConfig,
    routes: &[Route],
    options: &DriverOptions,
) -> Result<SnapshotReport, SnapshotError> {
    let browser = ChromiumBrowser::launch(&config.prerender).await?;
    let result = snapshot::run(&browser, routes, options).await;
    if let Err(e) = browser.close().await {
        log!("warning"; "failed to close browser: {}", e);
    }
    result
}

/// Write `sitemap.xml` when enabled and `site.url` is set.
fn write_sitemap(
    config: &SiteConfig,
    report: &SnapshotReport,
    output: &Path,
) -> Result<Option<std::path::PathBuf>> {
    if !config.prerender.sitemap {
        return Ok(None);
    }
    let Some(base_url) = config.site.url.as_deref() else {
        debug!("snapshot"; "site.url not set, skipping sitemap");
        return Ok(None);
    };

    let manifest = PostManifest::load(&config.build.output).unwrap_or_else(|e| {
        log!("warning"; "ignoring unreadable manifest: {:#}", e);
        None
    });
    let path = Sitemap::build(base_url, report.captured_routes(), manifest.as_ref()).write(output)?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_in;
    use crate::snapshot::{RouteOutcome, RouteState};
    use std::fs;
    use tempfile::TempDir;

    fn report(output: &Path, routes: &[&str]) -> SnapshotReport {
        let outcomes = routes
            .iter()
            .map(|r| {
                let route = Route::parse(r).unwrap();
                RouteOutcome {
                    path: route.snapshot_path(output),
                    route,
                    state: RouteState::Captured,
                }
            })
            .collect();
        SnapshotReport {
            outcomes,
            not_found: None,
        }
    }

    #[test]
    fn test_missing_dist_index_fails_early() {
        let dir = TempDir::new().unwrap();
        let config = test_config_in(dir.path(), "");
        let err = prerender(&config).unwrap_err();
        assert!(err.to_string().contains("build the app first"));
    }

    #[test]
    fn test_sitemap_requires_site_url() {
        let dir = TempDir::new().unwrap();
        let config = test_config_in(dir.path(), "");
        let report = report(dir.path(), &["/"]);
        assert_eq!(write_sitemap(&config, &report, dir.path()).unwrap(), None);
    }

    #[test]
    fn test_sitemap_with_manifest_dates() {
        let dir = TempDir::new().unwrap();
        let content = dir.path().join("content");
        fs::create_dir_all(&content).unwrap();
        fs::write(content.join("2024-03-15-hello.md"), "Hi").unwrap();

        let config = test_config_in(dir.path(), "[site]\nurl = \"https://blog.example.com\"");
        crate::cli::generate::generate(&config, false).unwrap();

        let report = report(dir.path(), &["/", "/posts/hello"]);
        let path = write_sitemap(&config, &report, dir.path()).unwrap().unwrap();
        let xml = fs::read_to_string(path).unwrap();
        assert!(xml.contains("<loc>https://blog.example.com/</loc>"));
        assert!(xml.contains("<lastmod>2024-03-15</lastmod>"));
    }

    #[test]
    fn test_sitemap_disabled() {
        let dir = TempDir::new().unwrap();
        let config = test_config_in(
            dir.path(),
            "[site]\nurl = \"https://blog.example.com\"\n[prerender]\nsitemap = false",
        );
        let report = report(dir.path(), &["/"]);
        assert_eq!(write_sitemap(&config, &report, dir.path()).unwrap(), None);
    }
}
