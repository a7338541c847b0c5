//! Route discovery for the prerender pass.
//!
//! The route set is the configured seed routes followed by one route per
//! eligible source document under the content root, in file order:
//!
//! - markdown documents resolve their route like `generate` does
//!   (frontmatter `page`, else `/posts/<slug>`)
//! - any other configured extension is scanned for a `@page "/route"`
//!   directive
//!
//! Unreadable documents and invalid routes are logged and skipped.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashSet;

use crate::compiler::{collect_all_files, is_private};
use crate::config::SiteConfig;
use crate::config::section::build::is_markdown;
use crate::markdown::extract_frontmatter;
use crate::page::{PostMetadata, Route};
use crate::utils::path::file_stem;
use crate::{debug, log};

/// `@page "/route"`
static PAGE_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"@page[ \t]+"([^"]+)""#).unwrap());

/// Ordered, deduplicated route list.
#[derive(Debug, Default, Clone)]
pub struct RouteSet {
    routes: Vec<Route>,
    seen: FxHashSet<Route>,
}

impl RouteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `route` unless already present. Returns whether it was added.
    pub fn push(&mut self, route: Route) -> bool {
        if !self.seen.insert(route.clone()) {
            return false;
        }
        self.routes.push(route);
        true
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn into_vec(self) -> Vec<Route> {
        self.routes
    }
}

/// Discover every route to capture.
pub fn discover_routes(config: &SiteConfig) -> RouteSet {
    let mut routes = RouteSet::new();

    for seed in &config.prerender.seed_routes {
        add(&mut routes, seed, Path::new("quire.toml"));
    }

    let content = &config.build.content;
    if !content.is_dir() {
        log!("routes"; "content directory {} not found, using seed routes only", content.display());
        return routes;
    }

    let build = &config.build;
    for path in collect_all_files(content) {
        if !build.is_eligible(&path) || is_private(build, &path) {
            continue;
        }
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                log!("warning"; "skipping {}: {}", config.root_relative(&path).display(), e);
                continue;
            }
        };

        if let Some(raw) = document_route(&path, &text) {
            add(&mut routes, &raw, &config.root_relative(&path));
        }
    }

    routes
}

/// Route declared or implied by one document.
fn document_route(path: &Path, text: &str) -> Option<String> {
    if is_markdown(path) {
        let stem = file_stem(path)?;
        let (frontmatter, _) = extract_frontmatter(text);
        return Some(PostMetadata::resolve(stem, &frontmatter).route);
    }

    PAGE_DIRECTIVE
        .captures(text)
        .map(|caps| caps[1].to_string())
}

fn add(routes: &mut RouteSet, raw: &str, source: &Path) {
    match Route::parse(raw) {
        Some(route) => {
            if routes.push(route) {
                debug!("routes"; "{} ({})", raw, source.display());
            }
        }
        None => log!("warning"; "{}: invalid route `{}`, skipped", source.display(), raw),
    }
}
